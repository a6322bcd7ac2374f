//! Packed scene archive provider.
//!
//! Archive layout, all integers little-endian `i32`:
//!
//! ```text
//! [len][version string]
//! [entry count]
//! entry*: [len][path string][offset][length]
//! raw file data (offsets relative to the end of the entry table)
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::VfsError;
use crate::provider::VfsProvider;

#[derive(Debug, Clone, Copy)]
struct PkgEntry {
    offset: u64,
    length: u64,
}

/// Provider backed by a packed scene archive on disk.
///
/// The entry table is parsed eagerly; file contents are read lazily from
/// the archive on each [`read`](VfsProvider::read).
pub struct PkgProvider {
    path: PathBuf,
    version: String,
    entries: HashMap<String, PkgEntry>,
    file: Mutex<File>,
}

fn read_i32(file: &mut File) -> Result<i32, VfsError> {
    let mut buf = [0u8; 4];
    file.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_sized_string(file: &mut File) -> Result<String, VfsError> {
    let len = read_i32(file)?;
    if !(0..=0xFFFF).contains(&len) {
        return Err(VfsError::MalformedArchive(format!(
            "string length {len} out of range"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| VfsError::MalformedArchive(e.to_string()))
}

impl PkgProvider {
    /// Open an archive and parse its entry table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VfsError> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let version = read_sized_string(&mut file)?;
        log::info!("pkg version: {}", version);

        let count = read_i32(&mut file)?;
        if count < 0 {
            return Err(VfsError::MalformedArchive(format!(
                "negative entry count {count}"
            )));
        }
        let mut raw_entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let entry_path = read_sized_string(&mut file)?;
            let offset = read_i32(&mut file)?;
            let length = read_i32(&mut file)?;
            if offset < 0 || length < 0 {
                return Err(VfsError::MalformedArchive(format!(
                    "bad entry bounds for {entry_path}"
                )));
            }
            raw_entries.push((entry_path, offset as u64, length as u64));
        }

        // Offsets in the table are relative to the end of the header.
        let header_size = file.stream_position()?;
        let entries = raw_entries
            .into_iter()
            .map(|(entry_path, offset, length)| {
                (
                    entry_path,
                    PkgEntry {
                        offset: offset + header_size,
                        length,
                    },
                )
            })
            .collect();

        Ok(Self {
            path,
            version,
            entries,
            file: Mutex::new(file),
        })
    }

    /// The archive's version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Path of the archive file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VfsProvider for PkgProvider {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        let entry = *self
            .entries
            .get(path)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(entry.offset))?;
        let mut data = vec![0u8; entry.length as usize];
        file.read_exact(&mut data)?;
        Ok(data)
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, VfsError> {
        let mut result: Vec<String> = self
            .entries
            .keys()
            .filter(|k| prefix.is_empty() || k.starts_with(&format!("{prefix}/")))
            .cloned()
            .collect();
        result.sort();
        Ok(result)
    }
}
