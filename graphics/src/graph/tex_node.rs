//! Texture resource nodes.

use super::dependency::NodeId;

/// Where a texture resource comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexKind {
    /// Decoded scene content uploaded once.
    Imported,
    /// Engine-managed render target, allocated from the reuse pool.
    Temporary,
}

/// Creation parameters of a texture node.
#[derive(Debug, Clone)]
pub struct TexDesc {
    /// Symbolic name, unique per logical resource instance.
    pub key: String,
    /// Diagnostic name shown in graph dumps.
    pub name: String,
    pub kind: TexKind,
}

impl TexDesc {
    /// Descriptor whose kind follows the reserved-name convention.
    pub fn from_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let kind = if crate::reserved::is_reserved(&key) {
            TexKind::Temporary
        } else {
            TexKind::Imported
        };
        Self {
            name: key.clone(),
            key,
            kind,
        }
    }
}

/// A versioned texture resource in the graph.
///
/// Within one compiled graph a `(key, version)` pair identifies exactly
/// one physical-binding decision. A new version is created whenever a pass
/// writes a key that already has a writer.
#[derive(Debug)]
pub struct TexNode {
    desc: TexDesc,
    version: u32,
    prev_version: Option<NodeId>,
    next_version: Option<NodeId>,
    writer: Option<NodeId>,
}

impl TexNode {
    pub(super) fn new(desc: TexDesc) -> Self {
        Self {
            desc,
            version: 0,
            prev_version: None,
            next_version: None,
            writer: None,
        }
    }

    pub(super) fn new_version(desc: TexDesc, version: u32, prev: NodeId) -> Self {
        Self {
            desc,
            version,
            prev_version: Some(prev),
            next_version: None,
            writer: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.desc.key
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn kind(&self) -> TexKind {
        self.desc.kind
    }

    pub fn desc(&self) -> &TexDesc {
        &self.desc
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn prev_version(&self) -> Option<NodeId> {
        self.prev_version
    }

    pub fn next_version(&self) -> Option<NodeId> {
        self.next_version
    }

    /// The pass that produces this version, if any.
    pub fn writer(&self) -> Option<NodeId> {
        self.writer
    }

    pub(super) fn set_writer(&mut self, pass: NodeId) {
        self.writer = Some(pass);
    }

    pub(super) fn set_next_version(&mut self, next: NodeId) {
        self.next_version = Some(next);
    }

    /// Label used in graph dumps.
    pub fn graphviz_label(&self) -> String {
        format!("{} v{}", self.desc.name, self.version)
    }
}
