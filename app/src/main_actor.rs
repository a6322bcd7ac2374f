//! The main actor: scene loading and non-GPU state.

use std::path::Path;
use std::sync::Arc;

use scenic_core::looper::{Handler, LooperHandle};
use scenic_core::timer::FrameTimer;
use scenic_graphics::types::FillMode;
use scenic_vfs::{FileSystemProvider, PkgProvider, Vfs};

use crate::audio::AudioSink;
use crate::messages::{MainMessage, PropertyValue, RenderMessage};
use crate::parser::SceneParser;
use crate::properties;

pub struct MainActor {
    source: String,
    assets: String,
    parser: Box<dyn SceneParser>,
    audio: Box<dyn AudioSink>,
    render: LooperHandle<RenderMessage>,
    timer: Arc<FrameTimer>,
}

impl MainActor {
    pub fn new(
        parser: Box<dyn SceneParser>,
        audio: Box<dyn AudioSink>,
        render: LooperHandle<RenderMessage>,
        timer: Arc<FrameTimer>,
    ) -> Self {
        Self {
            source: String::new(),
            assets: String::new(),
            parser,
            audio,
            render,
            timer,
        }
    }

    fn set_property(&mut self, key: &str, value: PropertyValue) {
        match (key, value) {
            (properties::SOURCE, PropertyValue::Str(source)) => {
                log::info!("source: {}", source);
                self.source = source;
                self.load_scene();
            }
            (properties::ASSETS, PropertyValue::Str(assets)) => {
                self.assets = assets;
                self.load_scene();
            }
            (properties::FPS, PropertyValue::Int(fps)) => {
                if (1..=240).contains(&fps) {
                    self.timer.set_required_fps(fps as u16);
                } else {
                    log::warn!("ignoring out-of-range fps {}", fps);
                }
            }
            (properties::FILL_MODE, PropertyValue::Int(value)) => match FillMode::from_i32(value) {
                Some(mode) => {
                    let _ = self.render.post(RenderMessage::SetFillMode(mode));
                }
                None => log::warn!("unknown fill mode {}", value),
            },
            (properties::VOLUME, PropertyValue::Float(volume)) => {
                self.audio.set_volume(volume.clamp(0.0, 1.0));
            }
            (properties::MUTE, PropertyValue::Bool(muted)) => {
                self.audio.set_muted(muted);
            }
            (properties::GRAPHVIZ, PropertyValue::Bool(enable)) => {
                let _ = self.render.post(RenderMessage::DumpGraph(enable));
            }
            (key, value) => {
                log::warn!("unknown property '{}' = {:?}", key, value);
            }
        }
    }

    /// Assemble the VFS for the current source and hand the parsed scene
    /// to the render actor.
    fn load_scene(&mut self) {
        if self.source.is_empty() || self.assets.is_empty() {
            return;
        }

        let mut vfs = Vfs::new();
        vfs.mount("assets", FileSystemProvider::new(&self.assets));

        let source = Path::new(&self.source);
        let entry = source
            .file_stem()
            .map(|stem| format!("{}.json", stem.to_string_lossy()))
            .unwrap_or_else(|| "scene.json".to_string());

        // Prefer the packed archive next to the source; fall back to the
        // source directory when there is none.
        let pkg_path = source.with_extension("pkg");
        match PkgProvider::open(&pkg_path) {
            Ok(pkg) => vfs.mount("assets", pkg),
            Err(e) => {
                log::info!(
                    "no usable archive at {} ({}), falling back to directory",
                    pkg_path.display(),
                    e
                );
                if let Some(dir) = source.parent() {
                    vfs.mount("assets", FileSystemProvider::new(dir));
                }
            }
        }
        vfs.set_default("assets");

        match self.parser.parse(&entry, vfs) {
            Ok(scene) => {
                let _ = self.render.post(RenderMessage::SetScene {
                    scene: Box::new(scene),
                });
            }
            Err(e) => log::error!("{}", e),
        }
    }
}

impl Handler for MainActor {
    type Message = MainMessage;

    fn on_message(&mut self, message: MainMessage) {
        match message {
            MainMessage::SetProperty { key, value } => self.set_property(&key, value),
            MainMessage::LoadScene => self.load_scene(),
        }
    }
}
