//! The closed message sets of the two actors.

use scenic_core::looper::LooperHandle;
use scenic_graphics::backend::GpuBackend;
use scenic_graphics::scene::Scene;
use scenic_graphics::types::FillMode;

/// A value in the host property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
}

/// Messages handled by the main actor.
pub enum MainMessage {
    /// A host property changed.
    SetProperty {
        key: String,
        value: PropertyValue,
    },
    /// (Re)parse the scene from the current source/assets paths.
    LoadScene,
}

/// Backend handoff for the render actor.
pub struct RenderInit {
    pub backend: Box<dyn GpuBackend>,
    /// Posting handle back to the main actor, used to request the initial
    /// scene load once the backend is up.
    pub main: LooperHandle<MainMessage>,
}

/// Messages handled by the render actor.
pub enum RenderMessage {
    /// Hand over the GPU backend.
    InitRender(RenderInit),
    /// Replace the current scene. The scene moves in whole; the main
    /// actor keeps no reference to it.
    SetScene { scene: Box<Scene> },
    /// Render one frame.
    Draw,
    SetFillMode(FillMode),
    /// `true` pauses the frame pacer, `false` resumes it.
    Stop(bool),
    MouseInput { x: f64, y: f64 },
    /// Toggle the graph-diagnostics dump.
    DumpGraph(bool),
}

static_assertions::assert_impl_all!(RenderMessage: Send);
static_assertions::assert_impl_all!(MainMessage: Send);
