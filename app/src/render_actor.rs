//! The render actor: GPU context, compiled graph, frame loop.

use std::sync::Arc;

use scenic_core::looper::{Handler, LooperHandle};
use scenic_core::timer::FrameTimer;
use scenic_graphics::compiler::scene_to_graph;
use scenic_graphics::renderer::SceneRenderer;
use scenic_graphics::scene::Scene;
use scenic_graphics::types::FillMode;

use crate::messages::{MainMessage, RenderMessage};

pub struct RenderActor {
    renderer: Option<SceneRenderer>,
    scene: Option<Box<Scene>>,
    main: Option<LooperHandle<MainMessage>>,
    timer: Arc<FrameTimer>,
    fill_mode: FillMode,
    dump_graph: bool,
}

impl RenderActor {
    pub fn new(timer: Arc<FrameTimer>) -> Self {
        Self {
            renderer: None,
            scene: None,
            main: None,
            timer,
            fill_mode: FillMode::default(),
            dump_graph: false,
        }
    }

    fn compile_current(&mut self) {
        let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) else {
            return;
        };
        let graph = scene_to_graph(scene);
        renderer.compile(scene, graph);
        renderer.set_fill_mode(Some(scene), self.fill_mode);
        if self.dump_graph {
            dump_graph(renderer);
        }
    }

    fn draw(&mut self) {
        self.timer.frame_begin();
        if let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) {
            scene.shader_updater.frame_begin();
            if let Err(e) = renderer.draw_frame(scene) {
                log::error!("frame failed: {e}");
            }
            let dt = self.timer.ideal_time().as_secs_f64();
            scene.pass_frame_time(dt);
            scene.shader_updater.frame_end();
        }
        self.timer.frame_end();
    }
}

fn dump_graph(renderer: &SceneRenderer) {
    let Some(dot) = renderer.graphviz() else {
        return;
    };
    if let Err(e) = std::fs::write("graph.dot", &dot) {
        log::warn!("could not write graph.dot: {e}");
    } else {
        log::info!("wrote graph.dot");
    }
}

impl Handler for RenderActor {
    type Message = RenderMessage;

    fn on_message(&mut self, message: RenderMessage) {
        match message {
            RenderMessage::InitRender(init) => {
                self.renderer = Some(SceneRenderer::new(init.backend));
                self.main = Some(init.main);
                if self.scene.is_some() {
                    // A scene arrived before the backend; compile it now.
                    self.compile_current();
                } else if let Some(main) = &self.main {
                    let _ = main.post(MainMessage::LoadScene);
                }
            }
            RenderMessage::SetScene { scene } => {
                self.scene = Some(scene);
                self.compile_current();
            }
            RenderMessage::Draw => self.draw(),
            RenderMessage::SetFillMode(mode) => {
                self.fill_mode = mode;
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.set_fill_mode(self.scene.as_deref_mut(), mode);
                }
            }
            RenderMessage::Stop(stop) => {
                if stop {
                    self.timer.stop();
                } else {
                    self.timer.run();
                }
            }
            RenderMessage::MouseInput { x, y } => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.shader_updater.mouse_input(x, y);
                }
            }
            RenderMessage::DumpGraph(enable) => {
                self.dump_graph = enable;
                if enable {
                    if let Some(renderer) = &self.renderer {
                        dump_graph(renderer);
                    }
                }
            }
        }
    }
}

impl Drop for RenderActor {
    fn drop(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.destroy();
        }
    }
}
