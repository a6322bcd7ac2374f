//! Scene-shader draw pass.

use std::sync::Arc;

use crate::backend::{GpuBackend, GpuBuffer, GpuPipeline, GpuTexture, PipelineDescriptor};
use crate::cache::{ImageSlots, TextureKey};
use crate::reserved;
use crate::scene::{Mesh, Scene, SceneNodeId, SpriteMap};
use crate::shader::{ShaderProgram, ShaderValue, UniformBlockReflection};

use super::{FrameContext, PassState, PrepareContext, RenderPass};

/// Build-time description of a custom-shader pass.
#[derive(Debug, Default)]
pub struct CustomShaderDesc {
    /// The scene node whose mesh and material this pass draws.
    pub node: SceneNodeId,
    /// Symbolic input texture names, in binding order. An empty string is
    /// an intentionally unbound slot.
    pub textures: Vec<String>,
    /// Symbolic name of the output target.
    pub output: String,
    /// Sprite animations per input binding index.
    pub sprites: SpriteMap,
    /// Clear the output before drawing, if set.
    pub clear: Option<[f32; 4]>,
}

/// Draws a scene node's mesh with its material into one output target.
pub struct CustomShaderPass {
    desc: CustomShaderDesc,
    name: String,
    shader: Option<Arc<ShaderProgram>>,
    inputs: Vec<Option<ImageSlots>>,
    output: Option<GpuTexture>,
    pipeline: Option<GpuPipeline>,
    vertex_buffer: Option<GpuBuffer>,
    vertex_count: u32,
    uniform_data: Vec<u8>,
    state: PassState,
}

fn write_member(
    block: &UniformBlockReflection,
    data: &mut [u8],
    name: &str,
    value: &ShaderValue,
) {
    let Some(member) = block.member(name) else {
        return;
    };
    let bytes = value.as_bytes();
    let len = bytes.len().min(member.size);
    let end = member.offset + len;
    if end <= data.len() {
        data[member.offset..end].copy_from_slice(&bytes[..len]);
    }
}

impl CustomShaderPass {
    pub fn new(name: impl Into<String>, desc: CustomShaderDesc) -> Self {
        Self {
            desc,
            name: name.into(),
            shader: None,
            inputs: Vec::new(),
            output: None,
            pipeline: None,
            vertex_buffer: None,
            vertex_count: 0,
            uniform_data: Vec::new(),
            state: PassState::default(),
        }
    }

    pub fn desc(&self) -> &CustomShaderDesc {
        &self.desc
    }

    /// This frame's uniform block contents.
    pub fn uniform_data(&self) -> &[u8] {
        &self.uniform_data
    }

    fn resolve_inputs(&mut self, ctx: &mut PrepareContext<'_>) {
        self.inputs.clear();
        for name in &self.desc.textures {
            if name.is_empty() {
                self.inputs.push(None);
                continue;
            }
            if reserved::is_reserved(name) {
                let Some(rt) = ctx.scene.render_targets.get(name) else {
                    log::warn!("input target '{}' not found, skipping binding", name);
                    self.inputs.push(None);
                    continue;
                };
                let content = TextureKey::from_render_target(rt);
                let persist = !rt.allow_reuse;
                match ctx.cache.query(ctx.backend, name, content, persist) {
                    Ok(texture) => self.inputs.push(Some(ImageSlots {
                        slots: vec![texture],
                        active: 0,
                    })),
                    Err(e) => {
                        log::error!("input target '{}' allocation failed: {e}", name);
                        self.inputs.push(None);
                    }
                }
            } else {
                let Some(scene_tex) = ctx.scene.textures.get(name) else {
                    log::warn!("texture '{}' absent from scene, skipping binding", name);
                    self.inputs.push(None);
                    continue;
                };
                let image = Arc::clone(&scene_tex.image);
                match ctx.cache.create_from_image(ctx.backend, &image) {
                    Ok(slots) => self.inputs.push(Some(slots)),
                    Err(e) => {
                        log::error!("texture '{}' upload failed: {e}", name);
                        self.inputs.push(None);
                    }
                }
            }
        }
    }
}

impl RenderPass for CustomShaderPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self, mut ctx: PrepareContext<'_>) {
        let node = ctx.scene.graph.node(self.desc.node);
        let Some(material) = node.material.clone() else {
            log::warn!("pass '{}' has no material, skipping", self.name);
            return;
        };
        let mesh = node.mesh.clone().unwrap_or_else(Mesh::unit_quad);

        self.resolve_inputs(&mut ctx);
        let PrepareContext {
            scene, backend, cache,
        } = ctx;

        let Some(rt) = scene.render_targets.get(&self.desc.output) else {
            log::warn!(
                "output target '{}' missing for pass '{}'",
                self.desc.output,
                self.name
            );
            return;
        };
        let content = TextureKey::from_render_target(rt);
        let persist = !rt.allow_reuse;
        let color_format = rt.format;
        match cache.query(backend, &self.desc.output, content, persist) {
            Ok(texture) => self.output = Some(texture),
            Err(e) => {
                log::error!("output target '{}' allocation failed: {e}", self.desc.output);
                return;
            }
        }

        let pipeline_desc = PipelineDescriptor::new(&self.name, Arc::clone(&material.shader))
            .with_vertex_layout(mesh.layout.clone())
            .with_blend(material.blend)
            .with_color_format(color_format)
            .with_samplers(self.desc.textures.len() as u32);
        match backend.create_pipeline(&pipeline_desc) {
            Ok(pipeline) => self.pipeline = Some(pipeline),
            Err(e) => {
                log::error!("pipeline creation failed for pass '{}': {e}", self.name);
                return;
            }
        }

        match backend.create_buffer(bytemuck::cast_slice(&mesh.vertices)) {
            Ok(buffer) => {
                self.vertex_buffer = Some(buffer);
                self.vertex_count = mesh.vertex_count();
            }
            Err(e) => {
                log::error!("vertex buffer creation failed for pass '{}': {e}", self.name);
                return;
            }
        }

        self.uniform_data.clear();
        if let Some(block) = &material.shader.reflection.block {
            self.uniform_data = vec![0u8; block.size];
            for (name, value) in &material.constants {
                write_member(block, &mut self.uniform_data, name, value);
            }
            let Scene {
                graph,
                shader_updater,
                ..
            } = &mut *scene;
            let exists = |name: &str| block.member(name).is_some();
            shader_updater.init_uniforms(graph.node(self.desc.node), &exists);
        }
        self.shader = Some(Arc::clone(&material.shader));

        self.state.release(cache);
        self.state.set_prepared();
    }

    fn execute(&mut self, ctx: FrameContext<'_>) {
        if !self.state.prepared() {
            return;
        }
        let FrameContext { scene, encoder } = ctx;
        let (Some(pipeline), Some(output)) = (self.pipeline, self.output.clone()) else {
            return;
        };

        // Advance sprite animations and switch the active image slots.
        let dt = scene.frame_time as f32;
        for (&index, sprite) in self.desc.sprites.iter_mut() {
            let Some(frame) = sprite.tick(dt) else {
                continue;
            };
            if let Some(Some(slots)) = self.inputs.get_mut(index) {
                if frame.image_index < slots.slots.len() {
                    slots.active = frame.image_index;
                }
            }
        }

        // Let the scene-format updater fill this frame's uniform values.
        if let Some(block) = self.shader.as_ref().and_then(|s| s.reflection.block.as_ref()) {
            let Scene {
                graph,
                shader_updater,
                ..
            } = &mut *scene;
            let node = graph.node(self.desc.node);
            let data = &mut self.uniform_data;
            let exists = |name: &str| block.member(name).is_some();
            let mut update = |name: &str, value: ShaderValue| {
                write_member(block, data, name, &value);
            };
            shader_updater.update_uniforms(node, &mut self.desc.sprites, &exists, &mut update);
        }

        encoder.begin_render_pass(output, self.desc.clear);
        encoder.bind_pipeline(pipeline);
        if !self.uniform_data.is_empty() {
            encoder.write_uniforms(pipeline, self.uniform_data.clone());
        }
        let textures: Vec<GpuTexture> = self
            .inputs
            .iter()
            .flatten()
            .filter_map(|slots| slots.active_texture().cloned())
            .collect();
        if !textures.is_empty() {
            encoder.bind_textures(textures);
        }
        if let Some(buffer) = self.vertex_buffer {
            encoder.bind_vertex_buffer(buffer);
        }
        encoder.draw(self.vertex_count);
        encoder.end_render_pass();
    }

    fn destroy(&mut self, backend: &dyn GpuBackend) {
        if let Some(pipeline) = self.pipeline.take() {
            backend.destroy_pipeline(pipeline);
        }
        self.inputs.clear();
        self.output = None;
        self.vertex_buffer = None;
        self.shader = None;
    }

    fn prepared(&self) -> bool {
        self.state.prepared()
    }

    fn set_release_texs(&mut self, keys: Vec<String>) {
        self.state.set_release_texs(keys);
    }

    fn rebind_input(&mut self, index: usize, key: &str) {
        match self.desc.textures.get_mut(index) {
            Some(slot) => *slot = key.to_string(),
            None => log::warn!(
                "rebind of input {index} out of range for pass '{}'",
                self.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, DummyBackend, FrameEncoder};
    use crate::cache::TextureCache;
    use crate::scene::{
        Image, Material, RenderTargetDescriptor, SceneNode, SceneTexture, ShaderValueUpdater,
    };
    use crate::shader::{ShaderReflection, UniformMember};
    use scenic_vfs::Vfs;

    fn test_shader() -> Arc<ShaderProgram> {
        Arc::new(ShaderProgram {
            name: "test".into(),
            stages: Vec::new(),
            reflection: ShaderReflection {
                block: Some(UniformBlockReflection {
                    binding: 0,
                    size: 8,
                    members: vec![UniformMember {
                        name: "g_time".into(),
                        offset: 0,
                        size: 4,
                    }],
                }),
                attributes: Vec::new(),
                samplers: Vec::new(),
            },
        })
    }

    fn test_scene() -> (Scene, SceneNodeId) {
        let mut scene = Scene::new("test", Vfs::new());
        scene.render_targets.insert(
            "_rt_out".into(),
            RenderTargetDescriptor::sized(128, 128),
        );
        scene.textures.insert(
            "img".into(),
            SceneTexture {
                name: "img".into(),
                image: Arc::new(Image::new("img", 8, 8, vec![0; 256])),
                sprite: None,
            },
        );
        let mut node = SceneNode::new("layer");
        node.mesh = Some(Mesh::unit_quad());
        node.material = Some(Material {
            name: "mat".into(),
            shader: test_shader(),
            textures: vec!["img".into()],
            ..Default::default()
        });
        let root = scene.graph.root();
        let id = scene.graph.add_node(root, node);
        (scene, id)
    }

    fn pass_for(node: SceneNodeId, textures: Vec<String>) -> CustomShaderPass {
        CustomShaderPass::new(
            "layer",
            CustomShaderDesc {
                node,
                textures,
                output: "_rt_out".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_prepare_and_execute() {
        let (mut scene, node) = test_scene();
        let backend = DummyBackend::default();
        let state = backend.state();
        let mut cache = TextureCache::new();

        let mut pass = pass_for(node, vec!["img".into()]);
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });
        assert!(pass.prepared());
        assert_eq!(state.pipelines_created(), 1);

        let mut encoder = FrameEncoder::new();
        pass.execute(FrameContext {
            scene: &mut scene,
            encoder: &mut encoder,
        });
        let commands = encoder.commands();
        assert!(matches!(commands.first(), Some(Command::BeginRenderPass { .. })));
        assert!(commands.iter().any(|c| matches!(c, Command::Draw { vertex_count: 4 })));
        assert!(matches!(commands.last(), Some(Command::EndRenderPass)));
    }

    #[test]
    fn test_missing_texture_skips_binding() {
        let (mut scene, node) = test_scene();
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let mut pass = pass_for(node, vec!["not-there".into()]);
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });
        // The lookup miss degrades to an empty binding, not a failure.
        assert!(pass.prepared());

        let mut encoder = FrameEncoder::new();
        pass.execute(FrameContext {
            scene: &mut scene,
            encoder: &mut encoder,
        });
        assert!(!encoder
            .commands()
            .iter()
            .any(|c| matches!(c, Command::BindTextures(_))));
    }

    #[test]
    fn test_missing_output_leaves_unprepared() {
        let (mut scene, node) = test_scene();
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let mut pass = CustomShaderPass::new(
            "layer",
            CustomShaderDesc {
                node,
                textures: vec!["img".into()],
                output: "_rt_nope".into(),
                ..Default::default()
            },
        );
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });
        assert!(!pass.prepared());
    }

    struct TimeUpdater;

    impl ShaderValueUpdater for TimeUpdater {
        fn frame_begin(&mut self) {}
        fn frame_end(&mut self) {}
        fn update_uniforms(
            &mut self,
            _node: &SceneNode,
            _sprites: &mut SpriteMap,
            exists: &dyn Fn(&str) -> bool,
            update: &mut dyn FnMut(&str, ShaderValue),
        ) {
            if exists("g_time") {
                update("g_time", ShaderValue::Float(2.5));
            }
            // Members missing from the reflected block are dropped.
            update("g_unknown", ShaderValue::Float(9.0));
        }
        fn mouse_input(&mut self, _x: f64, _y: f64) {}
        fn set_screen_size(&mut self, _w: u32, _h: u32) {}
    }

    #[test]
    fn test_updater_writes_uniforms_by_reflection() {
        let (mut scene, node) = test_scene();
        scene.shader_updater = Box::new(TimeUpdater);
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let mut pass = pass_for(node, vec!["img".into()]);
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });

        let mut encoder = FrameEncoder::new();
        pass.execute(FrameContext {
            scene: &mut scene,
            encoder: &mut encoder,
        });
        assert_eq!(&pass.uniform_data()[0..4], 2.5f32.to_ne_bytes());

        let uniforms = encoder.commands().iter().find_map(|c| match c {
            Command::WriteUniforms { data, .. } => Some(data.clone()),
            _ => None,
        });
        assert_eq!(&uniforms.unwrap()[0..4], 2.5f32.to_ne_bytes());
    }
}
