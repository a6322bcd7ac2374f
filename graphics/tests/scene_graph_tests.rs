//! End-to-end scene compilation tests.
//!
//! These drive the full pipeline against the headless backend: build a
//! scene by hand the way the parser would, compile it to a graph, prepare
//! and execute it, and assert on the emitted pass structure and command
//! lists.

use std::sync::Arc;

use scenic_graphics::backend::{Command, DummyBackend};
use scenic_graphics::compiler::scene_to_graph;
use scenic_graphics::graph::{PassKind, TexKind};
use scenic_graphics::renderer::SceneRenderer;
use scenic_graphics::reserved;
use scenic_graphics::scene::{
    Camera, Image, ImageEffectLayer, Material, Mesh, RenderTargetDescriptor, Scene,
    SceneImageEffect, SceneNode, SceneTexture,
};
use scenic_graphics::shader::ShaderProgram;
use scenic_vfs::Vfs;

fn shader() -> Arc<ShaderProgram> {
    Arc::new(ShaderProgram {
        name: "image".into(),
        ..Default::default()
    })
}

fn image_material(texture: &str) -> Material {
    Material {
        name: "image_layer".into(),
        shader: shader(),
        textures: vec![texture.into()],
        ..Default::default()
    }
}

fn effect_material(name: &str) -> Material {
    Material {
        name: name.into(),
        shader: shader(),
        textures: vec![reserved::EFFECT_INPUT.into()],
        ..Default::default()
    }
}

/// One image layer drawing into the default target.
fn image_scene() -> Scene {
    let mut scene = Scene::new("image-scene", Vfs::new());
    scene.render_targets.insert(
        reserved::DEFAULT_TARGET.into(),
        RenderTargetDescriptor::sized(1920, 1080),
    );
    scene.textures.insert(
        "backdrop".into(),
        SceneTexture {
            name: "backdrop".into(),
            image: Arc::new(Image::new("backdrop", 16, 16, vec![0; 1024])),
            sprite: None,
        },
    );
    let mut node = SceneNode::new("backdrop_layer");
    node.mesh = Some(Mesh::unit_quad());
    node.material = Some(image_material("backdrop"));
    let root = scene.graph.root();
    scene.graph.add_node(root, node);
    scene
}

/// The same layer with a two-effect chain on its camera.
fn effect_scene() -> Scene {
    let mut scene = image_scene();

    let mut layer = ImageEffectLayer::new(reserved::layer_composite(0));
    layer
        .effects
        .push(SceneImageEffect::new("blur", effect_material("blur")));
    layer
        .effects
        .push(SceneImageEffect::new("tint", effect_material("tint")));

    let mut camera = Camera::new(1920.0, 1080.0);
    camera.image_effect = Some(layer);
    scene.cameras.insert("effects".into(), camera);

    // Attach the camera to the drawable node.
    let drawable = scene.graph.node(scene.graph.root()).children()[0];
    scene.graph.node_mut(drawable).camera = Some("effects".into());
    scene
}

#[test]
fn test_single_layer_compiles_to_one_pass() {
    let mut scene = image_scene();
    let graph = scene_to_graph(&mut scene);

    let order = graph.topological_order();
    assert_eq!(order.len(), 1);
    let pass = graph.pass_node(order[0]).unwrap();
    assert_eq!(pass.kind(), PassKind::CustomShader);

    // The single pass writes the default target.
    let out = graph.head(reserved::DEFAULT_TARGET).unwrap();
    assert_eq!(graph.tex_node(out).unwrap().writer(), Some(order[0]));
    assert!(!graph.has_cycle());
}

#[test]
fn test_effect_chain_compiles_to_pingpong() {
    let mut scene = effect_scene();
    let graph = scene_to_graph(&mut scene);

    // Three custom-shader passes: layer, effect 1, effect 2.
    let order = graph.topological_order();
    assert_eq!(order.len(), 3);
    let names: Vec<&str> = order
        .iter()
        .map(|&id| graph.pass_node(id).unwrap().name())
        .collect();
    assert_eq!(names, ["image_layer", "blur", "tint"]);

    // Two intermediate Temporary targets: the layer composite and one
    // ping-pong scratch buffer.
    let composite = graph.head(&reserved::layer_composite(0)).unwrap();
    let pingpong = graph.head(&reserved::effect_pingpong(0, 0)).unwrap();
    for id in [composite, pingpong] {
        assert_eq!(graph.tex_node(id).unwrap().kind(), TexKind::Temporary);
    }

    // Chain wiring: layer writes the composite, blur consumes it, tint
    // writes the default target.
    assert_eq!(graph.tex_node(composite).unwrap().writer(), Some(order[0]));
    assert_eq!(graph.tex_node(pingpong).unwrap().writer(), Some(order[1]));
    let out = graph.head(reserved::DEFAULT_TARGET).unwrap();
    assert_eq!(graph.tex_node(out).unwrap().writer(), Some(order[2]));
    assert!(!graph.has_cycle());
}

#[test]
fn test_prepare_and_draw_single_layer() {
    let mut scene = image_scene();
    let backend = DummyBackend::new(1920, 1080);
    let state = backend.state();

    let graph = scene_to_graph(&mut scene);
    let mut renderer = SceneRenderer::new(Box::new(backend));
    renderer.compile(&mut scene, graph);
    assert!(renderer.loaded());

    renderer.draw_frame(&mut scene).unwrap();
    assert_eq!(state.frames_submitted(), 1);

    let commands = state.last_frame();
    let render_passes = commands
        .iter()
        .filter(|c| matches!(c, Command::BeginRenderPass { .. }))
        .count();
    assert_eq!(render_passes, 1);
    assert!(commands
        .iter()
        .any(|c| matches!(c, Command::BlitToSurface { .. })));
}

#[test]
fn test_prepare_and_draw_effect_chain() {
    let mut scene = effect_scene();
    let backend = DummyBackend::new(1920, 1080);
    let state = backend.state();

    let graph = scene_to_graph(&mut scene);
    let mut renderer = SceneRenderer::new(Box::new(backend));
    renderer.compile(&mut scene, graph);

    renderer.draw_frame(&mut scene).unwrap();
    renderer.draw_frame(&mut scene).unwrap();
    assert_eq!(state.frames_submitted(), 2);

    let commands = state.last_frame();
    let render_passes = commands
        .iter()
        .filter(|c| matches!(c, Command::BeginRenderPass { .. }))
        .count();
    assert_eq!(render_passes, 3);
}

#[test]
fn test_scene_reload_replaces_graph() {
    let backend = DummyBackend::new(1920, 1080);
    let state = backend.state();
    let mut renderer = SceneRenderer::new(Box::new(backend));

    let mut first = image_scene();
    let graph = scene_to_graph(&mut first);
    renderer.compile(&mut first, graph);
    renderer.draw_frame(&mut first).unwrap();

    // Reload with the richer scene; the old passes are destroyed and the
    // new graph draws.
    let mut second = effect_scene();
    let graph = scene_to_graph(&mut second);
    renderer.compile(&mut second, graph);
    renderer.draw_frame(&mut second).unwrap();

    assert_eq!(state.pipelines_destroyed(), 1);
    let render_passes = state
        .last_frame()
        .iter()
        .filter(|c| matches!(c, Command::BeginRenderPass { .. }))
        .count();
    assert_eq!(render_passes, 3);
}

#[test]
fn test_graphviz_dump_of_compiled_scene() {
    let mut scene = effect_scene();
    let graph = scene_to_graph(&mut scene);
    let mut renderer = SceneRenderer::new(Box::new(DummyBackend::default()));
    renderer.compile(&mut scene, graph);

    let dot = renderer.graphviz().unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("blur"));
    assert!(dot.contains(reserved::DEFAULT_TARGET));
}
