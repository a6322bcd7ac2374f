//! Scene to render-graph compilation.
//!
//! Walks the arena scene graph depth-first and emits one custom-shader
//! pass per drawable node, plus the copy and effect passes a camera's
//! image-effect chain requires. The builder's hazard resolution and the
//! deferred-link second phase do the rest; this module only declares what
//! each pass reads and writes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::graph::{NodeId, PassKind, RenderGraph, TexDesc};
use crate::passes::{CopyPass, CustomShaderDesc, CustomShaderPass};
use crate::reserved;
use crate::scene::{ImageEffectLayer, Material, Scene, SceneNodeId, SpriteMap};

/// Composed outputs per scene node, for resolving link targets after the
/// whole graph exists.
type ComposedMap = Arc<Mutex<HashMap<u32, NodeId>>>;

/// Compile a scene into a fresh render graph.
///
/// Deferred links are registered but not yet resolved; the executor calls
/// [`RenderGraph::resolve_deferred`] before preparing passes.
pub fn scene_to_graph(scene: &mut Scene) -> RenderGraph {
    let mut rg = RenderGraph::new();
    let composed: ComposedMap = Arc::new(Mutex::new(HashMap::new()));

    // Collect drawables first; effect-target registration below needs the
    // scene mutably.
    let mut drawables = Vec::new();
    scene.graph.traverse(|id, node| {
        if node.visible && node.mesh.is_some() && node.material.is_some() {
            drawables.push(id);
        }
    });

    let mut layer_counter = 0u32;
    for node_id in drawables {
        let camera_effect = effect_layer_for(scene, node_id);
        let output = match &camera_effect {
            Some(layer) => layer.base_target.clone(),
            None => reserved::DEFAULT_TARGET.to_string(),
        };

        let material = scene
            .graph
            .node(node_id)
            .material
            .clone()
            .expect("drawable has material");

        if let Some(layer) = &camera_effect {
            ensure_target(scene, &layer.base_target);
        }
        add_layer_pass(&mut rg, scene, node_id, &material, &output, &composed);

        if let Some(layer) = camera_effect {
            add_effect_chain(&mut rg, scene, node_id, &layer, layer_counter);
            layer_counter += 1;
        }
    }
    rg
}

/// The image-effect chain attached to a node's camera, if any.
fn effect_layer_for(scene: &Scene, node_id: SceneNodeId) -> Option<ImageEffectLayer> {
    let camera_name = scene.graph.node(node_id).camera.as_ref()?;
    let camera = scene.cameras.get(camera_name)?;
    let layer = camera.image_effect.as_ref()?;
    if layer.is_empty() {
        return None;
    }
    Some(layer.clone())
}

/// Register an engine target descriptor if the parser did not provide one.
/// Scratch targets default to the default target's shape and are reusable.
fn ensure_target(scene: &mut Scene, name: &str) {
    if scene.render_targets.contains_key(name) {
        return;
    }
    let like = scene
        .render_targets
        .get(reserved::DEFAULT_TARGET)
        .cloned()
        .unwrap_or_default();
    scene
        .render_targets
        .insert(name.to_string(), like.reusable_like());
}

/// Sprite animations for the material's texture bindings.
fn collect_sprites(scene: &Scene, material: &Material) -> SpriteMap {
    let mut sprites = SpriteMap::new();
    for (index, name) in material.textures.iter().enumerate() {
        if name.is_empty() || reserved::is_reserved(name) {
            continue;
        }
        if let Some(sprite) = scene
            .textures
            .get(name)
            .and_then(|tex| tex.sprite.clone())
        {
            sprites.insert(index, sprite);
        }
    }
    sprites
}

/// Emit the custom-shader pass drawing one scene node.
fn add_layer_pass(
    rg: &mut RenderGraph,
    scene: &Scene,
    node_id: SceneNodeId,
    material: &Material,
    output: &str,
    composed: &ComposedMap,
) {
    let sprites = collect_sprites(scene, material);
    let pass_name = if material.name.is_empty() {
        scene.graph.node(node_id).name.clone()
    } else {
        material.name.clone()
    };

    let mut deferred_links = Vec::new();
    let pass = rg.add_pass(
        &pass_name,
        PassKind::CustomShader,
        |builder| {
            let mut textures = Vec::with_capacity(material.textures.len());
            for (index, url) in material.textures.iter().enumerate() {
                if url.is_empty() {
                    textures.push(String::new());
                    continue;
                }
                if reserved::parse_link_target(url).is_some() {
                    // Produced by a sibling pass we may not have visited
                    // yet; resolved in the second build phase.
                    deferred_links.push((index, url.clone()));
                    textures.push(String::new());
                    continue;
                }
                let input = builder.create_tex_node(&TexDesc::from_key(url), false);
                builder.read(input);
                textures.push(url.to_string());
            }

            let out_node = builder.create_tex_node(&TexDesc::from_key(output), true);
            builder.write(out_node);

            CustomShaderPass::new(
                &pass_name,
                CustomShaderDesc {
                    node: node_id,
                    textures,
                    output: output.to_string(),
                    sprites,
                    clear: None,
                },
            )
        },
    );

    // Remember this node's composed output for link consumers.
    if let Some(head) = rg.head(output) {
        composed.lock().insert(node_id.raw(), head);
    }

    for (index, url) in deferred_links {
        let composed = Arc::clone(composed);
        rg.after_build(pass, move |builder, pass| {
            let Some(link_id) = reserved::parse_link_target(&url) else {
                return;
            };
            let Some(&tex) = composed.lock().get(&link_id) else {
                log::warn!("link target '{}' was never produced, leaving binding empty", url);
                return;
            };
            builder.read(tex);
            if let Some(key) = builder.tex_key(tex) {
                pass.rebind_input(index, &key);
            }
        });
    }
}

/// Emit the copy and effect passes of a camera's chain.
///
/// The chain ping-pongs through reusable scratch targets: effect `i`
/// consumes the previous target and produces the next, and the final
/// effect writes the camera's original output.
fn add_effect_chain(
    rg: &mut RenderGraph,
    scene: &mut Scene,
    node_id: SceneNodeId,
    layer: &ImageEffectLayer,
    layer_index: u32,
) {
    let mut prev = layer.base_target.clone();
    let count = layer.effects.len();
    for (i, effect) in layer.effects.iter().enumerate() {
        for command in &effect.commands {
            ensure_target(scene, &command.source);
            ensure_target(scene, &command.target);
            add_copy_pass(rg, &command.source, &command.target);
        }

        let output = if i + 1 == count {
            reserved::DEFAULT_TARGET.to_string()
        } else {
            reserved::effect_pingpong(layer_index, (i % 2) as u32)
        };
        ensure_target(scene, &output);

        let sprites = collect_sprites(scene, &effect.material);
        let textures: Vec<String> = effect
            .material
            .textures
            .iter()
            .map(|url| {
                if url == reserved::EFFECT_INPUT {
                    prev.clone()
                } else {
                    url.clone()
                }
            })
            .collect();

        let pass_name = effect.name.clone();
        let output_name = output.clone();
        rg.add_pass(&pass_name, PassKind::CustomShader, |builder| {
            let mut bound = Vec::with_capacity(textures.len());
            for url in &textures {
                if url.is_empty() {
                    bound.push(String::new());
                    continue;
                }
                let input = builder.create_tex_node(&TexDesc::from_key(url), false);
                builder.read(input);
                bound.push(url.clone());
            }
            let out_node = builder.create_tex_node(&TexDesc::from_key(&output_name), true);
            builder.write(out_node);
            CustomShaderPass::new(
                &pass_name,
                CustomShaderDesc {
                    node: node_id,
                    textures: bound,
                    output: output_name.clone(),
                    sprites,
                    clear: None,
                },
            )
        });

        prev = output;
    }
}

fn add_copy_pass(rg: &mut RenderGraph, src: &str, dst: &str) {
    let src = src.to_string();
    let dst = dst.to_string();
    rg.add_pass("copy", PassKind::Copy, |builder| {
        let input = builder.create_tex_node(&TexDesc::from_key(&src), false);
        builder.read(input);
        let output = builder.create_tex_node(&TexDesc::from_key(&dst), true);
        builder.write(output);
        CopyPass::new(src.clone(), dst.clone())
    });
}
