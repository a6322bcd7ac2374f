use std::sync::Arc;

use crate::shader::{ShaderConstants, ShaderProgram};
use crate::types::BlendMode;

/// A vertex input attribute of a mesh layout.
#[derive(Debug, Clone)]
pub struct VertexAttribute {
    pub name: String,
    /// Number of 32-bit float components.
    pub components: u32,
}

/// Interleaved vertex layout.
#[derive(Debug, Clone, Default)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Position + texcoord, the layout used by image layers and effects.
    pub fn position_texcoord() -> Self {
        Self {
            attributes: vec![
                VertexAttribute {
                    name: "a_position".into(),
                    components: 3,
                },
                VertexAttribute {
                    name: "a_texcoord".into(),
                    components: 2,
                },
            ],
        }
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.attributes.iter().map(|a| a.components as usize).sum()
    }
}

/// Renderable geometry: interleaved float vertices plus their layout.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub layout: VertexLayout,
}

impl Mesh {
    /// A unit quad as a 4-vertex triangle strip with texcoords.
    pub fn unit_quad() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            -0.5, -0.5, 0.0,   0.0, 1.0,
             0.5, -0.5, 0.0,   1.0, 1.0,
            -0.5,  0.5, 0.0,   0.0, 0.0,
             0.5,  0.5, 0.0,   1.0, 0.0,
        ];
        Self {
            vertices,
            layout: VertexLayout::position_texcoord(),
        }
    }

    /// Number of vertices described by the data.
    pub fn vertex_count(&self) -> u32 {
        let stride = self.layout.stride();
        if stride == 0 {
            return 0;
        }
        (self.vertices.len() / stride) as u32
    }
}

/// A material: compiled shader program, ordered texture bindings, blend
/// state, and default uniform values.
///
/// Texture entries are symbolic names resolved against the scene at pass
/// prepare time; an empty string is an intentionally unbound slot.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub name: String,
    pub shader: Arc<ShaderProgram>,
    pub textures: Vec<String>,
    pub blend: BlendMode,
    pub constants: ShaderConstants,
}
