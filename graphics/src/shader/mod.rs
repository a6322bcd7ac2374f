//! Compiled shader interface types.
//!
//! Shader sources are preprocessed and cross-compiled by an external
//! collaborator; this crate only consumes the result: per-stage bytecode
//! plus a reflection record. The reflection drives pipeline creation and
//! uniform writes without hardcoding any layout.

use std::collections::HashMap;

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

/// Compiled bytecode for one stage.
#[derive(Debug, Clone)]
pub struct ShaderStage {
    pub kind: ShaderStageKind,
    pub entry_point: String,
    /// Backend bytecode words as produced by the shader compiler.
    pub bytecode: Vec<u32>,
}

/// A member of the per-pass uniform block.
#[derive(Debug, Clone)]
pub struct UniformMember {
    pub name: String,
    /// Byte offset inside the block.
    pub offset: usize,
    /// Byte size of the member.
    pub size: usize,
}

/// Reflection of the single uniform block a custom-shader pass writes.
#[derive(Debug, Clone, Default)]
pub struct UniformBlockReflection {
    pub binding: u32,
    /// Total byte size of the block.
    pub size: usize,
    pub members: Vec<UniformMember>,
}

impl UniformBlockReflection {
    /// Look up a member by its uniform name.
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A vertex input attribute.
#[derive(Debug, Clone)]
pub struct AttributeReflection {
    pub name: String,
    pub location: u32,
    /// Number of 32-bit components.
    pub components: u32,
}

/// A sampled-texture binding.
#[derive(Debug, Clone)]
pub struct SamplerBinding {
    pub name: String,
    pub binding: u32,
}

/// Everything the pipeline builder and uniform writer need to know about a
/// compiled shader.
#[derive(Debug, Clone, Default)]
pub struct ShaderReflection {
    pub block: Option<UniformBlockReflection>,
    pub attributes: Vec<AttributeReflection>,
    pub samplers: Vec<SamplerBinding>,
}

/// A complete compiled shader program.
#[derive(Debug, Clone, Default)]
pub struct ShaderProgram {
    pub name: String,
    pub stages: Vec<ShaderStage>,
    pub reflection: ShaderReflection,
}

impl ShaderProgram {
    /// Find the stage of the given kind, if present.
    pub fn stage(&self, kind: ShaderStageKind) -> Option<&ShaderStage> {
        self.stages.iter().find(|s| s.kind == kind)
    }
}

impl Default for ShaderStage {
    fn default() -> Self {
        Self {
            kind: ShaderStageKind::Vertex,
            entry_point: "main".into(),
            bytecode: Vec::new(),
        }
    }
}

/// A value written into the uniform block by the shader value updater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

impl ShaderValue {
    /// The value's raw bytes, ready to be copied at a member's offset.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ShaderValue::Int(v) => bytemuck::bytes_of(v),
            ShaderValue::Float(v) => bytemuck::bytes_of(v),
            ShaderValue::Vec2(v) => bytemuck::cast_slice(v),
            ShaderValue::Vec3(v) => bytemuck::cast_slice(v),
            ShaderValue::Vec4(v) => bytemuck::cast_slice(v),
            ShaderValue::Mat4(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Default uniform values declared by a material, applied once at prepare.
pub type ShaderConstants = HashMap<String, ShaderValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup() {
        let block = UniformBlockReflection {
            binding: 0,
            size: 80,
            members: vec![
                UniformMember {
                    name: "g_time".into(),
                    offset: 64,
                    size: 4,
                },
                UniformMember {
                    name: "g_mvp".into(),
                    offset: 0,
                    size: 64,
                },
            ],
        };
        assert_eq!(block.member("g_time").unwrap().offset, 64);
        assert!(block.member("g_missing").is_none());
    }

    #[test]
    fn test_value_bytes() {
        assert_eq!(ShaderValue::Float(1.0).as_bytes(), 1.0f32.to_ne_bytes());
        assert_eq!(ShaderValue::Mat4([0.0; 16]).as_bytes().len(), 64);
    }
}
