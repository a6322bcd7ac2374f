use super::material::Material;

/// A copy scheduled between effect passes.
///
/// Some effects need a side buffer filled with another target's content
/// before they run; the compiler turns these into Copy passes at the
/// declared position.
#[derive(Debug, Clone)]
pub struct EffectCommand {
    /// Symbolic name copied from.
    pub source: String,
    /// Symbolic name copied to.
    pub target: String,
}

/// One post-process effect in a camera's chain.
///
/// The material's texture list may contain the
/// [`EFFECT_INPUT`](crate::reserved::EFFECT_INPUT) placeholder; the
/// compiler substitutes the chain's previous target for it.
#[derive(Debug, Clone)]
pub struct SceneImageEffect {
    pub name: String,
    pub material: Material,
    /// Copies to run before this effect's pass.
    pub commands: Vec<EffectCommand>,
}

impl SceneImageEffect {
    pub fn new(name: impl Into<String>, material: Material) -> Self {
        Self {
            name: name.into(),
            material,
            commands: Vec::new(),
        }
    }
}

/// A camera's image-effect chain.
///
/// The camera's layer content is redirected into `base_target`; each
/// effect then consumes the previous target and produces the next,
/// ping-ponging through reusable scratch targets until the final effect
/// writes the camera's original output.
#[derive(Debug, Clone, Default)]
pub struct ImageEffectLayer {
    /// Where the layer content is drawn before any effect runs.
    pub base_target: String,
    pub effects: Vec<SceneImageEffect>,
}

impl ImageEffectLayer {
    pub fn new(base_target: impl Into<String>) -> Self {
        Self {
            base_target: base_target.into(),
            effects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
