//! Pass nodes.

use super::dependency::NodeId;

/// What kind of GPU work a pass node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Draws with a scene-supplied shader.
    CustomShader,
    /// Full-image resource copy.
    Copy,
    /// Ordering-only node with no GPU work; excluded from execution.
    Virtual,
}

/// A unit of GPU work in the graph, with its declared resource sets.
#[derive(Debug)]
pub struct PassNode {
    kind: PassKind,
    name: String,
    /// Resource nodes read by this pass, in binding order.
    reads: Vec<NodeId>,
    /// Resource nodes written by this pass, in declaration order.
    writes: Vec<NodeId>,
    /// Declares a write without a consuming read (mip chains).
    virtual_write: bool,
    /// Opted out of automatic self-write hazard resolution.
    self_write: bool,
}

impl PassNode {
    pub(super) fn new(kind: PassKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            reads: Vec::new(),
            writes: Vec::new(),
            virtual_write: false,
            self_write: false,
        }
    }

    pub fn kind(&self) -> PassKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reads(&self) -> &[NodeId] {
        &self.reads
    }

    pub fn writes(&self) -> &[NodeId] {
        &self.writes
    }

    pub fn is_virtual_write(&self) -> bool {
        self.virtual_write
    }

    /// Whether this pass intentionally aliases input and output across
    /// frames (accumulation effects). Audited exception: the automatic
    /// hazard-breaking copy is skipped for it.
    pub fn is_self_write(&self) -> bool {
        self.self_write
    }

    pub(super) fn push_read(&mut self, tex: NodeId) {
        self.reads.push(tex);
    }

    pub(super) fn replace_read(&mut self, index: usize, tex: NodeId) {
        self.reads[index] = tex;
    }

    pub(super) fn push_write(&mut self, tex: NodeId) {
        self.writes.push(tex);
    }

    pub(super) fn set_virtual_write(&mut self) {
        self.virtual_write = true;
    }

    pub(super) fn set_self_write(&mut self) {
        self.self_write = true;
    }

    /// Label used in graph dumps.
    pub fn graphviz_label(&self) -> String {
        format!("[{:?}] {}", self.kind, self.name)
    }
}
