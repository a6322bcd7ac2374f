//! Arena-based scene graph.
//!
//! Nodes live in a flat `Vec`; children are stored as ID lists and the
//! parent is a plain ID used for lookup only, never as an ownership edge.

use glam::{Mat4, Quat, Vec3};

use super::material::{Material, Mesh};

/// Handle to a node in a [`SceneGraph`].
///
/// Only valid within the graph that created it. The default handle is the
/// root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SceneNodeId(u32);

impl SceneNodeId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }

    /// Stable numeric identity, as referenced by link-target names.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Local transform of a scene node.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians, applied in YXZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// The node's local model matrix.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            glam::EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

/// One node of the scene graph.
#[derive(Debug, Default)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    /// Renderable geometry, if the node draws anything.
    pub mesh: Option<Mesh>,
    pub material: Option<Material>,
    /// Name of the camera attached to this node, if any.
    pub camera: Option<String>,
    parent: Option<SceneNodeId>,
    children: Vec<SceneNodeId>,
}

impl SceneNode {
    /// Create an empty, visible node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }
}

/// Flat arena of scene nodes with a fixed root.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new("root")],
        }
    }

    /// The fixed root node ID.
    pub fn root(&self) -> SceneNodeId {
        SceneNodeId::new(0)
    }

    /// Append a node under `parent` and return its ID.
    pub fn add_node(&mut self, parent: SceneNodeId, mut node: SceneNode) -> SceneNodeId {
        let id = SceneNodeId::new(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn node(&self, id: SceneNodeId) -> &SceneNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: SceneNodeId) -> &mut SceneNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The model matrix of a node composed with all its ancestors.
    pub fn world_matrix(&self, id: SceneNodeId) -> Mat4 {
        let node = self.node(id);
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Visit every node depth-first in child insertion order, starting at
    /// the root.
    pub fn traverse(&self, mut visit: impl FnMut(SceneNodeId, &SceneNode)) {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            visit(id, node);
            // Reverse so the first child is visited first.
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_parent_child_links() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(graph.root(), SceneNode::new("a"));
        let b = graph.add_node(a, SceneNode::new("b"));

        assert_eq!(graph.node(b).parent(), Some(a));
        assert_eq!(graph.node(a).children(), &[b]);
        assert_eq!(graph.node(a).parent(), Some(graph.root()));
    }

    #[test]
    fn test_traverse_depth_first() {
        let mut graph = SceneGraph::new();
        let a = graph.add_node(graph.root(), SceneNode::new("a"));
        let _a1 = graph.add_node(a, SceneNode::new("a1"));
        let _b = graph.add_node(graph.root(), SceneNode::new("b"));

        let mut order = Vec::new();
        graph.traverse(|_, node| order.push(node.name.clone()));
        assert_eq!(order, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_world_matrix_composes() {
        let mut graph = SceneGraph::new();
        let mut parent = SceneNode::new("parent");
        parent.transform.translation = Vec3::new(10.0, 0.0, 0.0);
        let a = graph.add_node(graph.root(), parent);

        let mut child = SceneNode::new("child");
        child.transform.translation = Vec3::new(0.0, 5.0, 0.0);
        let b = graph.add_node(a, child);

        let world = graph.world_matrix(b);
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(10.0, 5.0, 0.0)).length() < 1e-5);
    }
}
