//! Render graph infrastructure.
//!
//! The render graph is the per-frame DAG of GPU passes and the texture
//! resources they read and write. It is rebuilt in full every time a scene
//! is loaded; compilation derives the execution order and resolves
//! resource hazards automatically.
//!
//! # Architecture
//!
//! | Layer | Type | Purpose |
//! |-------|------|---------|
//! | Executor | [`SceneRenderer`](crate::renderer::SceneRenderer) | Prepare and run compiled passes |
//! | **Graph** | [`RenderGraph`] | Pass/resource dependencies (this module) |
//! | Nodes | [`TexNode`], [`PassNode`] | Versioned resources, units of work |
//! | Generic | [`DependencyGraph`] | Ordering and traversal |
//!
//! # Hazards
//!
//! A pass that reads and writes the same `(key, version)` would form a
//! cycle. [`RenderGraphBuilder::write`] breaks it transparently: a Copy
//! pass snapshots the old version into a derived node, the reading pass is
//! rebound to the snapshot, and its write produces a fresh version of the
//! requested key. Authors keep "read current value, then overwrite"
//! semantics; the graph stays acyclic.
//!
//! # Deferred links
//!
//! Some inputs are only known once the whole graph exists (a texture
//! produced by a pass discovered later in traversal). Register an
//! [`RenderGraph::after_build`] callback during the first build pass;
//! [`RenderGraph::resolve_deferred`] runs the callbacks in each consumer's
//! topological position once the full node set is known.

mod dependency;
mod pass_node;
mod tex_node;

pub use dependency::{DependencyGraph, NodeId};
pub use pass_node::{PassKind, PassNode};
pub use tex_node::{TexDesc, TexKind, TexNode};

use std::collections::{HashMap, HashSet};

use crate::passes::{CopyPass, RenderPass};

/// Payload of a graph node: either a texture resource or a pass.
#[derive(Debug)]
pub enum GraphNode {
    Tex(TexNode),
    Pass(PassNode),
}

type DeferredLink = Box<dyn FnOnce(&mut RenderGraphBuilder<'_>, &mut dyn RenderPass) + Send>;

/// The per-frame graph of passes and versioned texture resources.
#[derive(Default)]
pub struct RenderGraph {
    dg: DependencyGraph<GraphNode>,
    /// Latest version node per symbolic key.
    key_heads: HashMap<String, NodeId>,
    /// Pass objects keyed by their pass node.
    passes: HashMap<NodeId, Box<dyn RenderPass>>,
    /// Deferred link callbacks, in registration order.
    deferred: Vec<(NodeId, DeferredLink)>,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass: the closure describes its reads and writes through the
    /// builder and returns the pass object.
    pub fn add_pass<P, F>(&mut self, name: &str, kind: PassKind, build: F) -> NodeId
    where
        P: RenderPass + 'static,
        F: FnOnce(&mut RenderGraphBuilder<'_>) -> P,
    {
        let id = self.add_pass_node(kind, name);
        let mut builder = RenderGraphBuilder {
            rg: self,
            current: id,
            rebinds: Vec::new(),
        };
        let mut pass = build(&mut builder);
        let rebinds = std::mem::take(&mut builder.rebinds);
        for (index, key) in rebinds {
            pass.rebind_input(index, &key);
        }
        self.passes.insert(id, Box::new(pass));
        id
    }

    /// Register a callback resolved after the entire graph is built.
    ///
    /// The callback runs in the consumer pass's topological position and
    /// may create additional Copy passes and rewrite the consuming pass's
    /// bindings. A callback whose pass was never produced is logged and
    /// skipped.
    pub fn after_build<F>(&mut self, pass: NodeId, callback: F)
    where
        F: FnOnce(&mut RenderGraphBuilder<'_>, &mut dyn RenderPass) + Send + 'static,
    {
        self.deferred.push((pass, Box::new(callback)));
    }

    /// Run all deferred link callbacks. Called once, after the first build
    /// pass over the scene finished.
    pub fn resolve_deferred(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        if deferred.is_empty() {
            return;
        }
        let order = self.dg.topological_order();
        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut deferred = deferred;
        deferred.sort_by_key(|(id, _)| position.get(id).copied().unwrap_or(usize::MAX));

        for (pass_id, callback) in deferred {
            let Some(mut pass) = self.passes.remove(&pass_id) else {
                log::warn!("deferred link: pass node {pass_id} was never produced, skipping");
                continue;
            };
            let mut builder = RenderGraphBuilder {
                rg: self,
                current: pass_id,
                rebinds: Vec::new(),
            };
            callback(&mut builder, pass.as_mut());
            let rebinds = std::mem::take(&mut builder.rebinds);
            for (index, key) in rebinds {
                pass.rebind_input(index, &key);
            }
            self.passes.insert(pass_id, pass);
        }
    }

    fn add_pass_node(&mut self, kind: PassKind, name: &str) -> NodeId {
        self.dg.add_node(GraphNode::Pass(PassNode::new(kind, name)))
    }

    fn create_new_tex_node(&mut self, desc: &TexDesc) -> NodeId {
        let id = match self.key_heads.get(&desc.key).copied() {
            Some(head) => {
                let version = self.tex_node(head).map(|t| t.version()).unwrap_or(0) + 1;
                let id = self
                    .dg
                    .add_node(GraphNode::Tex(TexNode::new_version(desc.clone(), version, head)));
                if let Some(prev) = self.tex_node_mut(head) {
                    prev.set_next_version(id);
                }
                id
            }
            None => self.dg.add_node(GraphNode::Tex(TexNode::new(desc.clone()))),
        };
        self.key_heads.insert(desc.key.clone(), id);
        id
    }

    /// The texture payload of a node, if it is one.
    pub fn tex_node(&self, id: NodeId) -> Option<&TexNode> {
        match self.dg.node(id) {
            GraphNode::Tex(tex) => Some(tex),
            GraphNode::Pass(_) => None,
        }
    }

    fn tex_node_mut(&mut self, id: NodeId) -> Option<&mut TexNode> {
        match self.dg.node_mut(id) {
            GraphNode::Tex(tex) => Some(tex),
            GraphNode::Pass(_) => None,
        }
    }

    /// The pass payload of a node, if it is one.
    pub fn pass_node(&self, id: NodeId) -> Option<&PassNode> {
        match self.dg.node(id) {
            GraphNode::Pass(pass) => Some(pass),
            GraphNode::Tex(_) => None,
        }
    }

    fn pass_node_mut(&mut self, id: NodeId) -> Option<&mut PassNode> {
        match self.dg.node_mut(id) {
            GraphNode::Pass(pass) => Some(pass),
            GraphNode::Tex(_) => None,
        }
    }

    /// The pass object attached to a pass node.
    pub fn pass(&self, id: NodeId) -> Option<&dyn RenderPass> {
        self.passes.get(&id).map(|p| p.as_ref())
    }

    /// Remove a pass object for execution; the node structure remains.
    pub fn take_pass(&mut self, id: NodeId) -> Option<Box<dyn RenderPass>> {
        self.passes.remove(&id)
    }

    /// The latest version node of a symbolic key, if any.
    pub fn head(&self, key: &str) -> Option<NodeId> {
        self.key_heads.get(key).copied()
    }

    /// All version nodes of a symbolic key, oldest first.
    pub fn versions_of(&self, key: &str) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .dg
            .nodes()
            .filter_map(|(id, node)| match node {
                GraphNode::Tex(tex) if tex.key() == key => Some(id),
                _ => None,
            })
            .collect();
        result.sort_by_key(|&id| self.tex_node(id).map(|t| t.version()).unwrap_or(0));
        result
    }

    /// Executable passes in dependency order. Virtual (ordering-only)
    /// passes are excluded.
    pub fn topological_order(&self) -> Vec<NodeId> {
        self.dg
            .topological_order()
            .into_iter()
            .filter(|&id| {
                self.pass_node(id)
                    .is_some_and(|p| p.kind() != PassKind::Virtual)
            })
            .collect()
    }

    /// For each pass of `order`, the symbolic keys it is the last reader
    /// of. Drives the release of cache bindings back to the reuse pool.
    pub fn last_read_texs(&self, order: &[NodeId]) -> Vec<Vec<String>> {
        let mut per_pass: Vec<Vec<NodeId>> = order
            .iter()
            .map(|&id| {
                self.dg
                    .node_in(id)
                    .into_iter()
                    .filter(|&n| self.tex_node(n).is_some())
                    .collect()
            })
            .collect();
        let mut seen = HashSet::new();
        for inputs in per_pass.iter_mut().rev() {
            inputs.retain(|&id| seen.insert(id));
        }
        per_pass
            .into_iter()
            .map(|inputs| {
                inputs
                    .into_iter()
                    .filter_map(|id| self.tex_node(id).map(|t| t.key().to_string()))
                    .collect()
            })
            .collect()
    }

    /// Whether the graph contains a cycle. The builder never produces one;
    /// this is a validation hook.
    pub fn has_cycle(&self) -> bool {
        self.dg.has_cycle()
    }

    pub fn node_count(&self) -> usize {
        self.dg.node_count()
    }

    /// Serialize the graph to `.dot` text for external visualization.
    pub fn to_graphviz(&self) -> String {
        self.dg.to_graphviz(|_, node| match node {
            GraphNode::Tex(tex) => tex.graphviz_label(),
            GraphNode::Pass(pass) => pass.graphviz_label(),
        })
    }
}

/// Scoped API for describing one pass's resource accesses.
pub struct RenderGraphBuilder<'a> {
    rg: &'a mut RenderGraph,
    current: NodeId,
    /// Input rebinds performed during the build, applied to the pass
    /// object once the closure returns.
    rebinds: Vec<(usize, String)>,
}

impl<'a> RenderGraphBuilder<'a> {
    /// The pass node being described.
    pub fn work_pass(&self) -> NodeId {
        self.current
    }

    /// The symbolic key of a texture node.
    pub fn tex_key(&self, id: NodeId) -> Option<String> {
        self.rg.tex_node(id).map(|t| t.key().to_string())
    }

    /// Get or create the texture node for a descriptor.
    ///
    /// Returns the existing node for the same key unless `is_output` is
    /// set and the current head already has a writer, in which case a new
    /// version is created.
    pub fn create_tex_node(&mut self, desc: &TexDesc, is_output: bool) -> NodeId {
        match self.rg.key_heads.get(&desc.key).copied() {
            Some(head) => {
                let has_writer = self
                    .rg
                    .tex_node(head)
                    .is_some_and(|t| t.writer().is_some());
                if is_output && has_writer {
                    self.rg.create_new_tex_node(desc)
                } else {
                    head
                }
            }
            None => self.rg.create_new_tex_node(desc),
        }
    }

    /// Declare that the current pass reads `tex`.
    pub fn read(&mut self, tex: NodeId) {
        self.rg.dg.connect(tex, self.current);
        if let Some(pass) = self.rg.pass_node_mut(self.current) {
            pass.push_read(tex);
        }
        // A reader must run before the writer of any newer version.
        if let Some(next) = self.rg.tex_node(tex).and_then(|t| t.next_version()) {
            if let Some(writer) = self.rg.tex_node(next).and_then(|t| t.writer()) {
                if writer != self.current {
                    self.rg.dg.connect(self.current, writer);
                }
            }
        }
    }

    /// Declare that the current pass writes `tex`.
    ///
    /// If the pass already reads the same node, the self-write hazard is
    /// resolved automatically (see module docs). Returns the node actually
    /// written, which differs from `tex` in the hazard case.
    pub fn write(&mut self, tex: NodeId) -> NodeId {
        let reads_tex = self
            .rg
            .pass_node(self.current)
            .is_some_and(|p| p.reads().contains(&tex));
        if reads_tex {
            let opted_out = self
                .rg
                .pass_node(self.current)
                .is_some_and(PassNode::is_self_write);
            if !opted_out {
                return self.resolve_self_write(tex);
            }
            // Escape hatch: no copy, but the write still lands on a fresh
            // version node so the graph stays acyclic. Both versions share
            // the symbolic key, so the cache binds them to one physical
            // texture - the aliasing the pass asked for.
            let desc = self
                .rg
                .tex_node(tex)
                .map(|t| t.desc().clone())
                .expect("written node is a texture");
            let out = self.rg.create_new_tex_node(&desc);
            self.write_edges(out);
            return out;
        }
        self.write_edges(tex);
        tex
    }

    /// Shared write bookkeeping: order after the previous version's
    /// readers, connect, and record writership.
    fn write_edges(&mut self, tex: NodeId) {
        if let Some(old) = self.rg.tex_node(tex).and_then(|t| t.prev_version()) {
            let readers: Vec<NodeId> = self.rg.dg.node_out(old).to_vec();
            if readers.is_empty() {
                self.rg.dg.connect(old, self.current);
            }
            for reader in readers {
                if reader != self.current && self.rg.pass_node(reader).is_some() {
                    self.rg.dg.connect(reader, self.current);
                }
            }
        }
        self.rg.dg.connect(self.current, tex);
        if let Some(node) = self.rg.tex_node_mut(tex) {
            node.set_writer(self.current);
        }
        let current = self.current;
        if let Some(pass) = self.rg.pass_node_mut(current) {
            pass.push_write(tex);
        }
    }

    /// Break a read/write hazard on the same `(key, version)`.
    fn resolve_self_write(&mut self, tex: NodeId) -> NodeId {
        let (src_desc, src_key) = {
            let node = self.rg.tex_node(tex).expect("hazard source is a texture");
            (node.desc().clone(), node.key().to_string())
        };

        // Snapshot node under a derived key.
        let snap_desc = TexDesc {
            key: format!("{}_copy", src_desc.key),
            name: format!("{}_copy", src_desc.name),
            kind: src_desc.kind,
        };
        let snapshot = self.rg.create_new_tex_node(&snap_desc);

        // Copy pass: old version -> snapshot.
        let copy = self.rg.add_pass_node(PassKind::Copy, "copy");
        self.rg.dg.connect(tex, copy);
        if let Some(pass) = self.rg.pass_node_mut(copy) {
            pass.push_read(tex);
        }
        self.rg.dg.connect(copy, snapshot);
        if let Some(node) = self.rg.tex_node_mut(snapshot) {
            node.set_writer(copy);
        }
        if let Some(pass) = self.rg.pass_node_mut(copy) {
            pass.push_write(snapshot);
        }
        let snap_key = self
            .rg
            .tex_node(snapshot)
            .map(|t| t.key().to_string())
            .unwrap_or_default();
        self.rg
            .passes
            .insert(copy, Box::new(CopyPass::new(src_key.clone(), snap_key.clone())));

        // Rebind the consuming pass's read to the snapshot.
        let read_index = self
            .rg
            .pass_node(self.current)
            .and_then(|p| p.reads().iter().position(|&r| r == tex));
        self.rg.dg.disconnect(tex, self.current);
        self.rg.dg.connect(snapshot, self.current);
        if let Some(index) = read_index {
            let current = self.current;
            if let Some(pass) = self.rg.pass_node_mut(current) {
                pass.replace_read(index, snapshot);
            }
            self.rebinds.push((index, snap_key));
        }

        // The write produces a fresh version of the requested key.
        let out = self.rg.create_new_tex_node(&src_desc);
        self.write_edges(out);
        log::debug!(
            "self-write on '{}' resolved with an inserted copy pass",
            src_key
        );
        out
    }

    /// Record a write dependency without an accompanying read edge, for
    /// passes producing derived data (mip chains) from a resource they do
    /// not consume as an input binding.
    pub fn mark_virtual_write(&mut self, tex: NodeId) {
        let needs_writer = self
            .rg
            .tex_node(tex)
            .is_some_and(|t| t.version() == 0 && t.writer().is_none());
        if !needs_writer {
            return;
        }
        let vp = self.rg.add_pass_node(PassKind::Virtual, "virtual");
        if let Some(pass) = self.rg.pass_node_mut(vp) {
            pass.set_virtual_write();
        }
        self.rg.dg.connect(vp, tex);
        if let Some(node) = self.rg.tex_node_mut(tex) {
            node.set_writer(vp);
        }
    }

    /// Opt the current pass out of automatic self-write resolution.
    ///
    /// Audited exception for accumulation passes that intentionally blend
    /// into their own input across frames; correctness is the caller's
    /// responsibility.
    pub fn mark_self_write(&mut self, tex: NodeId) {
        let current = self.current;
        if let Some(pass) = self.rg.pass_node_mut(current) {
            pass.set_self_write();
        }
        self.mark_virtual_write(tex);
    }

    /// Order the current pass after `tex` without recording an input
    /// binding. Companion escape hatch to [`mark_self_write`](Self::mark_self_write).
    pub fn mark_self_read(&mut self, tex: NodeId) {
        self.rg.dg.connect(tex, self.current);
    }
}
