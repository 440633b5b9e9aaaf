use crate::api::types::NodeId;

/// Root of the scene graph: the set of top-level nodes (solar-system groups,
/// the star field) currently presented to the renderer.
///
/// Nodes own their visuals; the root only records attachment, so attaching and
/// detaching are cheap and idempotent.
pub struct SceneRoot {
    attached: Vec<NodeId>,
    next_id: u32,
}

impl SceneRoot {
    pub fn new() -> Self {
        Self {
            attached: Vec::with_capacity(16),
            next_id: 1,
        }
    }

    /// Generate the next unique node ID.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Attach a node. Returns false if it was already attached.
    pub fn attach(&mut self, id: NodeId) -> bool {
        if self.attached.contains(&id) {
            return false;
        }
        self.attached.push(id);
        true
    }

    /// Detach a node. Returns false if it was not attached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if let Some(idx) = self.attached.iter().position(|&n| n == id) {
            self.attached.swap_remove(idx);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.attached.contains(&id)
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

impl Default for SceneRoot {
    fn default() -> Self {
        Self::new()
    }
}
