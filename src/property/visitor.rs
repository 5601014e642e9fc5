//! Traversal over property trees

use super::array::ArrayNode;
use super::map::MapNode;
use super::scalar::ScalarNode;

/// Visitor over a property tree
///
/// `visit_map` decides whether the traversal descends into the map's
/// children; returning `false` skips the whole subtree.
pub trait PropertyVisitor {
    fn visit_map(&mut self, _node: &MapNode) -> bool {
        true
    }

    fn visit_array(&mut self, _node: &ArrayNode) {}

    fn visit_scalar(&mut self, _node: &ScalarNode) {}
}

/// Collects the paths of dirty leaves, skipping clean maps
#[derive(Debug, Default)]
pub struct DirtyPathCollector {
    paths: Vec<String>,
}

impl DirtyPathCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths collected so far, in traversal order
    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl PropertyVisitor for DirtyPathCollector {
    fn visit_map(&mut self, node: &MapNode) -> bool {
        node.is_dirty()
    }

    fn visit_array(&mut self, node: &ArrayNode) {
        if node.is_dirty() {
            self.paths.push(node.path().to_string());
        }
    }

    fn visit_scalar(&mut self, node: &ScalarNode) {
        if node.is_dirty() {
            self.paths.push(node.path().to_string());
        }
    }
}
