//! Z-index layers of a parent node.

use std::collections::BTreeMap;

use crate::render::NodeId;

/// Children of one parent that share a z-index, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderLayer {
    z_index: i32,
    children: Vec<NodeId>,
}

impl RenderLayer {
    /// Creates an empty layer.
    #[must_use]
    pub const fn new(z_index: i32) -> Self {
        Self {
            z_index,
            children: Vec::new(),
        }
    }

    /// Z-index of this layer.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Children in flow order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Sorted z-index to layer map.
///
/// A child lives in exactly one layer. Moving it to another z-index is a
/// remove followed by an insert, never an in-place change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerMap {
    layers: BTreeMap<i32, RenderLayer>,
}

impl LayerMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            layers: BTreeMap::new(),
        }
    }

    /// Appends `child` to the layer at `z_index`, creating it if needed.
    pub fn insert(&mut self, z_index: i32, child: NodeId) {
        self.layers
            .entry(z_index)
            .or_insert_with(|| RenderLayer::new(z_index))
            .children
            .push(child);
    }

    /// Removes `child` from the layer at `z_index`. Empty layers are dropped.
    pub fn remove(&mut self, z_index: i32, child: NodeId) -> bool {
        let Some(layer) = self.layers.get_mut(&z_index) else {
            return false;
        };
        let before = layer.children.len();
        layer.children.retain(|&c| c != child);
        let removed = layer.children.len() != before;
        if layer.children.is_empty() {
            self.layers.remove(&z_index);
        }
        removed
    }

    /// Layers from lowest to highest z-index.
    pub fn ascending(&self) -> impl Iterator<Item = &RenderLayer> {
        self.layers.values()
    }

    /// Layers from highest to lowest z-index.
    pub fn descending(&self) -> impl Iterator<Item = &RenderLayer> {
        self.layers.values().rev()
    }

    /// Snapshot of every child, lowest layer first.
    #[must_use]
    pub fn child_ids(&self) -> Vec<NodeId> {
        self.ascending().flat_map(|l| l.children.iter().copied()).collect()
    }

    /// Snapshot of every child in hit-test order: highest layer first, and
    /// within a layer the last added first.
    #[must_use]
    pub fn child_ids_descending(&self) -> Vec<NodeId> {
        self.descending()
            .flat_map(|l| l.children.iter().rev().copied())
            .collect()
    }

    /// Total number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.values().map(|l| l.children.len()).sum()
    }

    /// True when there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of distinct z-indices.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}
