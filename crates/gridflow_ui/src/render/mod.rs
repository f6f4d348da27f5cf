//! The render tree: one node per element, cached geometry, z-layers,
//! deferred task lists and the per-frame passes.

pub mod deferred;
pub mod graphics;
mod interaction;
pub mod layer;
pub mod node;
mod passes;
pub mod tree;

pub use deferred::{DeferredList, DeferredPhase, DeferredRunnable, DeferredTask};
pub use graphics::{CommandRecorder, Graphics, RenderCommand};
pub use layer::{LayerMap, RenderLayer};
pub use node::{Actionable, Capabilities, Label, NodeId, NodeKind, NodeState, RenderNode, TextInput, Visibility};
pub use tree::UiTree;
