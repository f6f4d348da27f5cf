//! # UI Error Types
//!
//! Every failure the layout engine can report. Malformed configuration is
//! rejected here at parse/load time so that it never reaches a frame.

use thiserror::Error;

use crate::render::NodeId;

/// Errors that can occur in the UI engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// A layout string could not be parsed.
    #[error("invalid layout '{layout}': {reason}")]
    InvalidLayout {
        /// The offending layout string (or token).
        layout: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A breakpoint token was not one of xs, sm, md, lg, xl.
    #[error("unknown screen size: {0}")]
    UnknownScreenSize(String),

    /// An input source token was not recognised.
    #[error("unknown input source: {0}")]
    UnknownInputSource(String),

    /// A controller type token was not recognised.
    #[error("unknown controller type: {0}")]
    UnknownControllerType(String),

    /// Two elements in one tree share an id.
    #[error("duplicate element id: {0}")]
    DuplicateElementId(String),

    /// The node does not exist in the tree (never attached or already removed).
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The node exists but cannot perform the requested operation.
    #[error("node {node} does not support {capability}")]
    Unsupported {
        /// Node the operation was attempted on.
        node: NodeId,
        /// Capability that was required.
        capability: &'static str,
    },

    /// Invalid configuration or theme file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A deferred task failed while running.
    #[error("deferred task failed: {0}")]
    Deferred(String),
}

impl UiError {
    /// Shorthand for a layout parse failure.
    pub(crate) fn layout(layout: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            layout: layout.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
