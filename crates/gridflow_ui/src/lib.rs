//! # GRIDFLOW UI
//!
//! Responsive layout and render-tree engine for game-style user interfaces.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FRAME PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Input → UiContainer → Layout → Update → Interpolate → Render │
//! │            ↓             ↓        ↓                     ↓     │
//! │      Focus / Actions  Rulesets  Areas              Graphics   │
//! │                          ↓        ↓                           │
//! │                 Layout tasks   Update tasks    Render tasks   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Elements are attached to a [`UiTree`] owned by a [`UiContainer`]. Every
//! element carries a layout string in a small DSL (`flex-column:xs-12c
//! md-6c,xs-auto`, `pixel:10,20,100,50`) that is parsed once when attached.
//! Layout only revisits dirty subtrees or the whole tree after a breakpoint
//! change. Work that needs settled geometry is deferred to a phase boundary
//! ([`UiTree::defer`]), which is how the [`layout::shrink_to_contents`] and
//! alignment utilities are built.
//!
//! A single [`UiRuntime`] shared by `Arc` holds the theme and knows every
//! live container, so a theme change relayouts all of them.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod container;
pub mod element;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod listener;
pub mod navigation;
pub mod render;
pub mod runtime;
pub mod style;

pub use config::UiConfig;
pub use container::{ListenerId, UiContainer};
pub use element::Element;
pub use error::{UiError, UiResult};
pub use geometry::Rect;
pub use input::{ControllerButton, ControllerType, InputSource, Key, MouseButton, NavigationMode, Platform};
pub use layout::{HorizontalAlignment, LayoutRuleset, ScreenSize, ScreenSizeScaleMode, VerticalAlignment};
pub use listener::{ActionEvent, ActionListener, EventTrigger, UiContainerListener};
pub use navigation::{Navigatable, UiNavigation, VerticalUiNavigation};
pub use render::{CommandRecorder, DeferredPhase, Graphics, NodeId, NodeKind, NodeState, RenderCommand, UiTree, Visibility};
pub use runtime::{UiPhase, UiRuntime};
pub use style::{Color, StyleRule, Theme, UiTheme};
