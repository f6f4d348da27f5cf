//! Layout rules: breakpoints, the ruleset DSL and deferred layout utilities.

pub mod flex;
pub mod pixel;
pub mod rules;
pub mod ruleset;
pub mod screen_size;
pub mod utils;

pub use flex::{FlexDirection, FlexLayoutRuleset};
pub use pixel::PixelLayoutRuleset;
pub use rules::{LayoutState, OffsetRule, SizeRule, GRID_COLUMNS};
pub use ruleset::{ChildBox, LayoutRuleset, DEFAULT_LAYOUT};
pub use screen_size::{Breakpoints, ScreenSize, ScreenSizeScaleMode};
pub use utils::{
    align_above, align_below, align_edge_to_edge, align_left_of, align_right_of, align_to, round_px,
    shrink_to_contents, snap_to, HorizontalAlignment, ShrinkCallback, ShrinkState, VerticalAlignment,
};
