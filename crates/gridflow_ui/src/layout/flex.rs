//! Flex layout rulesets: breakpoint-aware grid sizing and flow.
//!
//! A flex value is `<horizontal>[,<vertical>]`, each a space separated list
//! of tokens:
//!
//! ```text
//! xs-12c           width of 12 grid columns from xs upwards
//! md-200px         200 pixels from md upwards
//! xs-offset-2c     shift right by 2 columns
//! xs-auto          height computed from children (vertical only)
//! hidden-controller, hidden-controller-ps4   (horizontal only)
//! ```

use std::fmt;

use crate::error::{UiError, UiResult};
use crate::input::{ControllerType, InputSource};
use crate::layout::ruleset::ChildBox;
use crate::layout::rules::{LayoutState, OffsetRule, SizeRule, GRID_COLUMNS};
use crate::layout::ScreenSize;

/// Slack allowed before a child wraps onto the next line.
const WRAP_TOLERANCE: f32 = 0.01;

/// Flow direction of a flex parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlexDirection {
    /// Children flow left to right and wrap.
    Column,
    /// Like `Column` with children visited last to first.
    ColumnReverse,
    /// Children stack top to bottom.
    Row,
    /// Children stack top to bottom, last child first.
    RowReverse,
    /// Children stack top to bottom, each centred horizontally.
    Center,
}

impl FlexDirection {
    /// Resolves a layout kind alias.
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "flex-col" | "flex-column" => Some(Self::Column),
            "flex-col-r" | "flex-column-r" | "flex-column-reverse" => Some(Self::ColumnReverse),
            "flex-r" | "flex-row" => Some(Self::Row),
            "flex-r-r" | "flex-row-r" | "flex-row-reverse" => Some(Self::RowReverse),
            "flex-cen" | "flex-centre" | "flex-center" => Some(Self::Center),
            _ => None,
        }
    }

    /// Canonical layout kind.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Column => "flex-column",
            Self::ColumnReverse => "flex-column-reverse",
            Self::Row => "flex-row",
            Self::RowReverse => "flex-row-reverse",
            Self::Center => "flex-center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Finalized per-breakpoint rules for one axis.
#[derive(Debug, Clone, PartialEq)]
struct AxisRules {
    sizes: [SizeRule; 5],
    offsets: [OffsetRule; 5],
}

#[derive(Default)]
struct AxisBuilder {
    sizes: [Option<SizeRule>; 5],
    offsets: [Option<OffsetRule>; 5],
}

impl AxisBuilder {
    /// Ascending fill: every breakpoint inherits the nearest smaller rule.
    fn finalize(self, default_size: SizeRule) -> AxisRules {
        let mut sizes = [default_size; 5];
        let mut offsets = [OffsetRule::ZERO; 5];
        let mut last_size = default_size;
        let mut last_offset = OffsetRule::ZERO;
        for size in ScreenSize::ALL {
            let i = size.index();
            if let Some(rule) = self.sizes[i] {
                last_size = rule;
            }
            if let Some(rule) = self.offsets[i] {
                last_offset = rule;
            }
            sizes[i] = last_size;
            offsets[i] = last_offset;
        }
        AxisRules { sizes, offsets }
    }
}

/// A parsed `flex-*` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexLayoutRuleset {
    direction: FlexDirection,
    horizontal: AxisRules,
    vertical: AxisRules,
    hidden_input_sources: Vec<InputSource>,
    hidden_controller_types: Vec<ControllerType>,
}

impl FlexLayoutRuleset {
    /// Parses the part after `<kind>:`.
    pub(crate) fn parse(direction: FlexDirection, value: &str) -> UiResult<Self> {
        let rulesets: Vec<&str> = value.split(',').collect();
        if rulesets.len() > 2 {
            return Err(UiError::layout(
                value,
                "expected at most a horizontal and a vertical ruleset",
            ));
        }

        let mut hidden_input_sources = Vec::new();
        let mut hidden_controller_types = Vec::new();

        let horizontal = parse_axis(
            rulesets[0],
            Axis::Horizontal,
            &mut hidden_input_sources,
            &mut hidden_controller_types,
        )?
        .finalize(SizeRule::Responsive(GRID_COLUMNS));

        let vertical = match rulesets.get(1) {
            Some(tokens) => parse_axis(tokens, Axis::Vertical, &mut Vec::new(), &mut Vec::new())?,
            None => AxisBuilder::default(),
        }
        .finalize(SizeRule::Auto);

        Ok(Self {
            direction,
            horizontal,
            vertical,
            hidden_input_sources,
            hidden_controller_types,
        })
    }

    /// `flex-column:xs-12c,xs-auto`
    pub(crate) fn default_column() -> Self {
        Self {
            direction: FlexDirection::Column,
            horizontal: AxisBuilder::default().finalize(SizeRule::Responsive(GRID_COLUMNS)),
            vertical: AxisBuilder::default().finalize(SizeRule::Auto),
            hidden_input_sources: Vec::new(),
            hidden_controller_types: Vec::new(),
        }
    }

    /// Flow direction.
    #[must_use]
    pub const fn direction(&self) -> FlexDirection {
        self.direction
    }

    /// Width rule at `size`.
    #[must_use]
    pub const fn width_rule(&self, size: ScreenSize) -> SizeRule {
        self.horizontal.sizes[size.index()]
    }

    /// Height rule at `size`.
    #[must_use]
    pub const fn height_rule(&self, size: ScreenSize) -> SizeRule {
        self.vertical.sizes[size.index()]
    }

    /// Horizontal offset rule at `size`.
    #[must_use]
    pub const fn x_offset_rule(&self, size: ScreenSize) -> OffsetRule {
        self.horizontal.offsets[size.index()]
    }

    /// Vertical offset rule at `size`.
    #[must_use]
    pub const fn y_offset_rule(&self, size: ScreenSize) -> OffsetRule {
        self.vertical.offsets[size.index()]
    }

    pub(crate) fn preferred_element_width(&self, state: &LayoutState<'_>) -> f32 {
        self.width_rule(state.screen_size)
            .preferred_size(state.parent_width, state.total_columns)
    }

    pub(crate) fn preferred_element_height(&self, state: &LayoutState<'_>) -> f32 {
        self.height_rule(state.screen_size)
            .preferred_size(state.parent_width, state.total_columns)
    }

    pub(crate) fn preferred_element_relative_x(&self, state: &LayoutState<'_>) -> f32 {
        self.x_offset_rule(state.screen_size)
            .offset(state.parent_width, state.total_columns)
    }

    pub(crate) fn preferred_element_relative_y(&self, state: &LayoutState<'_>) -> f32 {
        self.y_offset_rule(state.screen_size)
            .offset(state.parent_width, state.total_columns)
    }

    /// Controller sub-type rules win over the coarse input source rule
    /// whenever any exist.
    pub(crate) fn is_hidden_by_input_source(&self, state: &LayoutState<'_>) -> bool {
        match state.input_source {
            InputSource::Controller if !self.hidden_controller_types.is_empty() => {
                self.hidden_controller_types.contains(&state.controller_type)
            }
            source => self.hidden_input_sources.contains(&source),
        }
    }

    pub(crate) fn with_position(&self, x: f32, y: f32) -> Self {
        let mut result = self.clone();
        result.horizontal.offsets = [OffsetRule::Absolute(x); 5];
        result.vertical.offsets = [OffsetRule::Absolute(y); 5];
        result
    }

    pub(crate) fn with_size(&self, width: f32, height: f32) -> Self {
        let mut result = self.clone();
        result.horizontal.sizes = [SizeRule::Absolute(width.max(0.0)); 5];
        result.vertical.sizes = [SizeRule::Absolute(height.max(0.0)); 5];
        result
    }

    /// Positions one layer of children inside a content box starting at `origin`.
    pub(crate) fn arrange(&self, origin: (f32, f32), content_width: f32, children: &mut [ChildBox]) {
        match self.direction {
            FlexDirection::Column => flow(origin, content_width, children.iter_mut()),
            FlexDirection::ColumnReverse => flow(origin, content_width, children.iter_mut().rev()),
            FlexDirection::Row => stack(origin, content_width, children.iter_mut(), false),
            FlexDirection::RowReverse => {
                stack(origin, content_width, children.iter_mut().rev(), false);
            }
            FlexDirection::Center => stack(origin, content_width, children.iter_mut(), true),
        }
    }
}

fn flow<'a>(origin: (f32, f32), content_width: f32, children: impl Iterator<Item = &'a mut ChildBox>) {
    let (left, top) = origin;
    let right_edge = left + content_width;
    let mut cursor_x = left;
    let mut line_y = top;
    let mut line_height = 0.0_f32;

    for child in children {
        if !child.included {
            child.x = left;
            child.y = line_y;
            continue;
        }
        let mut x = cursor_x + child.x_offset;
        if cursor_x > left && x + child.width > right_edge + WRAP_TOLERANCE {
            line_y += line_height;
            line_height = 0.0;
            x = left + child.x_offset;
        }
        child.x = x;
        child.y = line_y + child.y_offset;
        cursor_x = x + child.width;
        line_height = line_height.max(child.y_offset + child.height);
    }
}

fn stack<'a>(
    origin: (f32, f32),
    content_width: f32,
    children: impl Iterator<Item = &'a mut ChildBox>,
    centred: bool,
) {
    let (left, top) = origin;
    let mut cursor_y = top;

    for child in children {
        if !child.included {
            child.x = left;
            child.y = cursor_y;
            continue;
        }
        let centring = if centred {
            ((content_width - child.width) * 0.5).max(0.0)
        } else {
            0.0
        };
        child.x = left + centring + child.x_offset;
        child.y = cursor_y + child.y_offset;
        cursor_y = child.y + child.height;
    }
}

fn parse_axis(
    tokens: &str,
    axis: Axis,
    hidden_sources: &mut Vec<InputSource>,
    hidden_controllers: &mut Vec<ControllerType>,
) -> UiResult<AxisBuilder> {
    let mut builder = AxisBuilder::default();
    for token in tokens.split_whitespace() {
        let parts: Vec<&str> = token.splitn(3, '-').collect();
        match parts.as_slice() {
            [_] => {
                return Err(UiError::layout(token, "missing screen size prefix"));
            }
            ["hidden", source] => {
                require_horizontal(token, axis)?;
                let source = InputSource::from_token(source)?;
                if !hidden_sources.contains(&source) {
                    hidden_sources.push(source);
                }
            }
            ["hidden", "controller", controller] => {
                require_horizontal(token, axis)?;
                let controller = ControllerType::from_token(controller)?;
                if !hidden_controllers.contains(&controller) {
                    hidden_controllers.push(controller);
                }
            }
            ["hidden", source, _] => {
                InputSource::from_token(source)?;
                return Err(UiError::layout(
                    token,
                    "only hidden-controller accepts a sub-type",
                ));
            }
            [size, value] => {
                let size = ScreenSize::from_token(size)?;
                builder.sizes[size.index()] = Some(parse_size(token, value, axis)?);
            }
            [size, "offset", value] => {
                let size = ScreenSize::from_token(size)?;
                builder.offsets[size.index()] = Some(parse_offset(token, value, axis)?);
            }
            _ => {
                return Err(UiError::layout(token, "expected <size>-offset-<value>"));
            }
        }
    }
    Ok(builder)
}

fn require_horizontal(token: &str, axis: Axis) -> UiResult<()> {
    if axis == Axis::Vertical {
        return Err(UiError::layout(token, "hidden rules are horizontal only"));
    }
    Ok(())
}

fn parse_size(token: &str, value: &str, axis: Axis) -> UiResult<SizeRule> {
    if value == "auto" {
        return match axis {
            Axis::Vertical => Ok(SizeRule::Auto),
            Axis::Horizontal => Err(UiError::layout(token, "auto is only valid for heights")),
        };
    }
    if let Some(px) = value.strip_suffix("px") {
        let px = parse_pixels(token, px)?;
        if px < 0.0 {
            return Err(UiError::layout(token, "sizes cannot be negative"));
        }
        return Ok(SizeRule::Absolute(px));
    }
    if let Some(columns) = value.strip_suffix('c') {
        if axis == Axis::Vertical {
            return Err(UiError::layout(token, "column sizes are horizontal only"));
        }
        return parse_columns(token, columns).map(SizeRule::Responsive);
    }
    Err(UiError::layout(token, "expected <n>c, <n>px or auto"))
}

fn parse_offset(token: &str, value: &str, axis: Axis) -> UiResult<OffsetRule> {
    if let Some(px) = value.strip_suffix("px") {
        return parse_pixels(token, px).map(OffsetRule::Absolute);
    }
    if let Some(columns) = value.strip_suffix('c') {
        if axis == Axis::Vertical {
            return Err(UiError::layout(token, "column offsets are horizontal only"));
        }
        return parse_columns(token, columns).map(OffsetRule::Responsive);
    }
    Err(UiError::layout(token, "expected <n>c or <n>px"))
}

fn parse_pixels(token: &str, value: &str) -> UiResult<f32> {
    match value.parse::<f32>() {
        Ok(px) if px.is_finite() => Ok(px),
        _ => Err(UiError::layout(token, format!("'{value}' is not a pixel amount"))),
    }
}

fn parse_columns(token: &str, value: &str) -> UiResult<u8> {
    match value.parse::<u8>() {
        Ok(columns) if columns <= GRID_COLUMNS => Ok(columns),
        _ => Err(UiError::layout(
            token,
            format!("'{value}' is not a column count between 0 and {GRID_COLUMNS}"),
        )),
    }
}

fn write_axis(
    f: &mut fmt::Formatter<'_>,
    rules: &AxisRules,
    mut separator: &'static str,
) -> Result<&'static str, fmt::Error> {
    let mut previous: Option<SizeRule> = None;
    for size in ScreenSize::ALL {
        let rule = rules.sizes[size.index()];
        if previous != Some(rule) {
            write!(f, "{separator}{size}-{rule}")?;
            separator = " ";
            previous = Some(rule);
        }
    }
    let mut previous = OffsetRule::ZERO;
    for size in ScreenSize::ALL {
        let rule = rules.offsets[size.index()];
        if previous != rule {
            write!(f, "{separator}{size}-offset-{rule}")?;
            separator = " ";
            previous = rule;
        }
    }
    Ok(separator)
}

impl fmt::Display for FlexLayoutRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.direction.canonical())?;
        let mut separator = write_axis(f, &self.horizontal, "")?;
        for source in &self.hidden_input_sources {
            write!(f, "{separator}hidden-{source}")?;
            separator = " ";
        }
        for controller in &self.hidden_controller_types {
            write!(f, "{separator}hidden-controller-{controller}")?;
            separator = " ";
        }
        f.write_str(",")?;
        write_axis(f, &self.vertical, "")?;
        Ok(())
    }
}
