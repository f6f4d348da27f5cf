//! Input vocabulary for UI interaction.
//!
//! Host input events are translated into these types before they reach a
//! [`UiContainer`](crate::UiContainer).

use std::fmt;

use serde::Deserialize;

use crate::error::{UiError, UiResult};

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// Controller (gamepad) button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ControllerButton {
    /// Bottom face button (A on Xbox, Cross on PlayStation).
    South,
    /// Right face button.
    East,
    /// Left face button.
    West,
    /// Top face button.
    North,
    /// D-pad up.
    DpadUp,
    /// D-pad down.
    DpadDown,
    /// D-pad left.
    DpadLeft,
    /// D-pad right.
    DpadRight,
    /// Left shoulder.
    LeftShoulder,
    /// Right shoulder.
    RightShoulder,
    /// Start / options.
    Start,
    /// Back / select.
    Select,
}

/// Direction of a cursor move through a navigation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationDirection {
    /// Towards the previous entry.
    Up,
    /// Towards the next entry.
    Down,
    /// Left.
    Left,
    /// Right.
    Right,
}

impl NavigationDirection {
    /// Maps arrow keys to a direction.
    #[must_use]
    pub const fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Up => Some(Self::Up),
            Key::Down => Some(Self::Down),
            Key::Left => Some(Self::Left),
            Key::Right => Some(Self::Right),
            _ => None,
        }
    }

    /// Maps the d-pad to a direction.
    #[must_use]
    pub const fn from_button(button: ControllerButton) -> Option<Self> {
        match button {
            ControllerButton::DpadUp => Some(Self::Up),
            ControllerButton::DpadDown => Some(Self::Down),
            ControllerButton::DpadLeft => Some(Self::Left),
            ControllerButton::DpadRight => Some(Self::Right),
            _ => None,
        }
    }
}

/// The class of device the user last interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputSource {
    /// Keyboard and mouse.
    #[default]
    KeyboardMouse,
    /// Touch screen.
    Touchscreen,
    /// Game controller.
    Controller,
}

impl InputSource {
    /// Parses the lowercase token used in layout strings.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::UnknownInputSource`] for anything but
    /// `keyboardmouse`, `touchscreen` or `controller`.
    pub fn from_token(token: &str) -> UiResult<Self> {
        match token {
            "keyboardmouse" => Ok(Self::KeyboardMouse),
            "touchscreen" => Ok(Self::Touchscreen),
            "controller" => Ok(Self::Controller),
            other => Err(UiError::UnknownInputSource(other.to_string())),
        }
    }

    /// Token used in layout strings.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::KeyboardMouse => "keyboardmouse",
            Self::Touchscreen => "touchscreen",
            Self::Controller => "controller",
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Controller family, used by `hidden-controller-<type>` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerType {
    /// Unrecognised controller.
    #[default]
    Unknown,
    /// PlayStation 3.
    Ps3,
    /// PlayStation 4.
    Ps4,
    /// Xbox 360.
    Xbox360,
    /// Xbox One.
    XboxOne,
}

impl ControllerType {
    /// Parses the lowercase token used in layout strings.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::UnknownControllerType`] for unrecognised tokens.
    pub fn from_token(token: &str) -> UiResult<Self> {
        match token {
            "unknown" => Ok(Self::Unknown),
            "ps3" => Ok(Self::Ps3),
            "ps4" => Ok(Self::Ps4),
            "xbox360" => Ok(Self::Xbox360),
            "xboxone" => Ok(Self::XboxOne),
            other => Err(UiError::UnknownControllerType(other.to_string())),
        }
    }

    /// Token used in layout strings.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ps3 => "ps3",
            Self::Ps4 => "ps4",
            Self::Xbox360 => "xbox360",
            Self::XboxOne => "xboxone",
        }
    }
}

impl fmt::Display for ControllerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Host platform class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Mouse and keyboard primary.
    #[default]
    Desktop,
    /// Touch primary (phones, tablets).
    Touch,
}

impl Platform {
    /// Input source assumed when the pointer moves on this platform.
    #[must_use]
    pub const fn pointer_input_source(self) -> InputSource {
        match self {
            Self::Desktop => InputSource::KeyboardMouse,
            Self::Touch => InputSource::Touchscreen,
        }
    }
}

/// Which navigation styles a container accepts on desktop platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Keyboard/controller only.
    ButtonOnly,
    /// Pointer only.
    PointerOnly,
    /// Either.
    #[default]
    ButtonOrPointer,
}

impl NavigationMode {
    /// Whether keyboard/controller navigation is permitted on `platform`.
    #[must_use]
    pub const fn key_navigation_allowed(self, platform: Platform) -> bool {
        match platform {
            Platform::Touch => false,
            Platform::Desktop => !matches!(self, Self::PointerOnly),
        }
    }

    /// Whether pointer navigation is permitted on `platform`.
    #[must_use]
    pub const fn pointer_navigation_allowed(self, platform: Platform) -> bool {
        match platform {
            Platform::Touch => true,
            Platform::Desktop => !matches!(self, Self::ButtonOnly),
        }
    }
}
