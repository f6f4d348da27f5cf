//! Keyboard and controller navigation.
//!
//! A [`Navigatable`] container owns an ordered list of actionable element ids
//! and a cursor into it, plus hotkey tables that jump straight to an element
//! regardless of the cursor.

use std::collections::HashMap;
use std::fmt;

use crate::input::{ControllerButton, Key, NavigationDirection};

/// Ordered focus list with a cursor.
pub trait UiNavigation: Send {
    /// Appends an element id. Ids are not checked here; prefer
    /// [`UiTree::add_to_navigation`](crate::render::UiTree::add_to_navigation),
    /// which only accepts attached actionables.
    fn add(&mut self, element_id: &str);

    /// Removes every occurrence of an element id.
    fn remove(&mut self, element_id: &str);

    /// Clears the list and resets the cursor.
    fn remove_all(&mut self);

    /// Replaces the entry at `index`, or inserts it when `index` is past the
    /// end of the list.
    fn set(&mut self, index: usize, element_id: &str);

    /// Moves the cursor and returns the newly selected element id.
    ///
    /// Returns `None` when the list is empty.
    fn navigate(&mut self, direction: NavigationDirection) -> Option<&str>;

    /// Moves the cursor back to the first entry and returns it.
    fn reset_cursor(&mut self) -> Option<&str>;

    /// Element id under the cursor.
    fn cursor(&self) -> Option<&str>;

    /// Cursor index.
    fn cursor_index(&self) -> usize;

    /// Number of entries.
    fn len(&self) -> usize;

    /// True when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Top-to-bottom list navigated with up/down, wrapping at both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerticalUiNavigation {
    entries: Vec<String>,
    cursor: usize,
}

impl VerticalUiNavigation {
    /// Creates an empty navigation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl UiNavigation for VerticalUiNavigation {
    fn add(&mut self, element_id: &str) {
        self.entries.push(element_id.to_string());
    }

    fn remove(&mut self, element_id: &str) {
        self.entries.retain(|e| e != element_id);
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
        }
    }

    fn remove_all(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    fn set(&mut self, index: usize, element_id: &str) {
        if index < self.entries.len() {
            self.entries[index] = element_id.to_string();
        } else {
            self.entries.push(element_id.to_string());
        }
    }

    fn navigate(&mut self, direction: NavigationDirection) -> Option<&str> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        match direction {
            NavigationDirection::Up => {
                self.cursor = if self.cursor > 0 { self.cursor - 1 } else { len - 1 };
            }
            NavigationDirection::Down => {
                self.cursor = if self.cursor + 1 < len { self.cursor + 1 } else { 0 };
            }
            NavigationDirection::Left | NavigationDirection::Right => {}
        }
        self.cursor()
    }

    fn reset_cursor(&mut self) -> Option<&str> {
        self.cursor = 0;
        self.cursor()
    }

    fn cursor(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    fn cursor_index(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Navigation list plus hotkey tables of a container element.
pub struct Navigatable {
    navigation: Box<dyn UiNavigation>,
    keyboard_hotkeys: HashMap<Key, String>,
    controller_hotkeys: HashMap<ControllerButton, String>,
}

impl Navigatable {
    /// Wraps a navigation implementation with empty hotkey tables.
    #[must_use]
    pub fn new(navigation: Box<dyn UiNavigation>) -> Self {
        Self {
            navigation,
            keyboard_hotkeys: HashMap::new(),
            controller_hotkeys: HashMap::new(),
        }
    }

    /// The navigation list.
    #[must_use]
    pub fn navigation(&self) -> &dyn UiNavigation {
        self.navigation.as_ref()
    }

    /// Mutable navigation list.
    pub fn navigation_mut(&mut self) -> &mut dyn UiNavigation {
        self.navigation.as_mut()
    }

    /// Maps a keyboard key to an element id.
    pub fn set_hotkey(&mut self, key: Key, element_id: &str) {
        self.keyboard_hotkeys.insert(key, element_id.to_string());
    }

    /// Removes a keyboard mapping.
    pub fn unset_hotkey(&mut self, key: Key) {
        self.keyboard_hotkeys.remove(&key);
    }

    /// Maps a controller button to an element id.
    pub fn set_controller_hotkey(&mut self, button: ControllerButton, element_id: &str) {
        self.controller_hotkeys.insert(button, element_id.to_string());
    }

    /// Removes a controller mapping.
    pub fn unset_controller_hotkey(&mut self, button: ControllerButton) {
        self.controller_hotkeys.remove(&button);
    }

    /// Removes every hotkey mapping.
    pub fn clear_hotkeys(&mut self) {
        self.keyboard_hotkeys.clear();
        self.controller_hotkeys.clear();
    }

    /// Element id mapped to `key`.
    #[must_use]
    pub fn hotkey(&self, key: Key) -> Option<&str> {
        self.keyboard_hotkeys.get(&key).map(String::as_str)
    }

    /// Element id mapped to `button`.
    #[must_use]
    pub fn controller_hotkey(&self, button: ControllerButton) -> Option<&str> {
        self.controller_hotkeys.get(&button).map(String::as_str)
    }

    /// Drops every reference to `element_id`, from the list and both hotkey tables.
    pub(crate) fn forget(&mut self, element_id: &str) {
        self.navigation.remove(element_id);
        self.keyboard_hotkeys.retain(|_, id| id != element_id);
        self.controller_hotkeys.retain(|_, id| id != element_id);
    }
}

impl Default for Navigatable {
    fn default() -> Self {
        Self::new(Box::new(VerticalUiNavigation::new()))
    }
}

impl fmt::Debug for Navigatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigatable")
            .field("entries", &self.navigation.len())
            .field("cursor", &self.navigation.cursor())
            .field("keyboard_hotkeys", &self.keyboard_hotkeys)
            .field("controller_hotkeys", &self.controller_hotkeys)
            .finish()
    }
}
