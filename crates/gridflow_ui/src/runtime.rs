//! Shared UI runtime: the active theme, default visibility and the registry
//! of live containers.
//!
//! One [`UiRuntime`] is created at startup and handed to every
//! [`UiContainer`](crate::UiContainer) by `Arc`. Swapping the theme forces
//! every registered container to relayout on its next update.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::render::Visibility;
use crate::style::Theme;

/// Frame pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UiPhase {
    /// Between passes.
    #[default]
    Noop = 0,
    /// Laying out the tree.
    Layout = 1,
    /// Updating areas and listeners.
    Update = 2,
    /// Interpolating render areas.
    Interpolate = 3,
    /// Drawing.
    Render = 4,
}

impl UiPhase {
    /// True for the passes that mutate geometry.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        matches!(self, Self::Layout | Self::Update)
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Layout,
            2 => Self::Update,
            3 => Self::Interpolate,
            4 => Self::Render,
            _ => Self::Noop,
        }
    }
}

/// Handle to a registered container's force-relayout flag.
#[derive(Debug)]
pub(crate) struct Registration {
    pub id: u64,
    pub force_layout: Arc<AtomicBool>,
}

/// Process-wide UI state.
pub struct UiRuntime {
    theme: RwLock<Option<Arc<dyn Theme>>>,
    default_visibility: RwLock<Visibility>,
    containers: Mutex<Vec<(u64, Arc<AtomicBool>)>>,
    next_container_id: AtomicU64,
    phase: AtomicU8,
}

impl UiRuntime {
    /// Creates a runtime with no theme and visible-by-default elements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: RwLock::new(None),
            default_visibility: RwLock::new(Visibility::Visible),
            containers: Mutex::new(Vec::new()),
            next_container_id: AtomicU64::new(1),
            phase: AtomicU8::new(UiPhase::Noop as u8),
        }
    }

    /// Creates a runtime with `theme` already applied.
    #[must_use]
    pub fn with_theme(theme: Arc<dyn Theme>) -> Self {
        let runtime = Self::new();
        *runtime.theme.write() = Some(theme);
        runtime
    }

    /// Applies a theme. Applying a theme with the current id is a no-op;
    /// any other theme forces every registered container to relayout.
    pub fn set_theme(&self, theme: Arc<dyn Theme>) {
        {
            let mut current = self.theme.write();
            if current.as_ref().is_some_and(|t| t.id() == theme.id()) {
                return;
            }
            tracing::info!("Applying UI theme '{}'", theme.id());
            *current = Some(theme);
        }
        self.relayout_all();
    }

    /// The active theme, if one has been applied.
    #[must_use]
    pub fn theme(&self) -> Option<Arc<dyn Theme>> {
        self.theme.read().clone()
    }

    /// True once a theme has been applied.
    #[must_use]
    pub fn is_theme_applied(&self) -> bool {
        self.theme.read().is_some()
    }

    /// Visibility given to elements that do not set one.
    #[must_use]
    pub fn default_visibility(&self) -> Visibility {
        *self.default_visibility.read()
    }

    /// Changes the default visibility for elements attached from now on.
    pub fn set_default_visibility(&self, visibility: Visibility) {
        *self.default_visibility.write() = visibility;
    }

    /// Forces every registered container to relayout on its next update.
    pub fn relayout_all(&self) {
        let containers = self.containers.lock();
        tracing::info!("Triggering relayout for {} UI containers", containers.len());
        for (_, flag) in containers.iter().rev() {
            flag.store(true, Ordering::Release);
        }
    }

    /// Number of registered containers.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.containers.lock().len()
    }

    /// Unregisters every container. Containers created afterwards register
    /// normally.
    pub fn shutdown(&self) {
        let mut containers = self.containers.lock();
        tracing::debug!("UI runtime shutdown, releasing {} containers", containers.len());
        containers.clear();
    }

    /// Phase of the container currently running a pass.
    #[must_use]
    pub fn phase(&self) -> UiPhase {
        UiPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: UiPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    pub(crate) fn register(&self) -> Registration {
        let id = self.next_container_id.fetch_add(1, Ordering::Relaxed);
        let force_layout = Arc::new(AtomicBool::new(false));
        self.containers.lock().push((id, Arc::clone(&force_layout)));
        Registration { id, force_layout }
    }

    pub(crate) fn unregister(&self, id: u64) {
        self.containers.lock().retain(|(registered, _)| *registered != id);
    }
}

impl Default for UiRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UiRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiRuntime")
            .field("theme", &self.theme.read().as_ref().map(|t| t.id().to_string()))
            .field("default_visibility", &self.default_visibility())
            .field("containers", &self.container_count())
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::UiTheme;

    #[test]
    fn test_register_and_relayout() {
        let runtime = UiRuntime::new();
        let a = runtime.register();
        let b = runtime.register();
        assert_ne!(a.id, b.id);
        assert_eq!(runtime.container_count(), 2);

        runtime.relayout_all();
        assert!(a.force_layout.load(Ordering::Acquire));
        assert!(b.force_layout.load(Ordering::Acquire));

        runtime.unregister(a.id);
        assert_eq!(runtime.container_count(), 1);
        runtime.shutdown();
        assert_eq!(runtime.container_count(), 0);
    }

    #[test]
    fn test_same_theme_id_is_noop() {
        let runtime = UiRuntime::new();
        let reg = runtime.register();
        runtime.set_theme(Arc::new(UiTheme::new("dark")));
        assert!(reg.force_layout.swap(false, Ordering::AcqRel));

        runtime.set_theme(Arc::new(UiTheme::new("dark")));
        assert!(!reg.force_layout.load(Ordering::Acquire));

        runtime.set_theme(Arc::new(UiTheme::new("light")));
        assert!(reg.force_layout.load(Ordering::Acquire));
        assert_eq!(runtime.theme().map(|t| t.id().to_string()), Some("light".to_string()));
    }

    #[test]
    fn test_phase_roundtrip() {
        let runtime = UiRuntime::default();
        assert_eq!(runtime.phase(), UiPhase::Noop);
        runtime.set_phase(UiPhase::Render);
        assert_eq!(runtime.phase(), UiPhase::Render);
        assert!(UiPhase::Layout.is_mutating());
        assert!(!UiPhase::Interpolate.is_mutating());
    }
}
