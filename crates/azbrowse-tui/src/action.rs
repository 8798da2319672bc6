//! All possible UI actions. Actions are the sole mechanism for state mutation.

use azbrowse_core::{ExpansionOutcome, RootListing};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A status-bar notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── List navigation ───────────────────────────────────────────
    MoveSelection(isize),
    SelectFirst,
    SelectLast,
    PageUp,
    PageDown,

    // ── Content panel ─────────────────────────────────────────────
    ScrollContent(i16),

    // ── Tree ──────────────────────────────────────────────────────
    ExpandSelection,
    Refresh,
    GoBack,

    // ── Overlays / layout ─────────────────────────────────────────
    ToggleHelp,
    ToggleFullscreen,
    CloseOverlay,

    // ── Background results ────────────────────────────────────────
    /// Subscription listing finished loading (error already rendered).
    RootLoaded(Result<RootListing, String>),
    /// A spawned expansion completed.
    ExpansionFinished(Box<ExpansionOutcome>),
    /// The auto-navigator asks to select and expand a node.
    AutoNavigate { index: usize, node_id: String },
    /// The auto-navigator has stopped for good.
    AutoNavigationStopped,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
