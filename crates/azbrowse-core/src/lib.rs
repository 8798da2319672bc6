//! Tree navigation and concurrent expansion engine behind `azbrowse`.
//!
//! The crate owns everything between the ARM client (`azbrowse-api`) and the
//! terminal UI:
//!
//! - **[`ExpanderRegistry`]** — the ordered set of [`Expander`] capabilities.
//!   Each expander decides whether it applies to a [`ResourceNode`] and, if
//!   so, contributes child nodes.
//!
//! - **[`ExpansionCoordinator`]** — runs the predicate phase, fans out to the
//!   matching expanders on independent tasks, joins them under one shared
//!   deadline, merges their nodes, and fetches the display content.
//!
//! - **[`Navigator`]** — the state owner the UI talks to: displayed list,
//!   content, title, selection, and the [`NavStack`] of previous pages.
//!   Expansions are split into begin / run / finish so the render loop never
//!   waits on the network.
//!
//! - **[`EventBus`]** — topic-keyed fan-out with one bounded channel per
//!   subscriber. The navigator publishes [`NavigationEvent`]s on
//!   [`LIST_NAVIGATED`].
//!
//! - **[`ApiVersions`]** — per resource type `api-version` table loaded from
//!   the subscription's providers, with the configured default as fallback.
//!
//! - **[`AutoNavigator`]** — background automaton that drives selection and
//!   expansion towards a target resource id until it arrives, runs out of
//!   matches, or notices the user navigating elsewhere.

pub mod api_versions;
pub mod autonav;
pub mod bus;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod expander;
pub mod fetch;
pub mod model;
pub mod navigator;
pub mod root;
pub mod stack;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api_versions::{ApiVersions, load_api_versions};
pub use autonav::{AutoNavState, AutoNavigator, NavigationCommand, is_path_prefix};
pub use bus::{EventBus, LIST_NAVIGATED, Subscription};
pub use config::EngineConfig;
pub use coordinator::{Expansion, ExpansionCoordinator};
pub use error::{CoreError, ExpandError, ExpanderError};
pub use expander::{
    DefaultContent, ExpandContext, Expander, ExpanderRegistry, ExpansionResult,
};
pub use fetch::ResourceFetcher;
pub use model::{ExpandReturnType, ItemType, NavigationEvent, Page, ResourceNode};
pub use navigator::{Applied, ExpansionKind, ExpansionOutcome, Navigator, PendingExpansion};
pub use root::{RootListing, load_root, load_subscriptions};
pub use stack::NavStack;
