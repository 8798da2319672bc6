//! Application core — event loop, action dispatch, and rendering.
//!
//! The app task owns the [`Navigator`]. Network work (root listing and
//! expansions) runs on spawned tasks that report back as actions, so the
//! loop keeps drawing while requests are in flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use azbrowse_config::Config;
use azbrowse_core::{
    ApiVersions, Applied, EventBus, ExpansionCoordinator, LIST_NAVIGATED, Navigator,
    PendingExpansion, ResourceFetcher, load_root,
};

use crate::action::{Action, Notification, NotificationLevel};
use crate::event::{Event, EventReader};
use crate::nav_bridge::spawn_nav_bridge;
use crate::tui::Tui;
use crate::widgets::panels::{
    ContentView, ListView, StatusView, render_content, render_help, render_list, render_status,
};

/// How long a notification stays in the status bar.
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);
/// Lines scrolled per content scroll step.
const SCROLL_STEP: i16 = 3;

pub struct App {
    running: bool,
    navigator: Navigator,
    fetcher: Arc<dyn ResourceFetcher>,
    api_versions: Arc<ApiVersions>,
    /// Resource id to walk to on startup.
    navigate: Option<String>,
    demo: bool,
    help_visible: bool,
    fullscreen: bool,
    content_scroll: u16,
    terminal_size: (u16, u16),
    root_loading: bool,
    auto_navigating: bool,
    /// Node id of the last step the auto-navigator asked for.
    last_auto_step: Option<String>,
    /// Stops the navigation bridge.
    nav_cancel: Option<CancellationToken>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, config: &Config, navigate: Option<String>) -> Self {
        let engine = config.engine_config();
        let api_versions = Arc::new(ApiVersions::new(engine.resource_api_version.clone()));
        let coordinator = Arc::new(ExpansionCoordinator::builtin(
            Arc::clone(&fetcher),
            &engine,
            &api_versions,
        ));
        let bus = Arc::new(EventBus::new(engine.bus_capacity));
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            navigator: Navigator::new(coordinator, bus),
            fetcher,
            api_versions,
            navigate,
            demo: config.demo,
            help_visible: false,
            fullscreen: false,
            content_scroll: 0,
            terminal_size: (80, 24),
            root_loading: false,
            auto_navigating: false,
            last_auto_step: None,
            nav_cancel: None,
            notification: None,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Main event loop: draw, read events, dispatch actions.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));

        self.start();

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action
            let action = match event {
                Event::Key(key) => key_action(key, self.help_visible, self.fullscreen),
                Event::Mouse(mouse) => mouse_action(mouse),
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                Event::Tick => Some(Action::Tick),
                Event::Render => Some(Action::Render),
            };
            if let Some(action) = action {
                self.action_tx.send(action)?;
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                    continue;
                }
                self.process_action(action).await;
            }
        }

        events.stop();
        self.cancel.cancel();
        self.navigator.shutdown();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Subscribe the auto-navigator (if any) and kick off the root load.
    fn start(&mut self) {
        if let Some(target) = self.navigate.clone() {
            // Subscribe before the root list can be published
            let subscription = self.navigator.bus().subscribe(LIST_NAVIGATED);
            let nav_cancel = self.cancel.child_token();
            tokio::spawn(spawn_nav_bridge(
                target,
                subscription,
                self.action_tx.clone(),
                nav_cancel.clone(),
            ));
            self.nav_cancel = Some(nav_cancel);
            self.auto_navigating = true;
        }
        self.spawn_root_load();
    }

    fn spawn_root_load(&mut self) {
        self.root_loading = true;
        let fetcher = Arc::clone(&self.fetcher);
        let api_versions = Arc::clone(&self.api_versions);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = load_root(fetcher.as_ref(), &api_versions)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::RootLoaded(result));
        });
    }

    fn spawn_expansion(&self, pending: PendingExpansion) {
        let work = self.navigator.run_expansion(pending);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = work.await;
            let _ = tx.send(Action::ExpansionFinished(Box::new(outcome)));
        });
    }

    /// The automaton waits for a list it will never see: nothing is
    /// published after an empty, leaf or failed step. Stop it here.
    fn stop_auto_navigation(&mut self, node_id: &str) {
        info!(node = %node_id, "auto-navigation cannot continue past this node");
        self.auto_navigating = false;
        self.last_auto_step = None;
        if let Some(cancel) = self.nav_cancel.take() {
            cancel.cancel();
        }
        let note = if self.navigate.as_deref() == Some(node_id) {
            Notification::success(format!("Navigated to {}", node_name(node_id)))
        } else {
            Notification::info(format!("Auto-navigation stopped at {}", node_name(node_id)))
        };
        self.notify(note);
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    /// Rows visible in the list panel.
    fn page_size(&self) -> isize {
        let rows = self.terminal_size.1.saturating_sub(3).max(1);
        isize::try_from(rows).unwrap_or(1)
    }

    /// Process a single action — update app state.
    async fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, at)| at.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::Render => {}

            Action::Resize(w, h) => {
                self.terminal_size = (w, h);
            }

            Action::MoveSelection(delta) => self.navigator.move_selection(delta),
            Action::SelectFirst => self.navigator.change_selection(0),
            Action::SelectLast => {
                let len = self.navigator.nodes().len();
                self.navigator.change_selection(len.saturating_sub(1));
            }
            Action::PageUp => self.navigator.move_selection(-self.page_size()),
            Action::PageDown => self.navigator.move_selection(self.page_size()),

            Action::ScrollContent(delta) => {
                self.content_scroll = self.content_scroll.saturating_add_signed(delta);
            }

            Action::ExpandSelection => {
                if let Some(pending) = self.navigator.begin_expansion() {
                    self.spawn_expansion(pending);
                }
            }

            Action::Refresh => match self.navigator.begin_refresh() {
                Some(pending) => self.spawn_expansion(pending),
                None => self.spawn_root_load(),
            },

            Action::GoBack => {
                if self.navigator.go_back() {
                    self.content_scroll = 0;
                } else {
                    debug!("already at the root list");
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            Action::CloseOverlay => {
                if self.help_visible {
                    self.help_visible = false;
                } else {
                    self.fullscreen = false;
                }
            }

            Action::RootLoaded(result) => {
                self.root_loading = false;
                match result {
                    Ok(listing) => {
                        info!(subscriptions = listing.nodes.len(), "root list loaded");
                        self.content_scroll = 0;
                        self.navigator
                            .set_root(listing.nodes, listing.content, listing.title)
                            .await;
                    }
                    Err(message) => {
                        warn!(error = %message, "root list failed to load");
                        self.notify(Notification::error(message));
                    }
                }
            }

            Action::ExpansionFinished(outcome) => {
                let node_id = outcome.pending.node.id.clone();
                let result = self.navigator.finish_expansion(*outcome).await;
                let stalled = self.auto_navigating
                    && auto_step_stalled(
                        self.last_auto_step.as_deref(),
                        &node_id,
                        result.as_ref().ok().copied(),
                    );
                match result {
                    Ok(Applied::Navigated { .. } | Applied::ContentOnly) => {
                        self.content_scroll = 0;
                    }
                    Ok(Applied::Unchanged) => {
                        self.content_scroll = 0;
                        self.notify(Notification::info("No child items"));
                    }
                    Ok(Applied::Stale | Applied::NoSelection) => {}
                    Err(e) => self.notify(Notification::error(e.to_string())),
                }
                if stalled {
                    self.stop_auto_navigation(&node_id);
                }
            }

            Action::AutoNavigate { index, node_id } => {
                self.last_auto_step = Some(node_id.clone());
                if self.navigator.select_by_id(index, &node_id) {
                    if let Some(pending) = self.navigator.begin_expansion() {
                        self.spawn_expansion(pending);
                    }
                } else {
                    warn!(node = %node_id, "auto-navigation target vanished from the list");
                }
            }

            Action::AutoNavigationStopped => {
                if !self.auto_navigating {
                    return;
                }
                self.auto_navigating = false;
                self.last_auto_step = None;
                if let Some(target) = &self.navigate {
                    let reached = self
                        .navigator
                        .expanded()
                        .is_some_and(|node| node.id == *target);
                    let note = if reached {
                        Notification::success(format!("Navigated to {}", node_name(target)))
                    } else {
                        Notification::info("Auto-navigation stopped")
                    };
                    self.notify(note);
                }
            }

            Action::Notify(notification) => {
                if notification.level == NotificationLevel::Error {
                    warn!(message = %notification.message, "error notification");
                }
                self.notify(notification);
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [panels] [status bar]
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
        let main_area = layout[0];
        let status_area = layout[1];

        if self.fullscreen {
            self.render_content_panel(frame, main_area);
        } else {
            let panels =
                Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(main_area);
            let list = ListView {
                title: self.navigator.title(),
                nodes: self.navigator.nodes(),
                selected: self.navigator.selected(),
                focused: true,
                demo: self.demo,
            };
            render_list(frame, panels[0], &list);
            self.render_content_panel(frame, panels[1]);
        }

        let status = StatusView {
            busy: self.root_loading || self.navigator.is_busy(),
            depth: self.navigator.depth(),
            navigating: self.auto_navigating,
            notification: self.notification.as_ref().map(|(n, _)| n),
        };
        render_status(frame, status_area, &status);

        if self.help_visible {
            render_help(frame, area);
        }
    }

    fn render_content_panel(&self, frame: &mut Frame, area: Rect) {
        let heading = self
            .navigator
            .expanded()
            .map_or(self.navigator.title(), |node| node.id.as_str());
        let content = ContentView {
            heading,
            content: self.navigator.content(),
            scroll: self.content_scroll,
            demo: self.demo,
        };
        render_content(frame, area, &content);
    }
}

/// Whether finishing `node_id` leaves the auto-navigator stranded: the
/// step it asked for produced no list change, so no event will follow.
fn auto_step_stalled(
    last_auto_step: Option<&str>,
    node_id: &str,
    applied: Option<Applied>,
) -> bool {
    last_auto_step == Some(node_id)
        && !matches!(applied, Some(Applied::Navigated { .. } | Applied::Stale))
}

/// Last path segment of a resource id.
fn node_name(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

/// Map a key press to an action.
///
/// With the help overlay open only closing keys and quit are live. Esc
/// leaves fullscreen before it navigates back.
pub fn key_action(key: KeyEvent, help_visible: bool, fullscreen: bool) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('d') => Some(Action::PageDown),
            KeyCode::Char('u') => Some(Action::PageUp),
            KeyCode::Char('f') => Some(Action::ToggleFullscreen),
            _ => None,
        };
    }

    if help_visible {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('f') => Action::ToggleFullscreen,

        KeyCode::Char('j') | KeyCode::Down => Action::MoveSelection(1),
        KeyCode::Char('k') | KeyCode::Up => Action::MoveSelection(-1),
        KeyCode::Char('g') | KeyCode::Home => Action::SelectFirst,
        KeyCode::Char('G') | KeyCode::End => Action::SelectLast,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,

        KeyCode::Char('J') => Action::ScrollContent(SCROLL_STEP),
        KeyCode::Char('K') => Action::ScrollContent(-SCROLL_STEP),

        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Action::ExpandSelection,
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => Action::GoBack,
        KeyCode::Esc if fullscreen => Action::CloseOverlay,
        KeyCode::Esc => Action::GoBack,
        KeyCode::Char('r') | KeyCode::F(5) => Action::Refresh,

        _ => return None,
    };
    Some(action)
}

/// Mouse wheel scrolls the content panel.
fn mouse_action(mouse: MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Action::ScrollContent(SCROLL_STEP)),
        MouseEventKind::ScrollUp => Some(Action::ScrollContent(-SCROLL_STEP)),
        _ => None,
    }
}
