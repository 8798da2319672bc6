//! Navigation bridge — connects the auto-navigator to TUI actions.
//!
//! Runs the [`AutoNavigator`] on its own task against a bus subscription
//! and forwards every command it issues as an [`Action`]. The UI task stays
//! the only owner of navigation state; the automaton only ever asks.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use azbrowse_core::{
    AutoNavState, AutoNavigator, NavigationCommand, NavigationEvent, Subscription,
};

use crate::action::{Action, Notification};

/// Drive auto-navigation towards `target` until it stops or `cancel` fires.
///
/// `subscription` must be taken before the root list is published so the
/// first event is not missed.
pub async fn spawn_nav_bridge(
    target: String,
    subscription: Subscription<NavigationEvent>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
    let automaton = tokio::spawn(AutoNavigator::new(target.as_str()).run(subscription, cmd_tx));
    let abort = automaton.abort_handle();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                abort.abort();
                debug!("navigation bridge cancelled");
                return;
            }

            cmd = cmd_rx.recv() => match cmd {
                Some(NavigationCommand::SelectAndExpand { index, node_id }) => {
                    debug!(index, node = %node_id, "forwarding auto-navigation step");
                    if action_tx.send(Action::AutoNavigate { index, node_id }).is_err() {
                        abort.abort();
                        return;
                    }
                }
                // Automaton dropped its sender: it has stopped
                None => break,
            },
        }
    }

    match automaton.await {
        Ok(AutoNavState::Stopped) => debug!(target_id = %target, "auto-navigation finished"),
        Ok(AutoNavState::Active) => debug!("navigation bus closed"),
        Err(e) => {
            warn!(error = %e, "auto-navigation task failed");
            let _ = action_tx.send(Action::Notify(Notification::error(
                "Auto-navigation failed, see log",
            )));
        }
    }
    let _ = action_tx.send(Action::AutoNavigationStopped);
}
