//! Input and heartbeat pump.
//!
//! One background task merges the crossterm stream with two intervals: a
//! slow tick that expires notifications and a fast render beat that redraws.
//! Only input the browser reacts to gets through [`translate`]; everything
//! else is dropped at the source.

use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Wheel only; the list is driven from the keyboard.
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    Render,
}

/// Handle to the pump task. Dropping it stops the task.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(pump(tx, cancel.clone(), heartbeat(tick_rate), heartbeat(render_rate)));
        Self { rx, cancel }
    }

    /// `None` once the pump has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn heartbeat(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    // A slow frame must not trigger a burst of catch-up redraws
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn pump(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    mut tick: Interval,
    mut render: Interval,
) {
    let mut input = EventStream::new();
    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => return,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            raw = input.next() => match raw {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(_)) => continue,
                // stdin closed
                None => return,
            },
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}

/// Key presses (not repeats or releases), wheel scrolls and resizes.
fn translate(raw: CrosstermEvent) -> Option<Event> {
    match raw {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse)
            if matches!(mouse.kind, MouseEventKind::ScrollUp | MouseEventKind::ScrollDown) =>
        {
            Some(Event::Mouse(mouse))
        }
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}
