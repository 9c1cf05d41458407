//! Terminal event pump for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;
use tokio::time::interval;

/// Terminal events delivered to the UI loop.
#[derive(Debug, Clone)]
pub enum Event {
    /// Periodic redraw tick.
    Tick,
    /// A key press.
    Key(KeyEvent),
    /// A mouse event (scrolling toggles follow mode).
    Mouse(MouseEvent),
    /// Terminal resize.
    Resize(u16, u16),
}

/// Polls crossterm on a background task and feeds events to the UI.
#[derive(Debug)]
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Start the polling task with the given tick rate in milliseconds.
    #[must_use]
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        tokio::spawn(async move {
            let mut ticker = interval(tick_rate);
            loop {
                let event = tokio::select! {
                    _ = ticker.tick() => Event::Tick,
                    event = poll_event() => event,
                };
                if tx_clone.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Receive the next event.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Poll for the next interesting crossterm event.
async fn poll_event() -> Event {
    loop {
        if event::poll(Duration::from_millis(50)).unwrap_or(false) {
            if let Ok(event) = event::read() {
                return match event {
                    CrosstermEvent::Key(key) => Event::Key(key),
                    CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
                    CrosstermEvent::Resize(w, h) => Event::Resize(w, h),
                    _ => continue,
                };
            }
        }
        tokio::task::yield_now().await;
    }
}
