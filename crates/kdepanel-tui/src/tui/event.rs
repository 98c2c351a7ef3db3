use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Terminal tick (for periodic redraws)
    Tick,
    /// Time for the periodic tree refresh
    Refresh,
    /// Key press event
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Error occurred
    Error(String),
}

/// Event handler managing terminal input and timers
pub struct EventHandler {
    /// Event receiver
    receiver: mpsc::UnboundedReceiver<Event>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
    /// Task handle
    task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    /// Create a new event handler with the given tick and refresh rates
    pub fn new(tick_rate: Duration, refresh_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut reader = event::EventStream::new();
                let mut tick_interval = tokio::time::interval(tick_rate);
                let mut refresh_interval = tokio::time::interval_at(
                    tokio::time::Instant::now() + refresh_rate,
                    refresh_rate,
                );
                refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    let tick = tick_interval.tick();
                    let refresh = refresh_interval.tick();
                    let crossterm_event = reader.next().fuse();

                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        _ = tick => {
                            let _ = sender.send(Event::Tick);
                        }

                        _ = refresh => {
                            let _ = sender.send(Event::Refresh);
                        }

                        maybe_event = crossterm_event => {
                            match maybe_event {
                                Some(Ok(evt)) => {
                                    match evt {
                                        CrosstermEvent::Key(key) => {
                                            // Filter out release events (important for Windows)
                                            if key.kind == KeyEventKind::Press {
                                                let _ = sender.send(Event::Key(key));
                                            }
                                        }
                                        CrosstermEvent::Resize(w, h) => {
                                            let _ = sender.send(Event::Resize(w, h));
                                        }
                                        _ => {}
                                    }
                                }
                                Some(Err(e)) => {
                                    let _ = sender.send(Event::Error(e.to_string()));
                                }
                                None => break,
                            }
                        }
                    }
                }
                debug!("event handler stopped");
            })
        };

        Self {
            receiver,
            cancel,
            task,
        }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Stop reading terminal input and wait until the reader is gone.
    ///
    /// Needed before handing the terminal to a child process, otherwise the
    /// reader would steal its keystrokes.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        let _ = (&mut self.task).await;
    }
}
