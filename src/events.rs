use crate::api::parser::BoardDetails;
use crate::app::{ChainId, Mutation};
use crate::cascade::{FetchTicket, Item};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

/// Reply payload of a completed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationReply {
    Status(String),
    /// Backup commit hash, None when the backup found no changes.
    Backup(Option<String>),
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    FetchResult {
        chain: ChainId,
        ticket: FetchTicket,
        result: Result<Vec<Item>, String>,
    },
    /// Per-board detail fetch; `generation` pins it to the open-boards
    /// list that spawned it.
    DetailResult {
        generation: u64,
        result: Result<BoardDetails, String>,
    },
    MutationResult {
        mutation: Mutation,
        result: Result<MutationReply, String>,
    },
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _tx: mpsc::UnboundedSender<AppEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();

        let thread = std::thread::spawn(move || {
            while !shutdown_flag.load(Ordering::Relaxed) {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(CrosstermEvent::Key(key)) = event::read() {
                        if event_tx.send(AppEvent::Key(key)).is_err() {
                            break;
                        }
                    }
                } else if event_tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            _tx: tx,
            shutdown,
            thread: Some(thread),
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self._tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop();
    }
}
