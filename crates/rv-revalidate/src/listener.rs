//! Channel-fed event intake
//!
//! For hosts that embed the relay in-process: change events are pushed into
//! an mpsc channel and drained here. Events are handled one at a time; each
//! classification + dispatch sequence runs to completion before the next
//! event is taken.

use std::sync::Arc;

use rv_common::ChangeEvent;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::handler::RevalidateEventHandler;

pub struct EventListener {
    handler: Arc<RevalidateEventHandler>,
    events: mpsc::Receiver<ChangeEvent>,
    shutdown: oneshot::Receiver<()>,
}

impl EventListener {
    /// Dropping the returned shutdown handle also stops the listener.
    pub fn new(
        handler: Arc<RevalidateEventHandler>,
        events: mpsc::Receiver<ChangeEvent>,
    ) -> (Self, oneshot::Sender<()>) {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let listener = Self {
            handler,
            events,
            shutdown: shutdown_rx,
        };

        (listener, shutdown_tx)
    }

    /// Drain events until the channel closes or shutdown is signalled.
    pub async fn run(mut self) {
        info!("Starting revalidation event listener");

        loop {
            tokio::select! {
                maybe_event = self.events.recv() => match maybe_event {
                    Some(event) => self.handler.handle(event).await,
                    None => {
                        debug!("Event channel closed");
                        break;
                    }
                },
                _ = &mut self.shutdown => {
                    debug!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Revalidation event listener stopped");
    }
}
