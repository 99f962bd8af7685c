//! Runs coordinator intents in the background.
//!
//! The terminal loop is synchronous; every intent is spawned as a task on the
//! tokio runtime and its outcome is sent back to the UI thread over an
//! [`mpsc`] channel, which the main loop drains on every tick.
//!
//! ## For contributors
//!
//! To add an intent: add an [`Intent`] variant, map a key to it in
//! [`crate::input`], and add a match arm in [`Dispatcher::dispatch`] that
//! calls the coordinator and names the outcome.

use std::sync::mpsc;
use std::sync::Arc;

use log::warn;
use tokio::runtime::Handle;

use crate::coordinator::ViewCoordinator;
use crate::source::Employee;

/// A user request that needs the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Bootstrap,
    /// A picker event: `None` when closed without choosing.
    Select(Option<Employee>),
    LoadMore,
    SetApproval { transaction_id: String, approved: bool },
}

/// Messages sent from intent tasks to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMsg {
    /// An intent finished; carries a short description for the status bar.
    Done(String),
    /// An intent failed with this error description.
    Error(String),
}

pub struct Dispatcher {
    runtime: Handle,
    coordinator: Arc<ViewCoordinator>,
    tx: mpsc::Sender<ViewMsg>,
}

impl Dispatcher {
    /// Returns the dispatcher and the receiver the main loop should drain.
    pub fn new(runtime: Handle, coordinator: Arc<ViewCoordinator>) -> (Self, mpsc::Receiver<ViewMsg>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                runtime,
                coordinator,
                tx,
            },
            rx,
        )
    }

    pub fn dispatch(&self, intent: Intent) {
        let coordinator = self.coordinator.clone();
        let tx = self.tx.clone();

        self.runtime.spawn(async move {
            let outcome = match intent {
                Intent::Bootstrap => coordinator
                    .bootstrap()
                    .await
                    .map(|loaded| String::from(if loaded { "Loaded" } else { "Already loaded" })),
                Intent::Select(None) => return,
                Intent::Select(Some(employee)) => coordinator
                    .apply_selection(Some(&employee))
                    .await
                    .map(|()| format!("Showing {}", employee.full_name())),
                Intent::LoadMore => coordinator
                    .load_more()
                    .await
                    .map(|()| "Loaded more".to_string()),
                Intent::SetApproval {
                    transaction_id,
                    approved,
                } => {
                    let verb = if approved { "Approved" } else { "Unapproved" };
                    coordinator
                        .set_approval(&transaction_id, approved)
                        .await
                        .map(|()| format!("{verb} {transaction_id}"))
                }
            };

            let msg = match outcome {
                Ok(label) => ViewMsg::Done(label),
                Err(e) => {
                    warn!("intent failed: {e}");
                    ViewMsg::Error(e.to_string())
                }
            };
            // If the receiver is gone the UI has exited; nothing to report to.
            let _ = tx.send(msg);
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
