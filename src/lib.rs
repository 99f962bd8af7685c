//! txn-browser: browse card transactions, all at once or one employee at a
//! time.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ Intent ┌─────────────┐ spawn ┌────────────────┐
//! │ input.rs │ ─────► │ dispatch.rs │ ────► │ coordinator.rs │
//! └──────────┘        └─────────────┘       └────────────────┘
//!      ▲                     │ ViewMsg          │ snapshot()   │
//!      │                     ▼                  ▼              ▼
//!      │              ┌──────────┐  draw() ┌──────────┐  ┌──────────┐
//!      └───────────── │  app.rs  │ ──────► │  ui.rs   │  │  cache/  │
//!                     │ (state)  │         │ (render) │  └──────────┘
//!                     └──────────┘         └──────────┘       │
//!                                                        ┌──────────┐
//!                                                        │ source/  │
//!                                                        └──────────┘
//! ```
//!
//! * **`source`**: the `TransactionApi` trait, the data model and the HTTP and
//!   fixture providers.
//! * **`cache`**: `DataSource` and the paginated, per-employee and directory
//!   caches built on it.
//! * **`coordinator`**: decides which cache is authoritative and derives the
//!   displayed result.
//! * **`dispatch`**: runs intents on the tokio runtime and reports outcomes.
//! * **`app`**: owns UI state (snapshot, highlight, picker).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations and intents.
//! * **`config`**: command-line flags layered over an optional YAML file.

pub mod app;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod source;
pub mod ui;
