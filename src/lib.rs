// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # relay-doctor
//!
//! A diagnostic TUI and library for monitoring an HL7 order/report relay.
//!
//! This crate watches a relay backend over its monitoring HTTP API: it
//! polls aggregate delivery statistics, the backend health check, and the
//! dead-letter queue of failed messages, and it lets an operator filter the
//! queue and requeue individual messages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (models) │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ events / commands                                   │
//! │       ▼                                                     │
//! │  ┌─────────┐        ┌─────────┐                             │
//! │  │ poller  │───────▶│   api   │───▶ relay backend (HTTP)    │
//! │  │ (task)  │        │ (client)│                             │
//! │  └─────────┘        └─────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Dashboard state, filtering and user interaction logic
//! - **[`api`]**: HTTP client for the backend's four monitoring endpoints
//! - **[`poller`]**: Background refresh loop and retry dispatch; talks to
//!   the UI thread over channels
//! - **[`data`]**: View-model types - message snapshot, stats, the filter
//!   engine, and health classification
//! - **[`ui`]**: Terminal rendering using ratatui - DLQ table, detail
//!   overlay, status banner, theme support
//! - **[`settings`]**: Layered runtime settings (defaults, file,
//!   environment, CLI)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a relay backend
//! relay-doctor --endpoint http://localhost:8080
//!
//! # One-shot snapshot export
//! relay-doctor --endpoint http://localhost:8080 --export snapshot.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::time::Duration;
//! use relay_doctor::{ApiClient, App, Poller};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rt = tokio::runtime::Runtime::new()?;
//! let _guard = rt.enter();
//!
//! let client = ApiClient::builder()
//!     .endpoint("http://localhost:8080")
//!     .build()?;
//! let (handle, events) = Poller::spawn(client, Duration::from_secs(5));
//! let app = App::new(handle, events);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod app;
pub mod data;
pub mod events;
pub mod poller;
pub mod settings;
pub mod ui;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, BackendError, MessagesBody};
pub use app::{App, FilterField};
pub use data::{
    filter_messages, DeliveryStatus, Direction, FilterCriteria, HealthBody, HealthCheck,
    Hl7Message, RelayStats, SystemStatus,
};
pub use poller::{DashboardEvent, Poller, PollerCommand, PollerHandle, RefreshStep};
pub use settings::{Overrides, Settings};
