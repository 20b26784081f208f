//! # MyPrime back-office SDK
//!
//! Typed client for the MyPrime admin API.
//!
//! - **Session**: bearer tokens persisted across restarts, with single-flight
//!   refresh on 401 and a one-shot replay of the failed request
//! - **Notifications**: every failed call is reported once through a
//!   host-supplied [`Notifier`]
//! - **Idempotency**: money-moving mutations carry an `Idempotency-Key` that
//!   survives the refresh replay
//! - **Queries**: resource handles with a small stale-while-fresh cache and
//!   prefix invalidation after mutations
//! - **Transfer flow**: the amount → confirm → processing wizard as a state
//!   machine
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mp_sdk::{Client, Config, SessionContext};
//! use mp_sdk::dto::LoanQuery;
//!
//! #[tokio::main]
//! async fn main() -> mp_sdk::Result<()> {
//!     let client = Client::new(
//!         Config::new("https://api.myprime.ng"),
//!         SessionContext::in_memory(),
//!     )?;
//!
//!     client.auth().login("ops@myprime.ng", "secret").await?;
//!
//!     let page = client
//!         .loans()
//!         .list(&LoanQuery { page: Some(1), ..Default::default() })
//!         .await?;
//!     if let Some(label) = page.pagination.range_label() {
//!         println!("Showing {}", label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod idempotency;
pub mod notify;
pub mod resources;
pub mod session;
pub mod transfer_flow;

pub use cache::{QueryCache, QueryKey};
pub use client::{Attempt, Client};
pub use config::Config;
pub use error::{Error, Result};
pub use idempotency::{IdempotencyKey, IDEMPOTENCY_KEY_HEADER};
pub use notify::{CollectingNotifier, Notification, Notifier, TracingNotifier};
pub use session::{FileSessionStore, MemorySessionStore, SessionContext, SessionStore};
pub use transfer_flow::{FlowError, Step, TransferFlow};

pub use mp_common::{Page, PageMeta};
