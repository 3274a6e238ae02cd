//! # schola-client
//!
//! The client-side state-synchronization layer: resource hooks binding
//! wallet and marketplace state to the reactive cache, the purchase
//! orchestrator with optimistic cache updates, administrator operations, the
//! transaction notice bus, and session wiring.
//!
//! Three sources of truth change independently underneath this crate — the
//! wallet extension (account/network events), the ledger (reads that can be
//! stale or in flight), and locally submitted transactions (whose effects
//! must show up before confirmation settles). The hooks reconcile them
//! through cache keys: provider events mutate or re-key entries, writes
//! mutate optimistically, and everything else is fetch-on-demand.
//!
//! ## Modules
//!
//! - [`hooks`] — account, network, owned/managed courses, wallet info, admin gate
//! - [`checkout`] — purchase/repurchase orchestration with busy markers
//! - [`admin`] — administrator desk: state transitions, search, verification, treasury
//! - [`notify`] — transaction notice bus (pending/confirmed/failed)
//! - [`price`] — ETH price peer cache
//! - [`config`] — TOML client configuration
//! - [`session`] — one-per-page-load wiring of the above

pub mod admin;
pub mod checkout;
pub mod config;
pub mod connection;
pub mod hooks;
pub mod notify;
pub mod price;
pub mod session;

pub use checkout::{Checkout, CheckoutError, PurchaseOrder};
pub use config::ClientConfig;
pub use connection::Connection;
pub use notify::{TxNotice, TxNotifier};
pub use session::{ClientSession, SessionHooks};
