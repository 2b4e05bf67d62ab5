//! nzbcheck — verify that every article referenced by an NZB is still
//! retrievable from one or more NNTP providers, without downloading any
//! payload.
//!
//! The core is a pool of concurrent NNTP sessions: each [`connection::Connection`]
//! negotiates its own transport (plain TCP or TLS), optionally authenticates,
//! then drains the shared [`queue::WorkQueue`] one `STAT` at a time. The
//! aggregator in [`checker`] tallies outcomes and finalizes once every
//! session has ended.

pub mod args;
pub mod checker;
pub mod config;
pub mod connection;
pub mod connection_error;
pub mod logging;
pub mod network;
pub mod nzb;
pub mod progress;
pub mod protocol;
pub mod queue;
pub mod stream;
pub mod tls;
pub mod types;

pub use checker::{run_check, CheckReport, CheckerOptions};
pub use config::{parse_server_spec, ServerProfile};
pub use connection_error::ConnectionError;
pub use types::MessageId;
