#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

//! Persistence backends and the desk controller for the servicedesk
//! tracker: a remote HTTP adapter for the support-requests API, a
//! seed-plus-snapshot local adapter, and the owned state that keeps the
//! in-memory collection reconciled with whichever backend configuration
//! selected.

pub mod backend;
pub mod config;
pub mod desk;
pub mod local;
pub mod remote;

pub use backend::{BackendError, MutationKind, RequestBackend};
pub use config::{BackendMode, ConfigError, DeskConfig};
pub use desk::{BootstrapReport, DeskError, SubmitOutcome, SupportDesk};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
