#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

//! Domain core for the servicedesk request tracker: the record model, input
//! validation, the in-memory store, the single-slot edit session, and the
//! search/filter projections. No I/O happens in this crate.

pub mod category;
pub mod query;
pub mod record;
pub mod session;
pub mod store;
pub mod validate;

pub use category::{Category, CategoryValue, title_for};
pub use query::{filter_by_category, search};
pub use record::{RecordId, SupportRequest};
pub use session::{EditSession, EditSessionError, RequestCommit};
pub use store::RequestStore;
pub use validate::{RequestFields, RequestInput, ValidationError, validate};
