//! # Pagecraft Common
//!
//! Collaborator interfaces shared by the editor and the CLI:
//!
//! - [`DocumentStore`]: collection/id addressed JSON documents
//! - [`LocalStore`]: device-local key-value strings for previews and backups
//! - [`UserId`]: opaque identity used for ownership checks
//!
//! Each interface ships with an in-memory implementation (tests) and a
//! file-backed one (CLI).

pub mod error;
pub mod identity;
pub mod local_storage;
pub mod result;
pub mod store;

pub use error::*;
pub use identity::*;
pub use local_storage::*;
pub use result::*;
pub use store::*;
