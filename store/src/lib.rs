//! On-disk state for a single verification attempt.
//!
//! A [`Session`] is the attempt's isolated workspace; the [`AuditLogger`]
//! collects check results while the attempt runs and writes one
//! [`SessionRecord`] into that workspace when it ends.

pub mod audit;
pub mod error;
pub mod record;
pub mod session;

pub use audit::AuditLogger;
pub use error::StoreError;
pub use record::{read_record, SessionRecord, RECORD_FILE_NAME};
pub use session::{ArtifactPaths, Session, SessionContext, SessionId};
