//! Database access layer. `init` holds pool/migration plumbing and the
//! shared `DbPool` alias; `sessions` is the per-user session record store.

pub mod init;
pub mod sessions;

pub use init::DbPool;
pub use sessions::{ChatState, Session, SessionStore};
