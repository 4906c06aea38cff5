//! Authentication models

pub mod session;

// Re-export for convenience
pub use session::{Credentials, Session, SessionStatus};
