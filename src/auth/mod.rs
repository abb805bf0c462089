//! Admin authentication
//!
//! The post store never checks credentials itself. Callers hold an
//! [`Authorizer`] and ask it for an [`AdminSession`] before any mutation.

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{AdminSession, Authorizer, SessionGate};
