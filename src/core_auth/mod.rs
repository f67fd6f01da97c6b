pub mod core_auth;
pub mod handshake;

pub use core_auth::LoginAttempt;
pub use handshake::{authenticate, AuthOutcome};
