//! Credential and session handlers.

pub mod ban;
pub mod check;
pub mod cookies;
pub mod csrf;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod login;
pub mod logout;
pub mod rate_limit;
pub mod refresh;
pub mod state;
pub mod types;
pub mod utils;

pub use check::check;
pub use csrf::csrf_gate;
pub use login::token;
pub use logout::logout;
pub use refresh::refresh;
pub use state::{AuthConfig, AuthState};
