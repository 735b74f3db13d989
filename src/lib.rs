//! Custos: authentication and session gateway.
//!
//! Issues and rotates short-lived bearer credentials, audits every login
//! attempt, and shields the login endpoint with escalating, time-boxed bans
//! keyed by client address. All cross-instance state (violation counters,
//! bans, revoked refresh ids) lives in a shared TTL-capable counter store.

pub mod api;
pub mod cli;
pub mod store;
pub mod token;
