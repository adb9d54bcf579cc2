//! Shared pieces of the guidellm-auth binaries.
//!
//! `guidellm-auth` and `discover-models` resolve the same configuration and
//! install the same tracing stack; the launcher's target check lives here
//! too.

pub mod config;
pub mod observability;
pub mod preflight;
