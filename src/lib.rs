//! Authentication and session-revocation core for the snapvault API.
//!
//! Two credential kinds with distinct trust models share one signing layer:
//! session tokens are revocable through a Redis-backed ledger, API tokens
//! are revoked by deleting their stored entry on the identity record.

pub mod admin;
pub mod api_tokens;
pub mod auth;
pub mod configuration;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod middleware;
pub mod roles;
pub mod routes;
pub mod sessions;
pub mod startup;
pub mod telemetry;
pub mod validators;
