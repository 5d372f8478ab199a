//! Authorization and validation gate in front of privileged directory runbooks.
//!
//! A bearer credential is turned into a [`services::auth::Principal`], checked
//! against the per-operation role table, and the request parameters are
//! validated before a [`services::authz::ValidatedJob`] is handed to the job
//! orchestrator. Every decision is written to the audit sink.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
