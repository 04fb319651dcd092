//! Platform API client.
//!
//! Async HTTP client using `reqwest` with Bearer token authentication. It
//! implements the deploy collaborator traits so a
//! [`staticship_deploy::DeployContext`] can be built from one client.

mod client;
pub mod types;

pub use client::{Client, DEFAULT_BASE_URL, Error};
