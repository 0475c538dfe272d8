//! `AuthN` Module
//!
//! Picks the authentication client that applies to a request, runs it,
//! and passes the resulting identity through the post-auth hook chain.
//! Login additionally issues a session token.
//!
//! Consumers obtain an `Arc<dyn AuthNService>` from [`module::provide_api`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod clients;
pub mod config;
pub mod domain;
pub mod module;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use config::AuthNConfig;
pub use domain::{AuthNLocalClient, Service};
pub use module::{Dependencies, provide_api, provide_service};
