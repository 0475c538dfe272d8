#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static `AuthN` Plugin
//!
//! Registers a client that maps bearer tokens to identities taken from
//! configuration. Meant for development and end-to-end tests.
//!
//! ## Modes
//!
//! - **`accept_all`** (default): Accepts any non-empty token, returns the configured default identity.
//!
//! - **`static_tokens`**: Maps specific tokens to specific identities. Useful for E2E tests
//!   with distinct users.
//!
//! ## Configuration
//!
//! ```yaml
//! static_authn_plugin:
//!   priority: 90
//!   header_name: Authorization
//!   mode: static_tokens
//!   default_identity:
//!     namespace: user
//!     id: 1
//!     org_id: 1
//!     org_role: Admin
//!     login: admin
//!   tokens:
//!     - token: "e2e-viewer"
//!       identity:
//!         id: 2
//!         org_role: Viewer
//!         login: viewer
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use domain::{CLIENT_STATIC, Service};
pub use module::register;
