//! `AuthN` SDK
//!
//! This crate provides the public API for the `authn` module:
//!
//! - [`AuthNService`] - Public API trait for consumers
//! - [`AuthNClient`], [`ContextAwareClient`], [`RedirectClient`] - Client (strategy) traits
//! - [`PostAuthHook`], [`PostLoginHook`] - Hook traits
//! - [`Identity`], [`NamespacedId`] - Authentication result models
//! - [`Request`] - Request wrapper consumed by clients and hooks
//! - [`AuthNError`] - Error types
//! - [`ports`] - Collaborators used by the built-in clients and hooks
//!
//! ## Usage
//!
//! ```ignore
//! use authn_sdk::{AuthNService, Request};
//!
//! let mut req = Request::new(http_request).with_remote_addr(peer.to_string());
//! let identity = authn.authenticate(&mut req).await?;
//! println!("authenticated {}", identity.id());
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod client;
pub mod error;
pub mod hooks;
pub mod models;
pub mod ports;
pub mod request;

// Re-export main types at crate root
pub use api::AuthNService;
pub use client::{AuthNClient, ContextAwareClient, CredentialBackend, RedirectClient};
pub use error::AuthNError;
pub use hooks::{PostAuthHook, PostLoginHook};
pub use models::{
    ClientParams, Identity, IdentityBuilder, Namespace, NamespacedId, OrgRole,
    ParseNamespacedIdError, UserToken,
};
pub use request::Request;
