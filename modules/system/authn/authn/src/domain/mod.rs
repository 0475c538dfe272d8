//! Domain layer for the `AuthN` module.

pub mod local_client;
pub mod network;
pub mod org;
pub mod queue;
pub mod registry;
pub mod service;

pub use local_client::AuthNLocalClient;
pub use registry::ClientRegistry;
pub use service::Service;
