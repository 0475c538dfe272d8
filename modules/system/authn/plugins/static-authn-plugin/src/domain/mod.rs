mod client;
mod service;

pub use client::CLIENT_STATIC;
pub use service::Service;
