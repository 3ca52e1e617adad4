// netbind-api: Async Rust client for the remote network-management service.

pub mod auth;
pub mod client;
pub mod error;
pub mod extensions;
pub mod floating_ips;
pub mod models;
pub mod networks;
pub mod ports;
pub mod security_groups;
pub mod transport;

pub use auth::{AdminCredentials, AuthStrategy, IdentityClient, Token};
pub use client::NetworkClient;
pub use error::Error;
pub use models::*;
pub use transport::{TlsMode, TransportConfig};
