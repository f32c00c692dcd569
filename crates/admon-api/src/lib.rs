// admon-api: Async Rust client for the cluster admon HTTP+XML service

pub mod client;
pub mod error;
pub mod logs;
pub mod nodes;
pub mod request;
pub mod transport;
pub mod xml;

pub use client::AdmonClient;
pub use error::Error;
pub use logs::LogService;
pub use nodes::{NodeCategory, NodeListOptions};
pub use request::XmlRequest;
pub use transport::TransportConfig;
pub use xml::{Row, XmlDocument};
