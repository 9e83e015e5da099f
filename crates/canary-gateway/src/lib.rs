//! HTTP implementation of the orchestration gateway.
//!
//! Resource paths are `{base}/{project}/{collection}[/{id}]`, where `base` is the
//! projects collection URL (for example `https://rancher.local/v2-beta/projects`).
mod client;
pub use client::RancherGateway;

mod config;
pub use config::HttpConfig;

mod envelope;
