//! Failover client, its configuration and the auth hook seam

pub mod auth;
pub mod config;
pub mod failover;

pub use auth::{AuthHook, BearerAuth};
pub use config::{ClientConfig, Scheme, TargetConfig, DEFAULT_ATTEMPT_TIMEOUT};
pub use failover::FailoverClient;
