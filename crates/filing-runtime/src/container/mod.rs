//! # Filing Container
//!
//! Configuration and dependency injection for the pipeline components.
//!
//! - Components are initialized in dependency order
//! - Components talk to each other through ports and the event bus
//! - Adapters for keys, certificates and the HTTP channel are built from config

pub mod config;
pub mod services;

pub use config::{
    AuthorityConfig, ConfigError, Environment, FilingConfig, SchedulerConfig, SigningConfig,
    ValidationConfig, DEFAULT_SWEEP_INTERVAL,
};
pub use services::{ContainerError, FilingContainer};
