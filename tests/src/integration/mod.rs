//! # Integration Tests
//!
//! Every flow goes through the same container the binary builds, with the
//! HTTP channel replaced by [`fixtures::ScriptedTransport`].

pub mod fixtures;
mod flows;
mod retries;
mod runtime;
