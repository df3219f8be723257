//! # Domain Layer
//!
//! Failure categories, the transport-error mapping and the retry policy.

pub mod category;
pub mod classify;
pub mod policy;
