//! # Domain Layer
//!
//! Envelope construction, WS-Security, response parsing and status codes.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod response;
pub mod security;
