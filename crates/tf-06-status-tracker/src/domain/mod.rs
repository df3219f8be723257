//! # Domain Layer
//!
//! The transition function, tracker errors and the per-declaration lock
//! registry.

pub mod errors;
pub mod locks;
pub mod machine;
