//! # Domain Layer
//!
//! Pure rendering logic with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod render;
pub mod schema;
pub mod xml;
