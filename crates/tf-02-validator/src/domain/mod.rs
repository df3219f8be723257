//! # Domain Layer
//!
//! The three validation passes. Each pass appends to the same report.

pub mod business;
pub mod entities;
pub mod schema_pass;
pub mod structural;
pub mod tree;
pub mod validate;
