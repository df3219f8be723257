//! # Domain Layer

pub mod entities;
pub mod errors;
pub mod parse;
pub mod rules;
