//! # Domain Layer
//!
//! Canonicalisation, fragment embedding, certificate parsing and trust rules.

pub mod canonical;
pub mod certificate;
pub mod entities;
pub mod errors;
pub mod trust;
