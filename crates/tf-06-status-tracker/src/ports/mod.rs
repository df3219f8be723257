//! # Ports Layer
//!
//! - `inbound`: the tracker API used by the pipeline and operators
//! - `outbound`: persistence and time

pub mod inbound;
pub mod outbound;
