//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the pipeline uses

pub mod inbound;
