//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the pipeline uses
//! - **Outbound (Driven)**: Identity provider and signature record storage

pub mod inbound;
pub mod outbound;
