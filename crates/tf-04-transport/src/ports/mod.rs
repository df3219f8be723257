//! # Ports Layer
//!
//! - **Inbound (Driving)**: `FilingTransport`, used by the status tracker
//! - **Outbound (Driven)**: `SoapChannel`, the raw HTTP exchange

pub mod inbound;
pub mod outbound;
