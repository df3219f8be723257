//! # Adapters Layer
//!
//! - `http`: `reqwest` implementation of `SoapChannel`

pub mod http;

pub use http::HttpSoapChannel;
