//! # Tax Filing Test Suite
//!
//! Cross-crate flows run against a fully wired container with a scripted
//! authority.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs   # scripted transport, ledger, receipts, harness
//!     ├── flows.rs      # file → poll → receipt
//!     ├── retries.rs    # classification, backoff, exhaustion, reset
//!     └── runtime.rs    # background tasks and shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tf-tests
//! cargo test -p tf-tests integration::retries::
//! cargo bench -p tf-tests
//! ```

pub mod integration;
