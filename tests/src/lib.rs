//! # Market Network Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Cross-node flows over a shared in-memory overlay
//! └── benches/           # Verification and sealing benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p market-tests
//!
//! # Benchmarks
//! cargo bench -p market-tests
//! ```

pub mod integration;
