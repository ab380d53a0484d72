//! # Governance-Sync Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate scenarios
//!     ├── boosting.rs   # Stake → PreBoosted → Boosted, observed through the index
//!     ├── claim.rs      # Claiming twice on an executed proposal
//!     ├── decode.rs     # Malformed records inside list subscriptions
//!     └── indexation.rs # Absent-vs-found and cache behaviour
//! benches/
//! └── governance_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gs-tests
//! cargo test -p gs-tests integration::boosting
//! cargo bench -p gs-tests
//! ```

pub mod integration;
