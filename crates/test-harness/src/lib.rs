//! Shared scenario helpers and assertions for the end-to-end suites.
//!
//! The integration tests in `tests/` drive the public engine surface the way
//! a host would: create simplices, pick face pairs, glue, retry, embed.

pub mod assertions;
pub mod helpers;

pub use assertions::{assert_audit_clean, assert_counts};
pub use helpers::{build_chain, build_glued_pair, first_timelike_facet, HarnessError};
