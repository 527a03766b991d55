//! Integration test suite for cargo-convoy
//!
//! Every test builds a real git repository in a tempdir and drives the
//! compiled binary end-to-end.

mod helpers;

mod test_cleanup;
mod test_plan;
