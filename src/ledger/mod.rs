//! Version-controlled release ledger

pub mod storage;

pub use storage::{LedgerStorage, RELEASE_INFO_FILE};
