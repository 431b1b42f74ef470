//! Replay engine for validating a running service against recordings

mod tester;
mod verify;

pub use tester::{Tester, DEFAULT_HOSTNAME, DEFAULT_PORT, DEFAULT_TARGET};
pub use verify::{status_and_body, ErrorCollector};
