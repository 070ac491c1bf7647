//! Unit tests for the muster CLI
//!
//! These tests drive the enrollment pipeline with scripted doubles and run
//! fast without touching the network.

mod dry_run;
mod mocks;
mod privilege_gate;
mod rollback;
