//! Command implementations

pub mod enroll;
pub mod version;
