//! Domain layer: pure types and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod account;
pub mod config;
pub mod error;
pub mod host;
pub mod pubkey;
pub mod registry;
pub mod session;
pub mod stage;

#[allow(unused_imports)]
pub use config::{DEFAULT_INVENTORY_PATH, MusterConfig, validate_config};
#[allow(unused_imports)]
pub use error::EnrollError;
#[allow(unused_imports)]
pub use host::{RemoteAccount, TargetHost, parse_target_spec};
#[allow(unused_imports)]
pub use session::{Compensation, EnrollSession, SudoCapability, SudoSecret, Warning, WarningKind};
#[allow(unused_imports)]
pub use stage::EnrollStage;
