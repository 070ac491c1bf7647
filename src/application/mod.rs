//! Application layer: ports and the services behind them.
//!
//! Imports `crate::domain` only. Infrastructure implements the ports;
//! commands wire everything together.

pub mod ports;
pub mod services;
