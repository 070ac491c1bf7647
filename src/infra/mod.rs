//! Infrastructure adapters: processes, SSH, files, and terminal prompts.
//!
//! Everything here implements a port from [`crate::application::ports`] or
//! supports one. Adapters are generic over [`CommandRunner`] so unit tests
//! can substitute canned process outputs.

pub mod ansible;
pub mod command_runner;
pub mod config;
pub mod inventory;
pub mod keys;
pub mod prompt;
pub mod ssh;

#[allow(unused_imports)]
pub use ansible::AnsiblePing;
#[allow(unused_imports)]
pub use command_runner::{CommandRunner, TokioCommandRunner};
#[allow(unused_imports)]
pub use inventory::InventoryFile;
#[allow(unused_imports)]
pub use keys::LocalKeyPair;
#[allow(unused_imports)]
pub use prompt::TerminalPrompts;
#[allow(unused_imports)]
pub use ssh::SshClient;
