pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod helper;
pub mod mounts;
pub mod options;
pub mod orchestrate;
pub mod report;
pub mod resolve;
pub mod targets;

pub use config::{Config, HostEntry};
pub use context::ContextEnv;
pub use error::Error;
pub use helper::{MountHelper, Sshfs};
pub use mounts::{MountTable, SystemMountTable};
pub use orchestrate::{Orchestrator, Report, Status};
pub use targets::{Mode, Targets};
