pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod pip;
pub mod runner;
pub mod system;

pub use error::PipError;
pub use pip::{InstallOutcome, InstallRequest, Pip, UninstallRequest};
pub use runner::Platform;
