pub mod settings;

pub use settings::{Settings, DEFAULT_PIP_BINARIES};
