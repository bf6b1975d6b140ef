use std::fmt;

#[derive(Debug)]
pub enum PipError {
    /// A requirements reference could not be fetched into the local cache.
    UnresolvedRequirements {
        source: String,
        reason: Option<String>,
    },
    NonZeroExit {
        command: String,
        retcode: i32,
        output: String,
    },
    PipNotFound {
        bin_env: Option<String>,
    },
    InvalidArgument {
        argument: String,
        message: String,
    },
    Execution {
        command: String,
        source: anyhow::Error,
    },
}

impl PipError {
    pub fn unresolved_requirements(source: impl Into<String>, reason: Option<String>) -> Self {
        Self::UnresolvedRequirements {
            source: source.into(),
            reason,
        }
    }

    pub fn non_zero_exit(
        command: impl Into<String>,
        retcode: i32,
        output: impl Into<String>,
    ) -> Self {
        Self::NonZeroExit {
            command: command.into(),
            retcode,
            output: output.into(),
        }
    }

    pub fn pip_not_found(bin_env: Option<String>) -> Self {
        Self::PipNotFound { bin_env }
    }

    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn execution(command: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Execution {
            command: command.into(),
            source,
        }
    }

    /// Text placed in the `comment` of a failed outcome.
    ///
    /// For a non-zero exit this is the raw process output so callers see what
    /// pip printed, not a wrapped message.
    pub fn comment(&self) -> String {
        match self {
            Self::NonZeroExit { output, .. } => output.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for PipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedRequirements { source, .. } => write!(f, "{source} not found"),
            Self::NonZeroExit {
                command, retcode, ..
            } => write!(f, "Command '{command}' exited with status {retcode}"),
            Self::PipNotFound { bin_env: Some(env) } => {
                write!(f, "Could not find a pip binary in {env}")
            }
            Self::PipNotFound { bin_env: None } => {
                write!(f, "Could not find a pip binary on PATH")
            }
            Self::InvalidArgument { argument, message } => {
                write!(f, "Invalid value for {argument}: {message}")
            }
            Self::Execution { command, source } => {
                write!(f, "Failed to execute '{command}': {source}")
            }
        }
    }
}

impl std::error::Error for PipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Execution { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipError>;
