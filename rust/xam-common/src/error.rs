use thiserror::Error;

/// Host-side error.
///
/// These never cross into the guest directly: export functions classify them
/// into an [`XResult`](crate::XResult) or [`XStatus`](crate::XStatus) before
/// returning.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn access_violation(address: u32, len: usize) -> Error {
        Error(ErrorKind::AccessViolation { address, len }.into())
    }

    pub fn out_of_memory(requested: u32) -> Error {
        Error(ErrorKind::OutOfMemory { requested }.into())
    }

    pub fn config(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Config {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn parse<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Parse {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("guest access violation at {address:#010X} (len {len})")]
    AccessViolation { address: u32, len: usize },

    #[error("guest heap exhausted (requested {requested:#X} bytes)")]
    OutOfMemory { requested: u32 },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("parse error: {context}")]
    Parse {
        context: String,
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
