use rpl_types::ErrorKind;

use crate::error::DispatchError;

/// Outcome of one invocation: a payload, or an error kind and message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Success { payload: Vec<u8> },
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self::Success { payload }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Error { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Error { kind, .. } => Some(*kind),
        }
    }
}

impl From<DispatchError> for Response {
    fn from(err: DispatchError) -> Self {
        Self::error(err.kind(), err.to_string())
    }
}

impl From<Result<Vec<u8>, DispatchError>> for Response {
    fn from(result: Result<Vec<u8>, DispatchError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => err.into(),
        }
    }
}
