use std::{error, fmt, io, time::Duration};

#[derive(Debug)]
pub enum Error {
    UnexpectedResponse,
    Timeout(Duration),
    WebApiError(String),
    ActorError(String),
    ConfigError(String),
    JsonError(Box<dyn error::Error + Send + Sync>),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedResponse => write!(f, "Unknown server response"),
            Self::Timeout(after) => write!(f, "Request timed out after {after:?}"),
            Self::WebApiError(err) | Self::ActorError(err) | Self::ConfigError(err) => {
                f.write_str(err)
            }
            Self::JsonError(err) => err.fmt(f),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonError(Box::new(err))
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Error {
        Error::WebApiError(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::WebApiError(err.to_string())
    }
}
