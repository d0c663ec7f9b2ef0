use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ApiClientError {
    MissingServer,
    MissingKey,
    InvalidServer(url::ParseError),
    Reqwest(reqwest::Error),
}

impl fmt::Display for ApiClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiClientError::MissingServer => write!(f, "no server url was provided"),
            ApiClientError::MissingKey => write!(f, "no deploy key was provided"),
            ApiClientError::InvalidServer(_) => write!(f, "the provided server url is not valid"),
            ApiClientError::Reqwest(_) => write!(f, "failed to create the http client"),
        }
    }
}

impl Error for ApiClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiClientError::InvalidServer(v) => Some(v),
            ApiClientError::Reqwest(v) => Some(v),
            _ => None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("authentication error with the server")]
    Auth,

    #[error("server error {status}: {body}")]
    Server {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    StdIo(#[from] std::io::Error),
}
