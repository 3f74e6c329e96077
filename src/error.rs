use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Coarse classification used to decide how an error surfaces to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad version, service or command. Answered with 400 before any body.
    Protocol,
    /// Malformed pkt-line input. Answered with 400 before any body.
    Framing,
    /// The response stream broke after it started. Only logged.
    Transport,
    /// A single packet was too large to encode.
    PayloadTooLarge,
    /// Startup and configuration failures.
    Setup,
}

#[derive(Debug, Error)]
pub enum GitInnerError {
    #[error("unsupported protocol: {0:?}")]
    UnsupportedProtocol(String),
    #[error("unsupported service: {0:?}")]
    UnsupportedService(String),
    #[error("request has no command")]
    MissingCommand,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    #[error("malformed pkt-line length")]
    MalformedLength,
    #[error("unexpected end of pkt-line stream")]
    UnexpectedEof,
    #[error("pkt-line is not valid utf-8")]
    InvalidUtf8,

    #[error("payload of {0} bytes exceeds the pkt-line limit")]
    PayloadTooLarge(usize),

    #[error("response channel closed")]
    ChannelClosed,
    #[error("request deadline exceeded")]
    Cancelled,
    #[error("payload producer failed: {0}")]
    Producer(String),

    #[error("invalid sha1 string")]
    InvalidSha1String,
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitInnerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            GitInnerError::UnsupportedProtocol(_)
            | GitInnerError::UnsupportedService(_)
            | GitInnerError::MissingCommand
            | GitInnerError::UnknownCommand(_)
            | GitInnerError::InvalidState(_) => ErrorClass::Protocol,
            GitInnerError::MalformedLength
            | GitInnerError::UnexpectedEof
            | GitInnerError::InvalidUtf8 => ErrorClass::Framing,
            GitInnerError::ChannelClosed
            | GitInnerError::Cancelled
            | GitInnerError::Producer(_) => ErrorClass::Transport,
            GitInnerError::PayloadTooLarge(_) => ErrorClass::PayloadTooLarge,
            GitInnerError::InvalidSha1String
            | GitInnerError::Config(_)
            | GitInnerError::Io(_) => ErrorClass::Setup,
        }
    }
}

impl ResponseError for GitInnerError {
    fn status_code(&self) -> StatusCode {
        match self.class() {
            ErrorClass::Protocol | ErrorClass::Framing => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Git clients only look at the status; the body stays empty.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).finish()
    }
}
