//! HTTP boundary adapter.
//!
//! # Responsibilities
//! - Turn non-success responses into errors
//! - Map reqwest failures onto `FaultCause`
//!
//! # Design Decisions
//! - Connection refusal is read from the io::Error in the source chain
//! - Any non-2xx response is an error; classification decides what is transient

use std::error::Error as StdError;
use std::io;

use reqwest::{RequestBuilder, Response, StatusCode};
use thiserror::Error;

use crate::resilience::fault::{Classify, FaultCause};

/// Failure of one HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status} for {url}")]
    Status { status: StatusCode, url: String },
}

impl Classify for HttpError {
    fn fault_cause(&self) -> FaultCause {
        match self {
            HttpError::Transport(e) => e.fault_cause(),
            HttpError::Status { status, .. } => FaultCause::HttpStatus(status.as_u16()),
        }
    }
}

impl Classify for reqwest::Error {
    fn fault_cause(&self) -> FaultCause {
        if is_connection_refused(self) {
            FaultCause::ConnectionRefused
        } else if let Some(status) = self.status() {
            FaultCause::HttpStatus(status.as_u16())
        } else {
            FaultCause::Other
        }
    }
}

fn is_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// Send a request, treating every non-2xx response as an error.
pub async fn send(request: RequestBuilder) -> Result<Response, HttpError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(HttpError::Status {
            status,
            url: response.url().to_string(),
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("connect failed")]
    struct Wrapper(#[source] io::Error);

    #[test]
    fn test_status_error_cause() {
        let err = HttpError::Status {
            status: StatusCode::BAD_GATEWAY,
            url: "http://localhost/".to_string(),
        };
        assert_eq!(err.fault_cause(), FaultCause::HttpStatus(502));
        assert_eq!(err.to_string(), "upstream returned 502 Bad Gateway for http://localhost/");
    }

    #[test]
    fn test_refusal_found_in_source_chain() {
        let wrapped = Wrapper(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(is_connection_refused(&wrapped));

        let other = Wrapper(io::Error::from(io::ErrorKind::TimedOut));
        assert!(!is_connection_refused(&other));
    }
}
