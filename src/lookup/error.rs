use reqwest::StatusCode;
use thisslime::TracingError;

use crate::openaq;

/// Everything that can end a lookup early.
#[derive(Debug, thiserror::Error, TracingError)]
#[span]
pub enum LookupError {
    #[error(transparent)]
    MissingParameter(MissingParameterError),

    #[error(transparent)]
    UnknownLocation(UnknownLocationError),

    #[error(transparent)]
    NotFound(NotFoundError),

    #[error("upstream lookup failed: {0}")]
    Upstream(#[from] openaq::Error),
}

impl LookupError {
    pub(super) fn missing_location() -> Self {
        Self::MissingParameter(MissingParameterError {
            parameter: "location",
        })
    }

    pub(super) fn unknown_location(location: &str) -> Self {
        Self::UnknownLocation(UnknownLocationError {
            location: location.to_owned(),
        })
    }

    pub(super) fn not_found(location: &str, missing: &'static str) -> Self {
        Self::NotFound(NotFoundError {
            location: location.to_owned(),
            missing,
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::UnknownLocation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(err) => err.status(),
        }
    }

    /// The message shown to callers for invalid input. Other failures
    /// are reported with a bare `null` reading and no detail.
    pub fn public_message(&self) -> Option<&'static str> {
        match self {
            Self::MissingParameter(_) => Some("Missing location"),
            Self::UnknownLocation(_) => Some("Unknown location"),
            Self::NotFound(_) | Self::Upstream(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error, TracingError)]
#[error("missing parameter `{parameter}`")]
#[event(level = INFO)]
pub struct MissingParameterError {
    parameter: &'static str,
}

#[derive(Debug, thiserror::Error, TracingError)]
#[error("{location} is not a known location")]
#[event(level = INFO)]
pub struct UnknownLocationError {
    location: String,
}

#[derive(Debug, thiserror::Error, TracingError)]
#[error("no {missing} found near {location}")]
#[event(level = WARN)]
pub struct NotFoundError {
    location: String,
    missing: &'static str,
}
