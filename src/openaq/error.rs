use reqwest::StatusCode;

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum OpenAqError {
    #[error("upstream responded with {0}")]
    #[event(level = WARN)]
    Status(StatusCode),

    #[error("upstream took too long: {0}")]
    #[event(level = WARN)]
    Timeout(reqwest::Error),

    #[error("request to upstream failed: {0}")]
    #[event(level = ERROR)]
    Request(reqwest::Error),

    #[error("upstream response didn't match the expected shape: {0}")]
    #[event(level = ERROR)]
    Parse(#[from] serde_json::Error),

    #[error("couldn't build upstream url: {0}")]
    #[event(level = ERROR)]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for OpenAqError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout(value)
        } else {
            Self::Request(value)
        }
    }
}

impl OpenAqError {
    /// The status the proxy should answer with when this error ends a lookup.
    ///
    /// Upstream statuses are passed through unchanged. A missed deadline is
    /// reported as a gateway timeout, and anything else collapses to 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Status(status) => *status,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Request(_) | Self::Parse(_) | Self::Url(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
