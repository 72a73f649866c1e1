use reqwest::StatusCode;
use serde::Serialize;

use super::LookupError;

/// What the proxy sends back: `{"pm25": ...}`, or `{"error": ...}` for bad input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingBody {
    Reading { pm25: Option<f64> },
    Error { error: &'static str },
}

/// The outcome of one lookup. Built fresh per request and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    status: StatusCode,
    body: ReadingBody,
}

impl SensorReading {
    pub fn new(status: StatusCode, pm25: Option<f64>) -> Self {
        Self {
            status,
            body: ReadingBody::Reading { pm25 },
        }
    }

    pub fn ok(pm25: Option<f64>) -> Self {
        Self::new(StatusCode::OK, pm25)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ReadingBody {
        &self.body
    }

    /// PM2.5 in µg/m³, exactly as upstream reported it.
    pub fn pm25(&self) -> Option<f64> {
        match self.body {
            ReadingBody::Reading { pm25 } => pm25,
            ReadingBody::Error { .. } => None,
        }
    }
}

impl From<Result<Option<f64>, LookupError>> for SensorReading {
    fn from(value: Result<Option<f64>, LookupError>) -> Self {
        match value {
            Ok(pm25) => Self::ok(pm25),
            Err(err) => {
                let status = err.status();
                match err.public_message() {
                    Some(error) => Self {
                        status,
                        body: ReadingBody::Error { error },
                    },
                    None => Self::new(status, None),
                }
            }
        }
    }
}
