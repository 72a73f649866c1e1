//! Resolves a town name to its latest PM2.5 reading.
//!
//! The lookup runs strictly in order and stops at the first failure:
//! validate the name, find monitoring sites near the town, pick the first
//! PM2.5 sensor among them, then fetch that sensor's newest measurement.
//! Nothing is retried and nothing is cached between lookups.

use thisslime::TracingError as _;
use tracing::{debug, info};

use crate::{
    openaq::{self, OpenAq},
    towns::Town,
};

mod error;
pub use error::{LookupError, MissingParameterError, NotFoundError, UnknownLocationError};

mod reading;
pub use reading::{ReadingBody, SensorReading};

type Result<T, E = LookupError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct LookupProxy {
    openaq: OpenAq,
}

impl LookupProxy {
    pub fn new(openaq: OpenAq) -> Self {
        Self { openaq }
    }

    pub fn upstream(&self) -> &reqwest::Url {
        self.openaq.base_url()
    }

    /// Never fails: every error is folded into the reading's status,
    /// with `pm25` left empty.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_reading(&self, location: Option<&str>) -> SensorReading {
        let result = self.try_resolve(location).await;

        match result {
            Ok(pm25) => info!(?pm25, "resolved reading"),
            Err(ref err) => err.trace(),
        }

        let reading = SensorReading::from(result);
        debug!(status = %reading.status());
        reading
    }

    async fn try_resolve(&self, location: Option<&str>) -> Result<Option<f64>> {
        let name = location
            .filter(|name| !name.is_empty())
            .ok_or_else(LookupError::missing_location)?;

        let town = Town::find(name).ok_or_else(|| LookupError::unknown_location(name))?;

        let locations = self.openaq.locations(town.coordinates).await?;

        if locations.is_empty() {
            return Err(LookupError::not_found(name, "monitoring location"));
        }

        let sensor = openaq::select_pm25_sensor(&locations)
            .ok_or_else(|| LookupError::not_found(name, "pm25 sensor"))?;

        debug!(sensor.id = %sensor.id, "selected sensor");

        let measurement = self.openaq.latest_measurement(sensor.id).await?;

        Ok(measurement.and_then(|measurement| measurement.value))
    }
}
