//! Client for the upstream air-quality provider ([OpenAQ](https://docs.openaq.org/)).
//!
//! Two calls are used:
//! - `/v3/locations` finds monitoring sites near a point,
//!   filtered to sites with a PM2.5 sensor
//! - `/v3/sensors/{id}/measurements` returns a sensor's readings,
//!   which we ask for newest-first, one at a time

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    framework::{self, config::OpenAqConfig},
    towns::Coordinates,
};

mod error;
pub use error::OpenAqError as Error;

mod schema;
pub use schema::{select_pm25_sensor, Location, Measurement, Sensor, SensorId, PM25};
use schema::Page;

#[cfg(test)]
pub(crate) mod fake;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct OpenAq {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_key_var: String,
    radius_meters: u32,
    limit: u32,
    pm25_parameter_id: u32,
}

impl OpenAq {
    const API_KEY_HEADER: &'static str = "x-api-key";
    const LOCATIONS_PATH: &'static str = "v3/locations";

    pub fn new(config: &OpenAqConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: framework::base_url(&config.base_url),
            api_key_var: config.api_key_var.clone(),
            radius_meters: config.radius_meters,
            limit: config.limit,
            pm25_parameter_id: config.pm25_parameter_id,
        })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    /// Read from the environment on every request. A missing key is sent empty.
    fn api_key(&self) -> String {
        std::env::var(&self.api_key_var).unwrap_or_default()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.base_url.join(path)?;

        let response = self
            .client
            .get(url)
            .query(query)
            .header(Self::API_KEY_HEADER, self.api_key())
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "upstream responded");

        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Monitoring sites with a PM2.5 sensor near `coordinates`, in upstream order.
    #[tracing::instrument(skip_all, fields(%coordinates))]
    pub async fn locations(&self, coordinates: Coordinates) -> Result<Vec<Location>> {
        let query = [
            ("coordinates", coordinates.to_string()),
            ("radius", self.radius_meters.to_string()),
            ("limit", self.limit.to_string()),
            ("parameters_id", self.pm25_parameter_id.to_string()),
        ];

        let locations = self
            .get::<Page<Location>>(Self::LOCATIONS_PATH, &query)
            .await?
            .into_results();

        debug!(found = locations.len());

        Ok(locations)
    }

    /// The newest measurement for a sensor, if it has any.
    #[tracing::instrument(skip_all, fields(%sensor))]
    pub async fn latest_measurement(&self, sensor: SensorId) -> Result<Option<Measurement>> {
        let query = [
            ("limit", "1".to_owned()),
            ("order_by", "datetime".to_owned()),
            ("sort", "desc".to_owned()),
        ];

        let measurement = self
            .get::<Page<Measurement>>(&format!("v3/sensors/{sensor}/measurements"), &query)
            .await?
            .into_results()
            .into_iter()
            .next();

        debug!(value = ?measurement.as_ref().and_then(|m| m.value));

        Ok(measurement)
    }
}
