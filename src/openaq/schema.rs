//! Response shapes for the two upstream calls.
//!
//! Only the fields the proxy reads are modelled; everything else in the
//! upstream payload is ignored.

use std::fmt::Display;

use serde::Deserialize;

/// The parameter name upstream uses for PM2.5 sensors.
pub const PM25: &str = "pm25";

/// One page of results. A missing or `null` results array counts as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Option::default")]
    results: Option<Vec<T>>,
}

impl<T> Page<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results.unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SensorId(u64);

impl SensorId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A monitoring site.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde(default)]
    sensors: Option<Vec<Sensor>>,
}

impl Location {
    pub fn sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter().flatten()
    }

    /// The first PM2.5 sensor at this location, in upstream order.
    pub fn pm25_sensor(&self) -> Option<&Sensor> {
        self.sensors().find(|sensor| sensor.measures(PM25))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    #[serde(default)]
    parameter: Option<Parameter>,
}

impl Sensor {
    pub fn parameter_name(&self) -> Option<&str> {
        self.parameter.as_ref()?.name.as_deref()
    }

    pub fn measures(&self, parameter: &str) -> bool {
        self.parameter_name() == Some(parameter)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Parameter {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Measurement {
    #[serde(default)]
    pub value: Option<f64>,
}

/// Scans locations in the order given and returns the first PM2.5 sensor.
///
/// This is first-match, not nearest or most recent: upstream ordering decides.
pub fn select_pm25_sensor(locations: &[Location]) -> Option<&Sensor> {
    locations.iter().find_map(Location::pm25_sensor)
}
