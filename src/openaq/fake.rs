//! A local stand-in for the upstream provider, for tests.

use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex},
    time::Duration,
};

use warp::{http::StatusCode, Filter, Reply};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Locations {
        query: HashMap<String, String>,
        api_key: Option<String>,
    },
    Measurements {
        sensor: u64,
        query: HashMap<String, String>,
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

impl Canned {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("should be a valid status code"),
            body: body.into(),
        }
    }

    async fn reply(self, delay: Option<Duration>) -> Result<impl Reply, Infallible> {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(warp::reply::with_status(
            warp::reply::with_header(self.body, "content-type", "application/json"),
            self.status,
        ))
    }
}

type Calls = Arc<Mutex<Vec<Call>>>;

#[derive(Debug, Clone)]
pub struct FakeOpenAq {
    locations: Canned,
    measurements: Canned,
    delay: Option<Duration>,
}

impl FakeOpenAq {
    pub fn new() -> Self {
        Self {
            locations: Canned::new(200, r#"{"results": []}"#),
            measurements: Canned::new(200, r#"{"results": []}"#),
            delay: None,
        }
    }

    pub fn locations(mut self, status: u16, body: impl Into<String>) -> Self {
        self.locations = Canned::new(status, body);
        self
    }

    pub fn measurements(mut self, status: u16, body: impl Into<String>) -> Self {
        self.measurements = Canned::new(status, body);
        self
    }

    /// Holds every response back for `delay`.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serves on an ephemeral localhost port. Must be called inside a tokio runtime.
    pub fn spawn(self) -> RunningOpenAq {
        let calls = Calls::default();
        let delay = self.delay;

        let locations = {
            let calls = calls.clone();
            let canned = self.locations;

            warp::path!("v3" / "locations")
                .and(warp::query::<HashMap<String, String>>())
                .and(warp::header::optional::<String>("x-api-key"))
                .and_then(move |query, api_key| {
                    calls
                        .lock()
                        .expect("calls lock should not be poisoned")
                        .push(Call::Locations { query, api_key });
                    canned.clone().reply(delay)
                })
        };

        let measurements = {
            let calls = calls.clone();
            let canned = self.measurements;

            warp::path!("v3" / "sensors" / u64 / "measurements")
                .and(warp::query::<HashMap<String, String>>())
                .and(warp::header::optional::<String>("x-api-key"))
                .and_then(move |sensor, query, api_key| {
                    calls
                        .lock()
                        .expect("calls lock should not be poisoned")
                        .push(Call::Measurements {
                            sensor,
                            query,
                            api_key,
                        });
                    canned.clone().reply(delay)
                })
        };

        let (addr, server) =
            warp::serve(locations.or(measurements)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        RunningOpenAq {
            base_url: reqwest::Url::parse(&format!("http://{addr}/"))
                .expect("local address should be a valid url"),
            calls,
        }
    }
}

pub struct RunningOpenAq {
    pub base_url: reqwest::Url,
    calls: Calls,
}

impl RunningOpenAq {
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .expect("calls lock should not be poisoned")
            .clone()
    }

    /// Sensor ids of every measurements call, in order.
    pub fn measured_sensors(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Measurements { sensor, .. } => Some(sensor),
                Call::Locations { .. } => None,
            })
            .collect()
    }
}
