//! HTTP front of the lookup proxy.
//!
//! - `GET /api/air?location=<town>` (also served as `/resolve`) answers
//!   with `{"pm25": <number or null>}`, or `{"error": ...}` for bad input
//! - `GET /api/towns` lists the known towns by region

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thisslime::TracingError;
use tracing::{error, info};
use warp::{Filter, Rejection, Reply};

use crate::{
    framework::Config,
    lookup::LookupProxy,
    openaq::{self, OpenAq},
    towns::Region,
};

#[derive(Debug, thiserror::Error, TracingError)]
#[span]
pub enum Error {
    #[error("couldn't bind server: {0}")]
    #[event(level = ERROR)]
    Bind(warp::Error),

    #[error(transparent)]
    Client(#[from] openaq::Error),
}

#[derive(Debug, Deserialize)]
struct AirQuery {
    location: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RegionTowns {
    region: Region,
    towns: Vec<&'static str>,
}

impl RegionTowns {
    pub fn all() -> Vec<Self> {
        Region::ALL
            .into_iter()
            .map(|region| Self {
                region,
                towns: region.towns().map(|town| town.name).collect(),
            })
            .collect()
    }
}

async fn air(query: AirQuery, proxy: LookupProxy) -> Result<impl Reply, Infallible> {
    let reading = proxy.resolve_reading(query.location.as_deref()).await;

    Ok(warp::reply::with_status(
        warp::reply::json(reading.body()),
        reading.status(),
    ))
}

pub fn routes(
    proxy: LookupProxy,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_proxy = warp::any().map(move || proxy.clone());

    let air = warp::get()
        .and(warp::path!("api" / "air").or(warp::path!("resolve")).unify())
        .and(warp::query::<AirQuery>())
        .and(with_proxy)
        .and_then(air);

    let towns = warp::get()
        .and(warp::path!("api" / "towns"))
        .map(|| warp::reply::json(&RegionTowns::all()));

    air.or(towns)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            error!(%err, "couldn't listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}

/// Serves until ctrl-c.
#[tracing::instrument(skip_all, name = "server")]
pub async fn serve(config: &Config) -> Result<(), Error> {
    let proxy = LookupProxy::new(OpenAq::new(&config.openaq)?);
    info!(upstream = %proxy.upstream(), "using upstream");

    let (address, server) = warp::serve(routes(proxy).with(warp::trace::request()))
        .try_bind_with_graceful_shutdown(config.server.address, shutdown_signal())
        .map_err(Error::Bind)?;

    info!(%address, "listening");
    server.await;

    Ok(())
}
