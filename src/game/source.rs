use std::{future::Future, time::Duration};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{framework, lookup::LookupProxy, towns::Town};

/// Somewhere a session can get a town's PM2.5 reading from.
///
/// Sources never fail: anything that goes wrong is a missing reading.
pub trait ReadingSource: Send + Sync {
    fn reading(&self, town: &'static Town) -> impl Future<Output = Option<f64>> + Send;
}

impl ReadingSource for LookupProxy {
    async fn reading(&self, town: &'static Town) -> Option<f64> {
        self.resolve_reading(Some(town.name)).await.pm25()
    }
}

/// Asks a running proxy over HTTP.
#[derive(Debug, Clone)]
pub struct ProxySource {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

#[derive(Deserialize)]
struct ProxyBody {
    #[serde(default)]
    pm25: Option<f64>,
}

impl ProxySource {
    const PATH: &'static str = "api/air";

    pub fn new(server_url: &url::Url, timeout: Duration) -> Result<Self, super::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = framework::base_url(server_url).join(Self::PATH)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    async fn fetch(&self, town: &Town) -> Result<Option<f64>, reqwest::Error> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("location", town.name)])
            .send()
            .await?;

        // the body is all that matters, whatever the status
        debug!(status = %response.status(), "proxy responded");
        let body: ProxyBody = response.json().await?;

        Ok(body.pm25)
    }
}

impl ReadingSource for ProxySource {
    #[tracing::instrument(skip_all, fields(town = town.name))]
    async fn reading(&self, town: &'static Town) -> Option<f64> {
        self.fetch(town).await.unwrap_or_else(|err| {
            warn!(%err, "couldn't get reading from proxy");
            None
        })
    }
}
