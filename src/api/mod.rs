pub mod mastodon;

use std::sync::Arc;

use log::{debug, log_enabled, trace};
use reqwest::{header, Client};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Semaphore, SemaphorePermit};
use url::Url;

use crate::error::{Error, Result, UpstreamCause};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Requests allowed in flight at once.
    pub concurrency: usize,
    /// Retries for transient failures. Zero sends every request once.
    pub retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            retries: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ClientWithMiddleware,
    semaphore: Arc<Semaphore>,
}

impl ApiClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Client)?;

        let mut builder = ClientBuilder::new(client);
        if options.retries > 0 {
            let retry_policy =
                ExponentialBackoff::builder().build_with_max_retries(options.retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            client: builder.build(),
            semaphore: Arc::new(Semaphore::new(options.concurrency.max(1))),
        })
    }

    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        // the semaphore is never closed
        self.semaphore.acquire().await.ok()
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let _permit = self.permit().await;

        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::upstream(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::upstream(&url, UpstreamCause::Status(status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(&url, UpstreamCause::Body(e)))?;

        if log_enabled!(log::Level::Trace) {
            if let Ok(value) = serde_json::from_str::<Value>(&body) {
                trace!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
        }

        serde_json::from_str(&body).map_err(|e| Error::upstream(&url, UpstreamCause::Decode(e)))
    }
}
