//! Page fetch: GET each URL concurrently and keep the body of every 200 response.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

use crate::capacity::CapacityPolicy;
use crate::utils::config::FETCH_TIMEOUT_SECS;
use crate::{ItemError, JobOpts, ResultSink, run_jobs_with};

/// Blocking client with the default per-request timeout.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build HTTP client")
}

/// GET `url` and return the body. Any status other than 200 is an error.
pub fn fetch_body(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if status != StatusCode::OK {
        bail!("status code other than 200: {}", status);
    }
    resp.text().with_context(|| format!("read body of {url}"))
}

/// Fetch every URL concurrently. Failed requests and non-200 responses land in the error log.
pub fn fetch_urls<C>(
    urls: Vec<String>,
    client: Client,
    capacity_policy: &C,
    opts: JobOpts,
) -> crate::Result<ResultSink<String>>
where
    C: CapacityPolicy + ?Sized,
{
    let processor = move |url: &String| -> Result<String, ItemError> {
        fetch_body(&client, url).map_err(ItemError::from)
    };
    run_jobs_with(urls, processor, capacity_policy, opts)
}
