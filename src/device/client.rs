// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{anyhow, bail, Context as _};
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Request, Response, Uri};
use tracing::{debug, instrument};

use std::time::Duration;

use super::config::{ConfigUpdate, DeviceConfig, UpdateResponse};
use crate::settings::DeviceSettings;

/// Reads and writes the sensor's configuration over its HTTP API.
#[derive(Clone, Debug)]
pub(crate) struct DeviceClient {
    client: Client<HttpConnector>,
    config_uri: Uri,
    timeout: Duration,
}

impl DeviceClient {
    pub(crate) fn new(settings: &DeviceSettings) -> anyhow::Result<Self> {
        let config_uri = settings
            .config_url()?
            .as_str()
            .parse()
            .context("Invalid device configuration URL")?;
        Ok(Self {
            client: Client::new(),
            config_uri,
            timeout: settings.request_timeout(),
        })
    }

    async fn send(&self, request: Request<Body>) -> anyhow::Result<Response<Body>> {
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| anyhow!("Timed out waiting for {}", self.config_uri))?
            .with_context(|| format!("Request to {} failed", self.config_uri))?;
        Ok(response)
    }

    /// Fetch the current configuration and status.
    #[instrument(level = "debug", skip(self))]
    pub(crate) async fn fetch_config(&self) -> anyhow::Result<DeviceConfig> {
        let request = Request::get(self.config_uri.clone()).body(Body::empty())?;
        let response = self.send(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        if !status.is_success() {
            bail!(
                "Device returned {} for configuration request: {}",
                status,
                String::from_utf8_lossy(&body)
            );
        }
        let config: DeviceConfig =
            serde_json::from_slice(&body).context("Invalid configuration document")?;
        debug!(?config, "fetched device configuration");
        Ok(config)
    }

    /// Send a partial configuration change. Values are clamped to the sensor's limits first.
    // The update may include the WiFi password, so keep it out of the span.
    #[instrument(level = "debug", skip(self, update))]
    pub(crate) async fn update_config(&self, update: ConfigUpdate) -> anyhow::Result<()> {
        let update = update.clamped();
        if update.is_empty() {
            debug!("no configuration changes to send");
            return Ok(());
        }
        let request = Request::post(self.config_uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&update)?))?;
        let response = self.send(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        let reply: Option<UpdateResponse> = serde_json::from_slice(&body).ok();
        match reply {
            Some(UpdateResponse {
                error: Some(message),
                ..
            }) => bail!("Device rejected configuration ({}): {}", status, message),
            _ if !status.is_success() => bail!("Device returned {} for configuration update", status),
            Some(UpdateResponse { ok: true, .. }) => Ok(()),
            _ => bail!("Unexpected reply to configuration update: {}", String::from_utf8_lossy(&body)),
        }
    }
}
