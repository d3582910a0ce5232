// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Temperature source port and HTTP implementation.
//!
//! The acquirer talks to a [`TemperatureSource`] so the retry loop can be
//! exercised against a scripted source in tests; the production
//! implementation polls a weather endpoint over HTTP.

use crate::config::SourceConfig;
use crate::error::SourceError;
use async_trait::async_trait;
use serde::Deserialize;

/// A provider of raw temperature samples.
///
/// One call corresponds to one network attempt; retry is the caller's
/// concern.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    /// Fetch a single temperature sample in °C.
    async fn sample(&self) -> Result<f64, SourceError>;
}

/// Relevant subset of the weather endpoint's JSON body.
#[derive(Debug, Deserialize)]
struct WeatherBody {
    main: WeatherMain,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
}

/// HTTP GET source for a weather-style current-conditions endpoint.
///
/// The endpoint is queried with `q` (location), `appid` (API key), and
/// `units` parameters and must answer with a JSON body carrying a numeric
/// temperature at `main.temp`. HTTP 429 maps to the retryable
/// [`SourceError::RateLimited`]; any other non-success status is fatal
/// for the attempt.
pub struct HttpTemperatureSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpTemperatureSource {
    /// Create a source from the given settings with a fresh HTTP client.
    pub fn new(config: SourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a source reusing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: SourceConfig) -> Self {
        Self { client, config }
    }

    fn parse_body(body: &str) -> Result<f64, SourceError> {
        let parsed: WeatherBody = serde_json::from_str(body)
            .map_err(|e| SourceError::MalformedBody(e.to_string()))?;
        Ok(parsed.main.temp)
    }
}

#[async_trait]
impl TemperatureSource for HttpTemperatureSource {
    async fn sample(&self) -> Result<f64, SourceError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("q", self.config.location.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("units", self.config.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Self::parse_body(&body)
    }
}
