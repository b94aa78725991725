// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to a guild's soundboard through the Discord REST API.
//!
//! Each call is exactly one HTTP round trip. Nothing here retries; callers decide what to do with a failure.

use super::model::{CatalogEntry, SoundTemplate};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

/// The Discord JSON error code for "Maximum number of soundboard sounds reached".
pub const MAX_SOUNDBOARD_SOUNDS_REACHED: u64 = 30045;

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("no response from the Discord API: {0}")]
	Transport(String),
	#[error("the Discord API responded with status {status} (code {code:?}): {message}")]
	Application {
		status: u16,
		code: Option<u64>,
		message: String,
	},
	#[error("couldn't read the Discord API response: {0}")]
	Decode(String),
}

impl ApiError {
	pub fn is_limit_reached(&self) -> bool {
		matches!(
			self,
			Self::Application {
				code: Some(MAX_SOUNDBOARD_SOUNDS_REACHED),
				..
			}
		)
	}
}

#[async_trait]
pub trait SoundboardApi: Send + Sync {
	/// Lists the sounds currently on the guild's soundboard, oldest first.
	async fn list(&self, guild_id: Id<GuildMarker>) -> Result<Vec<CatalogEntry>, ApiError>;

	async fn create(&self, guild_id: Id<GuildMarker>, template: &SoundTemplate) -> Result<CatalogEntry, ApiError>;

	async fn delete(&self, guild_id: Id<GuildMarker>, sound_id: &str) -> Result<(), ApiError>;
}

/// Rate limit headers from one API response, kept exactly as Discord sent them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RateLimitObservation {
	pub method: String,
	pub url: String,
	pub limit: Option<String>,
	pub remaining: Option<String>,
	pub reset: Option<String>,
	pub reset_after: Option<String>,
	pub bucket: Option<String>,
}

impl RateLimitObservation {
	pub fn from_headers(method: &Method, url: &str, headers: &HeaderMap) -> Self {
		let header = |name: &str| {
			headers
				.get(name)
				.and_then(|value| value.to_str().ok())
				.map(String::from)
		};
		Self {
			method: method.to_string(),
			url: url.to_string(),
			limit: header("x-ratelimit-limit"),
			remaining: header("x-ratelimit-remaining"),
			reset: header("x-ratelimit-reset"),
			reset_after: header("x-ratelimit-reset-after"),
			bucket: header("x-ratelimit-bucket"),
		}
	}

	pub fn log(&self) {
		tracing::info!(
			target: "rate_limit",
			method = %self.method,
			url = %self.url,
			limit = ?self.limit,
			remaining = ?self.remaining,
			reset = ?self.reset,
			reset_after = ?self.reset_after,
			bucket = ?self.bucket,
			"Rate limit response data"
		);
	}
}

#[derive(Debug, Serialize)]
struct CreateSoundBody<'a> {
	name: &'a str,
	sound_id: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	sound: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	volume: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	emoji_id: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	emoji_name: Option<&'a str>,
}

impl<'a> From<&'a SoundTemplate> for CreateSoundBody<'a> {
	fn from(template: &'a SoundTemplate) -> Self {
		Self {
			name: &template.name,
			sound_id: &template.sound_id,
			sound: template.sound.as_deref(),
			volume: template.volume,
			emoji_id: template.emoji_id.as_deref(),
			emoji_name: template.emoji_name.as_deref(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct ListSoundsBody {
	items: Vec<CatalogEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
	#[serde(default)]
	code: Option<u64>,
	#[serde(default)]
	message: Option<String>,
}

/// Soundboard client backed by reqwest, authenticated with the bot token.
pub struct HttpSoundboardClient {
	client: Client,
	api_base: String,
	authorization: String,
}

impl HttpSoundboardClient {
	/// `api_base` is the versioned API root, such as `https://discord.com/api/v10`.
	pub fn new(api_base: impl Into<String>, bot_token: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
		let client = Client::builder().timeout(timeout).build()?;
		let api_base = api_base.into().trim_end_matches('/').to_string();
		Ok(Self {
			client,
			api_base,
			authorization: format!("Bot {}", bot_token),
		})
	}

	fn sounds_url(&self, guild_id: Id<GuildMarker>) -> String {
		format!("{}/guilds/{}/soundboard-sounds", self.api_base, guild_id.get())
	}

	/// Performs one round trip, returning the response's rate limit headers, status and body.
	async fn exchange(
		&self,
		method: &Method,
		url: &str,
		request: RequestBuilder,
	) -> Result<(RateLimitObservation, StatusCode, Vec<u8>), ApiError> {
		let response = request
			.header(AUTHORIZATION, self.authorization.as_str())
			.send()
			.await
			.map_err(|error| ApiError::Transport(error.to_string()))?;

		let rate_limit = RateLimitObservation::from_headers(method, url, response.headers());
		let status = response.status();
		let body = response
			.bytes()
			.await
			.map_err(|error| ApiError::Transport(error.to_string()))?;
		Ok((rate_limit, status, body.to_vec()))
	}

	async fn send(&self, method: Method, url: String, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
		let (rate_limit, status, body) = self.exchange(&method, &url, request).await?;
		rate_limit.log();

		if !status.is_success() {
			let error_body: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
			return Err(ApiError::Application {
				status: status.as_u16(),
				code: error_body.code,
				message: error_body
					.message
					.unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string()),
			});
		}
		Ok(body)
	}
}

#[async_trait]
impl SoundboardApi for HttpSoundboardClient {
	async fn list(&self, guild_id: Id<GuildMarker>) -> Result<Vec<CatalogEntry>, ApiError> {
		let url = self.sounds_url(guild_id);
		let request = self.client.get(&url);
		let body = self.send(Method::GET, url, request).await?;
		let sounds: ListSoundsBody = serde_json::from_slice(&body).map_err(|error| ApiError::Decode(error.to_string()))?;
		Ok(sounds.items)
	}

	async fn create(&self, guild_id: Id<GuildMarker>, template: &SoundTemplate) -> Result<CatalogEntry, ApiError> {
		let url = self.sounds_url(guild_id);
		let request = self.client.post(&url).json(&CreateSoundBody::from(template));
		let body = self.send(Method::POST, url, request).await?;
		serde_json::from_slice(&body).map_err(|error| ApiError::Decode(error.to_string()))
	}

	async fn delete(&self, guild_id: Id<GuildMarker>, sound_id: &str) -> Result<(), ApiError> {
		let url = format!("{}/{}", self.sounds_url(guild_id), sound_id);
		let request = self.client.delete(&url);
		self.send(Method::DELETE, url, request).await?;
		Ok(())
	}
}
