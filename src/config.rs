// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::soundboard::capacity::{CapacityPolicy, DEFAULT_NO_BOOST_LIMIT, DEFAULT_TIER_LIMITS};
use kdl::{KdlDocument, KdlValue};
use miette::{IntoDiagnostic, bail, miette};
use std::time::Duration;
use tokio::fs::read_to_string;

const DEFAULT_API_BASE: &str = "https://discord.com/api";
const DEFAULT_API_VERSION: u8 = 10;
const DEFAULT_COOLDOWN_SECONDS: u64 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub catalog: CatalogConfig,
	pub default_cooldown: Duration,
	pub capacity: CapacityPolicy,
	pub request_timeout: Duration,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub bot_token: String,
	pub api_base: String,
	pub api_version: u8,
}

impl DiscordConfig {
	/// The versioned API root, such as `https://discord.com/api/v10`.
	pub fn versioned_api_base(&self) -> String {
		format!("{}/v{}", self.api_base.trim_end_matches('/'), self.api_version)
	}
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
	pub sounds_file: String,
	pub categories_file: String,
}

pub async fn parse_config(config_path: &str) -> miette::Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_str(&config_file_contents)
}

pub fn parse_config_str(config_contents: &str) -> miette::Result<ConfigData> {
	let document: KdlDocument = config_contents.parse()?;
	let discord = Section::block(&document, "discord").required()?;
	let catalog = Section::block(&document, "catalog").required()?;
	let cooldown = Section::block(&document, "cooldown");
	let soundboard = Section::block(&document, "soundboard");
	let root = Section::root(&document);

	Ok(ConfigData {
		discord: DiscordConfig {
			bot_token: discord.required_string("bot-token")?,
			api_base: discord
				.string("api-base")?
				.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
			api_version: discord.number("api-version")?.unwrap_or(DEFAULT_API_VERSION),
		},
		catalog: CatalogConfig {
			sounds_file: catalog.required_string("sounds-file")?,
			categories_file: catalog.required_string("categories-file")?,
		},
		default_cooldown: Duration::from_secs(cooldown.number("default-seconds")?.unwrap_or(DEFAULT_COOLDOWN_SECONDS)),
		capacity: parse_capacity(&soundboard)?,
		request_timeout: Duration::from_secs(
			root.number("request-timeout-seconds")?
				.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
		),
	})
}

fn parse_capacity(soundboard: &Section<'_>) -> miette::Result<CapacityPolicy> {
	let no_boost_limit: Option<usize> = soundboard.number("no-boost-limit")?;
	let tier_limit_values: Vec<usize> = soundboard.numbers("tier-limits")?;
	let tier_limits = if tier_limit_values.is_empty() {
		None
	} else {
		let tier_limits = <[usize; 4]>::try_from(tier_limit_values).map_err(|_| {
			miette!(
				"`soundboard.tier-limits` needs exactly {} values (no boost, then tiers 1 to 3)",
				DEFAULT_TIER_LIMITS.len()
			)
		})?;
		Some(tier_limits)
	};

	let no_boost_limit = match (no_boost_limit, tier_limits) {
		(Some(no_boost_limit), Some(tier_limits)) if no_boost_limit != tier_limits[0] => bail!(
			"`soundboard.no-boost-limit` ({}) disagrees with the first value of `soundboard.tier-limits` ({})",
			no_boost_limit,
			tier_limits[0]
		),
		(Some(no_boost_limit), _) => no_boost_limit,
		(None, Some(tier_limits)) => tier_limits[0],
		(None, None) => DEFAULT_NO_BOOST_LIMIT,
	};

	Ok(CapacityPolicy::new(
		no_boost_limit,
		tier_limits.unwrap_or(DEFAULT_TIER_LIMITS),
	))
}

/// A block of settings in the config document. Optional blocks that are absent read as having no settings.
struct Section<'a> {
	name: &'static str,
	document: Option<&'a KdlDocument>,
}

impl<'a> Section<'a> {
	fn block(document: &'a KdlDocument, name: &'static str) -> Self {
		Self {
			name,
			document: document.get(name).and_then(|node| node.children()),
		}
	}

	fn root(document: &'a KdlDocument) -> Self {
		Self {
			name: "",
			document: Some(document),
		}
	}

	fn required(self) -> miette::Result<Self> {
		if self.document.is_none() {
			bail!("The config is missing the `{}` block", self.name);
		}
		Ok(self)
	}

	fn path(&self, setting: &str) -> String {
		if self.name.is_empty() {
			setting.to_string()
		} else {
			format!("{}.{}", self.name, setting)
		}
	}

	fn value(&self, setting: &str) -> Option<&'a KdlValue> {
		self.document.and_then(|document| document.get_arg(setting))
	}

	fn string(&self, setting: &str) -> miette::Result<Option<String>> {
		match self.value(setting) {
			Some(value) => match value.as_string() {
				Some(value) => Ok(Some(value.to_string())),
				None => bail!("`{}` must be a string", self.path(setting)),
			},
			None => Ok(None),
		}
	}

	fn required_string(&self, setting: &str) -> miette::Result<String> {
		match self.string(setting)? {
			Some(value) => Ok(value),
			None => bail!("The config is missing `{}`", self.path(setting)),
		}
	}

	fn number<T: TryFrom<i128>>(&self, setting: &str) -> miette::Result<Option<T>> {
		self.value(setting)
			.map(|value| self.integer(setting, value))
			.transpose()
	}

	/// Every argument of the setting's node, such as the four values of `tier-limits`.
	fn numbers<T: TryFrom<i128>>(&self, setting: &str) -> miette::Result<Vec<T>> {
		let Some(document) = self.document else {
			return Ok(Vec::new());
		};
		document
			.iter_args(setting)
			.map(|value| self.integer(setting, value))
			.collect()
	}

	fn integer<T: TryFrom<i128>>(&self, setting: &str, value: &KdlValue) -> miette::Result<T> {
		let Some(integer) = value.as_integer() else {
			bail!("`{}` must only contain integers", self.path(setting));
		};
		T::try_from(integer).map_err(|_| miette!("`{}` is out of range", self.path(setting)))
	}
}
