// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::dispatcher::CommandRegistry;
use crate::config::CatalogConfig;
use crate::soundboard::client::SoundboardApi;
use crate::soundboard::engine::ReplacementEngine;
use crate::soundboard::mirror::{GuildSession, GuildSessions};
use crate::soundboard::model::StaticCatalog;
use std::sync::Arc;
use tokio::sync::RwLock;
use twilight_cache_inmemory::DefaultInMemoryCache;
use twilight_http::client::Client;
use twilight_model::guild::PremiumTier;
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, GuildMarker};

/// Everything command and button handlers share while the bot runs.
pub struct BotState {
	pub http_client: Arc<Client>,
	pub application_id: Id<ApplicationMarker>,
	pub cache: Arc<DefaultInMemoryCache>,
	pub engine: ReplacementEngine<dyn SoundboardApi>,
	pub sessions: GuildSessions,
	pub commands: Arc<CommandRegistry<BotState>>,
	catalog: RwLock<Arc<StaticCatalog>>,
	catalog_config: CatalogConfig,
}

impl BotState {
	pub fn new(
		http_client: Arc<Client>,
		application_id: Id<ApplicationMarker>,
		cache: Arc<DefaultInMemoryCache>,
		engine: ReplacementEngine<dyn SoundboardApi>,
		commands: Arc<CommandRegistry<BotState>>,
		catalog: StaticCatalog,
		catalog_config: CatalogConfig,
	) -> Self {
		Self {
			http_client,
			application_id,
			cache,
			engine,
			sessions: GuildSessions::default(),
			commands,
			catalog: RwLock::new(Arc::new(catalog)),
			catalog_config,
		}
	}

	/// The catalog as of now. A reload swaps in a new catalog without affecting holders of the old one.
	pub async fn catalog(&self) -> Arc<StaticCatalog> {
		Arc::clone(&*self.catalog.read().await)
	}

	/// Reads the catalog files again, keeping the current catalog if they can't be loaded.
	pub async fn reload_catalog(&self) -> miette::Result<usize> {
		let catalog = StaticCatalog::load(&self.catalog_config.sounds_file, &self.catalog_config.categories_file).await?;
		let sound_count = catalog.sounds().len();
		*self.catalog.write().await = Arc::new(catalog);
		Ok(sound_count)
	}

	/// Guilds the cache doesn't know about are treated as unboosted.
	pub fn premium_tier(&self, guild_id: Id<GuildMarker>) -> PremiumTier {
		self.cache
			.guild(guild_id)
			.map(|guild| guild.premium_tier())
			.unwrap_or(PremiumTier::None)
	}

	/// Gets the guild's session, loading its mirror from Discord the first time the guild is seen.
	///
	/// A mirror that fails to load stays empty and is loaded again on the next use.
	pub async fn session(&self, guild_id: Id<GuildMarker>) -> Arc<GuildSession> {
		let session = self.sessions.get_or_create(guild_id).await;
		{
			let mut mirror = session.mirror.lock().await;
			if !mirror.is_synced() {
				match mirror.sync(self.engine.api(), guild_id).await {
					Ok(sound_count) => {
						tracing::info!(guild_id = guild_id.get(), sound_count, "Loaded the guild's soundboard")
					}
					Err(error) => {
						tracing::warn!(guild_id = guild_id.get(), source = ?error, "Failed to load the guild's soundboard")
					}
				}
			}
		}
		session
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::soundboard::capacity::CapacityPolicy;
	use crate::soundboard::model::Category;
	use crate::soundboard::model::tests::template;
	use crate::soundboard::testing::{Call, FakeSoundboard, application_error};

	pub(crate) fn state_with(api: Arc<FakeSoundboard>, catalog: StaticCatalog) -> BotState {
		let api: Arc<dyn SoundboardApi> = api;
		BotState::new(
			Arc::new(Client::new(String::from("test-token"))),
			Id::new(1),
			Arc::new(DefaultInMemoryCache::new()),
			ReplacementEngine::new(api, CapacityPolicy::default()),
			Arc::new(CommandRegistry::new(Vec::new())),
			catalog,
			CatalogConfig {
				sounds_file: String::from("does-not-exist/sounds.json"),
				categories_file: String::from("does-not-exist/categories.json"),
			},
		)
	}

	pub(crate) fn sample_catalog() -> StaticCatalog {
		StaticCatalog::new(
			vec![template("airhorn", "memes"), template("trumpet", "memes")],
			vec![Category {
				id: String::from("memes"),
				name: String::from("Memes"),
			}],
		)
		.unwrap()
	}

	const GUILD: Id<GuildMarker> = Id::new(100);

	#[tokio::test]
	async fn session_is_loaded_once() {
		let api = Arc::new(FakeSoundboard::with_remote(["r1", "r2"]));
		let state = state_with(Arc::clone(&api), sample_catalog());

		let session = state.session(GUILD).await;
		assert_eq!(session.mirror.lock().await.names(), vec!["r1", "r2"]);
		state.session(GUILD).await;

		assert_eq!(api.calls(), vec![Call::List]);
	}

	#[tokio::test]
	async fn failed_load_is_retried() {
		let api = Arc::new(FakeSoundboard::with_remote(["r1"]));
		api.fail_next_list(application_error(500, 0));
		let state = state_with(Arc::clone(&api), sample_catalog());

		let session = state.session(GUILD).await;
		assert!(session.mirror.lock().await.is_empty());
		let session = state.session(GUILD).await;
		assert_eq!(session.mirror.lock().await.names(), vec!["r1"]);
	}

	#[tokio::test]
	async fn unknown_guilds_are_unboosted() {
		let state = state_with(Arc::new(FakeSoundboard::default()), sample_catalog());
		assert_eq!(state.premium_tier(GUILD), PremiumTier::None);
	}

	#[tokio::test]
	async fn failed_reload_keeps_the_catalog() {
		let state = state_with(Arc::new(FakeSoundboard::default()), sample_catalog());
		assert!(state.reload_catalog().await.is_err());
		assert_eq!(state.catalog().await.sounds().len(), 2);
	}
}
