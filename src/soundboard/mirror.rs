// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::client::{ApiError, SoundboardApi};
use super::model::CatalogEntry;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

/// Local copy of one guild's soundboard, in the order the sounds were created.
///
/// The copy is only as fresh as the last sync plus the changes this process made itself. Changes made to the
/// soundboard by anyone else show up later as unexpected API responses.
#[derive(Debug, Default)]
pub struct CatalogMirror {
	entries: VecDeque<CatalogEntry>,
	synced: bool,
}

impl CatalogMirror {
	/// Creates a mirror from sounds already known to be on the soundboard.
	pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
		Self {
			entries: entries.into_iter().collect(),
			synced: true,
		}
	}

	/// Replaces the whole mirror with the guild's current soundboard. On failure the mirror is left as it was.
	pub async fn sync<A>(&mut self, api: &A, guild_id: Id<GuildMarker>) -> Result<usize, ApiError>
	where
		A: SoundboardApi + ?Sized,
	{
		let entries = api.list(guild_id).await?;
		self.entries = entries.into();
		self.synced = true;
		tracing::debug!(guild_id = guild_id.get(), sounds = ?self.entries, "Loaded the guild's soundboard sounds");
		Ok(self.entries.len())
	}

	/// Whether the mirror has been loaded from Discord (or built from known sounds) at least once.
	pub fn is_synced(&self) -> bool {
		self.synced
	}

	pub fn append(&mut self, entry: CatalogEntry) {
		self.entries.push_back(entry);
	}

	/// The next sound to evict.
	pub fn oldest(&self) -> Option<&CatalogEntry> {
		self.entries.front()
	}

	pub fn remove_oldest(&mut self) -> Option<CatalogEntry> {
		self.entries.pop_front()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.iter().any(|entry| entry.name == name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn names(&self) -> Vec<&str> {
		self.entries.iter().map(|entry| entry.name.as_str()).collect()
	}
}

/// Per-guild state. The mirror lock is held for a guild's whole replacement run, so runs for one guild never overlap.
#[derive(Debug, Default)]
pub struct GuildSession {
	pub mirror: Mutex<CatalogMirror>,
}

#[derive(Debug, Default)]
pub struct GuildSessions {
	sessions: RwLock<HashMap<Id<GuildMarker>, Arc<GuildSession>>>,
}

impl GuildSessions {
	pub async fn get(&self, guild_id: Id<GuildMarker>) -> Option<Arc<GuildSession>> {
		self.sessions.read().await.get(&guild_id).cloned()
	}

	pub async fn get_or_create(&self, guild_id: Id<GuildMarker>) -> Arc<GuildSession> {
		if let Some(session) = self.get(guild_id).await {
			return session;
		}
		let mut sessions = self.sessions.write().await;
		Arc::clone(sessions.entry(guild_id).or_default())
	}
}
