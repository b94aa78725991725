// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adding a sound to a guild's soundboard, evicting the oldest sound when the soundboard is full.
//!
//! A request goes through these steps:
//!
//! 1. If the mirror already has a sound with the requested name, the request is rejected without calling Discord.
//! 2. If the mirror holds no more sounds than the guild's limit, the sound is created directly. If Discord answers
//!    that the soundboard is full anyway, the request continues with step 3.
//! 3. Otherwise the oldest sound is deleted and the requested sound created in its place.
//!
//! Only one sound is ever evicted for a request. If Discord still reports a full soundboard after the eviction, the
//! request stops there.

use super::capacity::CapacityPolicy;
use super::client::{ApiError, SoundboardApi};
use super::mirror::{CatalogMirror, GuildSession};
use super::model::{CatalogEntry, SoundTemplate};
use async_trait::async_trait;
use std::sync::Arc;
use twilight_model::guild::PremiumTier;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

/// Something the user needs to be told about while their request is processed.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
	Added { name: String },
	Removed { name: String },
	Duplicate { name: String },
	/// The mirror already holds more sounds than the guild's limit allows.
	CapacityFull { tier: PremiumTier, limit: usize },
	/// Discord refused to add the sound because the soundboard is full.
	LimitReached,
	Failed,
}

#[async_trait]
pub trait Notifier: Send + Sync {
	/// Delivers a notice to the requesting user. Delivery failures are the notifier's own concern.
	async fn notify(&self, notice: Notice);
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Failure {
	/// Creating the sound failed for a reason other than a full soundboard.
	Create,
	/// The soundboard was still full after evicting a sound.
	StillFull,
	Delete,
	/// The soundboard was full but the mirror had no sound to evict.
	NothingToEvict,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
	Duplicate,
	Added(CatalogEntry),
	Replaced { evicted: CatalogEntry, added: CatalogEntry },
	Failed(Failure),
}

pub struct ReplacementEngine<A: ?Sized> {
	api: Arc<A>,
	capacity: CapacityPolicy,
}

impl<A: SoundboardApi + ?Sized> ReplacementEngine<A> {
	pub fn new(api: Arc<A>, capacity: CapacityPolicy) -> Self {
		Self { api, capacity }
	}

	pub fn api(&self) -> &A {
		&self.api
	}

	/// Runs a request while holding the guild's mirror lock for its whole duration.
	pub async fn add_sound_to_session<N: Notifier + ?Sized>(
		&self,
		session: &GuildSession,
		guild_id: Id<GuildMarker>,
		tier: PremiumTier,
		template: &SoundTemplate,
		notifier: &N,
	) -> Outcome {
		let mut mirror = session.mirror.lock().await;
		self.add_sound(&mut mirror, guild_id, tier, template, notifier).await
	}

	pub async fn add_sound<N: Notifier + ?Sized>(
		&self,
		mirror: &mut CatalogMirror,
		guild_id: Id<GuildMarker>,
		tier: PremiumTier,
		template: &SoundTemplate,
		notifier: &N,
	) -> Outcome {
		if mirror.contains(&template.name) {
			tracing::warn!(guild_id = guild_id.get(), sound = %template.name, "Sound already exists");
			notifier
				.notify(Notice::Duplicate {
					name: template.name.clone(),
				})
				.await;
			return Outcome::Duplicate;
		}

		let limit = self.capacity.max_sounds(tier);
		tracing::debug!(guild_id = guild_id.get(), ?tier, limit, "Checking soundboard capacity");

		// At the limit exactly, the sound is still created directly; Discord decides whether it fits.
		if mirror.len() > limit {
			tracing::warn!(guild_id = guild_id.get(), ?tier, limit, "The guild has reached its soundboard limit");
			notifier.notify(Notice::CapacityFull { tier, limit }).await;
			return self.evict_then_add(mirror, guild_id, template, notifier).await;
		}

		match self.api.create(guild_id, template).await {
			Ok(entry) => {
				tracing::info!(guild_id = guild_id.get(), sound = %entry.name, "Sound added");
				mirror.append(entry.clone());
				notifier
					.notify(Notice::Added {
						name: entry.name.clone(),
					})
					.await;
				Outcome::Added(entry)
			}
			Err(error) if error.is_limit_reached() => {
				tracing::warn!(guild_id = guild_id.get(), sound = %template.name, source = %error, "Discord reports a full soundboard");
				notifier.notify(Notice::LimitReached).await;
				self.evict_then_add(mirror, guild_id, template, notifier).await
			}
			Err(error) => {
				log_create_failure(guild_id, template, &error);
				notifier.notify(Notice::Failed).await;
				Outcome::Failed(Failure::Create)
			}
		}
	}

	async fn evict_then_add<N: Notifier + ?Sized>(
		&self,
		mirror: &mut CatalogMirror,
		guild_id: Id<GuildMarker>,
		template: &SoundTemplate,
		notifier: &N,
	) -> Outcome {
		let Some(oldest) = mirror.oldest().cloned() else {
			tracing::error!(guild_id = guild_id.get(), sound = %template.name, "The soundboard is full but no sound is known to remove");
			notifier.notify(Notice::Failed).await;
			return Outcome::Failed(Failure::NothingToEvict);
		};

		if let Err(error) = self.api.delete(guild_id, &oldest.sound_id).await {
			tracing::error!(guild_id = guild_id.get(), sound = %oldest.name, source = %error, "Failed to remove a sound");
			notifier.notify(Notice::Failed).await;
			return Outcome::Failed(Failure::Delete);
		}
		mirror.remove_oldest();
		tracing::info!(guild_id = guild_id.get(), sound = %oldest.name, "Sound removed");
		notifier
			.notify(Notice::Removed {
				name: oldest.name.clone(),
			})
			.await;

		// The evicted sound is gone even if this fails; the mirror catches up at the next sync.
		match self.api.create(guild_id, template).await {
			Ok(entry) => {
				tracing::info!(guild_id = guild_id.get(), sound = %entry.name, replaced = %oldest.name, "Sound added");
				mirror.append(entry.clone());
				notifier
					.notify(Notice::Added {
						name: entry.name.clone(),
					})
					.await;
				Outcome::Replaced {
					evicted: oldest,
					added: entry,
				}
			}
			Err(error) if error.is_limit_reached() => {
				tracing::warn!(guild_id = guild_id.get(), sound = %template.name, source = %error, "Soundboard still full after removing a sound");
				notifier.notify(Notice::LimitReached).await;
				Outcome::Failed(Failure::StillFull)
			}
			Err(error) => {
				log_create_failure(guild_id, template, &error);
				notifier.notify(Notice::Failed).await;
				Outcome::Failed(Failure::Create)
			}
		}
	}
}

fn log_create_failure(guild_id: Id<GuildMarker>, template: &SoundTemplate, error: &ApiError) {
	tracing::error!(
		guild_id = guild_id.get(),
		sound = %template.name,
		source = %error,
		"An error occurred while adding a soundboard sound"
	);
}
