// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::reply::{Reply, Responder};
use super::state::BotState;
use super::utils::responses::{GUILD_ONLY, SOUND_NOT_FOUND};
use crate::soundboard::engine::{Notifier, Outcome};
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

/// A press of one of the sound buttons posted by `/start`.
#[derive(Clone, Debug)]
pub struct ButtonPress {
	pub custom_id: String,
	pub guild_id: Option<Id<GuildMarker>>,
}

/// Adds the pressed sound to the guild's soundboard, making room for it if needed.
pub async fn route_interaction<R>(state: &BotState, press: &ButtonPress, responder: &R) -> miette::Result<Option<Outcome>>
where
	R: Responder + Notifier + ?Sized,
{
	let catalog = state.catalog().await;
	let Some(template) = catalog.find_by_custom_id(&press.custom_id) else {
		tracing::error!(custom_id = %press.custom_id, "No sound matches the pressed button");
		responder.send(Reply::ephemeral(SOUND_NOT_FOUND)).await?;
		return Ok(None);
	};

	let Some(guild_id) = press.guild_id else {
		responder.send(Reply::ephemeral(GUILD_ONLY)).await?;
		return Ok(None);
	};

	let session = state.session(guild_id).await;
	let tier = state.premium_tier(guild_id);
	let outcome = state
		.engine
		.add_sound_to_session(&session, guild_id, tier, template, responder)
		.await;
	Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::discord::state::tests::{sample_catalog, state_with};
	use crate::discord::utils::responses::notice_message;
	use crate::soundboard::engine::Notice;
	use crate::soundboard::testing::{Call, FakeSoundboard};
	use async_trait::async_trait;
	use std::sync::{Arc, Mutex};

	/// Collects replies and notices in the order the user would see them.
	#[derive(Default)]
	struct RecordingInteraction {
		messages: Mutex<Vec<String>>,
	}

	impl RecordingInteraction {
		fn messages(&self) -> Vec<String> {
			self.messages.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl Responder for RecordingInteraction {
		async fn send(&self, reply: Reply) -> miette::Result<()> {
			self.messages.lock().unwrap().push(reply.content);
			Ok(())
		}
	}

	#[async_trait]
	impl Notifier for RecordingInteraction {
		async fn notify(&self, notice: Notice) {
			self.messages.lock().unwrap().push(notice_message(&notice));
		}
	}

	fn press(custom_id: &str) -> ButtonPress {
		ButtonPress {
			custom_id: custom_id.to_string(),
			guild_id: Some(Id::new(100)),
		}
	}

	#[tokio::test]
	async fn unknown_button_is_reported() {
		let api = Arc::new(FakeSoundboard::default());
		let state = state_with(Arc::clone(&api), sample_catalog());
		let interaction = RecordingInteraction::default();

		let outcome = route_interaction(&state, &press("sound/kazoo"), &interaction).await.unwrap();

		assert!(outcome.is_none());
		assert_eq!(interaction.messages(), vec![String::from(SOUND_NOT_FOUND)]);
		assert!(api.calls().is_empty());
	}

	#[tokio::test]
	async fn first_press_loads_the_soundboard_then_adds() {
		let api = Arc::new(FakeSoundboard::with_remote(["r1"]));
		let state = state_with(Arc::clone(&api), sample_catalog());
		let interaction = RecordingInteraction::default();

		let outcome = route_interaction(&state, &press("sound/airhorn"), &interaction).await.unwrap();

		assert!(matches!(outcome, Some(Outcome::Added(_))));
		assert_eq!(api.calls(), vec![Call::List, Call::Create(String::from("airhorn"))]);
		assert_eq!(
			interaction.messages(),
			vec![notice_message(&Notice::Added {
				name: String::from("airhorn")
			})]
		);
	}

	#[tokio::test]
	async fn pressing_twice_reports_a_duplicate() {
		let api = Arc::new(FakeSoundboard::default());
		let state = state_with(Arc::clone(&api), sample_catalog());

		route_interaction(&state, &press("sound/trumpet"), &RecordingInteraction::default())
			.await
			.unwrap();
		let interaction = RecordingInteraction::default();
		let outcome = route_interaction(&state, &press("sound/trumpet"), &interaction).await.unwrap();

		assert!(matches!(outcome, Some(Outcome::Duplicate)));
		assert_eq!(
			interaction.messages(),
			vec![notice_message(&Notice::Duplicate {
				name: String::from("trumpet")
			})]
		);
	}

	#[tokio::test]
	async fn button_outside_a_guild_is_rejected() {
		let api = Arc::new(FakeSoundboard::default());
		let state = state_with(Arc::clone(&api), sample_catalog());
		let interaction = RecordingInteraction::default();
		let mut press = press("sound/airhorn");
		press.guild_id = None;

		route_interaction(&state, &press, &interaction).await.unwrap();

		assert_eq!(interaction.messages(), vec![String::from(GUILD_ONLY)]);
		assert!(api.calls().is_empty());
	}
}
