// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::dispatcher::{CommandHandler, CommandInvocation};
use crate::discord::reply::{Reply, Responder};
use crate::discord::state::BotState;
use crate::discord::utils::responses::{
	AVAILABLE_SOUNDS_HEADER, NO_SOUNDS_AVAILABLE, UNABLE_TO_LOAD_SOUNDS, category_header,
};
use crate::discord::utils::sound_buttons::sound_button_pages;
use async_trait::async_trait;
use miette::{IntoDiagnostic, bail};
use std::time::Duration;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_util::builder::command::CommandBuilder;

pub const NAME: &str = "start";

pub fn command_definition() -> Command {
	CommandBuilder::new(NAME, "Show the legend phrases you can add to the soundboard", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.build()
}

pub struct StartCommand;

#[async_trait]
impl CommandHandler<BotState> for StartCommand {
	fn name(&self) -> &'static str {
		NAME
	}

	fn cooldown(&self) -> Option<Duration> {
		Some(Duration::from_secs(5))
	}

	async fn execute(
		&self,
		state: &BotState,
		invocation: &CommandInvocation,
		responder: &dyn Responder,
	) -> miette::Result<()> {
		let Some(guild_id) = invocation.guild_id else {
			bail!("The start command was used outside of a guild");
		};

		let catalog = state.catalog().await;
		if catalog.is_empty() {
			responder.send(Reply::ephemeral(NO_SOUNDS_AVAILABLE)).await?;
			return Ok(());
		}

		let session = state.sessions.get_or_create(guild_id).await;
		{
			let mut mirror = session.mirror.lock().await;
			match mirror.sync(state.engine.api(), guild_id).await {
				Ok(sound_count) => {
					tracing::info!(guild_id = guild_id.get(), sound_count, "Loaded the guild's soundboard");
				}
				Err(error) => {
					tracing::error!(guild_id = guild_id.get(), source = ?error, "Failed to load the guild's soundboard");
					responder.send(Reply::ephemeral(UNABLE_TO_LOAD_SOUNDS)).await?;
					return Ok(());
				}
			}
		}

		responder.send(Reply::public(AVAILABLE_SOUNDS_HEADER)).await?;

		let Some(channel_id) = invocation.channel_id else {
			bail!("The start command was used without a channel");
		};
		for (category_id, sounds) in catalog.sounds_by_category() {
			let header = category_header(catalog.category_name(category_id));
			state
				.http_client
				.create_message(channel_id)
				.content(&header)
				.await
				.into_diagnostic()?;

			for page in sound_button_pages(&sounds) {
				state
					.http_client
					.create_message(channel_id)
					.components(&page)
					.await
					.into_diagnostic()?;
			}
		}

		Ok(())
	}
}
