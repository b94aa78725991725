// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::new_handler;
use crate::discord::dispatcher::{CommandHandler, CommandInvocation};
use crate::discord::reply::{Reply, Responder};
use crate::discord::state::BotState;
use crate::discord::utils::responses::{
	command_reload_failed_message, command_reloaded_message, unknown_command_message,
};
use async_trait::async_trait;
use miette::bail;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::guild::Permissions;
use twilight_util::builder::command::{CommandBuilder, StringBuilder};

pub const NAME: &str = "reload";
const COMMAND_OPTION: &str = "command";

pub fn command_definition() -> Command {
	CommandBuilder::new(NAME, "Reloads a command", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.default_member_permissions(Permissions::MANAGE_GUILD)
		.option(StringBuilder::new(COMMAND_OPTION, "The command to reload").required(true))
		.build()
}

pub struct ReloadCommand;

#[async_trait]
impl CommandHandler<BotState> for ReloadCommand {
	fn name(&self) -> &'static str {
		NAME
	}

	async fn execute(
		&self,
		state: &BotState,
		invocation: &CommandInvocation,
		responder: &dyn Responder,
	) -> miette::Result<()> {
		let Some(command_name) = invocation.string_option(COMMAND_OPTION) else {
			bail!("The reload command was used without a command name");
		};
		let command_name = command_name.to_lowercase();

		let handler = match state.commands.get(&command_name).await {
			Some(_) => new_handler(&command_name),
			None => None,
		};
		let Some(handler) = handler else {
			responder
				.send(Reply::public(unknown_command_message(&command_name)))
				.await?;
			return Ok(());
		};

		if let Err(error) = state.reload_catalog().await {
			tracing::error!(command = %command_name, source = ?error, "Failed to reload a command");
			responder
				.send(Reply::public(command_reload_failed_message(&command_name, &error)))
				.await?;
			return Ok(());
		}

		state.commands.replace(handler).await;
		tracing::info!(command = %command_name, "Reloaded a command");
		responder
			.send(Reply::public(command_reloaded_message(&command_name)))
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::discord::reply::tests::RecordingResponder;
	use crate::discord::state::tests::{sample_catalog, state_with};
	use crate::soundboard::testing::FakeSoundboard;
	use std::collections::HashMap;
	use std::sync::Arc;
	use twilight_model::id::Id;

	fn reload_of(command_name: &str) -> CommandInvocation {
		CommandInvocation {
			name: String::from(NAME),
			user_id: Id::new(10),
			guild_id: Some(Id::new(100)),
			channel_id: Some(Id::new(200)),
			string_options: HashMap::from([(String::from(COMMAND_OPTION), command_name.to_string())]),
		}
	}

	#[tokio::test]
	async fn unknown_command_gets_a_warning() {
		let state = state_with(Arc::new(FakeSoundboard::default()), sample_catalog());
		let responder = RecordingResponder::default();

		ReloadCommand
			.execute(&state, &reload_of("dance"), &responder)
			.await
			.unwrap();

		assert_eq!(responder.replies(), vec![Reply::public(unknown_command_message("dance"))]);
	}

	#[tokio::test]
	async fn catalog_failure_keeps_the_old_handler() {
		let state = state_with(Arc::new(FakeSoundboard::default()), sample_catalog());
		let original = new_handler("start").unwrap();
		state.commands.replace(Arc::clone(&original)).await;
		let responder = RecordingResponder::default();

		ReloadCommand
			.execute(&state, &reload_of("Start"), &responder)
			.await
			.unwrap();

		let replies = responder.replies();
		assert_eq!(replies.len(), 1);
		assert!(replies[0].content.contains("An error occurred while reloading a command `start`"));
		let current = state.commands.get("start").await.unwrap();
		assert!(Arc::ptr_eq(&current, &original));
	}

	#[tokio::test]
	async fn missing_option_is_an_error() {
		let state = state_with(Arc::new(FakeSoundboard::default()), sample_catalog());
		let responder = RecordingResponder::default();
		let mut invocation = reload_of("start");
		invocation.string_options.clear();

		assert!(ReloadCommand.execute(&state, &invocation, &responder).await.is_err());
	}
}
