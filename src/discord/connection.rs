// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, command_handlers};
use super::dispatcher::{CommandInvocation, CommandRegistry, Dispatcher, run_isolated};
use super::interactions::{ButtonPress, route_interaction};
use super::reply::{InteractionResponder, Responder};
use super::state::BotState;
use super::utils::responses::UNEXPECTED_ERROR;
use crate::config::ConfigData;
use crate::soundboard::client::{HttpSoundboardClient, SoundboardApi};
use crate::soundboard::engine::ReplacementEngine;
use crate::soundboard::model::StaticCatalog;
use miette::{IntoDiagnostic, bail};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use twilight_cache_inmemory::{DefaultInMemoryCache, ResourceType};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::application::interaction::{Interaction, InteractionData};
use twilight_model::gateway::event::Event;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

/// An interaction waiting for its turn on the event queue.
enum InboundEvent {
	Command {
		invocation: CommandInvocation,
		responder: Arc<InteractionResponder>,
	},
	Button {
		press: ButtonPress,
		responder: Arc<InteractionResponder>,
	},
}

pub async fn run_bot(config: Arc<ConfigData>, http_client: Arc<Client>, catalog: StaticCatalog) -> miette::Result<()> {
	let intents = Intents::GUILDS;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let cache = Arc::new(
		DefaultInMemoryCache::builder()
			.resource_types(ResourceType::GUILD)
			.build(),
	);

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_global_commands(&commands)
			.await
			.into_diagnostic()?;
	}

	let soundboard_client: Arc<dyn SoundboardApi> = Arc::new(
		HttpSoundboardClient::new(
			config.discord.versioned_api_base(),
			&config.discord.bot_token,
			config.request_timeout,
		)
		.into_diagnostic()?,
	);
	let commands = Arc::new(CommandRegistry::new(command_handlers()));
	let bot_state = Arc::new(BotState::new(
		Arc::clone(&http_client),
		application_id,
		Arc::clone(&cache),
		ReplacementEngine::new(soundboard_client, config.capacity),
		Arc::clone(&commands),
		catalog,
		config.catalog.clone(),
	));
	let dispatcher = Dispatcher::new(commands, config.default_cooldown);

	let (event_sender, event_receiver) = unbounded_channel();
	let event_consumer = tokio::spawn(process_events(event_receiver, dispatcher, Arc::clone(&bot_state)));

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};
		cache.update(&event);

		match event {
			Event::InteractionCreate(interaction) => {
				let Some(inbound_event) = inbound_event(&interaction, &bot_state) else {
					continue;
				};
				if event_sender.send(inbound_event).is_err() {
					bail!("The event queue stopped accepting events");
				}
			}
			Event::Ready(_) => {
				tracing::info!("Discord gateway is ready");
			}
			_ => (),
		}
	}

	drop(event_sender);
	event_consumer.await.into_diagnostic()?;
	Ok(())
}

fn inbound_event(interaction: &Interaction, bot_state: &BotState) -> Option<InboundEvent> {
	tracing::debug!("Incoming interaction: {:?}", interaction);
	let responder = Arc::new(InteractionResponder::new(
		Arc::clone(&bot_state.http_client),
		bot_state.application_id,
		interaction.id,
		interaction.token.clone(),
	));

	match &interaction.data {
		Some(InteractionData::ApplicationCommand(command_data)) => {
			let Some(user_id) = interaction.author_id() else {
				tracing::warn!(command = %command_data.name, "Received a command without a user");
				return None;
			};
			let invocation = CommandInvocation {
				name: command_data.name.clone(),
				user_id,
				guild_id: interaction.guild_id,
				channel_id: interaction.channel.as_ref().map(|channel| channel.id),
				string_options: string_options(command_data),
			};
			Some(InboundEvent::Command { invocation, responder })
		}
		Some(InteractionData::MessageComponent(component_data)) => {
			let press = ButtonPress {
				custom_id: component_data.custom_id.clone(),
				guild_id: interaction.guild_id,
			};
			Some(InboundEvent::Button { press, responder })
		}
		_ => None,
	}
}

fn string_options(command_data: &CommandData) -> HashMap<String, String> {
	command_data
		.options
		.iter()
		.filter_map(|option| match &option.value {
			CommandOptionValue::String(value) => Some((option.name.clone(), value.clone())),
			_ => None,
		})
		.collect()
}

/// Takes events off the queue one at a time so cooldowns are applied in delivery order. The handling itself runs on
/// separate tasks.
async fn process_events(
	mut event_receiver: UnboundedReceiver<InboundEvent>,
	dispatcher: Dispatcher<BotState>,
	bot_state: Arc<BotState>,
) {
	while let Some(event) = event_receiver.recv().await {
		match event {
			InboundEvent::Command { invocation, responder } => {
				let responder: Arc<dyn Responder> = responder;
				dispatcher.dispatch(Arc::clone(&bot_state), invocation, responder).await;
			}
			InboundEvent::Button { press, responder } => {
				let bot_state = Arc::clone(&bot_state);
				tokio::spawn(async move {
					let task_responder = Arc::clone(&responder);
					let task = async move {
						route_interaction(&bot_state, &press, task_responder.as_ref()).await?;
						Ok::<(), miette::Report>(())
					};
					run_isolated("a sound button", responder, UNEXPECTED_ERROR, task).await;
				});
			}
		}
	}
}
