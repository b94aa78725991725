// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::cooldown::{Clock, Cooldowns, SystemClock};
use super::reply::{Reply, Responder};
use super::utils::responses::{COMMAND_FAILED, cooldown_message};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::miette;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

/// A slash command use, stripped down to what handlers need.
#[derive(Clone, Debug)]
pub struct CommandInvocation {
	pub name: String,
	pub user_id: Id<UserMarker>,
	pub guild_id: Option<Id<GuildMarker>>,
	pub channel_id: Option<Id<ChannelMarker>>,
	pub string_options: HashMap<String, String>,
}

impl CommandInvocation {
	pub fn string_option(&self, name: &str) -> Option<&str> {
		self.string_options.get(name).map(String::as_str)
	}
}

#[async_trait]
pub trait CommandHandler<Ctx: Send + Sync + 'static>: Send + Sync {
	fn name(&self) -> &'static str;

	/// Overrides the configured default cooldown for this command.
	fn cooldown(&self) -> Option<Duration> {
		None
	}

	async fn execute(&self, ctx: &Ctx, invocation: &CommandInvocation, responder: &dyn Responder) -> miette::Result<()>;
}

/// Command handlers by command name. Built once at startup; individual handlers can be swapped out while running.
pub struct CommandRegistry<Ctx: Send + Sync + 'static> {
	handlers: RwLock<HashMap<String, Arc<dyn CommandHandler<Ctx>>>>,
}

impl<Ctx: Send + Sync + 'static> CommandRegistry<Ctx> {
	pub fn new(handlers: impl IntoIterator<Item = Arc<dyn CommandHandler<Ctx>>>) -> Self {
		let handlers = handlers
			.into_iter()
			.map(|handler| (handler.name().to_string(), handler))
			.collect();
		Self {
			handlers: RwLock::new(handlers),
		}
	}

	pub async fn get(&self, name: &str) -> Option<Arc<dyn CommandHandler<Ctx>>> {
		self.handlers.read().await.get(name).cloned()
	}

	/// Puts the handler in place of the one registered under the same name, returning the replaced handler.
	pub async fn replace(&self, handler: Arc<dyn CommandHandler<Ctx>>) -> Option<Arc<dyn CommandHandler<Ctx>>> {
		let name = handler.name().to_string();
		self.handlers.write().await.insert(name, handler)
	}
}

pub enum Admission<Ctx: Send + Sync + 'static> {
	Unknown,
	CoolingDown(DateTime<Utc>),
	Run(Arc<dyn CommandHandler<Ctx>>),
}

pub struct Dispatcher<Ctx: Send + Sync + 'static, C: Clock = SystemClock> {
	registry: Arc<CommandRegistry<Ctx>>,
	cooldowns: Cooldowns<C>,
	default_cooldown: Duration,
}

impl<Ctx: Send + Sync + 'static> Dispatcher<Ctx, SystemClock> {
	pub fn new(registry: Arc<CommandRegistry<Ctx>>, default_cooldown: Duration) -> Self {
		Self::with_clock(registry, default_cooldown, SystemClock)
	}
}

impl<Ctx: Send + Sync + 'static, C: Clock> Dispatcher<Ctx, C> {
	pub fn with_clock(registry: Arc<CommandRegistry<Ctx>>, default_cooldown: Duration, clock: C) -> Self {
		Self {
			registry,
			cooldowns: Cooldowns::new(clock),
			default_cooldown,
		}
	}

	/// Decides whether a command use may run, recording it for cooldown purposes if so.
	///
	/// Uses are admitted in the order this is called, so calling it for each event as it's received keeps cooldowns
	/// consistent with delivery order.
	pub async fn admit(&self, invocation: &CommandInvocation) -> Admission<Ctx> {
		let Some(handler) = self.registry.get(&invocation.name).await else {
			tracing::error!(command = %invocation.name, "No command matching the invocation was found");
			return Admission::Unknown;
		};

		let cooldown = handler.cooldown().unwrap_or(self.default_cooldown);
		match self
			.cooldowns
			.try_use(handler.name(), invocation.user_id, cooldown)
			.await
		{
			Ok(()) => Admission::Run(handler),
			Err(available_at) => Admission::CoolingDown(available_at),
		}
	}

	/// Admits the command use and handles it on its own task.
	pub async fn dispatch(
		&self,
		ctx: Arc<Ctx>,
		invocation: CommandInvocation,
		responder: Arc<dyn Responder>,
	) -> JoinHandle<()> {
		let admission = self.admit(&invocation).await;
		tokio::spawn(async move {
			match admission {
				Admission::Unknown => send_or_log(responder.as_ref(), Reply::ephemeral(COMMAND_FAILED)).await,
				Admission::CoolingDown(available_at) => {
					let message = cooldown_message(&invocation.name, available_at);
					send_or_log(responder.as_ref(), Reply::ephemeral(message)).await;
				}
				Admission::Run(handler) => {
					let command_name = invocation.name.clone();
					let handler_responder = Arc::clone(&responder);
					let task = async move { handler.execute(&ctx, &invocation, handler_responder.as_ref()).await };
					run_isolated(&format!("command `{}`", command_name), responder, COMMAND_FAILED, task).await;
				}
			}
		})
	}
}

/// Runs a handler so that an error or panic in it turns into a single failure reply and a log entry.
pub async fn run_isolated<F>(label: &str, responder: Arc<dyn Responder>, failure_message: &str, task: F)
where
	F: Future<Output = miette::Result<()>> + Send + 'static,
{
	let result = match tokio::spawn(task).await {
		Ok(result) => result,
		Err(join_error) => Err(miette!("The handler stopped unexpectedly: {}", join_error)),
	};
	if let Err(error) = result {
		tracing::error!(source = ?error, "An error occurred handling {}", label);
		send_or_log(responder.as_ref(), Reply::ephemeral(failure_message)).await;
	}
}

async fn send_or_log(responder: &dyn Responder, reply: Reply) {
	if let Err(error) = responder.send(reply).await {
		tracing::warn!(source = ?error, "Failed to send a reply");
	}
}
