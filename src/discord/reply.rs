// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::responses::notice_message;
use crate::soundboard::engine::{Notice, Notifier};
use async_trait::async_trait;
use miette::IntoDiagnostic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use twilight_http::client::Client;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ApplicationMarker, InteractionMarker};
use twilight_util::builder::InteractionResponseDataBuilder;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
	pub content: String,
	pub ephemeral: bool,
}

impl Reply {
	pub fn ephemeral(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			ephemeral: true,
		}
	}

	pub fn public(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			ephemeral: false,
		}
	}
}

/// Sends messages back to the user who triggered an interaction.
#[async_trait]
pub trait Responder: Send + Sync {
	/// The first message sent answers the interaction; any later ones are sent as follow-ups.
	async fn send(&self, reply: Reply) -> miette::Result<()>;
}

pub struct InteractionResponder {
	http_client: Arc<Client>,
	application_id: Id<ApplicationMarker>,
	interaction_id: Id<InteractionMarker>,
	token: String,
	responded: AtomicBool,
}

impl InteractionResponder {
	pub fn new(
		http_client: Arc<Client>,
		application_id: Id<ApplicationMarker>,
		interaction_id: Id<InteractionMarker>,
		token: String,
	) -> Self {
		Self {
			http_client,
			application_id,
			interaction_id,
			token,
			responded: AtomicBool::new(false),
		}
	}
}

#[async_trait]
impl Responder for InteractionResponder {
	async fn send(&self, reply: Reply) -> miette::Result<()> {
		let interaction_client = self.http_client.interaction(self.application_id);
		let flags = if reply.ephemeral {
			MessageFlags::EPHEMERAL
		} else {
			MessageFlags::empty()
		};

		if self.responded.load(Ordering::Acquire) {
			interaction_client
				.create_followup(&self.token)
				.content(&reply.content)
				.flags(flags)
				.await
				.into_diagnostic()?;
			return Ok(());
		}

		let response = InteractionResponseDataBuilder::new()
			.content(reply.content)
			.flags(flags)
			.build();
		let response = InteractionResponse {
			kind: InteractionResponseType::ChannelMessageWithSource,
			data: Some(response),
		};
		interaction_client
			.create_response(self.interaction_id, &self.token, &response)
			.await
			.into_diagnostic()?;
		self.responded.store(true, Ordering::Release);
		Ok(())
	}
}

#[async_trait]
impl Notifier for InteractionResponder {
	async fn notify(&self, notice: Notice) {
		if let Err(error) = self.send(Reply::ephemeral(notice_message(&notice))).await {
			tracing::warn!(source = ?error, ?notice, "Failed to deliver a notice");
		}
	}
}
