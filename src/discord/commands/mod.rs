// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::dispatcher::CommandHandler;
use super::state::BotState;
use std::sync::Arc;
use twilight_model::application::command::Command;

mod reload;
mod start;

pub fn command_definitions() -> Vec<Command> {
	vec![reload::command_definition(), start::command_definition()]
}

/// Constructs a fresh handler for the named command.
pub fn new_handler(command_name: &str) -> Option<Arc<dyn CommandHandler<BotState>>> {
	match command_name {
		reload::NAME => Some(Arc::new(reload::ReloadCommand)),
		start::NAME => Some(Arc::new(start::StartCommand)),
		_ => None,
	}
}

pub fn command_handlers() -> Vec<Arc<dyn CommandHandler<BotState>>> {
	[reload::NAME, start::NAME]
		.into_iter()
		.filter_map(new_handler)
		.collect()
}
