// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::timestamp::relative_timestamp;
use crate::soundboard::engine::Notice;
use chrono::{DateTime, Utc};

pub const NO_SOUNDS_AVAILABLE: &str = "⚠️ No legendary phrases available at the moment!";
pub const UNABLE_TO_LOAD_SOUNDS: &str =
	"❌ Unable to load information about the current server's soundboard sounds. Please try again later.";
pub const AVAILABLE_SOUNDS_HEADER: &str = "Here are available legend phrases:";
pub const SOUND_NOT_FOUND: &str =
	"❌ Sound not found. Please restart the command by sending `/start` again and try once more.";
pub const COMMAND_FAILED: &str = "❌ An error occurred while executing this command!";
pub const UNEXPECTED_ERROR: &str = "❌ An unexpected error occurred. Please restart the command using `/start` and try again. If the issue persists, please try again later.";
pub const GUILD_ONLY: &str = "⚠️ This can only be used in a server.";

pub fn notice_message(notice: &Notice) -> String {
	match notice {
		Notice::Added { name } => format!("✅ Sound `{}` was successfully **added** to the current server's soundboard!", name),
		Notice::Removed { name } => format!(
			"⚠️ Sound `{}` was successfully **removed** from the current server's soundboard!",
			name
		),
		Notice::Duplicate { name } => format!(
			"⚠️ The sound `{}` already exists in the current server's soundboard!",
			name
		),
		Notice::CapacityFull { tier, limit } => format!(
			"⚠️ The current server has reached its soundboard sound limit. The server's premium tier (boost level) is `{:?}`, which sets the limit to `{}` sounds.",
			tier, limit
		),
		Notice::LimitReached => String::from("⚠️ The current server has reached its soundboard sound limit!"),
		Notice::Failed => String::from(UNEXPECTED_ERROR),
	}
}

pub fn cooldown_message(command_name: &str, available_at: DateTime<Utc>) -> String {
	format!(
		"⚠️ Please wait, you are on a cooldown for `{}`. You can use it again {}.",
		command_name,
		relative_timestamp(available_at)
	)
}

pub fn category_header(category_name: &str) -> String {
	format!("## {}:", category_name)
}

pub fn unknown_command_message(command_name: &str) -> String {
	format!("⚠️ There is no command with name `{}`!", command_name)
}

pub fn command_reloaded_message(command_name: &str) -> String {
	format!("✅ Command `{}` was successfully reloaded!", command_name)
}

pub fn command_reload_failed_message(command_name: &str, error: &miette::Report) -> String {
	format!(
		"❌ An error occurred while reloading a command `{}`:\n`{}`",
		command_name, error
	)
}
