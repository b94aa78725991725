// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use twilight_mention::fmt::Mention;
use twilight_mention::timestamp::{Timestamp, TimestampStyle};

/// Formats a time as a Discord timestamp that clients render relative to now ("in 3 seconds").
/// Times before the Unix epoch are clamped to it.
pub fn relative_timestamp(time: DateTime<Utc>) -> String {
	let unix_seconds = u64::try_from(time.timestamp()).unwrap_or(0);
	Timestamp::new(unix_seconds, Some(TimestampStyle::RelativeTime))
		.mention()
		.to_string()
}
