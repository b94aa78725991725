// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

pub trait Clock: Send + Sync + 'static {
	fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

type CommandCooldowns = HashMap<String, HashMap<Id<UserMarker>, DateTime<Utc>>>;

/// Tracks when each user last used each command.
///
/// An entry is dropped once its cooldown has passed, so the map only holds users who are currently cooling down.
pub struct Cooldowns<C: Clock = SystemClock> {
	clock: C,
	last_uses: Arc<Mutex<CommandCooldowns>>,
}

impl Default for Cooldowns<SystemClock> {
	fn default() -> Self {
		Self::new(SystemClock)
	}
}

impl<C: Clock> Cooldowns<C> {
	pub fn new(clock: C) -> Self {
		Self {
			clock,
			last_uses: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	/// Records a use of the command by the user, unless they're still cooling down from an earlier use.
	///
	/// Returns the time the user may use the command again when the use is refused.
	pub async fn try_use(
		&self,
		command_name: &str,
		user_id: Id<UserMarker>,
		cooldown: Duration,
	) -> Result<(), DateTime<Utc>> {
		let now = self.clock.now();
		let cooldown_delta = TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX);

		let mut last_uses = self.last_uses.lock().await;
		let command_uses = last_uses.entry(command_name.to_string()).or_default();
		if let Some(last_use) = command_uses.get(&user_id) {
			let available_at = last_use.checked_add_signed(cooldown_delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
			if now < available_at {
				return Err(available_at);
			}
		}
		command_uses.insert(user_id, now);
		drop(last_uses);

		tokio::spawn(expire_use(
			Arc::clone(&self.last_uses),
			command_name.to_string(),
			user_id,
			now,
			cooldown,
		));
		Ok(())
	}

	#[cfg(test)]
	async fn tracked_users(&self, command_name: &str) -> usize {
		self.last_uses
			.lock()
			.await
			.get(command_name)
			.map(|uses| uses.len())
			.unwrap_or(0)
	}
}

async fn expire_use(
	last_uses: Arc<Mutex<CommandCooldowns>>,
	command_name: String,
	user_id: Id<UserMarker>,
	used_at: DateTime<Utc>,
	cooldown: Duration,
) {
	sleep(cooldown).await;
	let mut last_uses = last_uses.lock().await;
	let Some(command_uses) = last_uses.get_mut(&command_name) else {
		return;
	};
	// A later use has its own expiry scheduled.
	if command_uses.get(&user_id) == Some(&used_at) {
		command_uses.remove(&user_id);
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use std::sync::Mutex as StdMutex;

	#[derive(Clone)]
	pub(crate) struct ManualClock {
		now: Arc<StdMutex<DateTime<Utc>>>,
	}

	impl ManualClock {
		pub(crate) fn new() -> Self {
			Self {
				now: Arc::new(StdMutex::new(Utc::now())),
			}
		}

		pub(crate) fn advance(&self, duration: Duration) {
			let mut now = self.now.lock().unwrap();
			*now += TimeDelta::from_std(duration).unwrap();
		}
	}

	impl Clock for ManualClock {
		fn now(&self) -> DateTime<Utc> {
			*self.now.lock().unwrap()
		}
	}

	const USER: Id<UserMarker> = Id::new(10);

	#[tokio::test]
	async fn second_use_within_cooldown_is_refused() {
		let clock = ManualClock::new();
		let cooldowns = Cooldowns::new(clock.clone());
		let cooldown = Duration::from_secs(5);

		assert!(cooldowns.try_use("start", USER, cooldown).await.is_ok());
		clock.advance(Duration::from_secs(2));

		let available_at = cooldowns.try_use("start", USER, cooldown).await.unwrap_err();
		assert_eq!(available_at, clock.now() + TimeDelta::seconds(3));
	}

	#[tokio::test]
	async fn use_after_cooldown_is_allowed() {
		let clock = ManualClock::new();
		let cooldowns = Cooldowns::new(clock.clone());
		let cooldown = Duration::from_secs(5);

		assert!(cooldowns.try_use("start", USER, cooldown).await.is_ok());
		clock.advance(Duration::from_secs(5));
		assert!(cooldowns.try_use("start", USER, cooldown).await.is_ok());
	}

	#[tokio::test]
	async fn cooldowns_are_per_user_and_per_command() {
		let cooldowns = Cooldowns::new(ManualClock::new());
		let cooldown = Duration::from_secs(5);

		assert!(cooldowns.try_use("start", USER, cooldown).await.is_ok());
		assert!(cooldowns.try_use("start", Id::new(11), cooldown).await.is_ok());
		assert!(cooldowns.try_use("reload", USER, cooldown).await.is_ok());
		assert!(cooldowns.try_use("start", USER, cooldown).await.is_err());
	}

	#[tokio::test(start_paused = true)]
	async fn entries_are_dropped_after_the_cooldown() {
		let cooldowns = Cooldowns::new(ManualClock::new());

		assert!(cooldowns.try_use("start", USER, Duration::from_secs(5)).await.is_ok());
		assert_eq!(cooldowns.tracked_users("start").await, 1);

		tokio::time::sleep(Duration::from_secs(6)).await;
		assert_eq!(cooldowns.tracked_users("start").await, 0);
	}
}
