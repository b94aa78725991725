// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stand-ins for the Discord soundboard API and for user notices.

use super::client::{ApiError, MAX_SOUNDBOARD_SOUNDS_REACHED, SoundboardApi};
use super::engine::{Notice, Notifier};
use super::model::{CatalogEntry, SoundTemplate};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
	List,
	Create(String),
	Delete(String),
}

pub fn limit_reached() -> ApiError {
	application_error(400, MAX_SOUNDBOARD_SOUNDS_REACHED)
}

pub fn application_error(status: u16, code: u64) -> ApiError {
	ApiError::Application {
		status,
		code: Some(code),
		message: format!("error {}", code),
	}
}

/// A fake soundboard holding its sounds in memory.
///
/// Sounds created from `with_remote` get the sound ID `remote-<name>`. When a capacity is enforced, creating a sound on
/// a full soundboard fails with the limit-reached code, just like Discord does. Scripted failures take precedence.
#[derive(Debug, Default)]
pub struct FakeSoundboard {
	state: Mutex<FakeState>,
}

#[derive(Debug, Default)]
struct FakeState {
	remote: Vec<CatalogEntry>,
	capacity: Option<usize>,
	calls: Vec<Call>,
	list_failure: Option<ApiError>,
	create_failures: VecDeque<ApiError>,
	delete_failure: Option<ApiError>,
}

fn remote_entry(name: &str) -> CatalogEntry {
	CatalogEntry {
		name: name.to_string(),
		sound_id: format!("remote-{}", name),
		emoji_id: None,
		emoji_name: None,
	}
}

impl FakeSoundboard {
	pub fn with_remote<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
		let fake = Self::default();
		fake.state.lock().unwrap().remote = names.into_iter().map(|name| remote_entry(name.as_ref())).collect();
		fake
	}

	pub fn enforcing_capacity(self, capacity: usize) -> Self {
		self.state.lock().unwrap().capacity = Some(capacity);
		self
	}

	pub fn fail_next_list(&self, error: ApiError) {
		self.state.lock().unwrap().list_failure = Some(error);
	}

	pub fn fail_next_create(&self, error: ApiError) {
		self.state.lock().unwrap().create_failures.push_back(error);
	}

	pub fn fail_next_delete(&self, error: ApiError) {
		self.state.lock().unwrap().delete_failure = Some(error);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.state.lock().unwrap().calls.clone()
	}

	pub fn remote_names(&self) -> Vec<String> {
		self.state
			.lock()
			.unwrap()
			.remote
			.iter()
			.map(|entry| entry.name.clone())
			.collect()
	}
}

#[async_trait]
impl SoundboardApi for FakeSoundboard {
	async fn list(&self, _guild_id: Id<GuildMarker>) -> Result<Vec<CatalogEntry>, ApiError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::List);
		if let Some(error) = state.list_failure.take() {
			return Err(error);
		}
		Ok(state.remote.clone())
	}

	async fn create(&self, _guild_id: Id<GuildMarker>, template: &SoundTemplate) -> Result<CatalogEntry, ApiError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Create(template.name.clone()));
		if let Some(error) = state.create_failures.pop_front() {
			return Err(error);
		}
		if state.capacity.is_some_and(|capacity| state.remote.len() >= capacity) {
			return Err(limit_reached());
		}
		if state.remote.iter().any(|entry| entry.name == template.name) {
			return Err(application_error(400, 50035));
		}
		let entry = remote_entry(&template.name);
		state.remote.push(entry.clone());
		Ok(entry)
	}

	async fn delete(&self, _guild_id: Id<GuildMarker>, sound_id: &str) -> Result<(), ApiError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push(Call::Delete(sound_id.to_string()));
		if let Some(error) = state.delete_failure.take() {
			return Err(error);
		}
		let Some(position) = state.remote.iter().position(|entry| entry.sound_id == sound_id) else {
			return Err(application_error(404, 10097));
		};
		state.remote.remove(position);
		Ok(())
	}
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
	notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
	pub fn notices(&self) -> Vec<Notice> {
		self.notices.lock().unwrap().clone()
	}
}

#[async_trait]
impl Notifier for RecordingNotifier {
	async fn notify(&self, notice: Notice) {
		self.notices.lock().unwrap().push(notice);
	}
}
