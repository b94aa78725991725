// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::{IntoDiagnostic, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs::read_to_string;

/// A sound the bot offers to add. Loaded from the sounds file and never modified afterward.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SoundTemplate {
	pub name: String,
	pub sound_id: String,
	/// Audio payload as a data URI, sent to Discord when creating the sound.
	#[serde(default)]
	pub sound: Option<String>,
	#[serde(default)]
	pub volume: Option<f64>,
	#[serde(default)]
	pub emoji_id: Option<String>,
	#[serde(default)]
	pub emoji_name: Option<String>,
	pub category: String,
	pub custom_id: String,
}

/// A sound that exists on a guild's soundboard.
///
/// Deserializing a Discord soundboard sound object into this type keeps only the name, sound ID, and emoji; everything
/// else in the payload is dropped.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CatalogEntry {
	pub name: String,
	pub sound_id: String,
	#[serde(default)]
	pub emoji_id: Option<String>,
	#[serde(default)]
	pub emoji_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Category {
	pub id: String,
	pub name: String,
}

/// The read-only set of offered sounds and their categories.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
	sounds: Vec<SoundTemplate>,
	categories: Vec<Category>,
}

impl StaticCatalog {
	pub fn new(sounds: Vec<SoundTemplate>, categories: Vec<Category>) -> miette::Result<Self> {
		let mut names = HashSet::new();
		let mut custom_ids = HashSet::new();
		for sound in sounds.iter() {
			if sound.name.trim().is_empty() {
				bail!("A sound with custom ID `{}` has an empty name", sound.custom_id);
			}
			if !names.insert(sound.name.as_str()) {
				bail!("The sound name `{}` is used more than once", sound.name);
			}
			if !custom_ids.insert(sound.custom_id.as_str()) {
				bail!("The custom ID `{}` is used by more than one sound", sound.custom_id);
			}
		}

		Ok(Self { sounds, categories })
	}

	pub async fn load(sounds_path: impl AsRef<Path>, categories_path: impl AsRef<Path>) -> miette::Result<Self> {
		let sounds_contents = read_to_string(sounds_path.as_ref()).await.into_diagnostic()?;
		let sounds: Vec<SoundTemplate> = serde_json::from_str(&sounds_contents).into_diagnostic()?;
		let categories_contents = read_to_string(categories_path.as_ref()).await.into_diagnostic()?;
		let categories: Vec<Category> = serde_json::from_str(&categories_contents).into_diagnostic()?;

		let catalog = Self::new(sounds, categories)?;
		tracing::info!(
			sounds = catalog.sounds.len(),
			categories = catalog.categories.len(),
			path = %sounds_path.as_ref().display(),
			"Loaded the sound catalog"
		);
		Ok(catalog)
	}

	pub fn is_empty(&self) -> bool {
		self.sounds.is_empty()
	}

	pub fn sounds(&self) -> &[SoundTemplate] {
		&self.sounds
	}

	pub fn find_by_custom_id(&self, custom_id: &str) -> Option<&SoundTemplate> {
		self.sounds.iter().find(|sound| sound.custom_id == custom_id)
	}

	/// Gets the display name for a category, falling back to the category ID when no metadata exists for it.
	pub fn category_name<'a>(&'a self, category_id: &'a str) -> &'a str {
		self.categories
			.iter()
			.find(|category| category.id == category_id)
			.map(|category| category.name.as_str())
			.unwrap_or(category_id)
	}

	/// Groups the sounds by category, in the order each category first appears in the sound list.
	pub fn sounds_by_category(&self) -> Vec<(&str, Vec<&SoundTemplate>)> {
		let mut groups: Vec<(&str, Vec<&SoundTemplate>)> = Vec::new();
		for sound in self.sounds.iter() {
			match groups.iter_mut().find(|(category, _)| *category == sound.category) {
				Some((_, sounds)) => sounds.push(sound),
				None => groups.push((sound.category.as_str(), vec![sound])),
			}
		}
		groups
	}
}
