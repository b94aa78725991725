// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::soundboard::model::SoundTemplate;
use twilight_model::channel::message::EmojiReactionType;
use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};
use twilight_model::id::Id;

/// Discord's limit of buttons in a single action row.
pub const MAX_BUTTONS_PER_ROW: usize = 5;
/// Discord's limit of action rows in a single message.
pub const MAX_ROWS_PER_MESSAGE: usize = 5;

pub fn sound_button(sound: &SoundTemplate) -> Component {
	Component::Button(Button {
		custom_id: Some(sound.custom_id.clone()),
		disabled: false,
		emoji: sound_emoji(sound),
		label: Some(sound.name.clone()),
		style: ButtonStyle::Secondary,
		url: None,
		sku_id: None,
	})
}

fn sound_emoji(sound: &SoundTemplate) -> Option<EmojiReactionType> {
	let custom_emoji_id = sound
		.emoji_id
		.as_deref()
		.and_then(|id| id.parse::<u64>().ok())
		.and_then(Id::new_checked);
	match (custom_emoji_id, sound.emoji_name.as_ref()) {
		(Some(id), name) => Some(EmojiReactionType::Custom {
			animated: false,
			id,
			name: name.cloned(),
		}),
		(None, Some(name)) if !name.is_empty() => Some(EmojiReactionType::Unicode { name: name.clone() }),
		_ => None,
	}
}

/// Lays out buttons for the given sounds, split into messages that each fit within Discord's component limits.
///
/// Every returned entry is the component list for one message.
pub fn sound_button_pages(sounds: &[&SoundTemplate]) -> Vec<Vec<Component>> {
	sounds
		.chunks(MAX_BUTTONS_PER_ROW * MAX_ROWS_PER_MESSAGE)
		.map(|message_sounds| {
			message_sounds
				.chunks(MAX_BUTTONS_PER_ROW)
				.map(|row_sounds| {
					Component::ActionRow(ActionRow {
						components: row_sounds.iter().map(|sound| sound_button(sound)).collect(),
					})
				})
				.collect()
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::soundboard::model::tests::template;
	use rstest::rstest;

	fn row_sizes(page: &[Component]) -> Vec<usize> {
		page.iter()
			.map(|component| match component {
				Component::ActionRow(row) => row.components.len(),
				_ => panic!("expected only action rows"),
			})
			.collect()
	}

	#[rstest]
	#[case(0, vec![])]
	#[case(1, vec![vec![1]])]
	#[case(5, vec![vec![5]])]
	#[case(6, vec![vec![5, 1]])]
	#[case(25, vec![vec![5, 5, 5, 5, 5]])]
	#[case(27, vec![vec![5, 5, 5, 5, 5], vec![2]])]
	#[case(60, vec![vec![5, 5, 5, 5, 5], vec![5, 5, 5, 5, 5], vec![5, 5]])]
	#[case(61, vec![vec![5, 5, 5, 5, 5], vec![5, 5, 5, 5, 5], vec![5, 5, 1]])]
	fn pages_respect_component_limits(#[case] count: usize, #[case] expected: Vec<Vec<usize>>) {
		let sounds: Vec<SoundTemplate> = (0..count).map(|index| template(&format!("s{}", index), "memes")).collect();
		let sound_refs: Vec<&SoundTemplate> = sounds.iter().collect();

		let pages = sound_button_pages(&sound_refs);
		let layout: Vec<Vec<usize>> = pages.iter().map(|page| row_sizes(page)).collect();
		assert_eq!(layout, expected);
	}

	#[test]
	fn buttons_keep_catalog_order_and_ids() {
		let sounds = [template("a", "memes"), template("b", "memes")];
		let sound_refs: Vec<&SoundTemplate> = sounds.iter().collect();
		let pages = sound_button_pages(&sound_refs);

		let Component::ActionRow(row) = &pages[0][0] else {
			panic!("expected an action row");
		};
		let ids: Vec<Option<&str>> = row
			.components
			.iter()
			.map(|component| match component {
				Component::Button(button) => button.custom_id.as_deref(),
				_ => None,
			})
			.collect();
		assert_eq!(ids, vec![Some("sound/a"), Some("sound/b")]);
	}

	#[test]
	fn unicode_and_custom_emoji() {
		let mut unicode = template("a", "memes");
		unicode.emoji_name = Some(String::from("🎺"));
		assert_eq!(
			sound_emoji(&unicode),
			Some(EmojiReactionType::Unicode {
				name: String::from("🎺")
			})
		);

		let mut custom = template("b", "memes");
		custom.emoji_id = Some(String::from("123456"));
		custom.emoji_name = Some(String::from("trumpet"));
		assert_eq!(
			sound_emoji(&custom),
			Some(EmojiReactionType::Custom {
				animated: false,
				id: Id::new(123456),
				name: Some(String::from("trumpet")),
			})
		);

		assert_eq!(sound_emoji(&template("c", "memes")), None);
	}
}
