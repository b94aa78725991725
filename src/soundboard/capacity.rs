// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::guild::PremiumTier;

pub const DEFAULT_NO_BOOST_LIMIT: usize = 8;
pub const DEFAULT_TIER_LIMITS: [usize; 4] = [8, 24, 36, 48];

/// Maps a guild's boost level to the number of soundboard sounds Discord allows it to have.
///
/// Unboosted guilds and guilds with a boost level Discord hasn't documented get the no-boost limit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CapacityPolicy {
	tier_limits: [usize; 4],
}

impl Default for CapacityPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_NO_BOOST_LIMIT, DEFAULT_TIER_LIMITS)
	}
}

impl CapacityPolicy {
	/// Creates a policy from configured limits. The no-boost limit takes the place of the first tier limit, and limits
	/// are raised where necessary so that a higher tier never allows fewer sounds than a lower one.
	pub fn new(no_boost_limit: usize, tier_limits: [usize; 4]) -> Self {
		let mut tier_limits = tier_limits;
		tier_limits[0] = no_boost_limit;
		for index in 1..tier_limits.len() {
			tier_limits[index] = tier_limits[index].max(tier_limits[index - 1]);
		}
		Self { tier_limits }
	}

	pub fn max_sounds(&self, tier: PremiumTier) -> usize {
		let index = match tier {
			PremiumTier::Tier1 => 1,
			PremiumTier::Tier2 => 2,
			PremiumTier::Tier3 => 3,
			_ => 0,
		};
		self.tier_limits[index]
	}
}
