// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use soundboard_rotator::config::parse_config;
use soundboard_rotator::discord::{run_bot, set_up_client};
use soundboard_rotator::soundboard::model::StaticCatalog;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from("config.kdl"));
	let config = Arc::new(parse_config(&config_path).await?);

	let catalog = StaticCatalog::load(&config.catalog.sounds_file, &config.catalog.categories_file).await?;

	let http_client = set_up_client(&config);
	run_bot(config, http_client, catalog).await
}
