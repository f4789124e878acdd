// Entrypoint for the catbox CLI.
// - Logging goes to stderr, filtered by `RUST_LOG` (default `warn`).
// - Settings come from `~/.catbox.json` plus `CATBOX_*` env overrides.

use anyhow::Context;
use catbox_cli::{ui::main_menu, CatboxClient, Settings};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load().context("Failed to load settings")?;
    let api = CatboxClient::from_settings(&settings).context("Failed to build HTTP client")?;

    // Blocks until the user picks "Exit".
    main_menu(api)?;
    Ok(())
}
