use clap::{ArgMatches, Command};

use gari::Config;

pub fn cmd() -> Command {
    Command::new("serve")
        .display_order(1)
        .about("Start the backend server using the loaded configuration")
}

pub async fn run(_matches: &ArgMatches, config: Config) -> anyhow::Result<()> {
    let router = gari::Router::new();
    let router = gari::router(router, &config);

    gari::axum::start(router, config).await?;

    Ok(())
}
