mod serve;
mod user;

use clap::{Arg, Command};

use gari::{config, Config};

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &'static str = env!("CARGO_PKG_AUTHORS");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // If executed in a context where config file is available then some
    // additional context will be provided. Otherwise the config file path
    // can still be provided through the `--config` argument.
    let mut config: Config = config::load().unwrap_or_default();

    let matches = cmd().get_matches();

    // Load the proper config if proper argument is provided.
    if let Some(config_path) = matches.get_one::<String>("config") {
        config = config::load_from(config_path)?;
    }

    match matches.subcommand() {
        Some(("serve", m)) => serve::run(m, config).await?,
        Some(("user", m)) => user::run(m, &config).await?,
        _ => unimplemented!(),
    }

    Ok(())
}

pub fn cmd() -> Command {
    Command::new("gari")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .infer_subcommands(true)
        .version(VERSION)
        .author(AUTHORS)
        .about("Vehicle marketplace catalog and media backend")
        .subcommand(serve::cmd())
        .subcommand(user::cmd())
        .arg(Arg::new("config").long("config").value_name("PATH"))
        .arg(
            Arg::new("verbosity")
                .long("verbosity")
                .short('v')
                .display_order(100)
                .value_name("level")
                .default_value("info")
                .value_parser(["trace", "debug", "info", "warn", "error", "none"])
                .global(true)
                .help("Set the verbosity of the log output"),
        )
}
