//! choplink-cli: restaurant and menu administration from the terminal.
//! Every command goes through the cached query layer of the `choplink` crate.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;

use clap::Parser;

use args::{Cli, Commands};
use choplink::{config, infra::telemetry};
use client::{CliError, Ctx};
use handlers::{menu, restaurants};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = config::load(&cli.settings)?;
    telemetry::init(&settings.logging)?;
    let ctx = Ctx::new(&settings)?;

    match cli.command {
        Commands::Restaurants(cmd) => restaurants::handle(&ctx, cmd.action).await?,
        Commands::Menu(cmd) => menu::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
