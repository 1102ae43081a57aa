use crate::prelude::*;
use clap::Parser;

mod catalog;
mod config;
mod error;
mod prelude;
mod server;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Serve Hearthstone card searches filtered by class, mana cost, and rarity as HTML tables"
)]
pub struct App {
    #[clap(flatten)]
    config: config::Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    color_eyre::install()?;

    let app = App::parse();

    server::run(app.config).await
}
