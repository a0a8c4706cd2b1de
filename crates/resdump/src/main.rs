mod app;
mod cli;

use anyhow::Result;
use clap::Parser;

use crate::{app::App, cli::Cli};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut app = App::new(&cli)?;
    app.init();
    app.run(&cli.command)
}
