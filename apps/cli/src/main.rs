//! pressrun CLI — single-author blog publishing tool.
//!
//! Turns authored Markdown documents and notebooks into published
//! articles, preview briefs, media images, and an RSS feed.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
