// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use divibly::{ChannelList, Config};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "divibly")]
#[command(about = "A simple DVB-T viewer")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Path to a zap-format channels.conf
    channels: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging to file (divibly_debug.log)
    #[arg(long)]
    debug_log: bool,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channel name to start on (case-insensitive)
    #[arg(long)]
    channel: Option<String>,

    /// Print the parsed channel table and exit
    #[arg(short, long)]
    list: bool,
}

fn print_channels(channels: &ChannelList) {
    if channels.is_empty() {
        println!("No channels found.");
        return;
    }

    println!(
        "{:>3}  {:<24} {:>11}  {:>9}  {:>7}",
        "#", "NAME", "FREQUENCY", "BANDWIDTH", "PROGRAM"
    );
    for (index, channel) in channels.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>7.1} MHz  {:>5} MHz  {:>7}",
            index + 1,
            channel.name,
            channel.frequency as f64 / 1_000_000.0,
            channel.bandwidth,
            channel.program
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.debug_log {
        let file = File::create("divibly_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(EnvFilter::from_default_env().add_directive("divibly=debug".parse()?))
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&config_path)?,
    };
    tracing::debug!("Using config from {}", config_path.display());

    let channels = ChannelList::load(&cli.channels, config.tuning.default_bandwidth_mhz)?;

    if cli.list {
        print_channels(&channels);
        return Ok(());
    }

    let start = cli
        .channel
        .as_deref()
        .map(|name| {
            channels
                .find(name)
                .ok_or_else(|| anyhow::anyhow!("No channel named '{}' in {}", name, cli.channels.display()))
        })
        .transpose()?;

    divibly::run_tui(config, channels, start).await
}
