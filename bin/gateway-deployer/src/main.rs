// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use slog::info;

fn parse_log_level(s: &str) -> anyhow::Result<slog::Level> {
    s.parse().map_err(|_| anyhow::anyhow!("Invalid log level"))
}

#[derive(Debug, Parser)]
#[clap(about, version)]
/// Builds deployment topologies for the gateway
enum Args {
    /// Generates the JSON schema of the deployment document.
    Schema,
    /// Assembles a deployment topology from a configuration file and
    /// writes it to stdout as JSON.
    Synth {
        /// Path to the deployment configuration (TOML)
        #[clap(action)]
        config_path: PathBuf,

        /// Emit the document on a single line instead of pretty-printing
        #[clap(long, action)]
        compact: bool,

        /// Logging level for the deployer
        #[clap(long, default_value_t = slog::Level::Info, value_parser = parse_log_level)]
        log_level: slog::Level,
    },
}

fn build_logger(level: slog::Level) -> slog::Logger {
    use slog::Drain;

    let main_drain = if atty::is(atty::Stream::Stderr) {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        slog_async::Async::new(drain)
            .overflow_strategy(slog_async::OverflowStrategy::Block)
            .build_no_guard()
    } else {
        let drain =
            slog_bunyan::with_name("gateway-deployer", std::io::stderr())
                .build()
                .fuse();
        slog_async::Async::new(drain)
            .overflow_strategy(slog_async::OverflowStrategy::Block)
            .build_no_guard()
    };

    let filtered_main = slog::LevelFilter::new(main_drain, level);

    slog::Logger::root(filtered_main.fuse(), slog::o!())
}

fn run_schema() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(gateway_api_types::Deployment);
    serde_json::to_writer_pretty(std::io::stdout(), &schema)
        .context("Cannot generate deployment schema")?;
    println!();
    Ok(())
}

fn run_synth(
    config_path: PathBuf,
    compact: bool,
    log: slog::Logger,
) -> anyhow::Result<()> {
    let raw = gateway_config_toml::parse(&config_path).with_context(|| {
        format!("Failed to read configuration {}", config_path.display())
    })?;
    let (config, registry) = gateway_deployer::config::resolve(&raw)
        .context("Invalid deployment configuration")?;
    info!(log, "resolved configuration";
          "strategy" => %config.strategy,
          "region" => &config.region,
          "cidr" => %config.network_cidr);

    let deployment = gateway_deployer::assemble(&config, &registry, &log)
        .context("Failed to assemble deployment")?;
    info!(log, "assembled deployment";
          "base_endpoint" => &deployment.output.base_endpoint);

    // The document goes to stdout, logs to stderr, so the output stays
    // pipeable.
    if compact {
        serde_json::to_writer(std::io::stdout(), &deployment)?;
    } else {
        serde_json::to_writer_pretty(std::io::stdout(), &deployment)?;
    }
    println!();

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args {
        Args::Schema => run_schema(),
        Args::Synth { config_path, compact, log_level } => {
            let log = build_logger(log_level);
            run_synth(config_path, compact, log)
        }
    }
}
