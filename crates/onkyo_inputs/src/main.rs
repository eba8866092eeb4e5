use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use onkyo_inputs::Config;
use onkyo_inputs::DisplayOption;
use onkyo_inputs::LabelTable;
use onkyo_inputs::config::ReceiverConfig;
use onkyo_inputs::eiscp::DEFAULT_PORT;
use onkyo_inputs::eiscp::TcpConnector;
use onkyo_inputs::labels::render_options;
use onkyo_inputs::query_custom_names;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// List the inputs of an Onkyo receiver along with their custom names
#[derive(Debug, Parser)]
#[command(name = "onkyo-inputs", version, about)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Receiver to query, by its name in the config file
    #[arg(short, long, conflicts_with = "host")]
    receiver: Option<String>,

    /// Receiver hostname or IP address, instead of a configured receiver
    #[arg(long)]
    host: Option<String>,

    /// Receiver port, used with --host
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Print the input list as JSON
    #[arg(long)]
    json: bool,

    /// Print only the preferred name of each input
    #[arg(long, conflicts_with = "json")]
    names_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(&config);

    tracing::info!("onkyo-inputs starting");
    if let Some(path) = &args.config {
        tracing::info!("Loaded config from: {}", path.display());
    }

    let receiver = match &args.host {
        Some(host) => ReceiverConfig {
            host: host.clone(),
            port: args.port,
            inputs: None,
        },
        None => config
            .receiver(args.receiver.as_deref())
            .context("No receiver to query; pass --host or configure one")?
            .clone(),
    };

    let table = LabelTable::onkyo().with_overrides(&config.labels);
    let ids = receiver.inputs.clone().unwrap_or_else(|| table.ids());
    for id in &ids {
        if table.default_label(*id).is_none() {
            tracing::warn!("Input {} has no default label and will not be listed", id);
        }
    }

    tracing::info!(
        "Querying {} inputs on {}:{}",
        ids.len(),
        receiver.host,
        receiver.port
    );
    let connector = TcpConnector::new(
        receiver.host.clone(),
        receiver.port,
        config.query.connect_timeout(),
    );
    let names = query_custom_names(&connector, &ids, &config.query.options()).await;

    if args.names_only {
        for (id, name) in table.display_names(&names) {
            if ids.contains(&id) {
                println!("{}  {}", id, name);
            }
        }
        return Ok(());
    }

    let options: Vec<DisplayOption> = table
        .display_options(&names)
        .into_iter()
        .filter(|option| ids.contains(&option.id))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&options)?);
    } else {
        print!("{}", render_options(&options));
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let mut targets = Targets::new().with_default(LevelFilter::from(config.logging.level));
    for (target, level) in &config.logging.overrides {
        targets = targets.with_target(target.clone(), LevelFilter::from(*level));
    }

    // Logs go to stderr so stdout stays clean for the listing.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(targets)
        .init();
}
