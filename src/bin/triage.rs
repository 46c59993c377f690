//! triage CLI: serve the review queue or inspect its directories.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use triage_rs::config::Config;
use triage_rs::engine::Engine;
use triage_rs::storage::StageStore;
use triage_rs::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "triage", about = "Review items and move them between stages")]
struct Cli {
    /// Optional TOML config file (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the index from disk, start the move processor and serve HTTP
    Serve {
        /// Data root holding the review/accept/reject directories
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Listen address
        #[arg(long)]
        listen: Option<String>,
        /// Move queue capacity
        #[arg(long)]
        queue_capacity: Option<usize>,
    },
    /// Report item counts per stage directory and IDs found in more than one
    Status {
        /// Data root holding the review/accept/reject directories
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve {
            data_dir,
            listen,
            queue_capacity,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(addr) = listen {
                config.listen_addr = addr;
            }
            if let Some(capacity) = queue_capacity {
                config.queue_capacity = capacity;
            }
            cmd_serve(config).await
        }
        Command::Status { data_dir, json } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            cmd_status(config, json).await
        }
    }
}

async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "triage".to_string(),
        default_level: config.log_level.clone(),
    })?;

    let store = StageStore::new(&config.data_dir);
    let (engine, processor) = Engine::bootstrap(store, config.queue_capacity).await?;
    let processor = processor.spawn();

    let ctrl = engine.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("interrupt received");
        ctrl.shutdown();
    });

    triage_rs::http::run_server(&config.listen_addr, engine.clone()).await?;

    // The server can also stop on a bind or accept error; make sure the
    // processor stops too.
    engine.shutdown();
    processor.await??;
    tracing::info!("terminated");
    Ok(())
}

async fn cmd_status(config: Config, json: bool) -> anyhow::Result<()> {
    let store = StageStore::new(&config.data_dir);
    let layout = store.audit().await;
    let conflicts = layout.conflicts();

    if json {
        let report = serde_json::json!({
            "data_dir": config.data_dir,
            "counts": layout
                .counts
                .iter()
                .map(|(stage, count)| (stage.dir_name(), *count))
                .collect::<std::collections::BTreeMap<_, _>>(),
            "conflicts": conflicts
                .iter()
                .map(|(id, stages)| serde_json::json!({ "id": id, "stages": stages }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Data dir: {}", config.data_dir.display());
    println!("{:<8}  ITEMS", "STAGE");
    println!("{}", "-".repeat(16));
    for (stage, count) in &layout.counts {
        println!("{:<8}  {}", stage.dir_name(), count);
    }

    if conflicts.is_empty() {
        println!("\nNo IDs found in more than one stage.");
    } else {
        println!("\n{} ID(s) found in more than one stage:", conflicts.len());
        for (id, stages) in &conflicts {
            let names: Vec<&str> = stages.iter().map(|s| s.dir_name()).collect();
            println!("  {id}: {}", names.join(", "));
        }
    }

    Ok(())
}
