//! Webrank CLI: run distributed PageRank in-process, over TCP, or sequentially
//!
//! Every subcommand writes the top ranks to the output file; rank 0 also
//! echoes them to stdout in the selected format.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use futures::future::try_join_all;
use std::path::PathBuf;
use tokio::process::{Child, Command};
use tracing::{info, Level};
use webrank::config::{ClusterConfig, RunConfig};
use webrank::rank::{run_coordinator, run_local, run_sequential, run_worker};
use webrank::COORDINATOR;
use webrank_algorithms::RankedNode;

#[derive(Parser)]
#[command(name = "webrank", version, about = "Distributed PageRank")]
struct Cli {
    /// Console output format for the top ranks
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// YAML file with `coordinator`, `workers` and `connect_timeout_ms`
    #[arg(long, global = true, env = "WEBRANK_CLUSTER_CONFIG")]
    cluster_config: Option<PathBuf>,

    /// Log per-partition and per-iteration detail
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    fn as_arg(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Adjacency list, one `source target...` line per node
    input: PathBuf,

    /// Result file
    output: PathBuf,

    /// Damping factor
    #[arg(default_value_t = 0.85)]
    damping_factor: f64,

    /// Number of iterations
    #[arg(default_value_t = 10)]
    iterations: usize,
}

impl RunArgs {
    fn to_config(&self) -> RunConfig {
        RunConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            damping_factor: self.damping_factor,
            iterations: self.iterations,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run all ranks as tasks in this process
    Local {
        /// Number of ranks
        #[arg(short = 'n', long, default_value_t = 1)]
        workers: usize,

        #[command(flatten)]
        args: RunArgs,
    },
    /// Run a single rank of a TCP group
    Run {
        /// This process's rank; 0 is the coordinator
        #[arg(long)]
        rank: usize,

        /// Group size (read by rank 0 only)
        #[arg(long)]
        workers: Option<usize>,

        /// Coordinator address (`host:port`)
        #[arg(long)]
        coordinator: Option<String>,

        #[command(flatten)]
        args: RunArgs,
    },
    /// Start one `run` process per rank and wait for all of them
    Launch {
        /// Number of ranks
        #[arg(short = 'n', long)]
        workers: usize,

        /// Coordinator address (`host:port`)
        #[arg(long)]
        coordinator: Option<String>,

        #[command(flatten)]
        args: RunArgs,
    },
    /// Single-process reference computation
    Sequential {
        #[command(flatten)]
        args: RunArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match &cli.command {
        Commands::Local { workers, args } => {
            let top = run_local(&args.to_config(), *workers).await?;
            print_ranking(&top, format)
        }
        Commands::Run {
            rank,
            workers,
            coordinator,
            args,
        } => {
            let cluster = cluster_config(&cli, *workers, coordinator.clone())?;
            if *rank == COORDINATOR {
                let top = run_coordinator(&args.to_config(), &cluster).await?;
                print_ranking(&top, format)
            } else {
                run_worker(&args.to_config(), &cluster, *rank).await?;
                Ok(())
            }
        }
        Commands::Launch {
            workers,
            coordinator,
            args,
        } => {
            let cluster = cluster_config(&cli, Some(*workers), coordinator.clone())?;
            launch(&cli, &cluster, args).await
        }
        Commands::Sequential { args } => {
            let top = run_sequential(&args.to_config())?;
            print_ranking(&top, format)
        }
    }
}

/// Cluster settings from `--cluster-config`, overridden by explicit flags
fn cluster_config(
    cli: &Cli,
    workers: Option<usize>,
    coordinator: Option<String>,
) -> anyhow::Result<ClusterConfig> {
    let mut cluster = match &cli.cluster_config {
        Some(path) => ClusterConfig::from_yaml_file(path)
            .with_context(|| format!("failed to read cluster config {}", path.display()))?,
        None => ClusterConfig::default(),
    };

    if let Some(workers) = workers {
        cluster.workers = workers;
    }
    if let Some(coordinator) = coordinator {
        cluster.coordinator = coordinator;
    }
    cluster.validate()?;
    Ok(cluster)
}

/// Spawn `cluster.workers` copies of this executable, one per rank.
///
/// If any rank exits unsuccessfully the remaining ones are killed.
async fn launch(cli: &Cli, cluster: &ClusterConfig, args: &RunArgs) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("cannot locate the webrank executable")?;
    info!(
        "Launching {} ranks around {}",
        cluster.workers, cluster.coordinator
    );

    let mut ranks = Vec::with_capacity(cluster.workers);
    for rank in 0..cluster.workers {
        let mut command = Command::new(&exe);
        command
            .arg("--format")
            .arg(cli.format.as_arg())
            .arg("run")
            .arg("--rank")
            .arg(rank.to_string())
            .arg("--workers")
            .arg(cluster.workers.to_string())
            .arg("--coordinator")
            .arg(&cluster.coordinator)
            .arg(&args.input)
            .arg(&args.output)
            .arg(args.damping_factor.to_string())
            .arg(args.iterations.to_string())
            .kill_on_drop(true);
        if let Some(path) = &cli.cluster_config {
            command.arg("--cluster-config").arg(path);
        }
        if cli.verbose {
            command.arg("--verbose");
        }

        let child = command
            .spawn()
            .with_context(|| format!("failed to start rank {}", rank))?;
        ranks.push(wait_rank(child, rank));
    }

    try_join_all(ranks).await?;
    info!("All {} ranks finished", cluster.workers);
    Ok(())
}

async fn wait_rank(mut child: Child, rank: usize) -> anyhow::Result<()> {
    let status = child.wait().await?;
    if !status.success() {
        return Err(anyhow!("rank {} exited with {}", rank, status));
    }
    Ok(())
}

fn print_ranking(top: &[RankedNode], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(top)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Node", "Rank"]);
            for entry in top {
                table.add_row(vec![entry.node.to_string(), entry.rank.to_string()]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}
