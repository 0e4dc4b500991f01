use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use portfolio_harvester::config::{Cli, Command, StatsArgs};
use portfolio_harvester::harvest::report::{records_with_stack, top_stacks};
use portfolio_harvester::runner::{read_output, run};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("portfolio_harvester=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            let config = args.build_config();
            info!(index = %config.index_url, "Fetching portfolio list");
            let output = run(&config).await.context("harvest failed")?;
            println!("{}", serde_json::to_string_pretty(&output.meta)?);
        }
        Command::Stats(args) => stats(args).await?,
    }
    Ok(())
}

async fn stats(args: StatsArgs) -> Result<()> {
    let output = read_output(&args.input)
        .await
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    match args.stack {
        Some(stack) => {
            for record in records_with_stack(&output.records, &stack) {
                println!("{}\t{}", record.target.name, record.target.url);
            }
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&output.meta)?);
            for entry in top_stacks(&output.records, args.limit) {
                println!("{:>6}  {}", entry.count, entry.stack);
            }
        }
    }
    Ok(())
}
