//! End-to-end harvest run: index, resume, scheduler, aggregate, output.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::executor::HarvestExecutor;
use crate::harvest::aggregate::assemble;
use crate::harvest::checkpoint::CheckpointStore;
use crate::harvest::fetch::HttpFetcher;
use crate::harvest::index::load_index;
use crate::harvest::pipeline::HarvestPipeline;
use crate::model::HarvestOutput;
use crate::traits::{HarvestError, PageFetcher};

/// Runs a harvest with the HTTP fetchers described by `config`.
pub async fn run(config: &HarvestConfig) -> Result<HarvestOutput, HarvestError> {
    let index_fetcher = HttpFetcher::with_user_agent(config.index_timeout, &config.user_agent)
        .map_err(HarvestError::Client)?;
    let page_fetcher = HttpFetcher::with_user_agent(config.fetch_timeout, &config.user_agent)
        .map_err(HarvestError::Client)?;

    run_with(config, &index_fetcher, Arc::new(page_fetcher)).await
}

/// Runs a harvest with caller-supplied fetchers.
pub async fn run_with<I, F>(
    config: &HarvestConfig,
    index_fetcher: &I,
    page_fetcher: Arc<F>,
) -> Result<HarvestOutput, HarvestError>
where
    I: PageFetcher + ?Sized,
    F: PageFetcher + ?Sized,
{
    let targets = load_index(index_fetcher, &config.index_url).await?;

    let store = CheckpointStore::new(&config.checkpoint_path, &config.progress_path);
    let prior = if config.resume {
        store.load().await?.unwrap_or_default()
    } else {
        Vec::new()
    };

    let pipeline = HarvestPipeline::new(HarvestExecutor::new(page_fetcher))
        .with_window_size(config.window_size)
        .with_delay(config.window_delay)
        .with_checkpoint(store.clone(), config.checkpoint_every);

    info!(
        targets = targets.len(),
        window = pipeline.window_size(),
        "Starting harvest"
    );
    let run = pipeline.execute(&targets, &prior).await;

    let output = assemble(prior, run.records, Utc::now());
    write_output(&config.output_path, &output).await?;

    if let Err(e) = store.clear().await {
        warn!(error = %e, "Output written but checkpoint files could not be removed");
    }

    let stats = &output.meta.stats;
    info!(
        path = %config.output_path.display(),
        total = stats.total,
        ok = stats.successful,
        failed = stats.failed,
        with_email = stats.with_email,
        with_github = stats.with_github,
        with_stack = stats.with_stack,
        "Harvest complete"
    );
    Ok(output)
}

pub async fn write_output(path: &Path, output: &HarvestOutput) -> Result<(), HarvestError> {
    let body = serde_json::to_string_pretty(output)?;
    let io_err = |source| HarvestError::Output {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, body).await.map_err(io_err)
}

pub async fn read_output(path: &Path) -> Result<HarvestOutput, HarvestError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| HarvestError::Output {
            path: path.display().to_string(),
            source,
        })?;
    Ok(serde_json::from_str(&raw)?)
}
