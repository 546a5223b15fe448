use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use polkadothub_indexer::application::indexer::IndexingPipeline;
use polkadothub_indexer::application::pipeline::LogTaskMetrics;
use polkadothub_indexer::application::usecase::{
    BackfillUseCase, BackfillUseCaseConfig, PurgeUseCase, StartUseCase, SummarizeUseCase,
};
use polkadothub_indexer::config::{AppConfig, IndexTargets};
use polkadothub_indexer::infrastructure::chain::HttpChainClient;
use polkadothub_indexer::infrastructure::persistence::{DbPool, RepositoryFactory, Stores};
use polkadothub_indexer::utils::logging;

#[derive(Parser)]
#[command(name = "polkadothub-indexer", version, about = "Indexes a Polkadot-family chain into Postgres")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index new heights up to the chain head
    Start {
        /// Maximum heights to process, zero follows the head
        #[arg(long)]
        batch_size: Option<i64>,
    },
    /// Reindex heights produced by an older index version
    Backfill {
        #[arg(long)]
        parallel: bool,
        /// Ignore unfinished reindex reports
        #[arg(long)]
        force: bool,
        #[arg(long, value_delimiter = ',')]
        target_ids: Vec<i64>,
    },
    /// Delete sequences and hourly summaries past their retention
    Purge,
    /// Roll sequences into hourly and daily summaries
    Summarize,
    /// Run start, summarize and purge periodically until Ctrl+C
    Worker,
}

struct App {
    config: AppConfig,
    stores: Stores,
    pipeline: Arc<IndexingPipeline>,
}

impl App {
    async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let targets = IndexTargets::load(config.indexer.targets_file.as_deref())
            .context("Failed to load index targets")?;
        let client = HttpChainClient::new(&config.chain).context("Failed to build chain client")?;
        let db_pool = DbPool::new(&config)
            .await
            .context("Failed to connect to database")?;
        let stores = RepositoryFactory::create_stores(&db_pool);

        let pipeline = IndexingPipeline::new(
            Arc::new(client),
            stores.clone(),
            targets,
            config.indexer.first_block_height,
            config.indexer.parallel_backfill_workers,
        )
        .with_metrics(Arc::new(LogTaskMetrics));

        logging::log_info(&format!(
            "Indexer ready [index_version={}] [chain={}]",
            pipeline.index_version(),
            config.chain.proxy_url
        ));

        Ok(Self {
            config,
            stores,
            pipeline: Arc::new(pipeline),
        })
    }

    async fn start(&self, cancel: &CancellationToken, batch_size: i64) -> anyhow::Result<()> {
        let summary = StartUseCase::new(self.pipeline.clone(), self.stores.reports.clone())
            .execute(cancel, batch_size)
            .await?;
        logging::log_info(&format!(
            "Start finished [processed={}] [last_height={:?}]",
            summary.processed, summary.last_height
        ));
        Ok(())
    }

    async fn backfill(&self, cancel: &CancellationToken, config: BackfillUseCaseConfig) -> anyhow::Result<()> {
        let summary = BackfillUseCase::new(self.pipeline.clone(), self.stores.reports.clone())
            .execute(cancel, config)
            .await?;
        logging::log_info(&format!(
            "Backfill finished [processed={}] [last_height={:?}]",
            summary.processed, summary.last_height
        ));
        Ok(())
    }

    async fn purge(&self) -> anyhow::Result<()> {
        PurgeUseCase::new(
            self.stores.clone(),
            self.config.purge.clone(),
            self.pipeline.index_version(),
        )
        .execute()
        .await?;
        Ok(())
    }

    async fn summarize(&self) -> anyhow::Result<()> {
        SummarizeUseCase::new(self.stores.clone(), self.pipeline.index_version())
            .execute()
            .await?;
        Ok(())
    }

    /// One failed step is logged and retried on the next tick
    async fn worker(&self, cancel: &CancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_millis(self.config.indexer.process_interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            if let Err(e) = self.start(cancel, self.config.indexer.default_batch_size).await {
                logging::log_error(&format!("Start failed: {:#}", e));
            }
            if cancel.is_cancelled() {
                break;
            }
            if let Err(e) = self.summarize().await {
                logging::log_error(&format!("Summarize failed: {:#}", e));
            }
            if let Err(e) = self.purge().await {
                logging::log_error(&format!("Purge failed: {:#}", e));
            }
        }
        logging::log_info("Worker stopped");
    }
}

/// Cancels the returned token on Ctrl+C
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => logging::log_info("Shutdown requested, stopping after the current height"),
            Err(e) => logging::log_error(&format!("Failed to listen for Ctrl+C: {}", e)),
        }
        on_signal.cancel();
    });
    cancel
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let default_batch_size = config.indexer.default_batch_size;
    let app = App::connect(config).await?;
    let cancel = shutdown_token();

    match cli.command {
        Command::Start { batch_size } => {
            app.start(&cancel, batch_size.unwrap_or(default_batch_size)).await
        }
        Command::Backfill {
            parallel,
            force,
            target_ids,
        } => {
            app.backfill(
                &cancel,
                BackfillUseCaseConfig {
                    parallel,
                    force,
                    target_ids,
                },
            )
            .await
        }
        Command::Purge => app.purge().await,
        Command::Summarize => app.summarize().await,
        Command::Worker => {
            app.worker(&cancel).await;
            Ok(())
        }
    }
}
