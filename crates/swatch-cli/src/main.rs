use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::time::{Duration, sleep};

use swatch_core::impls::{ChannelSwap, InMemoryRegistry, LocalBlobStore};
use swatch_core::ports::{Registry, keys};
use swatch_core::{AppBuilder, Orchestrator, SwatchConfig, TaskId};

mod logging;

/// Recolor PNG files by swapping their red and green channels.
#[derive(Debug, Parser)]
#[command(name = "swatch", version)]
struct Args {
    /// TOML config file. Missing file means defaults.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    lease_secs: Option<u64>,

    #[arg(long)]
    poll_ms: Option<u64>,

    /// Where working and finished images are kept.
    #[arg(long)]
    storage_root: Option<PathBuf>,

    /// Directory for recolored outputs.
    #[arg(long, short = 'o', default_value = "out")]
    output_dir: PathBuf,

    /// Print the final status as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// PNG files to process.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl Args {
    fn overlay(&self, config: &mut SwatchConfig) {
        if let Some(n) = self.workers {
            config.workers = n;
        }
        if let Some(secs) = self.lease_secs {
            config.lease_secs = secs;
        }
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(root) = &self.storage_root {
            config.storage_root = root.display().to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = SwatchConfig::load(args.config.as_deref()).context("loading config")?;
    args.overlay(&mut config);
    config.validate().context("invalid settings")?;

    logging::init(&config.log_filter);

    // (A) 各コンポーネントのアドレスを registry に公開
    let registry = InMemoryRegistry::new();
    registry
        .set(keys::STORAGE_ADDRESS, &config.storage_root)
        .await
        .context("publishing storage address")?;
    registry
        .set(keys::MASTER_ADDRESS, "local")
        .await
        .context("publishing master address")?;

    // (B) storage を見つけて App を組み立て、worker を起動
    let blobs = LocalBlobStore::discover(&registry)
        .await
        .context("locating storage")?;
    tracing::info!(root = %blobs.root().display(), "using local blob store");

    let app = AppBuilder::from_config(&config)
        .blob_store(Arc::new(blobs))
        .transform(Arc::new(ChannelSwap))
        .build()?;
    let workers = app.spawn_workers(config.workers);

    // (C) 画像を投入
    let mut submitted = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let id = app
            .orchestrator
            .submit_new_task(bytes)
            .await
            .with_context(|| format!("submitting {}", path.display()))?;
        tracing::info!(task_id = %id, file = %path.display(), "submitted");
        submitted.push((id, path.clone()));
    }

    // (D) 全部終わるか ctrl-c まで待つ
    let outcome = tokio::select! {
        res = wait_all(&app.orchestrator, &submitted, config.poll_interval()) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, stopping workers");
            Ok(false)
        }
    };

    workers.shutdown_and_join().await;

    let done = outcome?;
    if done {
        tokio::fs::create_dir_all(&args.output_dir)
            .await
            .with_context(|| format!("creating {}", args.output_dir.display()))?;
        for (id, path) in &submitted {
            write_result(&app.orchestrator, *id, path, &args.output_dir).await?;
        }
    }

    let status = app.orchestrator.status().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{status}");
    }

    if !done {
        bail!("stopped before every image was processed");
    }
    Ok(())
}

async fn wait_all(
    orchestrator: &Orchestrator,
    submitted: &[(TaskId, PathBuf)],
    every: Duration,
) -> Result<bool> {
    loop {
        let mut ready = 0;
        for (id, _) in submitted {
            if orchestrator.query_ready(*id).await? {
                ready += 1;
            }
        }
        tracing::debug!(ready, total = submitted.len(), "waiting for workers");
        if ready == submitted.len() {
            return Ok(true);
        }
        sleep(every).await;
    }
}

async fn write_result(
    orchestrator: &Orchestrator,
    id: TaskId,
    input: &Path,
    output_dir: &Path,
) -> Result<()> {
    let bytes = orchestrator
        .fetch_result(id)
        .await
        .with_context(|| format!("fetching result of {id}"))?;
    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.to_string());
    let target = output_dir.join(format!("{name}.swapped.png"));
    tokio::fs::write(&target, bytes)
        .await
        .with_context(|| format!("writing {}", target.display()))?;
    println!("{} -> {}", input.display(), target.display());
    Ok(())
}
