use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::cdse::ProductRecord;
use crate::error::DownloadError;

/// Byte stream of one product archive. Chunk sizes are transport-determined;
/// the write loop holds at most one chunk in memory regardless of archive
/// size (archives may be multiple gigabytes).
pub type ArchiveStream = BoxStream<'static, Result<Bytes, DownloadError>>;

pub trait ArchiveSource {
    /// Opens the archive body for a product. A non-success status at stream
    /// start fails with `DownloadError::Status` for that product only.
    async fn open_archive(&self, product_id: &str) -> Result<ArchiveStream, DownloadError>;
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Stop the batch at the first failed product.
    Abort,
    /// Attempt every product and report per-product outcomes.
    Continue,
}

impl Default for OnFailure {
    fn default() -> Self {
        OnFailure::Continue
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct DownloadTask {
    product_id: String,
    product_name: String,
    output: PathBuf,
}

impl DownloadTask {
    pub fn new(product_id: &str, product_name: &str, output_dir: &Path) -> Self {
        DownloadTask {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            output: output_dir.join(format!("{}.zip", product_name)),
        }
    }

    pub fn for_product(product: &ProductRecord, output_dir: &Path) -> Self {
        Self::new(&product.id, &product.name, output_dir)
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

#[derive(Debug)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub bytes_written: u64,
}

#[derive(Debug)]
pub struct DownloadOutcome {
    pub product_name: String,
    pub result: Result<DownloadResult, DownloadError>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct DownloadPlan {
    tasks: Vec<DownloadTask>,
}

impl DownloadPlan {
    pub fn new(tasks: Vec<DownloadTask>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[DownloadTask] {
        &self.tasks
    }

    #[allow(dead_code)]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let plan: Self = serde_json::from_str(&content)?;
        Ok(plan)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Runs every task against the archive source. `Abort` propagates the
    /// first failure; `Continue` attempts the full batch and reports one
    /// outcome per task, in task order. `concurrency` bounds the number of
    /// in-flight transfers in `Continue` mode; the distinct per-product file
    /// names make overlapping writers safe.
    pub async fn execute<S>(
        &self,
        source: &S,
        on_failure: OnFailure,
        concurrency: usize,
    ) -> Result<Vec<DownloadOutcome>, DownloadError>
    where
        S: ArchiveSource + Sync,
    {
        match on_failure {
            OnFailure::Abort => {
                let mut outcomes = Vec::with_capacity(self.tasks.len());
                for task in self.tasks.iter() {
                    let result = try_download(source, task).await?;
                    outcomes.push(DownloadOutcome {
                        product_name: task.product_name.clone(),
                        result: Ok(result),
                    });
                }
                Ok(outcomes)
            }
            OnFailure::Continue => {
                let outcomes = futures_util::stream::iter(self.tasks.iter())
                    .map(|task| async move {
                        DownloadOutcome {
                            product_name: task.product_name.clone(),
                            result: try_download(source, task).await,
                        }
                    })
                    .buffered(concurrency.max(1))
                    .collect::<Vec<_>>()
                    .await;
                Ok(outcomes)
            }
        }
    }
}

/// Streams one archive to disk. The body is written chunk by chunk to a
/// `.partial` file which is renamed to the final name only after the stream
/// ends cleanly, so the final name never refers to a truncated archive.
pub async fn try_download<S: ArchiveSource>(
    source: &S,
    task: &DownloadTask,
) -> Result<DownloadResult, DownloadError> {
    let dst = task.output.as_path();

    // Re-running a selection must not re-transfer archives already on disk.
    if dst.exists() {
        log::info!("{} already present, skipping", dst.display());
        let bytes_written = fs::metadata(dst)?.len();
        return Ok(DownloadResult {
            path: dst.to_path_buf(),
            bytes_written,
        });
    }

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let partial = partial_path(dst);
    let mut file = File::create(&partial)?;

    log::info!("downloading {} ...", task.product_name);
    let mut stream = source.open_archive(&task.product_id).await?;

    let mut bytes_written: u64 = 0;
    while let Some(chunk) = stream.try_next().await? {
        file.write_all(&chunk)?;
        bytes_written += chunk.len() as u64;
    }
    file.flush()?;

    fs::rename(&partial, dst)?;
    log::info!("downloaded {} ({} bytes)", dst.display(), bytes_written);

    Ok(DownloadResult {
        path: dst.to_path_buf(),
        bytes_written,
    })
}

fn partial_path(dst: &Path) -> PathBuf {
    let mut partial = dst.as_os_str().to_owned();
    partial.push(".partial");
    PathBuf::from(partial)
}
