/*!
 * Model file fetching and caching.
 *
 * Model files are downloaded once from the model repository and kept under
 * `<cache_dir>/<owner>--<name>/<revision>/`. A download is written to a
 * temporary sibling file and moved into place only when the body has been
 * received completely.
 */

use log::{debug, info};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app_config::ModelConfig;
use crate::errors::ProviderError;

/// A model repository revision and its local cache location
#[derive(Debug, Clone)]
pub struct ModelRepo {
    endpoint: String,
    repo: String,
    revision: String,
    cache_dir: PathBuf,
    offline: bool,
}

impl ModelRepo {
    /// Build the repository handle described by `config`
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
            revision: config.revision.clone(),
            cache_dir: config.resolved_cache_dir(),
            offline: config.offline,
        }
    }

    /// Repository identifier
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Directory holding the cached files of this revision
    pub fn local_dir(&self) -> PathBuf {
        self.cache_dir
            .join(self.repo.replace('/', "--"))
            .join(&self.revision)
    }

    /// Local path of `file` within the cache
    pub fn local_path(&self, file: &str) -> PathBuf {
        self.local_dir().join(file)
    }

    /// Remote URL of `file`
    pub fn file_url(&self, file: &str) -> Result<Url, ProviderError> {
        let raw = format!("{}/{}/resolve/{}/{}", self.endpoint, self.repo, self.revision, file);
        Url::parse(&raw).map_err(|e| ProviderError::ModelUnavailable(format!("Invalid model URL {}: {}", raw, e)))
    }

    /// Return the local path of `file`, downloading it first if it is not cached
    pub async fn fetch(&self, client: &Client, file: &str) -> Result<PathBuf, ProviderError> {
        let local_path = self.local_path(file);
        if local_path.is_file() {
            debug!("Using cached model file {}", local_path.display());
            return Ok(local_path);
        }

        if self.offline {
            return Err(ProviderError::ModelUnavailable(format!(
                "{} is not cached at {} and offline mode is enabled",
                file,
                local_path.display()
            )));
        }

        let url = self.file_url(file)?;
        info!("Downloading {} from {}", file, url);
        download(client, &url, &local_path).await?;
        Ok(local_path)
    }

    /// Fetch every file in `files`, in order
    pub async fn fetch_all(&self, files: &[&str]) -> Result<Vec<PathBuf>, ProviderError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::ModelUnavailable(format!("Failed to build HTTP client: {}", e)))?;

        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            paths.push(self.fetch(&client, file).await?);
        }
        Ok(paths)
    }
}

async fn download(client: &Client, url: &Url, dest: &Path) -> Result<(), ProviderError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| unavailable("Failed to create cache directory for", url, e))?;
    }

    let mut response = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| unavailable("Download failed: GET", url, e))?;

    let tmp_path = temp_path_for(dest);
    let written = write_body(&mut response, &tmp_path, url).await;
    let received = finish_download(&tmp_path, dest, written).await?;

    debug!("Cached {} bytes at {}", received, dest.display());
    Ok(())
}

async fn write_body(response: &mut reqwest::Response, tmp_path: &Path, url: &Url) -> Result<usize, ProviderError> {
    let mut file = tokio::fs::File::create(tmp_path)
        .await
        .map_err(|e| unavailable("Failed to create temporary file for", url, e))?;

    let mut received = 0usize;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| unavailable("Failed while reading HTTP body from", url, e))?
    {
        received += chunk.len();
        file.write_all(&chunk)
            .await
            .map_err(|e| unavailable("Failed to write download of", url, e))?;
    }

    file.flush()
        .await
        .map_err(|e| unavailable("Failed to flush download of", url, e))?;
    Ok(received)
}

/// Move a completed download into place, or discard the temporary file on failure
async fn finish_download(
    tmp_path: &Path,
    dest: &Path,
    written: Result<usize, ProviderError>,
) -> Result<usize, ProviderError> {
    let received = match written {
        Ok(received) => received,
        Err(e) => {
            let _ = tokio::fs::remove_file(tmp_path).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(tmp_path, dest).await {
        let _ = tokio::fs::remove_file(tmp_path).await;
        return Err(ProviderError::ModelUnavailable(format!(
            "Failed to move download into cache at {}: {}",
            dest.display(),
            e
        )));
    }
    Ok(received)
}

fn unavailable(what: &str, url: &Url, error: impl std::fmt::Display) -> ProviderError {
    ProviderError::ModelUnavailable(format!("{} {}: {}", what, url, error))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let ts = chrono::Utc::now().timestamp_millis();
    PathBuf::from(format!("{}.{}.download", path.display(), ts))
}
