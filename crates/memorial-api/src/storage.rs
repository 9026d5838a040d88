use anyhow::Result;
use rand::distr::{Alphanumeric, SampleString};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// On-disk object store for uploaded tribute photos.
///
/// Photos live as flat files under `dir`; each gets a generated name and a
/// public URL of the form `{public_base_url}/photos/{file_name}`.
pub struct PhotoStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl PhotoStorage {
    pub async fn new(dir: PathBuf, public_base_url: String) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Photo storage directory: {}", dir.display());
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Path to a stored photo.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Write photo bytes under a generated unique name and return the
    /// public URL.
    pub async fn store(&self, bytes: &[u8], original_name: Option<&str>) -> Result<String> {
        let file_name = generate_file_name(original_name);
        fs::write(self.file_path(&file_name), bytes).await?;
        Ok(format!("{}/photos/{}", self.public_base_url, file_name))
    }
}

/// Current unix millis plus a short random suffix, keeping a sanitized copy
/// of the original file extension.
fn generate_file_name(original_name: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 6)
        .to_ascii_lowercase();

    match sanitized_extension(original_name) {
        Some(ext) => format!("{millis}-{suffix}.{ext}"),
        None => format!("{millis}-{suffix}"),
    }
}

fn sanitized_extension(original_name: Option<&str>) -> Option<String> {
    let (_, ext) = original_name?.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(10)
        .collect();
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Stored photo names only ever contain alphanumerics, '.', '-' and '_'.
/// Anything else (path separators in particular) is rejected before the
/// name touches the filesystem.
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}
