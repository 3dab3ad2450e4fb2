use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::{
    artifacts::ArtifactFiles,
    engine::DEFAULT_PARALLEL_THRESHOLD,
    storage::{BackendLocal, StorageManager},
};

const CONFIG_FILE: &str = "config.yaml";

/// Default number of recommendations
const DEFAULT_RESULTS: usize = 10;
/// Result counts offered to the user
const ALLOWED_RESULTS: [usize; 4] = [5, 10, 15, 20];

/// Where the precomputed artifacts live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding the artifacts. Relative paths are resolved against
    /// the base path; unset means the base path itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_movies_file")]
    pub movies_file: String,

    #[serde(default = "default_matrix_file")]
    pub matrix_file: String,

    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: None,
            movies_file: default_movies_file(),
            matrix_file: default_matrix_file(),
            index_file: default_index_file(),
        }
    }
}

impl ArtifactsConfig {
    pub fn files(&self) -> ArtifactFiles {
        ArtifactFiles {
            movies: self.movies_file.clone(),
            matrix: self.matrix_file.clone(),
            index: self.index_file.clone(),
        }
    }
}

fn default_movies_file() -> String {
    ArtifactFiles::default().movies
}

fn default_matrix_file() -> String {
    ArtifactFiles::default().matrix
}

fn default_index_file() -> String {
    ArtifactFiles::default().index
}

/// Recommendation settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Number of results when none is requested
    #[serde(default = "default_results")]
    pub default_results: usize,

    /// Result counts a caller may ask for
    #[serde(default = "default_allowed_results")]
    pub allowed_results: Vec<usize>,

    /// Corpus size (rows) at which scoring runs in parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_results: DEFAULT_RESULTS,
            allowed_results: ALLOWED_RESULTS.to_vec(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

fn default_results() -> usize {
    DEFAULT_RESULTS
}

fn default_allowed_results() -> Vec<usize> {
    ALLOWED_RESULTS.to_vec()
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        let artifacts = &self.artifacts;
        for (field, value) in [
            ("movies_file", &artifacts.movies_file),
            ("matrix_file", &artifacts.matrix_file),
            ("index_file", &artifacts.index_file),
        ] {
            if value.trim().is_empty() {
                bail!("artifacts.{field} must not be empty");
            }
        }

        let rec = &self.recommend;
        if rec.allowed_results.is_empty() {
            bail!("recommend.allowed_results must not be empty");
        }
        if rec.allowed_results.contains(&0) {
            bail!("recommend.allowed_results must only contain positive counts");
        }
        if !rec.allowed_results.contains(&rec.default_results) {
            bail!(
                "recommend.default_results ({}) must be one of recommend.allowed_results {:?}",
                rec.default_results,
                rec.allowed_results
            );
        }
        if rec.parallel_threshold == 0 {
            bail!("recommend.parallel_threshold must be greater than 0");
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing the defaults first if the
    /// file does not exist yet.
    pub fn load_with(base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let base_path = base_path.as_ref();
        let store = BackendLocal::new(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {}", base_path.display());
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        Ok(config)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute directory the artifacts are read from.
    pub fn artifacts_dir(&self) -> PathBuf {
        match &self.artifacts.dir {
            Some(dir) => self.base_path.join(dir),
            None => self.base_path.clone(),
        }
    }
}

/// Base directory: `CINEMATCH_BASE_PATH`, else `~/.local/share/cinematch`.
pub fn base_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("CINEMATCH_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = homedir::my_home()
        .map_err(|e| anyhow::anyhow!("could not determine home directory: {e:?}"))?
        .context("home directory path is empty")?;
    Ok(home.join(".local/share/cinematch"))
}
