//! Load-once cache for the precomputed artifacts.
//!
//! The first successful `load()` reads all three files; every later call
//! hands out the same `Arc` without touching storage. There is no
//! invalidation: artifacts are fixed for the life of the process.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;

use crate::artifacts::{
    ArtifactError, ArtifactKind, Artifacts, FeatureMatrix, ItemTable, TitleIndex,
};
use crate::storage::{BackendLocal, StorageManager};

/// File names of the three artifacts inside the storage backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactFiles {
    pub movies: String,
    pub matrix: String,
    pub index: String,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            movies: "movies.csv".to_string(),
            matrix: "tfidf_matrix.bin".to_string(),
            index: "indices.json".to_string(),
        }
    }
}

impl ArtifactFiles {
    fn name_of(&self, artifact: ArtifactKind) -> &str {
        match artifact {
            ArtifactKind::ItemTable => &self.movies,
            ArtifactKind::FeatureMatrix => &self.matrix,
            ArtifactKind::TitleIndex => &self.index,
        }
    }

    /// All file names, in load order.
    pub fn all(&self) -> [&str; 3] {
        [&self.movies, &self.matrix, &self.index]
    }
}

static SHARED: OnceCell<ArtifactStore<BackendLocal>> = OnceCell::new();

pub struct ArtifactStore<S: StorageManager> {
    storage: S,
    files: ArtifactFiles,
    /// Set once by the first successful load. A failed load leaves it empty,
    /// so the next call tries again.
    loaded: OnceCell<Arc<Artifacts>>,
}

impl ArtifactStore<BackendLocal> {
    /// The process-wide store. The first caller's directory and file names
    /// win; later arguments are ignored.
    ///
    /// The directory is not created or checked here; a missing one surfaces
    /// from `load()` as `ArtifactError::Missing` for the first file.
    pub fn shared(dir: &Path, files: ArtifactFiles) -> &'static Self {
        SHARED.get_or_init(|| Self::new(BackendLocal::open(dir), files))
    }
}

impl<S: StorageManager> ArtifactStore<S> {
    pub fn new(storage: S, files: ArtifactFiles) -> Self {
        Self {
            storage,
            files,
            loaded: OnceCell::new(),
        }
    }

    pub fn files(&self) -> &ArtifactFiles {
        &self.files
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Return the cached artifacts, loading them on first use.
    ///
    /// Concurrent first callers block until a single load finishes and then
    /// all observe its result.
    pub fn load(&self) -> Result<Arc<Artifacts>, ArtifactError> {
        self.loaded
            .get_or_try_init(|| self.read_all().map(Arc::new))
            .cloned()
    }

    /// Write all three artifacts to storage.
    ///
    /// Does not touch the cache: a store that already loaded keeps serving
    /// what it loaded.
    pub fn save(&self, artifacts: &Artifacts) -> anyhow::Result<()> {
        self.storage
            .write(&self.files.movies, &artifacts.table().to_csv()?)?;
        self.storage
            .write(&self.files.matrix, &artifacts.matrix().encode())?;
        self.storage
            .write(&self.files.index, &artifacts.index().to_json()?)?;
        Ok(())
    }

    fn read_all(&self) -> Result<Artifacts, ArtifactError> {
        let now = Instant::now();

        let table = self.decode(ArtifactKind::ItemTable, |data| {
            ItemTable::from_csv(data).map_err(|e| e.to_string())
        })?;
        let matrix = self.decode(ArtifactKind::FeatureMatrix, |data| {
            FeatureMatrix::decode(data).map_err(|e| e.to_string())
        })?;
        let index = self.decode(ArtifactKind::TitleIndex, |data| {
            TitleIndex::from_json(data).map_err(|e| e.to_string())
        })?;

        log::info!(
            "Loaded {} movies, {}x{} feature matrix ({} non-zeros), {} titles in {}ms",
            table.len(),
            matrix.rows(),
            matrix.cols(),
            matrix.nnz(),
            index.len(),
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Artifacts::new(table, matrix, index)
    }

    fn decode<T>(
        &self,
        artifact: ArtifactKind,
        parse: impl FnOnce(&[u8]) -> Result<T, String>,
    ) -> Result<T, ArtifactError> {
        let file = self.files.name_of(artifact);
        let missing = |reason: String| ArtifactError::Missing {
            artifact,
            file: file.to_string(),
            reason,
        };

        log::debug!("reading {artifact} from {file}");
        let data = self.storage.read(file).map_err(|e| missing(e.to_string()))?;
        parse(&data).map_err(missing)
    }
}
