use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use fieldform_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::form::Form;
use crate::models::submission::Submission;

pub const FORMS_FILE: &str = "forms.json";
pub const SUBMISSIONS_FILE: &str = "submissions.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory image of both collections.
#[derive(Debug, Default)]
pub struct Collections {
    pub forms: BTreeMap<DbId, Form>,
    pub submissions: BTreeMap<DbId, Submission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Forms,
    Submissions,
}

impl Collection {
    fn file_name(self) -> &'static str {
        match self {
            Collection::Forms => FORMS_FILE,
            Collection::Submissions => SUBMISSIONS_FILE,
        }
    }
}

/// The document store shared by all repositories.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    data: RwLock<Collections>,
}

impl JsonStore {
    /// Open (creating if needed) the store rooted at `dir`.
    ///
    /// A missing collection file reads as empty. A file that exists but
    /// does not decode is logged and also read as empty; it is overwritten
    /// on the next write to that collection.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;

        let forms = load_collection(&dir.join(FORMS_FILE)).await?;
        let submissions = load_collection(&dir.join(SUBMISSIONS_FILE)).await?;
        tracing::info!(
            dir = %dir.display(),
            forms = forms.len(),
            submissions = submissions.len(),
            "Opened JSON store",
        );

        Ok(Self {
            dir,
            data: RwLock::new(Collections { forms, submissions }),
        })
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.data.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.data.write().await
    }

    /// Write `staged` as the forms collection, then install it in `data`.
    ///
    /// `data` is left untouched when the write fails, so memory never holds
    /// a change the disk does not.
    pub async fn commit_forms(
        &self,
        data: &mut Collections,
        staged: BTreeMap<DbId, Form>,
    ) -> Result<(), StoreError> {
        self.persist(Collection::Forms, &staged).await?;
        data.forms = staged;
        Ok(())
    }

    /// Submissions counterpart of [`JsonStore::commit_forms`].
    pub async fn commit_submissions(
        &self,
        data: &mut Collections,
        staged: BTreeMap<DbId, Submission>,
    ) -> Result<(), StoreError> {
        self.persist(Collection::Submissions, &staged).await?;
        data.submissions = staged;
        Ok(())
    }

    async fn persist<T: Serialize>(
        &self,
        collection: Collection,
        items: &BTreeMap<DbId, T>,
    ) -> Result<(), StoreError> {
        let path = self.dir.join(collection.file_name());
        let bytes = serde_json::to_vec_pretty(items)?;
        write_atomic(&path, &bytes).await
    }
}

async fn load_collection<T: DeserializeOwned>(
    path: &Path,
) -> Result<BTreeMap<DbId, T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => Ok(items),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable collection, starting empty");
            Ok(BTreeMap::new())
        }
    }
}

/// Write via a sibling temp file and rename so readers never observe a
/// partially written document.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}
