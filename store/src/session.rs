//! Per-attempt workspace allocation.

use crate::record::RECORD_FILE_NAME;
use crate::StoreError;
use driveguard_types::{Clock, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const IMAGES_DIR: &str = "images";
const FACE_IMAGE: &str = "user_face.jpg";
const DOCUMENT_IMAGE: &str = "license.jpg";
const RAW_TEXT: &str = "license.txt";
const MAX_SESSIONS_PER_SECOND: u32 = 100;

/// Opaque attempt identifier, derived from the creation time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `session_<YYYY-mm-dd>_<HH-MM-SS>` in UTC.
    pub fn from_timestamp(at: Timestamp) -> Self {
        Self(
            at.as_datetime()
                .format("session_%Y-%m-%d_%H-%M-%S")
                .to_string(),
        )
    }

    /// The `n`th id allocated within the same second: `<id>_<n>`.
    fn nth(&self, n: u32) -> Self {
        Self(format!("{}_{n}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where collaborators put the attempt's artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub face_image: PathBuf,
    pub document_image: PathBuf,
    pub raw_text: PathBuf,
}

/// One attempt's workspace. Immutable after creation.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    created_at: Timestamp,
    workspace: PathBuf,
    artifacts: ArtifactPaths,
}

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn artifacts(&self) -> &ArtifactPaths {
        &self.artifacts
    }

    /// Location of the attempt's audit record.
    pub fn record_path(&self) -> PathBuf {
        self.workspace.join(RECORD_FILE_NAME)
    }
}

/// Allocates session workspaces under a base directory.
#[derive(Clone, Debug)]
pub struct SessionContext {
    base_dir: PathBuf,
}

impl SessionContext {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the workspace for a new attempt.
    ///
    /// The base directory is created if needed. The attempt's own directory
    /// must not exist yet: an attempt started in the same second as an
    /// earlier one gets a numeric suffix (`session_..._2`) instead of
    /// sharing its workspace.
    pub fn create(&self, clock: &dyn Clock) -> Result<Session, StoreError> {
        let created_at = clock.now();
        std::fs::create_dir_all(&self.base_dir).map_err(|e| StoreError::io(&self.base_dir, e))?;

        let base_id = SessionId::from_timestamp(created_at);
        let (id, workspace) = self.claim(base_id)?;
        let images = workspace.join(IMAGES_DIR);
        std::fs::create_dir(&images).map_err(|e| StoreError::io(&images, e))?;

        let artifacts = ArtifactPaths {
            face_image: images.join(FACE_IMAGE),
            document_image: images.join(DOCUMENT_IMAGE),
            raw_text: workspace.join(RAW_TEXT),
        };

        tracing::debug!(session = %id, workspace = %workspace.display(), "session workspace ready");

        Ok(Session {
            id,
            created_at,
            workspace,
            artifacts,
        })
    }

    /// Atomically take the first free directory for `base_id`.
    fn claim(&self, base_id: SessionId) -> Result<(SessionId, PathBuf), StoreError> {
        for n in 1..=MAX_SESSIONS_PER_SECOND {
            let id = if n == 1 { base_id.clone() } else { base_id.nth(n) };
            let workspace = self.base_dir.join(id.as_str());
            match std::fs::create_dir(&workspace) {
                Ok(()) => return Ok((id, workspace)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StoreError::io(&workspace, e)),
            }
        }
        Err(StoreError::io(
            &self.base_dir.join(base_id.as_str()),
            "too many sessions started within one second",
        ))
    }
}
