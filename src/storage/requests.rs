//! Stores for blood requests.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{BloodRequest, NewRequest, RequestStatus, Transition, TransitionError};

/// Create, read and update operations over blood requests.
///
/// A store never deletes requests; their status only moves through the
/// transitions a [`BloodRequest`] allows.
pub trait RequestStore {
    /// Every stored request, in insertion order.
    fn all(&self) -> &[BloodRequest];

    /// Store a validated request owned by `owner`, created at `now`.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be persisted.
    fn create(
        &mut self,
        request: NewRequest,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, StoreError>;

    /// Apply `transition` to request `id` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Fails if there is no such request, the transition is not allowed, or
    /// the change cannot be persisted.
    fn transition(
        &mut self,
        id: &str,
        actor: &str,
        transition: Transition,
    ) -> Result<BloodRequest, StoreError>;

    /// The request with the given id.
    fn get(&self, id: &str) -> Option<&BloodRequest> {
        self.all().iter().find(|request| request.id == id)
    }

    /// A copy of the current contents, for handing to the matcher.
    fn snapshot(&self) -> Vec<BloodRequest> {
        self.all().to_vec()
    }
}

/// Errors that can occur in a [`RequestStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No request has the given id.
    #[error("no blood request with id '{0}'")]
    NotFound(String),

    /// The requested status change is not allowed.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The backing file could not be read or written.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The backing file is not a JSON array of requests.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// A request store held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRequestStore {
    requests: Vec<BloodRequest>,
}

impl MemoryRequestStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with existing requests.
    #[must_use]
    pub const fn with_requests(requests: Vec<BloodRequest>) -> Self {
        Self { requests }
    }
}

impl RequestStore for MemoryRequestStore {
    fn all(&self) -> &[BloodRequest] {
        &self.requests
    }

    fn create(
        &mut self,
        request: NewRequest,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, StoreError> {
        let NewRequest {
            patient_name,
            blood_type,
            units_needed,
            hospital,
            contact_number,
            needed_by_date,
            urgency,
            message,
        } = request;

        let request = BloodRequest {
            id: Uuid::new_v4().to_string(),
            requester_user_id: owner.to_string(),
            patient_name,
            blood_type,
            units_needed,
            hospital,
            contact_number,
            needed_by_date,
            status: RequestStatus::Active,
            urgency,
            created_at: Some(now),
            message,
        };
        self.requests.push(request.clone());
        tracing::info!(id = %request.id, owner, "created blood request");
        Ok(request)
    }

    fn transition(
        &mut self,
        id: &str,
        actor: &str,
        transition: Transition,
    ) -> Result<BloodRequest, StoreError> {
        let request = self
            .requests
            .iter_mut()
            .find(|request| request.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        request.apply(actor, transition)?;
        tracing::info!(id, status = %request.status, "updated blood request");
        Ok(request.clone())
    }
}

/// A request store backed by a JSON array file.
///
/// The whole file is read on open and rewritten after every change.
#[derive(Debug)]
pub struct JsonRequestStore {
    path: PathBuf,
    inner: MemoryRequestStore,
}

impl JsonRequestStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    #[instrument]
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let requests = match fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            inner: MemoryRequestStore::with_requests(requests),
        })
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the contents, write the copy, and only
    /// then replace the contents with it. A failed write leaves the store as
    /// it was.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryRequestStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut staged = self.inner.clone();
        let output = change(&mut staged)?;
        self.write(staged.all())?;
        self.inner = staged;
        Ok(output)
    }

    fn write(&self, requests: &[BloodRequest]) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(requests).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl RequestStore for JsonRequestStore {
    fn all(&self) -> &[BloodRequest] {
        self.inner.all()
    }

    fn create(
        &mut self,
        request: NewRequest,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, StoreError> {
        self.commit(|inner| inner.create(request, owner, now))
    }

    fn transition(
        &mut self,
        id: &str,
        actor: &str,
        transition: Transition,
    ) -> Result<BloodRequest, StoreError> {
        self.commit(|inner| inner.transition(id, actor, transition))
    }
}
