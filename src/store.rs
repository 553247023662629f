// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission storage.
//!
//! The handlers only see the [`SubmissionStore`] trait. Two backends are
//! provided: a process-local memory store and a JSON document on disk that
//! is rewritten after every mutation.

use crate::models::{ContactSubmission, NewSubmission, SubmissionStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Submission not found: {0}")]
    NotFound(u64),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable record of contact submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission with status `new` and return it with its id.
    async fn create(&self, new: NewSubmission) -> Result<ContactSubmission>;

    /// All submissions, newest first.
    async fn list(&self) -> Result<Vec<ContactSubmission>>;

    /// Set the status of an existing submission.
    async fn update_status(&self, id: u64, status: SubmissionStatus) -> Result<ContactSubmission>;
}

/// Open the store named by `location`: `memory` or a JSON file path.
pub async fn open_store(location: &str) -> Result<Arc<dyn SubmissionStore>> {
    if location == "memory" {
        info!("Using in-memory submission store");
        Ok(Arc::new(MemoryStore::new()))
    } else {
        info!(path = %location, "Using JSON file submission store");
        Ok(Arc::new(JsonFileStore::open(location).await?))
    }
}

#[derive(Debug, Default, Clone)]
struct Inbox {
    next_id: u64,
    submissions: Vec<ContactSubmission>,
}

impl Inbox {
    fn from_submissions(submissions: Vec<ContactSubmission>) -> Self {
        let next_id = submissions.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self {
            next_id,
            submissions,
        }
    }

    fn create(&mut self, new: NewSubmission) -> ContactSubmission {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let submission = ContactSubmission::from_new(id, new, Utc::now());
        self.submissions.push(submission.clone());
        submission
    }

    fn sorted_newest_first(&self) -> Vec<ContactSubmission> {
        let mut all = self.submissions.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        all
    }

    fn set_status(&mut self, id: u64, status: SubmissionStatus) -> Result<ContactSubmission> {
        let submission = self
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;
        submission.status = status;
        Ok(submission.clone())
    }
}

/// Submissions kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inbox: RwLock<Inbox>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing submissions; new ids continue after the largest one.
    pub fn with_submissions(submissions: Vec<ContactSubmission>) -> Self {
        Self {
            inbox: RwLock::new(Inbox::from_submissions(submissions)),
        }
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create(&self, new: NewSubmission) -> Result<ContactSubmission> {
        let submission = self.inbox.write().await.create(new);
        debug!(id = submission.id, "Stored submission");
        Ok(submission)
    }

    async fn list(&self) -> Result<Vec<ContactSubmission>> {
        Ok(self.inbox.read().await.sorted_newest_first())
    }

    async fn update_status(&self, id: u64, status: SubmissionStatus) -> Result<ContactSubmission> {
        self.inbox.write().await.set_status(id, status)
    }
}

/// Submissions kept in a JSON document on disk.
///
/// The whole document is rewritten through a temporary file and a rename
/// after each mutation, so a crash leaves either the old or the new state.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inbox: RwLock<Inbox>,
}

impl JsonFileStore {
    /// Open `path`, creating an empty inbox when the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inbox = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let submissions: Vec<ContactSubmission> = serde_json::from_slice(&bytes)?;
                Inbox::from_submissions(submissions)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Inbox::from_submissions(Vec::new())
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), count = inbox.submissions.len(), "Loaded submissions");

        Ok(Self {
            path,
            inbox: RwLock::new(inbox),
        })
    }

    async fn persist(&self, inbox: &Inbox) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&inbox.submissions)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for JsonFileStore {
    async fn create(&self, new: NewSubmission) -> Result<ContactSubmission> {
        let mut inbox = self.inbox.write().await;
        let mut staged = inbox.clone();
        let submission = staged.create(new);
        self.persist(&staged).await?;
        *inbox = staged;
        Ok(submission)
    }

    async fn list(&self) -> Result<Vec<ContactSubmission>> {
        Ok(self.inbox.read().await.sorted_newest_first())
    }

    async fn update_status(&self, id: u64, status: SubmissionStatus) -> Result<ContactSubmission> {
        let mut inbox = self.inbox.write().await;
        let mut staged = inbox.clone();
        let submission = staged.set_status(id, status)?;
        self.persist(&staged).await?;
        *inbox = staged;
        Ok(submission)
    }
}
