//! Issue operations against the Jira Cloud REST API.
//!
//! Each method performs exactly one request and checks its status before
//! returning. Mutations return `()`; reads return the JSON array Jira sent,
//! in the order it was sent.

mod attachments;
mod comments;
mod issues;
mod search;
mod worklogs;

use crate::error::Result;
use crate::{ApiClient, Identity};

#[derive(Clone)]
pub struct JiraClient {
    api: ApiClient,
}

impl JiraClient {
    /// Client for `base_url` acting under `identity`.
    pub fn new(base_url: impl AsRef<str>, identity: Identity) -> Result<Self> {
        Ok(Self::from_api(ApiClient::new(base_url, identity)?))
    }

    pub fn from_api(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn identity(&self) -> &Identity {
        self.api.identity()
    }
}
