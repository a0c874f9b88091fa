use serde_json::Value;

use super::JiraClient;
use crate::error::Result;
use crate::models::Jql;
use crate::operation::Operation;

impl JiraClient {
    /// Run a JQL search and return the `issues` array as received.
    pub async fn search_issues(&self, jql: &Jql) -> Result<Vec<Value>> {
        let mut url = self.api.endpoint(&["search"])?;
        url.set_query(Some(&format!("jql={}", jql.encoded())));

        tracing::debug!(jql = %jql, "Searching issues");
        self.api
            .fetch_array(&Operation::SearchIssues, url, "issues")
            .await
    }
}
