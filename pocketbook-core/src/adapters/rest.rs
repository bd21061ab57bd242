//! Hosted table client (PostgREST-style HTTP API)
//!
//! Talks to a table-per-entity REST endpoint such as a Supabase project:
//! `POST /rest/v1/<table>` to upsert, `GET ...?userId=eq.<id>` to select,
//! `DELETE ...?id=eq.<id>` to delete.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::Table;
use crate::ports::RemoteTable;

/// Default request timeout for the remote mirror
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// REST client for the remote mirror
#[derive(Debug)]
pub struct RestRemote {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RestRemote {
    /// Create a client for `base_url` authenticated with a public anon key
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid remote URL '{}': {}", base_url, e)))?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(Error::Config(format!(
                "Remote URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if api_key.trim().is_empty() {
            return Err(Error::Config("Remote API key is empty".to_string()));
        }

        // Url::join drops the last segment unless the path ends with '/'
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: parsed,
            api_key: api_key.to_string(),
        })
    }

    /// Endpoint URL of one table
    pub fn table_url(&self, table: Table) -> Result<Url> {
        self.base_url
            .join(&format!("rest/v1/{}", table))
            .map_err(|e| Error::Config(format!("Invalid table URL: {}", e)))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

/// Turn non-2xx responses into errors, keeping the response body for diagnostics
async fn check_status(table: Table, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::remote(format!(
        "{} request failed with {}: {}",
        table,
        status,
        body.trim()
    )))
}

#[async_trait]
impl RemoteTable for RestRemote {
    fn name(&self) -> &str {
        "rest"
    }

    async fn upsert(&self, table: Table, doc: &JsonValue) -> Result<()> {
        let url = self.table_url(table)?;
        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(doc)
            .send()
            .await?;
        check_status(table, response).await?;
        Ok(())
    }

    async fn select_by_user(&self, table: Table, user_id: &str) -> Result<Vec<JsonValue>> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("userId", &format!("eq.{}", user_id));

        let response = self.authorized(self.client.get(url)).send().await?;
        let rows = check_status(table, response).await?.json::<Vec<JsonValue>>().await?;
        Ok(rows)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));

        let response = self.authorized(self.client.delete(url)).send().await?;
        check_status(table, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str) -> Result<RestRemote> {
        RestRemote::new(url, "anon-key", Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    #[test]
    fn test_table_url() {
        let remote = remote("https://example.supabase.co").unwrap();
        assert_eq!(
            remote.table_url(Table::Expenses).unwrap().as_str(),
            "https://example.supabase.co/rest/v1/expenses"
        );
    }

    #[test]
    fn test_table_url_keeps_base_path() {
        let remote = remote("https://proxy.example.com/finance").unwrap();
        assert_eq!(
            remote.table_url(Table::Recurring).unwrap().as_str(),
            "https://proxy.example.com/finance/rest/v1/recurring"
        );
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(remote("not a url"), Err(Error::Config(_))));
        assert!(matches!(remote("ftp://example.com"), Err(Error::Config(_))));
        assert!(matches!(
            RestRemote::new("https://example.com", " ", Duration::from_secs(1)),
            Err(Error::Config(_))
        ));
    }
}
