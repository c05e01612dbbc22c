//! Spanner REST client
//!
//! Talks to the Spanner REST surface, which the emulator exposes on its
//! HTTP port (9020 by default) alongside gRPC. One session is created per
//! client handle at connect time and deleted on close; the pool's health
//! checks and lifetime limits bound how stale a session can get.

use crate::client::{ClientFactory, SpannerClient};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use spanseed_core::{DatabasePath, Mutation};
use std::sync::Arc;
use std::time::Duration;

const PUBLIC_ENDPOINT: &str = "https://spanner.googleapis.com";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates `RestClient` handles for the pool.
pub struct RestClientFactory {
    http: reqwest::Client,
    base_url: String,
}

impl RestClientFactory {
    /// `emulator_host` is a `host:port` pair; when `None`, the public
    /// endpoint is used, which additionally needs ambient credentials.
    /// The emulator path is the supported one for E2E setups.
    pub fn new(emulator_host: Option<&str>) -> DbResult<Self> {
        let base_url = match emulator_host {
            Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("http://{}", host.trim_end_matches('/')),
            None => PUBLIC_ENDPOINT.to_string(),
        };
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DbError::Transport(e.to_string()))?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl ClientFactory for RestClientFactory {
    async fn connect(&self, database: &DatabasePath) -> DbResult<Arc<dyn SpannerClient>> {
        let url = format!("{}/v1/{}/sessions", self.base_url, database);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DbError::Connection {
                database: database.to_string(),
                message: e.to_string(),
            })?;
        let body = decode_response(response).await?;
        let session = body
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DbError::Session("create response carries no session name".to_string()))?
            .to_string();

        log::debug!("created session {} for {}", session, database);
        Ok(Arc::new(RestClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session,
        }))
    }
}

/// One database handle backed by one REST session.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    session: String,
}

impl RestClient {
    async fn execute_sql(&self, sql: &str) -> DbResult<serde_json::Value> {
        let url = format!("{}/v1/{}:executeSql", self.base_url, self.session);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "sql": sql }))
            .send()
            .await?;
        decode_response(response).await
    }
}

#[async_trait]
impl SpannerClient for RestClient {
    async fn ping(&self) -> DbResult<()> {
        self.execute_sql("SELECT 1").await?;
        Ok(())
    }

    async fn apply(&self, mutations: &[Mutation]) -> DbResult<()> {
        if mutations.is_empty() {
            return Ok(());
        }
        let url = format!("{}/v1/{}:commit", self.base_url, self.session);
        let body = serde_json::json!({
            "singleUseTransaction": { "readWrite": {} },
            "mutations": mutations
                .iter()
                .map(|m| m.to_rest_json())
                .collect::<Vec<_>>(),
        });
        let response = self.http.post(&url).json(&body).send().await?;
        decode_response(response).await?;
        Ok(())
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<serde_json::Value>>> {
        let body = self.execute_sql(sql).await?;
        let rows = match body.get("rows") {
            // A result set with no rows has no "rows" key at all
            None => return Ok(Vec::new()),
            Some(rows) => rows
                .as_array()
                .ok_or_else(|| DbError::Decode("'rows' is not an array".to_string()))?,
        };
        rows.iter()
            .map(|row| {
                row.as_array()
                    .cloned()
                    .ok_or_else(|| DbError::Decode("row is not an array".to_string()))
            })
            .collect()
    }

    async fn get_ddl(&self) -> DbResult<Vec<String>> {
        // The session path is projects/p/instances/i/databases/d/sessions/s;
        // DDL lives on the database resource
        let database = self
            .session
            .split("/sessions/")
            .next()
            .unwrap_or(&self.session);
        let url = format!("{}/v1/{}/ddl", self.base_url, database);
        let response = self.http.get(&url).send().await?;
        let body = decode_response(response).await?;
        let statements = body
            .get("statements")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|s| s.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(statements)
    }

    async fn close(&self) -> DbResult<()> {
        let url = format!("{}/v1/{}", self.base_url, self.session);
        match self.http.delete(&url).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    log::debug!(
                        "session delete returned {}, ignoring",
                        response.status()
                    );
                }
                Ok(())
            }
            Err(e) => {
                log::debug!("session delete failed, ignoring: {}", e);
                Ok(())
            }
        }
    }
}

/// Decode a REST response, mapping google.rpc error payloads onto the
/// error taxonomy.
async fn decode_response(response: reqwest::Response) -> DbResult<serde_json::Value> {
    let http_status = response.status();
    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(e) if http_status.is_success() => {
            return Err(DbError::Decode(e.to_string()));
        }
        Err(_) => serde_json::Value::Null,
    };

    if http_status.is_success() {
        return Ok(body);
    }

    let error = body.get("error");
    let status = error
        .and_then(|e| e.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or("");
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("request failed")
        .to_string();

    Err(DbError::from_status(http_status.as_u16(), status, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let factory = RestClientFactory::new(Some("localhost:9020")).unwrap();
        assert_eq!(factory.base_url, "http://localhost:9020");

        let factory = RestClientFactory::new(Some("http://emulator:9020/")).unwrap();
        assert_eq!(factory.base_url, "http://emulator:9020");

        let factory = RestClientFactory::new(None).unwrap();
        assert_eq!(factory.base_url, PUBLIC_ENDPOINT);
    }

    #[test]
    fn test_commit_body_shape() {
        use spanseed_core::value::SpannerValue;
        let mutation = Mutation::insert(
            "Users",
            vec!["UserID".to_string()],
            vec![SpannerValue::String("u1".to_string())],
        )
        .unwrap();
        let rendered = mutation.to_rest_json();
        assert_eq!(
            rendered,
            serde_json::json!({
                "insert": {
                    "table": "Users",
                    "columns": ["UserID"],
                    "values": [["u1"]],
                }
            })
        );
    }
}
