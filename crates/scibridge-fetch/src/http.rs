use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use scibridge_core::{BridgeConfig, Collection, FilterSpec, Record, WhereNode};
use scibridge_error::FetchError;

use crate::{LOG_TARGET, RecordFetcher};

const SNIPPET_MAX: usize = 8 * 1024;

fn snippet_lossy(bytes: &[u8], max: usize) -> String {
    let end = bytes.len().min(max);
    String::from_utf8_lossy(&bytes[..end]).to_string()
}

/// One collection of the store's REST API:
/// - `GET {base}/{Collection}?filter=<json>`
/// - `GET {base}/{Collection}/{id}?filter=<json>`
/// - `GET {base}/{Collection}/count?where=<json>`
#[derive(Debug, Clone)]
pub struct HttpCollection {
    client: reqwest::Client,
    collection: Collection,
    url: Url,
}

impl HttpCollection {
    pub fn new(
        client: reqwest::Client,
        config: &BridgeConfig,
        collection: Collection,
    ) -> Result<Self, FetchError> {
        let mut url = config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport {
                url: config.base_url.to_string(),
                message: "base url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(collection.path());
        Ok(Self {
            client,
            collection,
            url,
        })
    }

    /// URL of the collection itself.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn child_url(&self, segment: &str) -> Url {
        let mut url = self.url.clone();
        // The collection URL was built through `path_segments_mut`, so it can hold a path.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(segment);
        }
        url
    }

    /// GETs `url` and decodes the JSON body. `Ok(None)` for a 404 when `missing_ok`.
    async fn get_json(
        &self,
        url: Url,
        query: Option<(&str, String)>,
        missing_ok: bool,
    ) -> Result<Option<Value>, FetchError> {
        let url_str = url.to_string();
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some((key, json)) = &query {
            request = request.query(&[(key, json)]);
        }
        tracing::trace!(target: LOG_TARGET, url = %url_str, query = ?query, "GET");

        let resp = request.send().await.map_err(|e| FetchError::Transport {
            url: url_str.clone(),
            message: e.to_string(),
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| FetchError::Transport {
            url: url_str.clone(),
            message: e.to_string(),
        })?;

        if status == StatusCode::NOT_FOUND && missing_ok {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url_str,
                body_snippet: (!bytes.is_empty()).then(|| snippet_lossy(&bytes, SNIPPET_MAX)),
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| FetchError::Decode {
                url: url_str,
                message: e.to_string(),
                body_snippet: Some(snippet_lossy(&bytes, SNIPPET_MAX)),
            })
    }

    fn filter_query(
        &self,
        filter: &FilterSpec,
    ) -> Result<Option<(&'static str, String)>, FetchError> {
        if filter.is_empty() {
            return Ok(None);
        }
        self.encode(filter).map(|json| Some(("filter", json)))
    }

    fn encode(&self, value: &impl serde::Serialize) -> Result<String, FetchError> {
        serde_json::to_string(value).map_err(|e| FetchError::Transport {
            url: self.url.to_string(),
            message: format!("could not encode filter: {e}"),
        })
    }

    fn decode_error(&self, url: &Url, message: &str, body: &Value) -> FetchError {
        FetchError::Decode {
            url: url.to_string(),
            message: message.to_string(),
            body_snippet: Some(snippet_lossy(body.to_string().as_bytes(), SNIPPET_MAX)),
        }
    }
}

#[async_trait]
impl RecordFetcher for HttpCollection {
    fn collection(&self) -> Collection {
        self.collection
    }

    #[tracing::instrument(target = "scibridge-fetch", skip_all, fields(collection = %self.collection))]
    async fn find(&self, filter: &FilterSpec) -> Result<Vec<Record>, FetchError> {
        let url = self.url.clone();
        let body = self
            .get_json(url.clone(), self.filter_query(filter)?, false)
            .await?;
        let records = match body {
            None => Vec::new(),
            Some(Value::Array(records)) => records,
            Some(other) => return Err(self.decode_error(&url, "expected a JSON array", &other)),
        };
        tracing::debug!(target: LOG_TARGET, count = records.len(), "fetched records");
        Ok(records)
    }

    #[tracing::instrument(target = "scibridge-fetch", skip(self, filter), fields(collection = %self.collection))]
    async fn find_by_id(
        &self,
        id: &str,
        filter: &FilterSpec,
    ) -> Result<Option<Record>, FetchError> {
        let url = self.child_url(id);
        let body = self.get_json(url, self.filter_query(filter)?, true).await?;
        Ok(body.filter(|record| !record.is_null()))
    }

    #[tracing::instrument(target = "scibridge-fetch", skip_all, fields(collection = %self.collection))]
    async fn count(&self, where_clause: Option<&WhereNode>) -> Result<u64, FetchError> {
        let url = self.child_url("count");
        let query = where_clause
            .map(|node| self.encode(node).map(|json| ("where", json)))
            .transpose()?;
        let body = self.get_json(url.clone(), query, false).await?;
        let count = body
            .as_ref()
            .and_then(|b| b.get("count"))
            .and_then(Value::as_u64);
        count.ok_or_else(|| {
            self.decode_error(
                &url,
                "expected `{\"count\": n}`",
                body.as_ref().unwrap_or(&Value::Null),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_keeps_base_path() {
        let config = BridgeConfig::from_parts("https://scicat.example.org/api/v3/", "ESS").unwrap();
        let http = HttpCollection::new(reqwest::Client::new(), &config, Collection::PublishedData)
            .unwrap();
        assert_eq!(
            http.url().as_str(),
            "https://scicat.example.org/api/v3/PublishedData"
        );
    }

    #[test]
    fn record_ids_are_percent_encoded() {
        let config = BridgeConfig::from_parts("http://localhost:3030/api/v3", "ESS").unwrap();
        let http =
            HttpCollection::new(reqwest::Client::new(), &config, Collection::Datasets).unwrap();
        assert_eq!(
            http.child_url("10.5072/abc def").as_str(),
            "http://localhost:3030/api/v3/Datasets/10.5072%2Fabc%20def"
        );
    }

    #[test]
    fn empty_filter_sends_no_query() {
        let config = BridgeConfig::default();
        let http =
            HttpCollection::new(reqwest::Client::new(), &config, Collection::Datasets).unwrap();
        assert_eq!(http.filter_query(&FilterSpec::default()).unwrap(), None);
        let filter = FilterSpec::with_where(WhereNode::leaf("pid", "x"));
        assert_eq!(
            http.filter_query(&filter).unwrap(),
            Some(("filter", r#"{"where":{"pid":"x"}}"#.to_string()))
        );
    }
}
