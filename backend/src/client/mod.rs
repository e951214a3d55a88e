//! Client for the data-set REST API.
//!
//! Mirrors the endpoints the upload and preview screens use:
//!
//! | Method | Path                     | Returns                      |
//! |--------|--------------------------|------------------------------|
//! | GET    | `{prefix}`               | Records, filtered by query   |
//! | GET    | `{prefix}/{id}`          | One record                   |
//! | GET    | `{prefix}/{id}/meta`     | Record metadata              |
//! | GET    | `{prefix}/{id}/relations`| Related records              |
//! | GET    | `{prefix}/{id}/image`    | Full-size image bytes        |
//! | GET    | `{prefix}/{id}/binary`   | Raw file bytes               |
//!
//! Authentication is not built here; an already-formed `Authorization`
//! header value can be passed through with [`DataSetClient::with_auth`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dataset_series::client::DataSetClient;
//!
//! let client = DataSetClient::new("http://localhost:5000/api/data-sets");
//! let record = client.get_data_set("65f0c0ffee").await?;
//! let payload = record.time_series_payload()?;
//! ```

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{ClientError, ClientResult};
use crate::models::{DataSetRecord, DataType, TabularPayload};
use crate::validation::validate_time_series_payload;

/// Filters for [`DataSetClient::get_data_set_list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub assignment: Option<String>,
    pub assignment_type: Option<String>,
    pub data_type: Option<DataType>,
}

impl ListQuery {
    /// Query pairs for the filters that are set, in a stable order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(assignment) = &self.assignment {
            pairs.push(("assignment", assignment.clone()));
        }
        if let Some(assignment_type) = &self.assignment_type {
            pairs.push(("assignmentType", assignment_type.clone()));
        }
        if let Some(data_type) = self.data_type {
            pairs.push(("dataType", data_type.id().to_string()));
        }
        pairs
    }
}

/// Data-set API client.
#[derive(Clone)]
pub struct DataSetClient {
    http: reqwest::Client,
    api_prefix: String,
    auth: Option<String>,
}

impl DataSetClient {
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_prefix: api_prefix.into().trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    /// Build a client from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let client = Self::new(settings.api_prefix.clone());
        match &settings.api_auth {
            Some(auth) => client.with_auth(auth.clone()),
            None => client,
        }
    }

    /// Send this `Authorization` header value with every request.
    pub fn with_auth(mut self, header_value: impl Into<String>) -> Self {
        self.auth = Some(header_value.into());
        self
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// URL of an endpoint below the prefix.
    pub fn url(&self, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => format!("{}/{}", self.api_prefix, suffix.trim_start_matches('/')),
            None => self.api_prefix.clone(),
        }
    }

    fn get(&self, url: &str, accept_json: bool) -> RequestBuilder {
        let mut request = self.http.get(url);
        if accept_json {
            request = request.header(ACCEPT, "application/json");
        }
        if let Some(auth) = &self.auth {
            request = request.header(AUTHORIZATION, auth);
        }
        request
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        suffix: Option<&str>,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.url(suffix);
        debug!(%url, "GET");

        let mut request = self.get(&url, true);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ClientError::Status { status, url });
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch bytes; error statuses yield `None`.
    async fn get_bytes(&self, suffix: &str) -> ClientResult<Option<Vec<u8>>> {
        let url = self.url(Some(suffix));
        debug!(%url, "GET");

        let response = self.get(&url, false).send().await?;
        if response.status().as_u16() >= 400 {
            debug!(%url, status = response.status().as_u16(), "no content");
            return Ok(None);
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }

    /// Fetch one data set.
    pub async fn get_data_set(&self, id: &str) -> ClientResult<DataSetRecord> {
        let record: DataSetRecord = self.get_json(Some(id), &[]).await?;
        info!(id, data_type = %record.data_type, "fetched data set");
        Ok(record)
    }

    pub async fn get_data_set_meta(&self, id: &str) -> ClientResult<Value> {
        self.get_json(Some(&format!("{}/meta", id)), &[]).await
    }

    pub async fn get_related_data_sets(&self, id: &str) -> ClientResult<Value> {
        self.get_json(Some(&format!("{}/relations", id)), &[]).await
    }

    /// List data sets matching the query filters.
    pub async fn get_data_set_list(&self, query: &ListQuery) -> ClientResult<Vec<DataSetRecord>> {
        self.get_json(None, &query.pairs()).await
    }

    /// Thumbnail of an image data set; `None` for other types.
    pub async fn get_thumbnail(&self, id: &str) -> ClientResult<Option<String>> {
        let record = self.get_data_set(id).await?;
        Ok(record.thumbnail().map(str::to_string))
    }

    pub async fn get_full_image(&self, id: &str) -> ClientResult<Option<Vec<u8>>> {
        self.get_bytes(&format!("{}/image", id)).await
    }

    pub async fn get_binary(&self, id: &str) -> ClientResult<Option<Vec<u8>>> {
        self.get_bytes(&format!("{}/binary", id)).await
    }
}

impl DataSetRecord {
    /// Thumbnail data URL of an image record.
    pub fn thumbnail(&self) -> Option<&str> {
        if self.data_type != DataType::Image {
            return None;
        }
        self.payload.get("thumbnail").and_then(Value::as_str)
    }

    /// Validate and deserialize the payload of a time-series record.
    pub fn time_series_payload(&self) -> ClientResult<TabularPayload> {
        if self.data_type != DataType::TimeSeries {
            return Err(ClientError::WrongType {
                id: self.id.clone(),
                expected: DataType::TimeSeries.to_string(),
                actual: self.data_type.to_string(),
            });
        }

        validate_time_series_payload(&self.payload)
            .map_err(|errors| ClientError::InvalidPayload { errors })?;

        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Requests = Arc<Mutex<Vec<String>>>;

    const TIME_SERIES_RECORD: &str = r#"{"_id":"ds1","type":"TIME_SERIES","payload":{"columns":["t","a"],"indexColumn":"t","data":[["0","1"]]}}"#;
    const IMAGE_RECORD: &str =
        r#"{"_id":"img1","type":"IMAGE","payload":{"thumbnail":"data:image/png;base64,AA"}}"#;

    /// Local HTTP server answering each path with a canned status and body.
    /// Unknown paths get a 404. Every request head is recorded.
    async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> (DataSetClient, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let prefix = format!("http://{}/api/data-sets", listener.local_addr().unwrap());
        let requests: Requests = Arc::default();
        let log = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&head).into_owned();
                let target = head.split_whitespace().nth(1).unwrap_or_default();
                let path = target.split('?').next().unwrap_or_default();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or((404, "{}"));
                log.lock().unwrap().push(head);

                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (DataSetClient::new(prefix), requests)
    }

    fn record(data_type: &str, payload: Value) -> DataSetRecord {
        serde_json::from_value(json!({
            "_id": "ds1",
            "type": data_type,
            "payload": payload
        }))
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = DataSetClient::new("http://host/api/data-sets/");
        assert_eq!(client.api_prefix(), "http://host/api/data-sets");
        assert_eq!(client.url(None), "http://host/api/data-sets");
        assert_eq!(client.url(Some("42/meta")), "http://host/api/data-sets/42/meta");
    }

    #[test]
    fn test_list_query_pairs() {
        assert!(ListQuery::default().pairs().is_empty());

        let query = ListQuery {
            assignment: Some("a1".into()),
            assignment_type: None,
            data_type: Some(DataType::TimeSeries),
        };
        assert_eq!(
            query.pairs(),
            vec![
                ("assignment", "a1".to_string()),
                ("dataType", "TIME_SERIES".to_string())
            ]
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            api_auth: Some("Bearer t".into()),
            ..Default::default()
        };
        let client = DataSetClient::from_settings(&settings);
        assert_eq!(client.auth.as_deref(), Some("Bearer t"));
    }

    #[test]
    fn test_thumbnail() {
        let image = record("IMAGE", json!({ "thumbnail": "data:image/png;base64,AA" }));
        assert_eq!(image.thumbnail(), Some("data:image/png;base64,AA"));

        let series = record("TIME_SERIES", json!({ "thumbnail": "x" }));
        assert_eq!(series.thumbnail(), None);
    }

    #[test]
    fn test_time_series_payload() {
        let rec = record(
            "TIME_SERIES",
            json!({
                "columns": ["t", "a"],
                "indexColumn": "t",
                "data": [["0", "1"]],
                "dateFormat": null,
                "columnMapping": { "a": "A" }
            }),
        );
        let payload = rec.time_series_payload().unwrap();
        assert_eq!(payload.label_for("a"), "A");
    }

    #[test]
    fn test_time_series_payload_errors() {
        let rec = record("JSON", json!({}));
        assert!(matches!(
            rec.time_series_payload(),
            Err(ClientError::WrongType { .. })
        ));

        let rec = record("TIME_SERIES", json!({ "columns": 5 }));
        assert!(matches!(
            rec.time_series_payload(),
            Err(ClientError::InvalidPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_data_set_sends_auth() {
        let (client, requests) = serve(vec![("/api/data-sets/ds1", 200, TIME_SERIES_RECORD)]).await;
        let client = client.with_auth("Bearer secret");

        let record = client.get_data_set("ds1").await.unwrap();
        assert_eq!(record.id, "ds1");
        assert_eq!(record.data_type, DataType::TimeSeries);
        assert!(record.time_series_payload().is_ok());

        let head = requests.lock().unwrap()[0].to_lowercase();
        assert!(head.starts_with("get /api/data-sets/ds1 "));
        assert!(head.contains("authorization: bearer secret"));
        assert!(head.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_error_status_on_json_endpoints() {
        let (client, _) = serve(vec![("/api/data-sets/ds1/meta", 500, "{}")]).await;

        match client.get_data_set("missing").await {
            Err(ClientError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/api/data-sets/missing"));
            }
            other => panic!("expected status error, got {:?}", other.map(|r| r.id)),
        }
        assert!(matches!(
            client.get_data_set_meta("ds1").await,
            Err(ClientError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_meta_and_relations() {
        let (client, _) = serve(vec![
            ("/api/data-sets/ds1/meta", 200, r#"{"rows":1}"#),
            ("/api/data-sets/ds1/relations", 200, r#"[{"_id":"ds2"}]"#),
        ])
        .await;

        assert_eq!(client.get_data_set_meta("ds1").await.unwrap(), json!({ "rows": 1 }));
        assert_eq!(
            client.get_related_data_sets("ds1").await.unwrap(),
            json!([{ "_id": "ds2" }])
        );
    }

    #[tokio::test]
    async fn test_list_sends_filters() {
        let body = r#"[{"_id":"ds1","type":"TIME_SERIES"},{"_id":"img1","type":"IMAGE"}]"#;
        let (client, requests) = serve(vec![("/api/data-sets", 200, body)]).await;

        let query = ListQuery {
            assignment: Some("a1".into()),
            assignment_type: Some("course".into()),
            data_type: Some(DataType::TimeSeries),
        };
        let records = client.get_data_set_list(&query).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].data_type, DataType::Image);

        let head = requests.lock().unwrap()[0].clone();
        assert!(head.starts_with(
            "GET /api/data-sets?assignment=a1&assignmentType=course&dataType=TIME_SERIES "
        ));
    }

    #[tokio::test]
    async fn test_thumbnail_only_for_images() {
        let (client, _) = serve(vec![
            ("/api/data-sets/img1", 200, IMAGE_RECORD),
            ("/api/data-sets/ds1", 200, TIME_SERIES_RECORD),
        ])
        .await;

        assert_eq!(
            client.get_thumbnail("img1").await.unwrap().as_deref(),
            Some("data:image/png;base64,AA")
        );
        assert_eq!(client.get_thumbnail("ds1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bytes_endpoints() {
        let (client, requests) = serve(vec![("/api/data-sets/img1/image", 200, "PNGDATA")]).await;
        let client = client.with_auth("Bearer secret");

        assert_eq!(
            client.get_full_image("img1").await.unwrap(),
            Some(b"PNGDATA".to_vec())
        );
        assert_eq!(client.get_binary("img1").await.unwrap(), None);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].to_lowercase().contains("authorization: bearer secret"));
        assert!(!requests[0].to_lowercase().contains("accept: application/json"));
    }
}
