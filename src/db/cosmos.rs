/// Azure Cosmos DB (NoSQL API) movie store
///
/// Talks to the REST gateway directly with master-key authorization.
/// The gateway cannot merge `ORDER BY` across partitions, so queries run
/// once per partition key range and the pages are merged here. Vector
/// ranking itself is delegated to `VectorDistance` on the server.
use std::cmp::Ordering;

use crate::{
    db::{MovieStore, NearestQuery},
    error::{AppError, AppResult},
    models::SearchResult,
    services::filter::Predicate,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

const API_VERSION: &str = "2018-12-31";
const CONTINUATION_HEADER: &str = "x-ms-continuation";
const RANGE_ID_HEADER: &str = "x-ms-documentdb-partitionkeyrangeid";

type HmacSha256 = Hmac<Sha256>;

/// Account endpoint and decoded master key from a connection string
#[derive(Clone, PartialEq)]
pub struct CosmosConnection {
    pub endpoint: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for CosmosConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmosConnection")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl CosmosConnection {
    /// Parses `AccountEndpoint=https://...;AccountKey=...;`
    ///
    /// Keys are base64 and may end in `=`, so each segment is split on the
    /// first `=` only.
    pub fn parse(connection_string: &str) -> AppResult<Self> {
        let mut endpoint = None;
        let mut key = None;

        for segment in connection_string.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((name, value)) = segment.split_once('=') else {
                return Err(AppError::Config(format!(
                    "Malformed connection string segment '{}'",
                    name_only(segment)
                )));
            };
            match name.trim() {
                n if n.eq_ignore_ascii_case("AccountEndpoint") => {
                    endpoint = Some(value.trim().trim_end_matches('/').to_string())
                }
                n if n.eq_ignore_ascii_case("AccountKey") => key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint.ok_or_else(|| {
            AppError::Config("Connection string is missing AccountEndpoint".to_string())
        })?;
        let key = key.ok_or_else(|| {
            AppError::Config("Connection string is missing AccountKey".to_string())
        })?;
        let key = BASE64
            .decode(key.as_bytes())
            .map_err(|e| AppError::Config(format!("AccountKey is not valid base64: {}", e)))?;

        Ok(Self { endpoint, key })
    }

    /// Master-key authorization header value, already URL-encoded
    fn authorization(
        &self,
        verb: &str,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> AppResult<String> {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(format!("Invalid signing key: {}", e)))?;
        mac.update(payload.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        let token = format!("type=master&ver=1.0&sig={}", signature);
        Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
    }
}

/// Never echo the key material in errors
fn name_only(segment: &str) -> &str {
    segment.split('=').next().unwrap_or_default()
}

/// Distance function configured on the container's vector embedding policy
///
/// `VectorDistance` returns a similarity for cosine and dot product (higher
/// is closer) and a distance for euclidean. Results leave the store as
/// distances either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFunction {
    #[default]
    Cosine,
    DotProduct,
    Euclidean,
}

impl DistanceFunction {
    pub fn to_distance(self, score: f64) -> f64 {
        match self {
            DistanceFunction::Cosine | DistanceFunction::DotProduct => (1.0 - score).max(0.0),
            DistanceFunction::Euclidean => score.max(0.0),
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryParameter {
    name: &'static str,
    value: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    parameters: &'a [QueryParameter],
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(rename = "Documents")]
    documents: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PartitionKeyRange {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PartitionKeyRanges {
    #[serde(rename = "PartitionKeyRanges")]
    ranges: Vec<PartitionKeyRange>,
}

#[derive(Clone)]
pub struct CosmosStore {
    http_client: HttpClient,
    connection: CosmosConnection,
    /// `dbs/{database}/colls/{container}`, used both in the URL and the signature
    resource_link: String,
    distance_function: DistanceFunction,
}

impl CosmosStore {
    /// `http_client` should already carry the request timeouts
    pub fn new(
        http_client: HttpClient,
        connection_string: &str,
        database: &str,
        container: &str,
        distance_function: DistanceFunction,
    ) -> AppResult<Self> {
        let connection = CosmosConnection::parse(connection_string)?;

        tracing::info!(
            endpoint = %connection.endpoint,
            database = %database,
            container = %container,
            distance_function = ?distance_function,
            "Configured Cosmos DB store"
        );

        Ok(Self {
            http_client,
            connection,
            resource_link: format!("dbs/{}/colls/{}", database, container),
            distance_function,
        })
    }

    fn collection_url(&self, resource: &str) -> String {
        format!("{}/{}/{}", self.connection.endpoint, self.resource_link, resource)
    }

    /// Request with the date, version and master-key authorization headers set
    fn signed(&self, method: Method, resource_type: &str) -> AppResult<RequestBuilder> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let authorization = self.connection.authorization(
            method.as_str(),
            resource_type,
            &self.resource_link,
            &date,
        )?;

        Ok(self
            .http_client
            .request(method, self.collection_url(resource_type))
            .header("authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION))
    }

    fn transport_error(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::BackendQuery("Cosmos DB request timed out".to_string())
        } else {
            AppError::BackendQuery(format!("Cosmos DB request failed: {}", e))
        }
    }

    /// The response body stays in the log; callers only see the status
    async fn check_status(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Cosmos DB request failed");
        Err(AppError::BackendQuery(format!("Cosmos DB returned status {}", status)))
    }

    async fn partition_key_ranges(&self) -> AppResult<Vec<String>> {
        let response = self
            .signed(Method::GET, "pkranges")?
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let listing: PartitionKeyRanges = response.json().await.map_err(|e| {
            AppError::BackendQuery(format!("Failed to parse partition key ranges: {}", e))
        })?;
        if listing.ranges.is_empty() {
            return Err(AppError::BackendQuery(
                "Cosmos DB reported no partition key ranges".to_string(),
            ));
        }

        Ok(listing.ranges.into_iter().map(|r| r.id).collect())
    }

    /// Runs a parameterised query against one partition key range, following
    /// continuation pages until `max_items` documents are collected or the
    /// server has no more. Documents that do not decode as `T` are skipped.
    async fn query_range<T: DeserializeOwned>(
        &self,
        range_id: &str,
        query: &str,
        parameters: &[QueryParameter],
        max_items: usize,
    ) -> AppResult<Vec<T>> {
        let body = serde_json::to_vec(&QueryBody { query, parameters })
            .map_err(|e| AppError::Internal(format!("Query encoding error: {}", e)))?;
        let mut documents: Vec<T> = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .signed(Method::POST, "docs")?
                .header("x-ms-documentdb-isquery", "True")
                .header("x-ms-documentdb-query-enablecrosspartition", "True")
                .header(RANGE_ID_HEADER, range_id)
                .header("x-ms-max-item-count", max_items.to_string())
                .header("content-type", "application/query+json")
                .body(body.clone());
            if let Some(token) = &continuation {
                request = request.header(CONTINUATION_HEADER, token);
            }

            let response = request.send().await.map_err(Self::transport_error)?;
            let response = Self::check_status(response).await?;

            continuation = response
                .headers()
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let page: QueryPage = response.json().await.map_err(|e| {
                AppError::BackendQuery(format!("Failed to parse Cosmos DB response: {}", e))
            })?;
            for document in page.documents {
                match serde_json::from_value(document) {
                    Ok(decoded) => documents.push(decoded),
                    Err(e) => tracing::warn!(
                        range = %range_id,
                        error = %e,
                        "Skipping malformed document"
                    ),
                }
            }

            if documents.len() >= max_items || continuation.is_none() {
                break;
            }
            tracing::debug!(collected = documents.len(), "Following query continuation");
        }

        documents.truncate(max_items);
        Ok(documents)
    }
}

/// SQL for a top-K vector query, with the predicate as the WHERE body
pub fn nearest_sql(predicate: Option<&Predicate>) -> String {
    let mut sql = String::from(
        "SELECT TOP @num_results c.id, c.title, c.genres, c.rating, c.year, \
         c.plot_summary, c.plot_synopsis, \
         VectorDistance(c.embedding, @embedding) AS similarity_score FROM c",
    );
    if let Some(predicate) = predicate.filter(|p| !p.is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate.to_string());
    }
    sql.push_str(" ORDER BY VectorDistance(c.embedding, @embedding)");
    sql
}

const EMBEDDING_BY_TITLE_SQL: &str = "SELECT VALUE c.embedding FROM c WHERE c.title = @title";

fn by_distance_then_title(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.similarity_score
        .partial_cmp(&b.similarity_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.title.cmp(&b.title))
}

#[async_trait::async_trait]
impl MovieStore for CosmosStore {
    async fn nearest(&self, query: NearestQuery) -> AppResult<Vec<SearchResult>> {
        let sql = nearest_sql(query.predicate.as_ref());
        let ranges = self.partition_key_ranges().await?;
        tracing::debug!(
            sql = %sql,
            limit = query.limit,
            ranges = ranges.len(),
            "Running vector query"
        );

        let parameters = [
            QueryParameter {
                name: "@embedding",
                value: serde_json::json!(query.embedding),
            },
            QueryParameter {
                name: "@num_results",
                value: serde_json::json!(query.limit),
            },
        ];

        let mut results: Vec<SearchResult> = Vec::new();
        for range_id in &ranges {
            let page: Vec<SearchResult> =
                self.query_range(range_id, &sql, &parameters, query.limit).await?;
            results.extend(page);
        }

        for result in &mut results {
            result.similarity_score = self.distance_function.to_distance(result.similarity_score);
        }
        results.sort_by(by_distance_then_title);
        results.truncate(query.limit);
        Ok(results)
    }

    async fn embedding_for_title(&self, title: &str) -> AppResult<Option<Vec<f32>>> {
        let parameters = [QueryParameter {
            name: "@title",
            value: serde_json::json!(title),
        }];

        for range_id in self.partition_key_ranges().await? {
            let embeddings: Vec<Vec<f32>> = self
                .query_range(&range_id, EMBEDDING_BY_TITLE_SQL, &parameters, 1)
                .await?;
            if let Some(embedding) = embeddings.into_iter().next() {
                return Ok(Some(embedding));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "cosmos"
    }
}
