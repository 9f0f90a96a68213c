//! HTTP client for the three OpenTDB endpoints the importer uses
//!
//! - `api_token.php?command=request`: issues a session token
//! - `api_count.php?category=N`: reports how many questions a category holds
//! - `api.php?amount=N&category=N&token=T`: serves one page of questions
//!
//! All requests share one `reqwest::Client` with the configured timeout, and
//! transient transport failures go through [`with_retry`].

use crate::config::{ApiConfig, RetryConfig};
use crate::error::{Error, FetchError, Result, TokenAcquisitionError};
use crate::retry::with_retry;
use crate::types::ResponseCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TOKEN_ENDPOINT: &str = "api_token.php";
const COUNT_ENDPOINT: &str = "api_count.php";
const BATCH_ENDPOINT: &str = "api.php";

/// One question exactly as the batch endpoint delivers it (HTML-encoded)
///
/// Every field is optional on the wire; the upsert layer decides what is
/// required.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    /// Category display name
    #[serde(default)]
    pub category: Option<String>,
    /// "multiple" or "boolean"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// "easy", "medium" or "hard"
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Question text
    #[serde(default)]
    pub question: String,
    /// Correct answer text
    #[serde(default)]
    pub correct_answer: String,
    /// Incorrect answer texts
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

/// One page from the batch endpoint
#[derive(Clone, Debug)]
pub struct Batch {
    /// The page's response code
    pub code: ResponseCode,
    /// Questions on the page (empty unless `code` is success)
    pub results: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    response_code: i64,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    category_question_count: Option<CategoryQuestionCount>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuestionCount {
    #[serde(default)]
    total_question_count: u64,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

/// Client for the OpenTDB endpoints
pub struct OpenTdbClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl OpenTdbClient {
    /// Create a client for the configured base URL
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(api: &ApiConfig, retry: RetryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(api.request_timeout)
            .user_agent(api.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Request a new session token
    ///
    /// # Errors
    /// Fails with [`TokenAcquisitionError`] on a non-2xx status, a non-zero
    /// response code, a missing token or a transport failure.
    pub async fn request_token(&self) -> std::result::Result<String, TokenAcquisitionError> {
        with_retry(&self.retry, || async move {
            let response = self
                .http
                .get(self.url(TOKEN_ENDPOINT))
                .query(&[("command", "request")])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(TokenAcquisitionError::HttpStatus {
                    status: response.status().as_u16(),
                });
            }

            let body: TokenResponse = response.json().await?;
            if body.response_code != 0 {
                return Err(TokenAcquisitionError::ResponseCode {
                    code: body.response_code,
                });
            }

            match body.token {
                Some(token) if !token.is_empty() => Ok(token),
                _ => Err(TokenAcquisitionError::MissingToken),
            }
        })
        .await
    }

    /// Total number of questions the API holds for `category_id`
    ///
    /// A body without the count object is read as zero.
    pub async fn category_count(&self, category_id: i64) -> std::result::Result<u64, FetchError> {
        let total = with_retry(&self.retry, || async move {
            let response = self
                .http
                .get(self.url(COUNT_ENDPOINT))
                .query(&[("category", category_id)])
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(COUNT_ENDPOINT, e))?;

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus {
                    endpoint: COUNT_ENDPOINT.to_string(),
                    status: response.status().as_u16(),
                });
            }

            let body: CountResponse = response
                .json()
                .await
                .map_err(|e| FetchError::from_reqwest(COUNT_ENDPOINT, e))?;

            Ok(body
                .category_question_count
                .map(|c| c.total_question_count)
                .unwrap_or(0))
        })
        .await?;

        debug!(category_id, total, "Category question count");
        Ok(total)
    }

    /// Fetch one page of at most `amount` questions
    ///
    /// Any response code is returned as-is; interpreting it is the caller's job.
    pub async fn fetch_batch(
        &self,
        amount: u32,
        category_id: i64,
        token: &str,
    ) -> std::result::Result<Batch, FetchError> {
        let amount = amount.to_string();
        let category = category_id.to_string();
        let (amount, category) = (amount.as_str(), category.as_str());

        let body: BatchResponse = with_retry(&self.retry, || async move {
            let response = self
                .http
                .get(self.url(BATCH_ENDPOINT))
                .query(&[
                    ("amount", amount),
                    ("category", category),
                    ("token", token),
                ])
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(BATCH_ENDPOINT, e))?;

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus {
                    endpoint: BATCH_ENDPOINT.to_string(),
                    status: response.status().as_u16(),
                });
            }

            response
                .json::<BatchResponse>()
                .await
                .map_err(|e| FetchError::from_reqwest(BATCH_ENDPOINT, e))
        })
        .await?;

        Ok(Batch {
            code: ResponseCode::from_i64(body.response_code),
            results: body.results,
        })
    }
}
