//! HTTP+JSON scheduling service client
//!
//! Routes: `GET /load_data`, `GET /courses`, `POST /generate`, `POST /filter`,
//! `GET /stats`. Error responses carry `{"detail": "..."}`.

use super::{
    AppliedDescriptions, FilterResponse, SchedulerService, CATALOG_FALLBACK, FILTER_FALLBACK,
    GENERATE_FALLBACK, STATS_FALLBACK,
};
use crate::core::config::ServiceConfig;
use crate::core::error::ServiceError;
use crate::core::models::{Course, CourseCatalog, ResultSet, SystemStats, Timetable};
use crate::core::selection::SlotPreferences;
use crate::debug;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint used when the config leaves it empty
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    course_codes: &'a [String],
    slot_preferences: &'a SlotPreferences,
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(default)]
    timetables: Vec<Timetable>,
}

#[derive(Debug, Serialize)]
struct FilterRequest<'a> {
    schedules: &'a ResultSet,
    constraint_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct FilterBody {
    #[serde(default)]
    filtered_timetables: Vec<Timetable>,
    #[serde(default)]
    constraints_applied: AppliedDescriptions,
}

/// `/courses` answers either `{courses: [...]}` or a bare list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoursesBody {
    Wrapped { courses: Vec<Course> },
    Bare(Vec<Course>),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Pull the service's message out of an error body.
///
/// `detail` may be a string or structured validation output; anything that is
/// not a string is passed on as compact JSON.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn decode_generate(body: &str) -> Result<ResultSet, serde_json::Error> {
    serde_json::from_str::<GenerateBody>(body).map(|b| ResultSet::new(b.timetables))
}

fn decode_filter(body: &str) -> Result<FilterResponse, serde_json::Error> {
    serde_json::from_str::<FilterBody>(body).map(|b| FilterResponse {
        results: ResultSet::new(b.filtered_timetables),
        applied: b.constraints_applied,
    })
}

fn decode_catalog(body: &str) -> Result<CourseCatalog, serde_json::Error> {
    serde_json::from_str::<CoursesBody>(body).map(|b| match b {
        CoursesBody::Wrapped { courses } | CoursesBody::Bare(courses) => CourseCatalog::new(courses),
    })
}

/// Scheduling service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpSchedulerService {
    http: Client,
    base_url: String,
}

impl HttpSchedulerService {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend
    /// initialisation fails).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::new(format!("Failed to create HTTP client: {e}")))?;

        let base_url = if base_url.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };

        Ok(Self { http, base_url })
    }

    /// Create a client from the `[service]` config section
    ///
    /// # Errors
    /// See [`new`](Self::new).
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::new(&config.endpoint, config.timeout())
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Read a response body, mapping non-2xx statuses to the service's detail
    async fn read_body(response: Response, fallback: &str) -> Result<String, ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                debug!("Failed to read response body: {e}");
                ServiceError::new(fallback).with_status(status.as_u16())
            })?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!(
                "Service returned {status}: {}",
                body.chars().take(200).collect::<String>()
            );
            Err(ServiceError::from_detail(extract_detail(&body), fallback).with_status(status.as_u16()))
        }
    }

    async fn get(&self, path: &str, fallback: &str) -> Result<String, ServiceError> {
        debug!("GET {}", self.url(path));
        let response = self.http.get(self.url(path)).send().await.map_err(|e| {
            debug!("GET {path} failed: {e}");
            ServiceError::new(fallback)
        })?;
        Self::read_body(response, fallback).await
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        payload: &B,
        fallback: &str,
    ) -> Result<String, ServiceError> {
        debug!("POST {}", self.url(path));
        let response = self
            .http
            .post(self.url(path))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                debug!("POST {path} failed: {e}");
                ServiceError::new(fallback)
            })?;
        Self::read_body(response, fallback).await
    }
}

#[async_trait]
impl SchedulerService for HttpSchedulerService {
    async fn load_catalog(&self) -> Result<CourseCatalog, ServiceError> {
        // Warm-up only: the backend may already hold its data.
        if let Err(e) = self.get("/load_data", CATALOG_FALLBACK).await {
            debug!("Data load request failed or data already loaded: {e}");
        }

        let body = self.get("/courses", CATALOG_FALLBACK).await?;
        decode_catalog(&body).map_err(|e| {
            debug!("Malformed course list: {e}");
            ServiceError::new(CATALOG_FALLBACK)
        })
    }

    async fn generate(
        &self,
        course_ids: &[String],
        slot_preferences: &SlotPreferences,
    ) -> Result<ResultSet, ServiceError> {
        let request = GenerateRequest {
            course_codes: course_ids,
            slot_preferences,
        };
        let body = self.post("/generate", &request, GENERATE_FALLBACK).await?;
        decode_generate(&body).map_err(|e| {
            debug!("Malformed generate response: {e}");
            ServiceError::new(GENERATE_FALLBACK)
        })
    }

    async fn filter(
        &self,
        current: &ResultSet,
        constraint_text: &str,
    ) -> Result<FilterResponse, ServiceError> {
        let request = FilterRequest {
            schedules: current,
            constraint_text,
        };
        let body = self.post("/filter", &request, FILTER_FALLBACK).await?;
        decode_filter(&body).map_err(|e| {
            debug!("Malformed filter response: {e}");
            ServiceError::new(FILTER_FALLBACK)
        })
    }

    async fn system_stats(&self) -> Result<SystemStats, ServiceError> {
        let body = self.get("/stats", STATS_FALLBACK).await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!("Malformed stats response: {e}");
            ServiceError::new(STATS_FALLBACK)
        })
    }
}
