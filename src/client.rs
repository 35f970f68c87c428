// http client for the event planning service

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PlanningError;
use crate::models::{Configuration, HealthStatus, SubmissionResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECONDS: u64 = 180;
const RUN_EVENT_PATH: &str = "/run-event";
const HEALTH_PATH: &str = "/health";

// get api url from env
pub fn get_planner_api_url() -> String {
    std::env::var("EVENT_PLANNER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

// bounded wait per submission, 0 turns it off
pub fn get_api_timeout() -> Option<Duration> {
    let seconds = std::env::var("API_TIMEOUT_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
    bounded_wait(seconds)
}

pub fn bounded_wait(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

// anything that turns a configuration into a planning result, futures must be Send
pub trait PlanningService: Send + Sync + 'static {
    fn run_event(
        &self,
        config: &Configuration,
    ) -> impl Future<Output = Result<SubmissionResult, PlanningError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpPlanningService {
    client: Client,
    base_url: String,
}

impl HttpPlanningService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PlanningError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = create_http_client()?;
        Ok(Self { client, base_url })
    }

    pub fn from_env() -> Result<Self, PlanningError> {
        Self::new(get_planner_api_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthStatus, PlanningError> {
        let url = self.endpoint(HEALTH_PATH);
        debug!("Checking planning service health at {}", url);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        parse_api_response(response).await
    }
}

impl PlanningService for HttpPlanningService {
    async fn run_event(&self, config: &Configuration) -> Result<SubmissionResult, PlanningError> {
        let url = self.endpoint(RUN_EVENT_PATH);
        info!(
            "Submitting event plan request for {:?} in {}",
            config.event_topic, config.event_city
        );

        let response = make_api_request(&self.client, &url, config).await?;
        let result: SubmissionResult = parse_api_response(response).await?;

        info!("Planning service answered success={}", result.success);
        Ok(result)
    }
}

// helper functions
fn create_http_client() -> Result<Client, PlanningError> {
    Client::builder()
        .build()
        .map_err(|e| PlanningError::Transport(format!("Failed to create HTTP client: {}", e)))
}

async fn make_api_request(
    client: &Client,
    url: &str,
    body: &Configuration,
) -> Result<Response, PlanningError> {
    let response = client.post(url).json(body).send().await?;
    check_status(response).await
}

async fn check_status(response: Response) -> Result<Response, PlanningError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = error_from_body(status, &body);
    warn!("Planning service returned {}: {}", status, err);
    Err(err)
}

async fn parse_api_response<T: for<'de> Deserialize<'de>>(
    response: Response,
) -> Result<T, PlanningError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| PlanningError::InvalidResponse(e.to_string()))
}

// prefer the service's own `detail`, else fall back to the status line
pub fn error_from_body(status: StatusCode, body: &str) -> PlanningError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(detail_text));

    match detail {
        Some(detail) => PlanningError::Service {
            status: status.as_u16(),
            detail,
        },
        None => PlanningError::Transport(format!(
            "Request failed with status code {}",
            status.as_u16()
        )),
    }
}

// 422 bodies carry a list of {loc, msg, type}
fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
