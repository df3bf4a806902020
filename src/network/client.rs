//! HTTP client wrapper - typed calls against the expenses API

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthResponse, Category, ExpensePage, ExpensePayload, ExpenseQuery, SavedExpense,
    SigninRequest, SignupRequest, User,
};

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Error body shapes the API uses
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Server-provided error text, if the body carries one
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: error_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        }),
    }
}

/// Query string of the list endpoint
pub fn expense_query_params(query: &ExpenseQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit", query.limit.to_string())];
    if let Some(cursor) = &query.cursor {
        params.push(("cursor", cursor.clone()));
    }
    if let Some(start) = query.start_date {
        params.push(("startDate", start.format(QUERY_DATE_FORMAT).to_string()));
    }
    if let Some(end) = query.end_date {
        params.push(("endDate", end.format(QUERY_DATE_FORMAT).to_string()));
    }
    params
}

#[derive(serde::Serialize)]
struct NewCategory<'a> {
    title: &'a str,
}

/// Client bound to one API base URL, carrying the session token
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        ApiClient {
            http: create_client(timeout),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a JSON body. A 401 on an authenticated
    /// call becomes `ApiError::Unauthorized`.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let resp = self.authorized(builder).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status == StatusCode::UNAUTHORIZED && self.has_token() {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Like `send_json` but ignores the body of a successful response
    async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        let resp = self.authorized(builder).send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED && self.has_token() {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        Ok(())
    }

    /// Signup and signin answer client errors with an `AuthResponse` too,
    /// so those are returned as unsuccessful responses, not errors.
    async fn send_auth(&self, builder: RequestBuilder) -> ApiResult<AuthResponse> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
        }
        if status.is_client_error() {
            let mut answer: AuthResponse = serde_json::from_str(&body).unwrap_or_default();
            answer.success = false;
            if answer.message.is_none() {
                answer.message = error_message(&body);
            }
            return Ok(answer);
        }
        Err(status_error(status, &body))
    }

    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        self.send_auth(self.http.post(self.url("auth/signup")).json(request))
            .await
    }

    pub async fn signin(&self, request: &SigninRequest) -> ApiResult<AuthResponse> {
        self.send_auth(self.http.post(self.url("auth/signin")).json(request))
            .await
    }

    pub async fn signout(&self) -> ApiResult<()> {
        self.send_empty(self.http.get(self.url("auth/signout"))).await
    }

    pub async fn profile(&self) -> ApiResult<User> {
        self.send_json(self.http.get(self.url("users/me"))).await
    }

    pub async fn list_expenses(&self, query: &ExpenseQuery) -> ApiResult<ExpensePage> {
        let params = expense_query_params(query);
        self.send_json(self.http.get(self.url("expenses")).query(&params))
            .await
    }

    pub async fn create_expense(&self, payload: &ExpensePayload) -> ApiResult<SavedExpense> {
        self.send_json(self.http.post(self.url("expenses")).json(payload))
            .await
    }

    pub async fn update_expense(
        &self,
        expense_id: &str,
        payload: &ExpensePayload,
    ) -> ApiResult<SavedExpense> {
        let url = self.url(&format!("expenses/{}", expense_id));
        self.send_json(self.http.put(url).json(payload)).await
    }

    pub async fn delete_expense(&self, expense_id: &str) -> ApiResult<()> {
        let url = self.url(&format!("expenses/{}", expense_id));
        self.send_empty(self.http.delete(url)).await
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        self.send_json(self.http.get(self.url("categories"))).await
    }

    pub async fn create_category(&self, title: &str) -> ApiResult<Category> {
        self.send_json(
            self.http
                .post(self.url("categories"))
                .json(&NewCategory { title }),
        )
        .await
    }
}

/// Create an HTTP client with default configuration
fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("spendly/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?timeout, "HTTP client setup failed, using defaults without the timeout");
            reqwest::Client::new()
        })
}
