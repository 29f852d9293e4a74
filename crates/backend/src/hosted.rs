use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::env;
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;

use crate::api::{AuthApi, StudyApi};
use crate::error::BackendError;
use crate::records::{
    AuthSession, NewQuizAttempt, NewStudySession, NewUserProfile, ProfileUpdate, QuizAttemptRow,
    StudySessionRow, StudySessionUpdate, SubjectRow, UserProfile,
};

/// Embedded-subject select clause shared by session and attempt reads.
const SUBJECT_SELECT: &str = "*,subject:subjects(id,name,subject_type)";

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct HostedConfig {
    pub base_url: Url,
    pub api_key: String,
}

impl HostedConfig {
    /// Build a config, validating the base URL.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Config` for an unparsable URL or empty key.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, BackendError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(BackendError::Config("api key is empty".into()));
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Config(format!("invalid base url: {e}")))?;
        Ok(Self { base_url, api_key })
    }

    /// Read `LEARNPATH_BACKEND_URL` and `LEARNPATH_BACKEND_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Config` when either variable is missing or
    /// invalid.
    pub fn from_env() -> Result<Self, BackendError> {
        let base_url = env::var("LEARNPATH_BACKEND_URL")
            .map_err(|_| BackendError::Config("LEARNPATH_BACKEND_URL is not set".into()))?;
        let api_key = env::var("LEARNPATH_BACKEND_KEY")
            .map_err(|_| BackendError::Config("LEARNPATH_BACKEND_KEY is not set".into()))?;
        Self::new(&base_url, api_key)
    }
}

//
// ─── CLIENT ────────────────────────────────────────────────────────────────────
//

/// Client for the hosted auth/data service.
///
/// Keeps the access token from the last successful sign-in and sends it as
/// the bearer credential on data calls; before sign-in the api key doubles
/// as the anonymous credential, matching the hosted service's convention.
#[derive(Clone)]
pub struct HostedClient {
    http: Client,
    config: HostedConfig,
    token: Arc<Mutex<Option<String>>>,
}

/// Wire shape of the auth endpoints; `expires_at` arrives as epoch seconds.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserProfile,
}

impl AuthResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            user: self.user,
            access_token: self.access_token,
            expires_at: self.expires_at.and_then(|t| DateTime::from_timestamp(t, 0)),
        }
    }
}

/// Error body the service sends alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorBody {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .unwrap_or_else(|| format!("request failed with status {status}"))
    }
}

impl HostedClient {
    #[must_use]
    pub fn new(config: HostedConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Config` when the environment is incomplete.
    pub fn from_env() -> Result<Self, BackendError> {
        Ok(Self::new(HostedConfig::from_env()?))
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| BackendError::Config(format!("invalid endpoint {path}: {e}")))
    }

    fn bearer(&self) -> String {
        self.stored_token()
            .unwrap_or_else(|| self.config.api_key.clone())
    }

    fn stored_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn store_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = token;
        }
    }

    /// Attach the credentials every call needs.
    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(self.bearer())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(map_transport)?;
        check_status(response).await
    }

    async fn read_single<T>(&self, builder: RequestBuilder) -> Result<T, BackendError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let rows: Vec<T> = self.send(builder).await?.json().await.map_err(map_transport)?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }
}

fn map_transport(e: reqwest::Error) -> BackendError {
    if e.is_connect() || e.is_timeout() {
        BackendError::Unreachable
    } else if e.is_decode() {
        BackendError::Payload(e.to_string())
    } else {
        BackendError::Rejected(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body.into_message(status);
    tracing::warn!("learning service rejected a request: {message}");
    Err(BackendError::Rejected(message))
}

//
// ─── AUTH API ──────────────────────────────────────────────────────────────────
//

#[async_trait]
impl AuthApi for HostedClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("auth/v1/token")?;
        let response = self
            .send(
                self.http
                    .post(url)
                    .query(&[("grant_type", "password")])
                    .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .await?;

        let auth: AuthResponse = response.json().await.map_err(map_transport)?;
        let session = auth.into_session();
        self.store_token(Some(session.access_token.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: NewUserProfile,
    ) -> Result<AuthSession, BackendError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .send(self.http.post(url).json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": profile,
            })))
            .await?;

        let auth: AuthResponse = response.json().await.map_err(map_transport)?;
        let session = auth.into_session();
        self.store_token(Some(session.access_token.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        self.send(self.http.post(url)).await?;
        self.store_token(None);
        Ok(())
    }

    async fn session(&self) -> Result<Option<AuthSession>, BackendError> {
        let Some(token) = self.stored_token() else {
            return Ok(None);
        };

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .authed(self.http.get(url))
            .send()
            .await
            .map_err(map_transport)?;

        // An expired or revoked token is a signed-out state, not a failure.
        if response.status() == StatusCode::UNAUTHORIZED {
            self.store_token(None);
            return Ok(None);
        }
        let response = check_status(response).await?;
        let user: UserProfile = response.json().await.map_err(map_transport)?;
        Ok(Some(AuthSession {
            user,
            access_token: token,
            expires_at: None,
        }))
    }

    async fn profile(&self, user_id: Uuid) -> Result<UserProfile, BackendError> {
        let url = self.endpoint("rest/v1/user_profiles")?;
        self.read_single(
            self.http
                .get(url)
                .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))]),
        )
        .await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let url = self.endpoint("rest/v1/user_profiles")?;
        self.read_single(
            self.http
                .patch(url)
                .query(&[("select", "*".to_string()), ("id", format!("eq.{user_id}"))])
                .header("Prefer", "return=representation")
                .json(&update),
        )
        .await
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/recover")?;
        self.send(
            self.http
                .post(url)
                .json(&serde_json::json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<UserProfile>, BackendError> {
        let url = self.endpoint("rest/v1/user_profiles")?;
        let response = self
            .send(self.http.get(url).query(&[
                ("select", "*"),
                ("role", "eq.student"),
                ("status", "eq.active"),
                ("order", "full_name"),
            ]))
            .await?;
        response.json().await.map_err(map_transport)
    }
}

//
// ─── STUDY API ─────────────────────────────────────────────────────────────────
//

#[async_trait]
impl StudyApi for HostedClient {
    async fn list_subjects(&self) -> Result<Vec<SubjectRow>, BackendError> {
        let url = self.endpoint("rest/v1/subjects")?;
        let response = self
            .send(
                self.http
                    .get(url)
                    .query(&[("select", "*"), ("order", "name")]),
            )
            .await?;
        response.json().await.map_err(map_transport)
    }

    async fn list_study_sessions(
        &self,
        student_id: Option<Uuid>,
    ) -> Result<Vec<StudySessionRow>, BackendError> {
        let url = self.endpoint("rest/v1/study_sessions")?;
        let mut query = vec![
            ("select".to_string(), SUBJECT_SELECT.to_string()),
            ("order".to_string(), "created_at.desc".to_string()),
        ];
        if let Some(id) = student_id {
            query.push(("student_id".to_string(), format!("eq.{id}")));
        }

        let response = self.send(self.http.get(url).query(&query)).await?;
        response.json().await.map_err(map_transport)
    }

    async fn create_study_session(
        &self,
        new: NewStudySession,
    ) -> Result<StudySessionRow, BackendError> {
        let url = self.endpoint("rest/v1/study_sessions")?;
        self.read_single(
            self.http
                .post(url)
                .query(&[("select", SUBJECT_SELECT)])
                .header("Prefer", "return=representation")
                .json(&[new]),
        )
        .await
    }

    async fn update_study_session(
        &self,
        id: i64,
        update: StudySessionUpdate,
    ) -> Result<StudySessionRow, BackendError> {
        let url = self.endpoint("rest/v1/study_sessions")?;
        self.read_single(
            self.http
                .patch(url)
                .query(&[
                    ("select", SUBJECT_SELECT.to_string()),
                    ("id", format!("eq.{id}")),
                ])
                .header("Prefer", "return=representation")
                .json(&update),
        )
        .await
    }

    async fn list_quiz_attempts(
        &self,
        student_id: Option<Uuid>,
    ) -> Result<Vec<QuizAttemptRow>, BackendError> {
        let url = self.endpoint("rest/v1/quiz_attempts")?;
        let mut query = vec![
            ("select".to_string(), SUBJECT_SELECT.to_string()),
            ("order".to_string(), "completed_at.desc".to_string()),
        ];
        if let Some(id) = student_id {
            query.push(("student_id".to_string(), format!("eq.{id}")));
        }

        let response = self.send(self.http.get(url).query(&query)).await?;
        response.json().await.map_err(map_transport)
    }

    async fn create_quiz_attempt(
        &self,
        new: NewQuizAttempt,
    ) -> Result<QuizAttemptRow, BackendError> {
        let url = self.endpoint("rest/v1/quiz_attempts")?;
        self.read_single(
            self.http
                .post(url)
                .query(&[("select", SUBJECT_SELECT)])
                .header("Prefer", "return=representation")
                .json(&[new]),
        )
        .await
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
