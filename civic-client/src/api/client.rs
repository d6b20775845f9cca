use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult, VoteApi};
use civic_types::*;

/// HTTP client for the Civic API and the external analysis service
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    analysis_url: String,
    session_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>, analysis_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_url(base_url.into()),
            analysis_url: trim_url(analysis_url.into()),
            session_token: None,
        }
    }

    /// Set the session token for authenticated requests
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn analysis_url(&self) -> &str {
        &self.analysis_url
    }

    /// Helper to add session token to request if available
    fn add_auth_header(
        &self,
        req: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token.or(self.session_token.as_deref()) {
            Some(token) => req.header("X-Session-Token", token),
            None => req,
        }
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // HTML error pages usually mean a wrong base URL
            let clean_error = if error_text.contains("<html>") || error_text.contains("<!DOCTYPE") {
                format!(
                    "Server returned {} error. Please check the server URL.",
                    status.as_u16()
                )
            } else {
                error_text
            };

            Err(ApiError::from_status(status.as_u16(), clean_error))
        }
    }

    // Authentication endpoints

    /// Login with email and password; keeps the returned token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let login_response: LoginResponse = self.handle_response(response).await?;

        self.session_token = Some(login_response.session_token.clone());

        Ok(login_response)
    }

    /// Invalidate the current session on the server
    pub async fn logout(&mut self) -> ApiResult<()> {
        let url = format!("{}/auth/logout", self.base_url);
        let req = self.add_auth_header(self.client.post(&url), None);
        let response = req.send().await?;
        let _: serde_json::Value = self.handle_response(response).await?;
        self.session_token = None;
        Ok(())
    }

    /// Return the user behind the current session
    pub async fn validate_session(&self) -> ApiResult<User> {
        let url = format!("{}/auth/validate", self.base_url);
        let req = self.add_auth_header(self.client.get(&url), None);
        let response = req.send().await?;
        self.handle_response(response).await
    }

    // Reference data

    pub async fn get_regions(&self, group: Option<&str>) -> ApiResult<Vec<Region>> {
        let mut url = format!("{}/regions", self.base_url);
        if let Some(group) = group {
            url.push_str(&format!("?group={}", urlencoding::encode(group)));
        }
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    pub async fn get_offices(&self, level: Option<JurisdictionLevel>) -> ApiResult<Vec<Office>> {
        let mut url = format!("{}/offices", self.base_url);
        if let Some(level) = level {
            url.push_str(&format!("?level={}", level.as_str()));
        }
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    // Analysis service

    /// Published fact-checks, newest first as served
    pub async fn get_fact_checks(&self) -> ApiResult<Vec<FactCheck>> {
        let url = format!("{}/fact-checks", self.analysis_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Submit a claim for automated analysis
    pub async fn check_claim(&self, claim: &str) -> ApiResult<AiAnalysis> {
        let url = format!("{}/fact-check", self.analysis_url);
        let request = FactCheckRequest {
            claim: claim.to_string(),
        };
        let response = self.client.post(&url).json(&request).send().await?;
        self.handle_response(response).await
    }

    pub async fn get_score_breakdown(&self, politician_id: &str) -> ApiResult<ScoreBreakdown> {
        let url = format!(
            "{}/politicians/{}/analysis",
            self.analysis_url,
            urlencoding::encode(politician_id)
        );
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    fn vote_url(&self, kind: ContentKind, item_id: &str) -> String {
        format!(
            "{}/votes/{}/{}",
            self.base_url,
            kind.as_str(),
            urlencoding::encode(item_id)
        )
    }
}

#[async_trait]
impl VoteApi for ApiClient {
    async fn submit_vote(
        &self,
        token: &str,
        kind: ContentKind,
        item_id: &str,
        direction: VoteDirection,
    ) -> ApiResult<VoteResponse> {
        let url = self.vote_url(kind, item_id);
        let request = VoteRequest {
            direction: direction.as_str().to_string(),
        };
        let req = self.add_auth_header(self.client.post(&url).json(&request), Some(token));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn fetch_tally(
        &self,
        token: Option<&str>,
        kind: ContentKind,
        item_id: &str,
    ) -> ApiResult<TallyResponse> {
        let url = self.vote_url(kind, item_id);
        let req = self.add_auth_header(self.client.get(&url), token);
        let response = req.send().await?;
        self.handle_response(response).await
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
