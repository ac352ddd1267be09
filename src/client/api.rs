use std::time::Duration;

use reqwest::{header::AUTHORIZATION, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::ClientError;
use crate::{
    auth::dto::{LoginPayload, LoginRequest, UserPayload},
    envelope::Envelope,
    inventory::dto::{DonarsPayload, InventoryPayload},
    model::{Inventory, User},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct FailureMessage {
    message: String,
}

/// Typed wrapper over the `/api/v1` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<Envelope<T>, ClientError> {
        self.send(self.http.get(self.url(path)), token).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<Envelope<T>, ClientError> {
        self.send(self.http.post(self.url(path)).json(body), token).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        token: Option<&str>,
    ) -> Result<Envelope<T>, ClientError> {
        let req = match token {
            Some(t) => req.header(AUTHORIZATION, format!("Bearer {t}")),
            None => req,
        };
        let res = req.send().await.map_err(ClientError::Unreachable)?;
        let status = res.status();
        let bytes = res.bytes().await.map_err(ClientError::Unreachable)?;
        debug!(%status, len = bytes.len(), "api response");

        if !status.is_success() {
            let message = serde_json::from_slice::<FailureMessage>(&bytes)
                .map(|f| f.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").into());
            return Err(if status == StatusCode::UNAUTHORIZED {
                ClientError::Unauthenticated(message)
            } else {
                ClientError::Server {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginPayload, ClientError> {
        Ok(self.post("/auth/login", None, req).await?.data)
    }

    pub async fn current_user(&self, token: &str) -> Result<User, ClientError> {
        let env: Envelope<UserPayload> = self.get("/auth/current-user", Some(token)).await?;
        Ok(env.data.user)
    }

    pub async fn get_donars(&self, token: &str) -> Result<Vec<User>, ClientError> {
        let env: Envelope<DonarsPayload> = self.get("/inventory/get-donars", Some(token)).await?;
        Ok(env.data.donars)
    }

    pub async fn get_inventory(&self, token: &str) -> Result<Vec<Inventory>, ClientError> {
        let env: Envelope<InventoryPayload> =
            self.get("/inventory/get-inventory", Some(token)).await?;
        Ok(env.data.inventory)
    }
}
