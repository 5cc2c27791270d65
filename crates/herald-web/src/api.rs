//! HTTP client for the token registry.
//!
//! Uses gloo-net to call the `/fcm-tokens/*` endpoints with JSON bodies and
//! Bearer auth. Every call races a timer; a request that loses is reported
//! as [`RegistryError::Timeout`].

use async_trait::async_trait;
use futures::future::{select, Either};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;

use herald_client::ports::TokenRegistry;
use herald_client::RegistryError;
use herald_common::protocol::{ApiErrorResponse, TokenRequest, REMOVE_PATH, SAVE_PATH, TEST_PATH};

fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Parse a non-2xx response into a registry error.
async fn parse_error(resp: Response) -> RegistryError {
    let status = resp.status();
    let message = match resp.json::<ApiErrorResponse>().await {
        Ok(e) => e.message,
        Err(_) => format!("HTTP {status}"),
    };
    RegistryError::Rejected { status, message }
}

pub struct HttpRegistry {
    base_url: String,
    timeout_ms: u32,
}

impl HttpRegistry {
    /// `base_url` is prepended to every endpoint path (`""` for same origin root).
    pub fn new(base_url: impl Into<String>, timeout_ms: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: Request) -> Result<(), RegistryError> {
        let send = Box::pin(request.send());
        let timer = Box::pin(TimeoutFuture::new(self.timeout_ms));

        let resp = match select(send, timer).await {
            Either::Left((result, _)) => result.map_err(|e| RegistryError::Transport(e.to_string()))?,
            Either::Right(_) => return Err(RegistryError::Timeout),
        };

        if resp.ok() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

#[async_trait(?Send)]
impl TokenRegistry for HttpRegistry {
    async fn save(&self, bearer: &str, request: &TokenRequest) -> Result<(), RegistryError> {
        let req = Request::post(&self.url(SAVE_PATH))
            .header("Authorization", &auth_header(bearer))
            .json(request)
            .map_err(|e| RegistryError::Transport(e.to_string()))?;
        self.send(req).await
    }

    async fn remove(&self, bearer: &str, request: &TokenRequest) -> Result<(), RegistryError> {
        let req = Request::delete(&self.url(REMOVE_PATH))
            .header("Authorization", &auth_header(bearer))
            .json(request)
            .map_err(|e| RegistryError::Transport(e.to_string()))?;
        self.send(req).await
    }

    async fn send_test(&self, bearer: &str) -> Result<(), RegistryError> {
        let req = Request::post(&self.url(TEST_PATH))
            .header("Authorization", &auth_header(bearer))
            .build()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;
        self.send(req).await
    }
}
