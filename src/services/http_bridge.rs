// src/services/http_bridge.rs
//! Bearer-authenticated POST helper shared by the request and response
//! services.

use crate::error::DidAuthError;
use serde::Serialize;

/// POSTs `body` as JSON with an `Authorization: Bearer <token>` header.
///
/// Transport failures surface as [`DidAuthError::Network`], non-2xx
/// responses as [`DidAuthError::Service`] with status and body. No retries
/// happen here — that is a caller decision.
pub async fn post_with_bearer_token<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    body: &T,
    token: &str,
) -> Result<reqwest::Response, DidAuthError> {
    log::debug!("POST {url}");
    let response = client
        .post(url)
        .bearer_auth(token)
        .json(body)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DidAuthError::Service {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
