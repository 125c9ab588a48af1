//! HTTP transport.
//!
//! The [`Transport`] trait is the seam between the services and the network:
//! services are generic over it, production code uses [`HttpTransport`], and
//! tests substitute an in-memory implementation. The trait deliberately
//! speaks wire DTOs - verification happens above it, never inside it.
//!
//! Protect endpoints wrap their payload in a `{"result": ...}` envelope;
//! unwrapping happens here so nothing above the transport sees it.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use url::Url;

use protect_types::error::{Error, NotFoundError, TransportError};
use protect_types::wire::{ApprovalBody, RejectionBody, Request, RulesEnvelope, SignedEnvelope};

/// Asynchronous interface to the Protect server.
pub trait Transport {
    /// Fetches the current governance-rules document.
    fn fetch_rules(&self) -> impl Future<Output = Result<RulesEnvelope, Error>> + Send;

    /// Fetches one whitelisted-address envelope by id.
    fn fetch_whitelisted_address(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<SignedEnvelope, Error>> + Send;

    /// Fetches all whitelisted-address envelopes.
    fn fetch_whitelisted_addresses(
        &self,
    ) -> impl Future<Output = Result<Vec<SignedEnvelope>, Error>> + Send;

    /// Fetches one whitelisted-asset envelope by id.
    fn fetch_whitelisted_asset(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<SignedEnvelope, Error>> + Send;

    /// Fetches all whitelisted-asset envelopes.
    fn fetch_whitelisted_assets(
        &self,
    ) -> impl Future<Output = Result<Vec<SignedEnvelope>, Error>> + Send;

    /// Fetches one request by id.
    fn fetch_request(&self, id: u64) -> impl Future<Output = Result<Request, Error>> + Send;

    /// Fetches the pending requests.
    fn fetch_requests(&self) -> impl Future<Output = Result<Vec<Request>, Error>> + Send;

    /// Submits a signed approval.
    fn post_approval(
        &self,
        body: &ApprovalBody,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Submits a rejection.
    fn post_rejection(
        &self,
        body: &RejectionBody,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

impl<T: Transport + Sync> Transport for Arc<T> {
    fn fetch_rules(&self) -> impl Future<Output = Result<RulesEnvelope, Error>> + Send {
        self.as_ref().fetch_rules()
    }

    fn fetch_whitelisted_address(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<SignedEnvelope, Error>> + Send {
        self.as_ref().fetch_whitelisted_address(id)
    }

    fn fetch_whitelisted_addresses(
        &self,
    ) -> impl Future<Output = Result<Vec<SignedEnvelope>, Error>> + Send {
        self.as_ref().fetch_whitelisted_addresses()
    }

    fn fetch_whitelisted_asset(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<SignedEnvelope, Error>> + Send {
        self.as_ref().fetch_whitelisted_asset(id)
    }

    fn fetch_whitelisted_assets(
        &self,
    ) -> impl Future<Output = Result<Vec<SignedEnvelope>, Error>> + Send {
        self.as_ref().fetch_whitelisted_assets()
    }

    fn fetch_request(&self, id: u64) -> impl Future<Output = Result<Request, Error>> + Send {
        self.as_ref().fetch_request(id)
    }

    fn fetch_requests(&self) -> impl Future<Output = Result<Vec<Request>, Error>> + Send {
        self.as_ref().fetch_requests()
    }

    fn post_approval(
        &self,
        body: &ApprovalBody,
    ) -> impl Future<Output = Result<(), Error>> + Send {
        self.as_ref().post_approval(body)
    }

    fn post_rejection(
        &self,
        body: &RejectionBody,
    ) -> impl Future<Output = Result<(), Error>> + Send {
        self.as_ref().post_rejection(body)
    }
}

/// Every response body arrives wrapped as `{"result": ...}`.
#[derive(serde::Deserialize)]
struct ResultEnvelope<T> {
    result: T,
}

/// [`Transport`] implementation over `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpTransport {
    /// Creates a transport for the given base URL and optional bearer token.
    pub fn new(base_url: Url, api_token: Option<String>) -> Self {
        let mut base_url = base_url;
        // Url::join treats a path without a trailing slash as a file and
        // would drop its last segment.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Failure(format!("invalid endpoint {path}: {e}")).into())
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        not_found: Option<NotFoundError>,
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|e| TransportError::Failure(e.to_string()))?;
        let response = check_status(response, not_found).await?;
        let envelope: ResultEnvelope<T> = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        Ok(envelope.result)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .authorized(self.http.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Failure(e.to_string()))?;
        check_status(response, None).await?;
        Ok(())
    }
}

async fn check_status(
    response: reqwest::Response,
    not_found: Option<NotFoundError>,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        if let Some(not_found) = not_found {
            return Err(not_found.into());
        }
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    }
    .into())
}

impl Transport for HttpTransport {
    async fn fetch_rules(&self) -> Result<RulesEnvelope, Error> {
        self.get_json("rules", None).await
    }

    async fn fetch_whitelisted_address(&self, id: u64) -> Result<SignedEnvelope, Error> {
        self.get_json(
            &format!("whitelisted-addresses/{id}"),
            Some(NotFoundError {
                resource: "whitelisted address".into(),
                id: id.to_string(),
            }),
        )
        .await
    }

    async fn fetch_whitelisted_addresses(&self) -> Result<Vec<SignedEnvelope>, Error> {
        self.get_json("whitelisted-addresses", None).await
    }

    async fn fetch_whitelisted_asset(&self, id: u64) -> Result<SignedEnvelope, Error> {
        self.get_json(
            &format!("whitelisted-assets/{id}"),
            Some(NotFoundError {
                resource: "whitelisted asset".into(),
                id: id.to_string(),
            }),
        )
        .await
    }

    async fn fetch_whitelisted_assets(&self) -> Result<Vec<SignedEnvelope>, Error> {
        self.get_json("whitelisted-assets", None).await
    }

    async fn fetch_request(&self, id: u64) -> Result<Request, Error> {
        self.get_json(
            &format!("requests/{id}"),
            Some(NotFoundError {
                resource: "request".into(),
                id: id.to_string(),
            }),
        )
        .await
    }

    async fn fetch_requests(&self) -> Result<Vec<Request>, Error> {
        self.get_json("requests", None).await
    }

    async fn post_approval(&self, body: &ApprovalBody) -> Result<(), Error> {
        self.post_json("requests/approve", body).await
    }

    async fn post_rejection(&self, body: &RejectionBody) -> Result<(), Error> {
        self.post_json("requests/reject", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_a_trailing_slash() {
        let base = Url::parse("https://protect.example.com/api/rest/v1").expect("url parses");
        let transport = HttpTransport::new(base, None);
        let url = transport.endpoint("requests/approve").expect("joins");
        assert_eq!(
            url.as_str(),
            "https://protect.example.com/api/rest/v1/requests/approve"
        );
    }
}
