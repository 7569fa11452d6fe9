use std::time::Duration;

use log::{debug, trace};
use reqwest::{
    Method, StatusCode, Url,
    blocking::{Client, RequestBuilder, Response},
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use flowtidy_core::{
    identity::{ComponentIdentity, ComponentKind},
    service::{FetchedComponent, FlowService, PositionPatch, ServiceError},
    snapshot::FlowSnapshot,
};

use crate::error::ClientError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// NiFi answers a stale revision with 400 and this message rather than 409
const STALE_REVISION: &str = "is not the most up-to-date revision";

/// Returns the REST resource serving components of `kind`.
pub fn resource(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::ProcessGroup => "process-groups",
        ComponentKind::RemoteProcessGroup => "remote-process-groups",
        ComponentKind::Processor => "processors",
        ComponentKind::InputPort => "input-ports",
        ComponentKind::OutputPort => "output-ports",
        ComponentKind::Label => "labels",
        ComponentKind::Funnel => "funnels",
    }
}

/// Builder for [`NifiClient`].
#[derive(Debug, Clone)]
pub struct NifiClientBuilder {
    root: String,
    timeout: Duration,
    token: Option<String>,
}

impl NifiClientBuilder {
    /// Set the deadline of each request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `token` as a bearer token with every request
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] unless the root is an absolute
    /// `http` or `https` URL, and [`ClientError::Build`] when the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<NifiClient, ClientError> {
        let url = Url::parse(&self.root).map_err(|err| ClientError::InvalidUrl {
            url: self.root.clone(),
            message: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: self.root,
                message: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| ClientError::Build(format!("invalid token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;

        debug!(root = self.root.as_str(), timeout_secs = self.timeout.as_secs(); "NiFi client ready");

        Ok(NifiClient {
            root: self.root.trim_end_matches('/').to_string(),
            http,
        })
    }
}

/// Blocking client for one NiFi instance.
#[derive(Debug, Clone)]
pub struct NifiClient {
    root: String,
    http: Client,
}

impl NifiClient {
    /// Start configuring a client for the API root, e.g.
    /// `https://nifi.example.com/nifi-api`.
    pub fn builder(root: impl Into<String>) -> NifiClientBuilder {
        NifiClientBuilder {
            root: root.into(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn component_url(&self, identity: &ComponentIdentity) -> String {
        format!("{}/{}/{}", self.root, resource(identity.kind()), identity.id())
    }

    fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().map_err(|err| transport_error(url, &err))?;
        let status = response.status();
        trace!(url, status = status.as_u16(); "Response received");

        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                debug!(url, err:% = err; "Could not read error response body");
                status.canonical_reason().unwrap_or_default().to_string()
            }
        };
        Err(status_error(url, status, &body))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        debug!(method = "GET", url; "Sending request");
        let response = self.send(url, self.http.request(Method::GET, url))?;
        let body = response.text().map_err(|err| transport_error(url, &err))?;

        serde_json::from_str(&body).map_err(|err| ServiceError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }
}

impl FlowService for NifiClient {
    fn test_connectivity(&self) -> Result<(), ServiceError> {
        let url = format!("{}/flow/about", self.root);
        self.get_json::<Value>(&url).map(|_| ())
    }

    fn flow_snapshot(&self, group_id: &str) -> Result<FlowSnapshot, ServiceError> {
        let url = format!("{}/flow/process-groups/{group_id}", self.root);
        self.get_json(&url)
    }

    fn component(&self, identity: &ComponentIdentity) -> Result<FetchedComponent, ServiceError> {
        let url = self.component_url(identity);
        let entity: Value = self.get_json(&url)?;

        FetchedComponent::from_entity(identity.kind(), entity)
            .map_err(|message| ServiceError::Decode { url, message })
    }

    fn update_component(&self, patch: &PositionPatch) -> Result<(), ServiceError> {
        let url = self.component_url(&patch.identity());
        debug!(method = "PUT", url = url.as_str(); "Sending request");

        self.send(&url, self.http.request(Method::PUT, &url).json(patch))
            .map(|_| ())
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout {
            url: url.to_string(),
        }
    } else {
        ServiceError::Connection {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

fn status_error(url: &str, status: StatusCode, body: &str) -> ServiceError {
    let url = url.to_string();
    let message = body.trim().to_string();

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound { url },
        StatusCode::CONFLICT => ServiceError::Conflict { url, message },
        StatusCode::BAD_REQUEST if message.contains(STALE_REVISION) => {
            ServiceError::Conflict { url, message }
        }
        _ => ServiceError::Status {
            url,
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_kind_has_a_distinct_resource() {
        let resources: HashSet<_> = ComponentKind::ALL.into_iter().map(resource).collect();
        assert_eq!(resources.len(), ComponentKind::ALL.len());
    }

    #[test]
    fn test_component_url() {
        let client = NifiClient::builder("http://localhost:8080/nifi-api/")
            .build()
            .unwrap();

        assert_eq!(client.root(), "http://localhost:8080/nifi-api");
        assert_eq!(
            client.component_url(&ComponentIdentity::new("abc", ComponentKind::RemoteProcessGroup)),
            "http://localhost:8080/nifi-api/remote-process-groups/abc"
        );
    }

    #[test]
    fn test_invalid_roots_are_rejected() {
        for root in ["not a url", "ftp://nifi/nifi-api", ""] {
            let err = NifiClient::builder(root).build().unwrap_err();
            assert!(matches!(err, ClientError::InvalidUrl { .. }), "{root}");
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            status_error("u", StatusCode::NOT_FOUND, "gone"),
            ServiceError::NotFound {
                url: "u".to_string()
            }
        );
        assert!(status_error("u", StatusCode::CONFLICT, "").is_conflict());
        assert!(
            status_error(
                "u",
                StatusCode::BAD_REQUEST,
                "Error: [7, null, abc] is not the most up-to-date revision. This component appears to have been modified"
            )
            .is_conflict()
        );
        assert_eq!(
            status_error("u", StatusCode::BAD_REQUEST, " bad input \n"),
            ServiceError::Status {
                url: "u".to_string(),
                status: 400,
                message: "bad input".to_string(),
            }
        );
    }
}
