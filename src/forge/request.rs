//! Authenticated HTTP calls against the forge API.
//!
//! [`ApiClient::call`] is the single entry point every repository operation
//! goes through. It attaches credentials and media type headers, hands the
//! request to a [`Transport`] (normally [`ReqwestTransport`] wrapped in a
//! [`Retry`](crate::forge::retry::Retry)), checks the status against the
//! accepted set and validates JSON bodies.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use reqwest::{
    Client, Method, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{ReleaseError, Result};

/// Media type selecting the REST API representation.
pub const API_MEDIA_TYPE: &str = "application/vnd.github+json";
/// Header and value pinning the REST API version.
pub const API_VERSION_HEADER: &str = "x-github-api-version";
pub const API_VERSION: &str = "2022-11-28";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

const USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fully prepared request handed to a transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Status and raw body of a completed round trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// A single HTTP round trip. Implementations report connection level
/// failures as [`ReleaseError::Transport`] and return every response that
/// arrived, whatever its status. A body that breaks off after the status
/// arrived is [`ReleaseError::ResponseBody`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse>;
}

/// Transport backed by a shared reqwest client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                ReleaseError::Other(color_eyre::eyre::eyre!(
                    "failed to build http client: {e}"
                ))
            })?;

        Ok(Self { client })
    }

    fn transport_error(request: &ApiRequest, err: reqwest::Error) -> ReleaseError {
        ReleaseError::Transport {
            method: request.method.to_string(),
            url: request.url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::transport_error(request, e))?;

        let status = response.status();

        // a status arrived, so the request is never repeated from here
        let body = response.bytes().await.map_err(|e| {
            ReleaseError::ResponseBody {
                status: status.as_u16(),
                method: request.method.to_string(),
                url: request.url.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Request body together with its content type.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Vec<u8>),
    Binary {
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Json(serde_json::to_vec(value)?))
    }

    pub fn zip(bytes: Vec<u8>) -> Self {
        Self::Binary {
            content_type: ZIP_CONTENT_TYPE.into(),
            bytes,
        }
    }

    fn content_type(&self) -> &str {
        match self {
            Payload::Json(_) => JSON_CONTENT_TYPE,
            Payload::Binary { content_type, .. } => content_type,
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Json(bytes) => bytes,
            Payload::Binary { bytes, .. } => bytes,
        }
    }
}

/// Executes authenticated API calls through a transport.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    token: SecretString,
}

impl ApiClient {
    pub fn new(transport: Box<dyn Transport>, token: SecretString) -> Self {
        Self { transport, token }
    }

    fn headers(&self, payload: Option<&Payload>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut token_value = HeaderValue::from_str(
            format!("token {}", self.token.expose_secret()).as_str(),
        )?;
        token_value.set_sensitive(true);

        headers.insert(AUTHORIZATION, token_value);
        headers.insert(ACCEPT, HeaderValue::from_static(API_MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        if let Some(payload) = payload {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_str(payload.content_type())?,
            );
        }

        Ok(headers)
    }

    /// Perform one logical call and return the raw body. An empty body is a
    /// valid result; a non-empty one must be well formed JSON.
    pub async fn call(
        &self,
        method: Method,
        url: Url,
        valid_status_codes: &[StatusCode],
        payload: Option<Payload>,
    ) -> Result<Vec<u8>> {
        let request = ApiRequest {
            headers: self.headers(payload.as_ref())?,
            method,
            url,
            body: payload.map(Payload::into_bytes),
        };

        debug!("calling '{} {}'", request.method, request.url);

        let response = self.transport.send(&request).await?;

        if !valid_status_codes.contains(&response.status) {
            return Err(ReleaseError::ApiStatus {
                status: response.status.as_u16(),
                method: request.method.to_string(),
                url: request.url.to_string(),
                accepted: valid_status_codes.iter().map(|s| s.as_u16()).collect(),
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        if response.body.is_empty() {
            info!(
                "received successful response without body for '{} {}' with status code {}",
                request.method, request.url, response.status
            );
            return Ok(response.body);
        }

        if let Err(source) =
            serde_json::from_slice::<serde::de::IgnoredAny>(&response.body)
        {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            warn!(
                "deserializing response for '{} {}' failed: {source}. Body: {body}",
                request.method, request.url
            );
            return Err(ReleaseError::Decode {
                method: request.method.to_string(),
                url: request.url.to_string(),
                body,
                source,
            });
        }

        Ok(response.body)
    }

    /// Perform a call and decode the body into `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        valid_status_codes: &[StatusCode],
        payload: Option<Payload>,
    ) -> Result<T> {
        let method_name = method.to_string();
        let url_name = url.to_string();

        let body = self.call(method, url, valid_status_codes, payload).await?;

        serde_json::from_slice(&body).map_err(|source| ReleaseError::Decode {
            method: method_name,
            url: url_name,
            body: String::from_utf8_lossy(&body).into_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        "https://api.github.com/repos/o/r/releases".parse().unwrap()
    }

    fn client(mock: MockTransport) -> ApiClient {
        ApiClient::new(Box::new(mock), SecretString::from("s3cr3t"))
    }

    fn respond(status: StatusCode, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn attaches_auth_and_media_type_headers() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .withf(|req| {
                req.headers.get(AUTHORIZATION).unwrap() == "token s3cr3t"
                    && req.headers.get(ACCEPT).unwrap() == API_MEDIA_TYPE
                    && req.headers.get(API_VERSION_HEADER).unwrap()
                        == API_VERSION
                    && req.headers.get(CONTENT_TYPE).is_none()
                    && req.body.is_none()
            })
            .returning(|_| Ok(respond(StatusCode::OK, "[]")));

        let body = client(mock)
            .call(Method::GET, url(), &[StatusCode::OK], None)
            .await
            .unwrap();

        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn serializes_json_payload_with_content_type() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .withf(|req| {
                let body: serde_json::Value =
                    serde_json::from_slice(req.body.as_ref().unwrap())
                        .unwrap();
                req.method == Method::POST
                    && req.headers.get(CONTENT_TYPE).unwrap()
                        == JSON_CONTENT_TYPE
                    && body == serde_json::json!({"tag_name": "v1.0.0"})
            })
            .returning(|_| Ok(respond(StatusCode::CREATED, "{}")));

        let payload =
            Payload::json(&serde_json::json!({"tag_name": "v1.0.0"})).unwrap();

        client(mock)
            .call(Method::POST, url(), &[StatusCode::CREATED], Some(payload))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn passes_binary_payload_through() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .withf(|req| {
                req.headers.get(CONTENT_TYPE).unwrap() == ZIP_CONTENT_TYPE
                    && req.body.as_deref() == Some(&b"PK\x03\x04"[..])
            })
            .returning(|_| Ok(respond(StatusCode::CREATED, "{}")));

        client(mock)
            .call(
                Method::POST,
                url(),
                &[StatusCode::CREATED],
                Some(Payload::zip(b"PK\x03\x04".to_vec())),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_unexpected_status_with_body() {
        let mut mock = MockTransport::new();
        mock.expect_send().times(1).returning(|_| {
            Ok(respond(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"message":"Validation Failed","errors":[{"resource":"Release","code":"already_exists","field":"tag_name"}]}"#,
            ))
        });

        let err = client(mock)
            .call(Method::POST, url(), &[StatusCode::CREATED], None)
            .await
            .unwrap_err();

        match &err {
            ReleaseError::ApiStatus {
                status, accepted, ..
            } => {
                assert_eq!(*status, 422);
                assert_eq!(accepted, &vec![201]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn accepts_empty_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(respond(StatusCode::OK, "")));

        let body = client(mock)
            .call(Method::PATCH, url(), &[StatusCode::OK], None)
            .await
            .unwrap();

        assert!(body.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn malformed_json_is_a_decode_error_keeping_the_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(respond(StatusCode::OK, "<html>oops</html>")));

        let err = client(mock)
            .call(Method::GET, url(), &[StatusCode::OK], None)
            .await
            .unwrap_err();

        match err {
            ReleaseError::Decode { body, .. } => {
                assert_eq!(body, "<html>oops</html>")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn call_json_decodes_typed_body() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(respond(StatusCode::OK, "[1,2,3]")));

        let values: Vec<u64> = client(mock)
            .call_json(Method::GET, url(), &[StatusCode::OK], None)
            .await
            .unwrap();

        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn call_json_treats_empty_body_as_decode_error() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Ok(respond(StatusCode::OK, "")));

        let result: Result<Vec<u64>> = client(mock)
            .call_json(Method::GET, url(), &[StatusCode::OK], None)
            .await;

        assert!(matches!(result, Err(ReleaseError::Decode { .. })));
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let mut mock = MockTransport::new();
        mock.expect_send().times(1).returning(|req| {
            Err(ReleaseError::Transport {
                method: req.method.to_string(),
                url: req.url.to_string(),
                message: "timed out".into(),
            })
        });

        let err = client(mock)
            .call(Method::GET, url(), &[StatusCode::OK], None)
            .await
            .unwrap_err();

        assert!(err.is_transient());
    }
}
