//! # Model Accessor
//!
//! JSON REST helpers on top of [`RestConnector`]. Each call is a single
//! request/response exchange against the connector's base URL:
//!
//! - [`RestConnector::fetch`] - `GET`, decode the response
//! - [`RestConnector::create`] - `POST` a JSON body, decode the response
//! - [`RestConnector::update`] - `PATCH` a JSON body, decode the response
//!
//! Nothing is retried. A caller retrying an `update` after a timeout may
//! apply the patch twice.
//!
//! ## Response handling order
//!
//! 1. Transport or body-read failure: [`RestError::Network`]
//! 2. Body is not JSON: [`RestError::Deserialization`], whatever the status
//! 3. Status differs from the expected one: [`RestError::UnexpectedStatus`]
//! 4. Body does not fit the target type: [`RestError::Deserialization`]

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Span, debug, error, field, instrument, warn};

use crate::error::{RestError, RestResult};
use crate::services::connector::RestConnector;

const APPLICATION_JSON: &str = "application/json";

impl RestConnector {
    /// Issues a `GET` to the base URL and decodes the JSON response into `T`.
    ///
    /// # Errors
    ///
    /// [`RestError::Network`], [`RestError::Deserialization`] or
    /// [`RestError::UnexpectedStatus`], see the module docs for the order.
    pub async fn fetch<T>(&self, expected_status: StatusCode) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, None, expected_status).await
    }

    /// Serializes `body` to JSON, `POST`s it to the base URL and decodes the response into `T`.
    ///
    /// # Errors
    ///
    /// [`RestError::Serialization`] before any network activity if `body`
    /// cannot be encoded; otherwise as for [`RestConnector::fetch`].
    pub async fn create<B, T>(&self, body: &B, expected_status: StatusCode) -> RestResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode_body(body)?;
        self.request(Method::POST, Some(payload), expected_status)
            .await
    }

    /// Same as [`RestConnector::create`], but issues a `PATCH`.
    pub async fn update<B, T>(&self, body: &B, expected_status: StatusCode) -> RestResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = encode_body(body)?;
        self.request(Method::PATCH, Some(payload), expected_status)
            .await
    }

    #[instrument(
        parent = &self.span,
        skip(self, body),
        fields(
            url = %self.base_url,
            expected = expected_status.as_u16(),
            status = field::Empty
        )
    )]
    async fn request<T>(
        &self,
        method: Method,
        body: Option<Vec<u8>>,
        expected_status: StatusCode,
    ) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, self.base_url.clone())
            .header(ACCEPT, APPLICATION_JSON);

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(
                credentials.username(),
                Some(credentials.password().expose_secret()),
            );
        }

        if let Some(payload) = body {
            debug!(bytes = payload.len(), "Sending JSON request body");
            request = request.header(CONTENT_TYPE, APPLICATION_JSON).body(payload);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "REST request failed");
            RestError::Network(e)
        })?;

        let status = response.status();
        Span::current().record("status", status.as_u16());

        let raw = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read REST response body");
            RestError::Network(e)
        })?;

        debug!(bytes = raw.len(), "Received REST response");
        decode_response(status, expected_status, &raw)
    }
}

fn encode_body<B>(body: &B) -> RestResult<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    serde_json::to_vec(body).map_err(|e| {
        error!(error = %e, "Failed to serialize request body");
        RestError::Serialization(e)
    })
}

fn decode_response<T>(status: StatusCode, expected: StatusCode, raw: &[u8]) -> RestResult<T>
where
    T: DeserializeOwned,
{
    let value: Value = serde_json::from_slice(raw).map_err(|e| {
        warn!(%status, error = %e, "Response body is not valid JSON");
        RestError::Deserialization(e)
    })?;

    if status != expected {
        let body = String::from_utf8_lossy(raw).into_owned();
        warn!(%status, %expected, %body, "Unexpected response status");
        return Err(RestError::UnexpectedStatus {
            actual: status,
            expected,
            body,
        });
    }

    serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "Response body does not match the expected shape");
        RestError::Deserialization(e)
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Model {
        id: i64,
    }

    #[test]
    fn decodes_when_status_matches() {
        let model: Model = decode_response(StatusCode::OK, StatusCode::OK, br#"{"id":1}"#).unwrap();
        assert_eq!(model, Model { id: 1 });
    }

    #[test]
    fn status_mismatch_keeps_body_text() {
        let err = decode_response::<Model>(
            StatusCode::NOT_FOUND,
            StatusCode::OK,
            br#"{"error":"nf"}"#,
        )
        .unwrap_err();

        match err {
            RestError::UnexpectedStatus {
                actual,
                expected,
                body,
            } => {
                assert_eq!(actual, StatusCode::NOT_FOUND);
                assert_eq!(expected, StatusCode::OK);
                assert_eq!(body, r#"{"error":"nf"}"#);
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[test]
    fn status_mismatch_wins_over_shape_mismatch() {
        let err = decode_response::<Model>(
            StatusCode::NOT_FOUND,
            StatusCode::OK,
            br#"{"id":"one"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RestError::UnexpectedStatus { actual, .. } if actual == StatusCode::NOT_FOUND
        ));
    }

    #[test]
    fn invalid_json_wins_over_status_mismatch() {
        let err = decode_response::<Model>(
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::OK,
            b"<html>oops</html>",
        )
        .unwrap_err();
        assert!(matches!(err, RestError::Deserialization(_)));
    }

    #[test]
    fn empty_body_is_a_deserialization_error() {
        let err = decode_response::<Value>(StatusCode::OK, StatusCode::OK, b"").unwrap_err();
        assert!(matches!(err, RestError::Deserialization(_)));
    }

    #[test]
    fn shape_mismatch_is_a_deserialization_error() {
        let err = decode_response::<Model>(StatusCode::OK, StatusCode::OK, br#"{"id":"one"}"#)
            .unwrap_err();
        assert!(matches!(err, RestError::Deserialization(_)));
    }

    #[test]
    fn unserializable_body_is_a_serialization_error() {
        use std::collections::HashMap;

        let mut body = HashMap::new();
        body.insert((1, 2), "tuple keys are not valid JSON object keys");

        let err = encode_body(&body).unwrap_err();
        assert!(matches!(err, RestError::Serialization(_)));
    }
}
