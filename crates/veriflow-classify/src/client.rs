// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an external vision classifier service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use veriflow_core::types::{Classification, EvidenceLabel};
use veriflow_core::{EvidenceClassifier, VeriflowError};

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    image_ref: &'a str,
    caption: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: EvidenceLabel,
    confidence: f32,
    #[serde(default)]
    reason: String,
}

/// Classifier backed by a remote HTTP vision service.
///
/// The request-level timeout here is a transport bound; the pipeline applies
/// its own turn-level timeout and degrades to `REVIEW` on top of it.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    /// Creates a classifier client for `endpoint`, authenticating with
    /// `api_key` as a bearer token when provided.
    pub fn new(
        endpoint: String,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, VeriflowError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    VeriflowError::Config(format!("invalid classifier API key header value: {e}"))
                })?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| VeriflowError::Classifier {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl EvidenceClassifier for HttpClassifier {
    async fn classify(
        &self,
        image_ref: &str,
        caption: &str,
    ) -> Result<Classification, VeriflowError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { image_ref, caption })
            .send()
            .await
            .map_err(|e| VeriflowError::Classifier {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeriflowError::Classifier {
                message: format!("classifier returned {status}: {body}"),
                source: None,
            });
        }

        let verdict: ClassifyResponse =
            response.json().await.map_err(|e| VeriflowError::Classifier {
                message: format!("malformed classifier response: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(label = %verdict.label, confidence = verdict.confidence, "classifier verdict");
        Ok(Classification {
            label: verdict.label,
            confidence: verdict.confidence,
            reason: verdict.reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(url: &str) -> HttpClassifier {
        HttpClassifier::new(
            format!("{url}/classify"),
            Some("test-key"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn classify_parses_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(body_partial_json(serde_json::json!({
                "image_ref": "img://1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "label": "ACTIVITY",
                "confidence": 0.87,
                "reason": "store visit photo"
            })))
            .mount(&server)
            .await;

        let verdict = make_client(&server.uri())
            .classify("img://1", "done!")
            .await
            .unwrap();
        assert_eq!(verdict.label, EvidenceLabel::Activity);
        assert!((verdict.confidence - 0.87).abs() < 1e-6);
        assert_eq!(verdict.reason, "store visit photo");
    }

    #[tokio::test]
    async fn server_error_is_classifier_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = make_client(&server.uri()).classify("img://1", "").await;
        assert!(matches!(result, Err(VeriflowError::Classifier { .. })));
    }

    #[tokio::test]
    async fn malformed_body_is_classifier_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = make_client(&server.uri()).classify("img://1", "").await;
        assert!(matches!(result, Err(VeriflowError::Classifier { .. })));
    }
}
