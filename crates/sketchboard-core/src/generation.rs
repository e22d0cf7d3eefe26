//! Sketch-to-image generation API client.
//!
//! Sends a base64 sketch (and optional material/reference image) with a text
//! prompt to the generation endpoint. The request body shape depends on the
//! configured [`ApiVariant`]; the success body is handed back untouched.

use crate::http::{HttpRequest, HttpTransport, TransportError};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Path of the default generation endpoint.
pub const DEFAULT_GENERATION_PATH: &str = "/api/sketch-ai";

/// Parsed JSON body of a successful generation call.
pub type GenerationResult = Value;

/// Generation failures.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The call was rejected before any network activity.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[source] TransportError),
    /// The endpoint answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The request body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    /// A 2xx response whose body is not JSON.
    #[error("invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Request schema understood by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVariant {
    /// `{ base64Image, promptText }`.
    #[default]
    SketchAi,
    /// `{ base64Sketch, base64Material?, promptText }`.
    SketchWithMaterial,
}

impl ApiVariant {
    /// Build the JSON request body for this variant.
    pub fn build_body(self, sketch: &str, material: Option<&str>, prompt: &str) -> Result<Value, serde_json::Error> {
        match self {
            ApiVariant::SketchAi => sketch_ai_body(sketch, prompt),
            ApiVariant::SketchWithMaterial => sketch_with_material_body(sketch, material, prompt),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApiVariant::SketchAi => "sketch-ai",
            ApiVariant::SketchWithMaterial => "sketch-material",
        }
    }
}

impl FromStr for ApiVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sketch-ai" => Ok(ApiVariant::SketchAi),
            "sketch-material" => Ok(ApiVariant::SketchWithMaterial),
            other => Err(format!(
                "unsupported API variant '{other}' (expected 'sketch-ai' or 'sketch-material')"
            )),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SketchAiRequest<'a> {
    base64_image: &'a str,
    prompt_text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SketchWithMaterialRequest<'a> {
    base64_sketch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    base64_material: Option<&'a str>,
    prompt_text: &'a str,
}

/// Body for [`ApiVariant::SketchAi`]. The material image is not part of this schema.
pub fn sketch_ai_body(sketch: &str, prompt: &str) -> Result<Value, serde_json::Error> {
    serde_json::to_value(SketchAiRequest {
        base64_image: sketch,
        prompt_text: prompt,
    })
}

/// Body for [`ApiVariant::SketchWithMaterial`].
pub fn sketch_with_material_body(
    sketch: &str,
    material: Option<&str>,
    prompt: &str,
) -> Result<Value, serde_json::Error> {
    serde_json::to_value(SketchWithMaterialRequest {
        base64_sketch: sketch,
        base64_material: material,
        prompt_text: prompt,
    })
}

/// Where and how to send generation requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationEndpoint {
    pub url: String,
    pub variant: ApiVariant,
}

impl GenerationEndpoint {
    pub fn new(url: impl Into<String>, variant: ApiVariant) -> Self {
        Self {
            url: url.into(),
            variant,
        }
    }
}

/// Client for the generation endpoint.
pub struct SketchClient<T: HttpTransport> {
    transport: Arc<T>,
    endpoint: GenerationEndpoint,
}

impl<T: HttpTransport> Clone for SketchClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<T: HttpTransport> SketchClient<T> {
    pub fn new(transport: Arc<T>, endpoint: GenerationEndpoint) -> Self {
        Self { transport, endpoint }
    }

    pub fn endpoint(&self) -> &GenerationEndpoint {
        &self.endpoint
    }

    /// Generate an image from a sketch.
    ///
    /// `sketch` and `material` are base64 image payloads. Fails with
    /// [`GenerationError::InvalidInput`] on an empty sketch without touching
    /// the network.
    pub async fn generate(
        &self,
        sketch: &str,
        material: Option<&str>,
        prompt: &str,
    ) -> Result<GenerationResult, GenerationError> {
        log::debug!(
            "Preparing generation call to {} ({}): sketch {} bytes, material {} bytes, prompt {:?}",
            self.endpoint.url,
            self.endpoint.variant.name(),
            sketch.len(),
            material.map_or(0, str::len),
            prompt
        );

        if sketch.is_empty() {
            return Err(GenerationError::InvalidInput("no sketch image provided"));
        }

        let body = self
            .endpoint
            .variant
            .build_body(sketch, material, prompt)
            .map_err(GenerationError::Encode)?;
        let response = self
            .transport
            .send(HttpRequest::post_json(self.endpoint.url.clone(), body))
            .await
            .map_err(|e| {
                log::error!("Generation request failed: {e}");
                GenerationError::Network(e)
            })?;

        log::debug!("Generation response status: {} {}", response.status, response.status_text);

        if !response.is_success() {
            let message = response.error_message();
            log::error!("Generation API error: {message}");
            return Err(GenerationError::Api {
                status: response.status,
                message,
            });
        }

        let result = response.json()?;
        log::info!("Generation succeeded ({} bytes)", response.body.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::MockTransport;

    fn client(transport: MockTransport, variant: ApiVariant) -> (SketchClient<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let client = SketchClient::new(
            Arc::clone(&transport),
            GenerationEndpoint::new("http://localhost:8080/api/sketch-ai", variant),
        );
        (client, transport)
    }

    #[test]
    fn test_empty_sketch_fails_without_network() {
        let (client, transport) = client(MockTransport::new().respond(200, "OK", "{}"), ApiVariant::SketchAi);

        let result = pollster::block_on(client.generate("", Some("bWF0"), "a cat"));
        assert!(matches!(result, Err(GenerationError::InvalidInput(_))));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_default_variant_body() {
        let (client, transport) = client(MockTransport::new().respond(200, "OK", "{}"), ApiVariant::SketchAi);

        pollster::block_on(client.generate("c2tldGNo", Some("bWF0"), "a cat")).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["base64Image"], "c2tldGNo");
        assert_eq!(body["promptText"], "a cat");
        assert!(body.get("base64Sketch").is_none());
        assert!(body.get("base64Material").is_none());
    }

    #[test]
    fn test_material_variant_body() {
        let (client, transport) =
            client(MockTransport::new().respond(200, "OK", "{}"), ApiVariant::SketchWithMaterial);

        pollster::block_on(client.generate("c2tldGNo", Some("bWF0"), "a cat")).unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["base64Sketch"], "c2tldGNo");
        assert_eq!(body["base64Material"], "bWF0");
        assert_eq!(body["promptText"], "a cat");
        assert!(body.get("base64Image").is_none());
    }

    #[test]
    fn test_build_body_follows_variant() {
        let body = ApiVariant::SketchAi.build_body("c2tldGNo", Some("bWF0"), "p").unwrap();
        assert_eq!(body["base64Image"], "c2tldGNo");
        assert!(body.get("base64Material").is_none());
    }

    #[test]
    fn test_material_omitted_when_absent() {
        let body = sketch_with_material_body("c2tldGNo", None, "p").unwrap();
        assert!(body.get("base64Material").is_none());
        assert_eq!(body["base64Sketch"], "c2tldGNo");
    }

    #[test]
    fn test_success_body_returned_verbatim() {
        let raw = r#"{"image":"abc","extra":{"n":1}}"#;
        let (client, _) = client(MockTransport::new().respond(200, "OK", raw), ApiVariant::SketchAi);

        let result = pollster::block_on(client.generate("c2tldGNo", None, "p")).unwrap();
        assert_eq!(result, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn test_api_error_uses_error_field() {
        let (client, _) = client(
            MockTransport::new().respond(400, "Bad Request", r#"{"error":"bad prompt"}"#),
            ApiVariant::SketchAi,
        );

        let err = pollster::block_on(client.generate("c2tldGNo", None, "p")).unwrap_err();
        match &err {
            GenerationError::Api { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "bad prompt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("bad prompt"));
    }

    #[test]
    fn test_network_error_wraps_cause() {
        let (client, transport) = client(MockTransport::new().fail("connection refused"), ApiVariant::SketchAi);

        let err = pollster::block_on(client.generate("c2tldGNo", None, "p")).unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_non_json_success_is_reported() {
        let (client, _) = client(MockTransport::new().respond(200, "OK", "not json"), ApiVariant::SketchAi);
        let err = pollster::block_on(client.generate("c2tldGNo", None, "p")).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("sketch-ai".parse::<ApiVariant>(), Ok(ApiVariant::SketchAi));
        assert_eq!("sketch-material".parse::<ApiVariant>(), Ok(ApiVariant::SketchWithMaterial));
        assert!("other".parse::<ApiVariant>().is_err());
    }
}
