use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, InlineData, Part};
use crate::ai::CaptionService;
use crate::models::{CaptionRequest, CaptionResponse};
use crate::{data_url, prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CaptionContentRequest {
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

pub struct GeminiCaptionClient {
    http: GeminiHttpClient,
}

impl GeminiCaptionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    /// Turn the request's image reference into inline bytes.
    ///
    /// Data URLs are decoded locally; anything else is fetched over HTTP and
    /// its mime type sniffed from the leading bytes.
    async fn resolve_image(&self, image_url: &str) -> Result<(String, Vec<u8>)> {
        if data_url::is_data_url(image_url) {
            return data_url::decode(image_url);
        }

        tracing::debug!("Fetching remote image for captioning: {}", image_url);
        let response = self.http.client.get(image_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Generic(format!(
                "Failed to fetch image '{}' (status {})",
                image_url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        let mime = data_url::detect_image_mime(&bytes).to_string();
        Ok((mime, bytes))
    }

    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        response.candidates.first().and_then(|c| {
            c.content.parts.iter().find_map(|p| match p {
                Part::Text { text } => Some(text.clone()),
                Part::InlineData { .. } => None,
            })
        })
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiCaptionClient);

#[async_trait]
impl CaptionService for GeminiCaptionClient {
    async fn generate_captions(&self, request: &CaptionRequest) -> Result<CaptionResponse> {
        request.validate()?;

        let (mime, image_bytes) = self.resolve_image(&request.image_url).await?;
        tracing::debug!(
            "Requesting {} Bangla captions from Gemini ({} image bytes)",
            request.number_of_captions,
            image_bytes.len()
        );

        use base64::Engine as _;
        let base64_image = base64::engine::general_purpose::STANDARD.encode(&image_bytes);

        let content_request = CaptionContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text {
                    text: prompts::CAPTION_SYSTEM.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime,
                            data: base64_image,
                        },
                    },
                    Part::Text {
                        text: prompts::caption_instruction(request.number_of_captions),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(1000),
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let response: GenerateContentResponse =
            self.http.generate_content(&content_request).await?;

        let text = Self::extract_text(&response)
            .ok_or_else(|| Error::AiProvider("No text in Gemini caption response".to_string()))?;

        CaptionResponse::from_model_payload(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.0-flash";
    const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn make_client(server: &MockServer, api_key: &str, model: &str) -> GeminiCaptionClient {
        GeminiCaptionClient::new(api_key.to_string(), model.to_string())
            .with_base_url(server.uri())
    }

    fn captions_body(captions: &[&str]) -> serde_json::Value {
        let payload = serde_json::json!({ "captions": captions }).to_string();
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": payload }]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_captions_parses_response_in_order() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("\"inlineData\""))
            .and(body_string_contains("Generate 2 Bangla captions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(captions_body(&["নদীর ধারে বিকেল", "শান্ত জলে আলো"])),
            )
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let request = CaptionRequest::new(PNG_DATA_URL).with_caption_count(2);

        let response = client.generate_captions(&request).await.unwrap();
        assert_eq!(
            response.captions,
            vec!["নদীর ধারে বিকেল".to_string(), "শান্ত জলে আলো".to_string()]
        );
    }

    #[tokio::test]
    async fn test_remote_image_is_fetched_and_inlined() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            )
            .expect(1)
            .mount(&server)
            .await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(captions_body(&["বিড়াল"])))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let request = CaptionRequest::new(format!("{}/cat.png", server.uri()));

        let response = client.generate_captions(&request).await.unwrap();
        assert_eq!(response.captions, vec!["বিড়াল".to_string()]);
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = make_client(&server, "bad-key", DEFAULT_MODEL);
        let request = CaptionRequest::new(PNG_DATA_URL);

        let err = client.generate_captions(&request).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_malformed_caption_payload_is_a_schema_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{ "text": "{\"captions\": \"একটি মাত্র স্ট্রিং\"}" }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let request = CaptionRequest::new(PNG_DATA_URL);

        let err = client.generate_captions(&request).await.unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let request = CaptionRequest::new(PNG_DATA_URL);

        let err = client.generate_captions(&request).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_invalid_data_url_fails_before_any_request() {
        let server = MockServer::start().await;

        let client = make_client(&server, "test-key", DEFAULT_MODEL);
        let request = CaptionRequest::new("data:image/png;base64,!!!");

        let err = client.generate_captions(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_id_strips_models_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(captions_body(&["ক্যাপশন"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "test-key", "models/gemini-2.0-flash");
        let request = CaptionRequest::new(PNG_DATA_URL);

        client.generate_captions(&request).await.unwrap();
    }
}
