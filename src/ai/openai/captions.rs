use super::client::OpenAiHttpClient;
use super::types::{
    ChatCompletionRequest, ChatMessage, ChatMessageContent, ImageUrl, JsonSchema, MessagePart,
    ResponseFormat,
};
use crate::ai::CaptionService;
use crate::models::{CaptionRequest, CaptionResponse};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiCaptionClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiCaptionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(30), client),
            model,
        }
    }

    fn caption_response_format() -> ResponseFormat {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "captions": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "description": "A generated Bangla caption for the image"
                    }
                }
            },
            "required": ["captions"],
            "additionalProperties": false
        });

        ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchema {
                name: "bangla_captions".to_string(),
                schema,
                strict: true,
            },
        }
    }
}

#[cfg(test)]
super::impl_with_openai_base_url!(OpenAiCaptionClient);

#[async_trait]
impl CaptionService for OpenAiCaptionClient {
    async fn generate_captions(&self, request: &CaptionRequest) -> Result<CaptionResponse> {
        request.validate()?;

        tracing::debug!(
            "Requesting {} Bangla captions from OpenAI",
            request.number_of_captions
        );

        let system_message = ChatMessage {
            role: "system".to_string(),
            content: Some(ChatMessageContent::Text(
                prompts::CAPTION_SYSTEM.to_string(),
            )),
        };

        // The image reference travels verbatim; OpenAI accepts data URLs and
        // remote URLs in the image_url part.
        let user_message = ChatMessage {
            role: "user".to_string(),
            content: Some(ChatMessageContent::ImageContent(vec![
                MessagePart {
                    part_type: "text".to_string(),
                    text: Some(prompts::caption_instruction(request.number_of_captions)),
                    image_url: None,
                },
                MessagePart {
                    part_type: "image_url".to_string(),
                    text: None,
                    image_url: Some(ImageUrl {
                        url: request.image_url.clone(),
                    }),
                },
            ])),
        };

        let completion_request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![system_message, user_message],
            max_completion_tokens: 1000,
            response_format: Some(Self::caption_response_format()),
        };

        let response = self.http.chat_completion(&completion_request).await?;

        let payload = response
            .choices
            .first()
            .and_then(|choice| match &choice.message.content {
                Some(ChatMessageContent::Text(text)) => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| Error::AiProvider("No text in OpenAI caption response".to_string()))?;

        CaptionResponse::from_model_payload(&payload)
    }
}
