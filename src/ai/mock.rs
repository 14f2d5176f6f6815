use super::CaptionService;
use crate::models::{CaptionRequest, CaptionResponse};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Deterministic in-memory caption client for tests.
///
/// Queued responses are served in order and cycled; with no queue, captions
/// are derived from the request so plumbing tests stay deterministic.
#[derive(Clone)]
pub struct MockCaptionClient {
    responses: Arc<Mutex<Vec<Result<CaptionResponse>>>>,
    requests: Arc<Mutex<Vec<CaptionRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockCaptionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_captions(self, captions: Vec<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Ok(CaptionResponse { captions }));
        self
    }

    pub fn with_error(self, error: crate::Error) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Requests seen so far, in call order.
    pub fn get_requests(&self) -> Vec<CaptionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockCaptionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionService for MockCaptionClient {
    async fn generate_captions(&self, request: &CaptionRequest) -> Result<CaptionResponse> {
        request.validate()?;

        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.requests.lock().unwrap().push(request.clone());

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response derived from the request
            let captions = (1..=request.number_of_captions)
                .map(|i| format!("মক ক্যাপশন {}", i))
                .collect();
            Ok(CaptionResponse { captions })
        } else {
            let index = (*count - 1) % responses.len();
            match &responses[index] {
                Ok(response) => Ok(response.clone()),
                Err(crate::Error::Schema(message)) => Err(crate::Error::Schema(message.clone())),
                Err(crate::Error::AiProvider(message)) => {
                    Err(crate::Error::AiProvider(message.clone()))
                }
                Err(other) => Err(crate::Error::Generic(other.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response_matches_requested_count() {
        let client = MockCaptionClient::new();
        let request = CaptionRequest::new("data:image/png;base64,AAAA").with_caption_count(4);

        let response = client.generate_captions(&request).await.unwrap();
        assert_eq!(response.captions.len(), 4);
    }

    #[tokio::test]
    async fn test_queued_responses_cycle_in_order() {
        let client = MockCaptionClient::new()
            .with_captions(vec!["প্রথম".to_string()])
            .with_captions(vec!["দ্বিতীয়".to_string()]);
        let request = CaptionRequest::new("data:image/png;base64,AAAA");

        let first = client.generate_captions(&request).await.unwrap();
        let second = client.generate_captions(&request).await.unwrap();
        let third = client.generate_captions(&request).await.unwrap();

        assert_eq!(first.captions, vec!["প্রথম".to_string()]);
        assert_eq!(second.captions, vec!["দ্বিতীয়".to_string()]);
        assert_eq!(third.captions, first.captions);
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_identical_requests_yield_identical_responses() {
        let client =
            MockCaptionClient::new().with_captions(vec!["নদীর ধারে শান্ত বিকেল".to_string()]);
        let request = CaptionRequest::new("data:image/png;base64,AAAA");

        let first = client.generate_captions(&request).await.unwrap();
        let second = client.generate_captions(&request).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_queued_error_is_returned() {
        let client = MockCaptionClient::new()
            .with_error(crate::Error::Schema("captions was a string".to_string()));
        let request = CaptionRequest::new("data:image/png;base64,AAAA");

        let err = client.generate_captions(&request).await.unwrap_err();
        assert!(matches!(err, crate::Error::Schema(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_without_counting() {
        let client = MockCaptionClient::new();
        let request = CaptionRequest::new("").with_caption_count(3);

        let err = client.generate_captions(&request).await.unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRequest(_)));
        assert_eq!(client.get_call_count(), 0);
    }
}
