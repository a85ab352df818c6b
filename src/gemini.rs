//! Google Gemini `generateContent` client.

use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::generate::{GenerateError, TextGenerator};

const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
	contents: Vec<GeminiContent<'a>>,
	generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
	parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
	text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
	response_mime_type: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
	content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
	#[serde(default)]
	text: String,
}

impl GeminiResponse {
	fn into_text(self) -> Option<String> {
		self.candidates
			.into_iter()
			.next()?
			.content?
			.parts
			.into_iter()
			.map(|p| p.text)
			.reduce(|mut acc, t| {
				acc.push_str(&t);
				acc
			})
	}
}

pub struct GeminiClient {
	config: GeminiConfig,
	api_key: String,
	client: Client,
}

impl GeminiClient {
	/// Fails with [`GenerateError::MissingApiKey`] before any request is made.
	pub fn new(config: GeminiConfig) -> Result<Self, GenerateError> {
		let api_key = config.api_key()?.to_string();
		Ok(Self {
			config,
			api_key,
			client: Client::new(),
		})
	}

	fn request_body<'a>(&self, prompt: &'a str) -> GeminiRequest<'a> {
		GeminiRequest {
			contents: vec![GeminiContent {
				parts: vec![RequestPart { text: prompt }],
			}],
			generation_config: GenerationConfig {
				response_mime_type: JSON_MIME_TYPE,
				temperature: self.config.temperature,
			},
		}
	}
}

impl TextGenerator for GeminiClient {
	async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
		let url = self.config.endpoint();
		debug!("POST {url} ({} prompt bytes)", prompt.len());

		let response = self
			.client
			.post(&url)
			.header("x-goog-api-key", &self.api_key)
			.json(&self.request_body(prompt))
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			error!("gemini returned {status}");
			return Err(GenerateError::Status {
				status: status.as_u16(),
				body,
			});
		}

		response
			.json::<GeminiResponse>()
			.await?
			.into_text()
			.ok_or(GenerateError::EmptyResponse)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_asks_for_json() {
		let client = GeminiClient::new(GeminiConfig::from_values(Some("k"), None, None)).unwrap();
		let body = serde_json::to_value(client.request_body("hello")).unwrap();
		assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
		assert_eq!(body["generationConfig"]["responseMimeType"], JSON_MIME_TYPE);
	}

	#[test]
	fn missing_key_fails_early() {
		assert!(matches!(
			GeminiClient::new(GeminiConfig::default()),
			Err(GenerateError::MissingApiKey)
		));
	}

	#[test]
	fn extracts_first_candidate_text() {
		let response: GeminiResponse = serde_json::from_str(
			r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}], "role": "model"}}]}"#,
		)
		.unwrap();
		assert_eq!(response.into_text().as_deref(), Some("{\"a\":1}"));
	}

	#[test]
	fn no_candidates_is_empty() {
		let response: GeminiResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
		assert_eq!(response.into_text(), None);
	}
}
