//! Generation settings, baked in at build time.
//!
//! A browser bundle has no process environment, so the values are read with
//! `option_env!` when the crate is compiled (e.g. `GEMINI_API_KEY=... trunk build`).

use serde::{Deserialize, Serialize};

use crate::generate::GenerateError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
	pub api_key: Option<String>,
	pub model: String,
	pub base_url: String,
	pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
	fn default() -> Self {
		Self {
			api_key: None,
			model: DEFAULT_MODEL.into(),
			base_url: DEFAULT_BASE_URL.into(),
			temperature: Some(DEFAULT_TEMPERATURE),
		}
	}
}

impl GeminiConfig {
	/// Settings from `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_BASE_URL` at build time.
	pub fn from_build_env() -> Self {
		Self::from_values(
			option_env!("GEMINI_API_KEY"),
			option_env!("GEMINI_MODEL"),
			option_env!("GEMINI_BASE_URL"),
		)
	}

	/// Blank values fall back to the defaults.
	pub fn from_values(api_key: Option<&str>, model: Option<&str>, base_url: Option<&str>) -> Self {
		let present = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
		let defaults = Self::default();
		Self {
			api_key: present(api_key),
			model: present(model).unwrap_or(defaults.model),
			base_url: present(base_url)
				.map(|u| u.trim_end_matches('/').to_string())
				.unwrap_or(defaults.base_url),
			temperature: defaults.temperature,
		}
	}

	pub fn api_key(&self) -> Result<&str, GenerateError> {
		self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)
	}

	pub fn endpoint(&self) -> String {
		format!("{}/models/{}:generateContent", self.base_url, self.model)
	}
}
