//! Topic → mind map pipeline, independent of the transport.

use std::future::Future;

use log::{info, warn};
use thiserror::Error;

use crate::mindmap::{MapError, MindMap, build_prompt, normalize};

#[derive(Debug, Error)]
pub enum GenerateError {
	#[error("topic is empty")]
	MissingTopic,

	#[error("no API key configured (set GEMINI_API_KEY at build time)")]
	MissingApiKey,

	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("service answered {status}: {body}")]
	Status { status: u16, body: String },

	#[error("service returned no text")]
	EmptyResponse,

	#[error(transparent)]
	Map(#[from] MapError),
}

impl GenerateError {
	/// Message shown to the user. Everything past input checks collapses to one text.
	pub fn user_message(&self) -> &'static str {
		match self {
			GenerateError::MissingTopic => "Digite um tema para gerar o mapa mental.",
			GenerateError::MissingApiKey => {
				"Chave da API não configurada. Defina GEMINI_API_KEY e recompile."
			}
			_ => "Erro ao gerar o mapa mental. Tente novamente.",
		}
	}
}

/// Anything that can turn a prompt into model text.
pub trait TextGenerator {
	fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerateError>>;
}

/// Build the prompt for `topic`, ask `generator`, and normalize the answer.
pub async fn generate_mind_map<G: TextGenerator>(
	generator: &G,
	topic: &str,
) -> Result<MindMap, GenerateError> {
	let topic = topic.trim();
	if topic.is_empty() {
		return Err(GenerateError::MissingTopic);
	}

	info!("generating mind map for {topic:?}");
	let raw = generator.generate(&build_prompt(topic)).await?;
	if raw.trim().is_empty() {
		warn!("empty completion for {topic:?}");
		return Err(GenerateError::EmptyResponse);
	}
	let map = normalize(&raw)?;
	info!("mind map ready: {} nodes, {} edges", map.nodes.len(), map.edges.len());
	Ok(map)
}
