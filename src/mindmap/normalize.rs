use log::debug;
use serde_json::Value;
use thiserror::Error;

use super::types::{
	EdgeStyle, FALLBACK_SUMMARY, MindMap, MindMapEdge, MindMapNode, NODE_TYPE, NodeData,
	ROOT_NODE_ID, RawEdge, RawNode, RawResponse,
};

#[derive(Debug, Error)]
pub enum MapError {
	#[error("model response is not valid JSON: {0}")]
	Parse(#[source] serde_json::Error),

	#[error("model response does not match the mind-map shape: {0}")]
	Schema(#[source] serde_json::Error),
}

const FENCE: &str = "```";

/// Remove a Markdown code fence (```` ```json ```` … ```` ``` ````) around the payload.
///
/// The opening and closing markers are stripped independently, so a reply with only one
/// of them still parses. Input with neither marker comes back unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
	let trimmed = raw.trim();
	if !trimmed.starts_with(FENCE) && !trimmed.ends_with(FENCE) {
		return raw;
	}
	let mut text = trimmed;
	if let Some(rest) = text.strip_prefix(FENCE) {
		let rest = rest.strip_prefix("json").unwrap_or(rest);
		text = rest.trim_start();
	}
	if let Some(body) = text.strip_suffix(FENCE) {
		text = body.trim_end();
	}
	text
}

/// Turn raw model output into a render-ready [`MindMap`].
///
/// Edges are passed through even when they point at unknown node ids.
pub fn normalize(raw: &str) -> Result<MindMap, MapError> {
	let text = strip_code_fence(raw);
	let value: Value = serde_json::from_str(text).map_err(MapError::Parse)?;
	let response: RawResponse = serde_json::from_value(value).map_err(MapError::Schema)?;

	let nodes: Vec<MindMapNode> = response.mapa.nodes.into_iter().map(node_from_raw).collect();
	let edges: Vec<MindMapEdge> = response.mapa.edges.into_iter().map(edge_from_raw).collect();
	let summary = match response.resumo {
		Some(s) if !s.trim().is_empty() => s,
		_ => FALLBACK_SUMMARY.to_string(),
	};

	debug!("normalized mind map: {} nodes, {} edges", nodes.len(), edges.len());
	Ok(MindMap {
		nodes,
		edges,
		summary,
	})
}

fn node_from_raw(raw: RawNode) -> MindMapNode {
	let mut extra = raw.data.extra;
	extra.remove("id");
	extra.remove("isRoot");
	MindMapNode {
		data: NodeData {
			id: raw.id.clone(),
			label: raw.data.label,
			descricao: raw.data.descricao,
			is_root: raw.id == ROOT_NODE_ID,
			extra,
		},
		id: raw.id,
		position: raw.position,
		kind: NODE_TYPE.to_string(),
	}
}

fn edge_from_raw(raw: RawEdge) -> MindMapEdge {
	MindMapEdge {
		id: raw.id,
		source: raw.source,
		target: raw.target,
		animated: true,
		style: EdgeStyle::default(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mindmap::types::EDGE_STROKE;

	const SINGLE_ROOT: &str = r#"{
		"mapa": {
			"nodes": [{"id": "1", "position": {"x": 0, "y": 0}, "data": {"label": "Root", "descricao": "d"}}],
			"edges": []
		},
		"resumo": "s"
	}"#;

	#[test]
	fn strips_json_fence() {
		assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
	}

	#[test]
	fn strips_bare_fence_and_trailing_whitespace() {
		assert_eq!(strip_code_fence("```json   \n{\"a\":1}\n```\n\n"), "{\"a\":1}");
		assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
	}

	#[test]
	fn strips_lone_closing_fence() {
		assert_eq!(strip_code_fence("{\"a\":1}\n```"), "{\"a\":1}");
		let raw = "{\"mapa\":{\"nodes\":[],\"edges\":[]},\"resumo\":\"s\"}\n```";
		assert_eq!(normalize(raw).unwrap().summary, "s");
	}

	#[test]
	fn strips_lone_opening_fence() {
		assert_eq!(strip_code_fence("```json\n{\"a\":1}  "), "{\"a\":1}");
	}

	#[test]
	fn unfenced_input_is_returned_unchanged() {
		let padded = " {\"a\":1}\n";
		assert_eq!(strip_code_fence(padded), padded);
		assert!(normalize(&format!(" {SINGLE_ROOT}\n")).is_ok());
	}

	#[test]
	fn fence_strip_is_idempotent() {
		let plain = "{\"a\":1}";
		assert_eq!(strip_code_fence(plain), plain);
		let once = strip_code_fence("```json\n{\"a\":1}\n```");
		assert_eq!(strip_code_fence(once), once);
	}

	#[test]
	fn normalizes_single_root_node() {
		let map = normalize(SINGLE_ROOT).unwrap();
		assert_eq!(map.nodes.len(), 1);
		let node = &map.nodes[0];
		assert_eq!(node.data.id, "1");
		assert_eq!(node.data.label, "Root");
		assert_eq!(node.data.descricao, "d");
		assert!(node.data.is_root);
		assert_eq!(node.kind, NODE_TYPE);
		assert!(map.edges.is_empty());
		assert_eq!(map.summary, "s");
	}

	#[test]
	fn fenced_payload_normalizes_like_plain() {
		let fenced = format!("```json\n{SINGLE_ROOT}\n```");
		assert_eq!(normalize(&fenced).unwrap(), normalize(SINGLE_ROOT).unwrap());
	}

	#[test]
	fn empty_or_missing_summary_falls_back() {
		let empty = r#"{"mapa": {"nodes": [], "edges": []}, "resumo": "  "}"#;
		assert_eq!(normalize(empty).unwrap().summary, FALLBACK_SUMMARY);
		let missing = r#"{"mapa": {"nodes": [], "edges": []}}"#;
		assert_eq!(normalize(missing).unwrap().summary, FALLBACK_SUMMARY);
		let null = r#"{"mapa": {"nodes": [], "edges": []}, "resumo": null}"#;
		assert_eq!(normalize(null).unwrap().summary, FALLBACK_SUMMARY);
	}

	#[test]
	fn edges_get_presentation_attributes() {
		let raw = r#"{"mapa": {"nodes": [], "edges": [{"id": "e1", "source": "1", "target": "2"}]}, "resumo": "s"}"#;
		let map = normalize(raw).unwrap();
		let edge = &map.edges[0];
		assert!(edge.animated);
		assert_eq!(edge.style.stroke, EDGE_STROKE);
		assert_eq!((edge.source.as_str(), edge.target.as_str()), ("1", "2"));
	}

	#[test]
	fn dangling_edge_passes_through() {
		let raw = r#"{
			"mapa": {
				"nodes": [{"id": "1", "position": {"x": 0, "y": 0}, "data": {"label": "A", "descricao": ""}}],
				"edges": [{"id": "e1-99", "source": "1", "target": "99"}]
			},
			"resumo": "s"
		}"#;
		let map = normalize(raw).unwrap();
		assert_eq!(map.edges.len(), 1);
		assert_eq!(map.edges[0].target, "99");
	}

	#[test]
	fn no_node_with_root_id_means_no_root() {
		let raw = r#"{"mapa": {"nodes": [{"id": "a", "position": {"x": 1, "y": 2}, "data": {"label": "A"}}], "edges": []}}"#;
		let map = normalize(raw).unwrap();
		assert!(map.root().is_none());
		assert_eq!(map.nodes[0].data.descricao, "");
	}

	#[test]
	fn numeric_ids_become_strings() {
		let raw = r#"{"mapa": {"nodes": [{"id": 1, "position": {"x": 0, "y": 0}, "data": {"label": "A"}}], "edges": [{"id": 7, "source": 1, "target": 2}]}}"#;
		let map = normalize(raw).unwrap();
		assert_eq!(map.nodes[0].id, "1");
		assert!(map.nodes[0].is_root());
		assert_eq!(map.edges[0].id, "7");
	}

	#[test]
	fn extra_data_fields_are_kept() {
		let raw = r#"{"mapa": {"nodes": [{"id": "2", "position": {"x": 0, "y": 0}, "data": {"label": "A", "descricao": "b", "cor": "azul", "id": "ignored"}}], "edges": []}}"#;
		let node = &normalize(raw).unwrap().nodes[0];
		assert_eq!(node.data.extra.get("cor"), Some(&Value::from("azul")));
		assert!(!node.data.extra.contains_key("id"));
		assert_eq!(node.data.id, "2");
	}

	#[test]
	fn truncated_json_is_a_parse_error() {
		let err = normalize(r#"{"mapa": {"nodes": [{"id": "1""#).unwrap_err();
		assert!(matches!(err, MapError::Parse(_)));
	}

	#[test]
	fn wrong_shape_is_a_schema_error() {
		let err = normalize(r#"{"resumo": "s"}"#).unwrap_err();
		assert!(matches!(err, MapError::Schema(_)));
		let err = normalize(r#"{"mapa": {"nodes": "nope", "edges": []}}"#).unwrap_err();
		assert!(matches!(err, MapError::Schema(_)));
	}
}
