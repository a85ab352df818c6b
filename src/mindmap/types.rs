use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Id of the node the model is asked to use for the central topic.
pub const ROOT_NODE_ID: &str = "1";

/// Render-type tag attached to every node.
pub const NODE_TYPE: &str = "mindMap";

/// Stroke colour attached to every edge.
pub const EDGE_STROKE: &str = "#64b4ff";

/// Stroke width attached to every edge.
pub const EDGE_STROKE_WIDTH: f64 = 2.0;

/// Summary used when the model returns none.
pub const FALLBACK_SUMMARY: &str = "Não foi possível gerar um resumo.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

/// Payload carried by a node into the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
	/// Copy of the owning node's id.
	pub id: String,
	pub label: String,
	pub descricao: String,
	pub is_root: bool,
	/// Any other fields the model put in `data`, kept verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MindMapNode {
	pub id: String,
	pub position: Position,
	#[serde(rename = "type")]
	pub kind: String,
	pub data: NodeData,
}

impl MindMapNode {
	pub fn is_root(&self) -> bool {
		self.data.is_root
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
	pub stroke: String,
	pub stroke_width: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			stroke: EDGE_STROKE.into(),
			stroke_width: EDGE_STROKE_WIDTH,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MindMapEdge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub animated: bool,
	pub style: EdgeStyle,
}

/// A normalized, render-ready mind map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
	pub nodes: Vec<MindMapNode>,
	pub edges: Vec<MindMapEdge>,
	pub summary: String,
}

impl MindMap {
	pub fn root(&self) -> Option<&MindMapNode> {
		self.nodes.iter().find(|n| n.is_root())
	}
}

// Shapes the model is asked to produce.

#[derive(Debug, Deserialize)]
pub(crate) struct RawResponse {
	pub mapa: RawMap,
	#[serde(default)]
	pub resumo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMap {
	pub nodes: Vec<RawNode>,
	pub edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNode {
	#[serde(deserialize_with = "loose_id")]
	pub id: String,
	pub position: Position,
	pub data: RawNodeData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNodeData {
	pub label: String,
	#[serde(default)]
	pub descricao: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEdge {
	#[serde(deserialize_with = "loose_id")]
	pub id: String,
	#[serde(deserialize_with = "loose_id")]
	pub source: String,
	#[serde(deserialize_with = "loose_id")]
	pub target: String,
}

/// Models occasionally emit numeric ids; both `"3"` and `3` map to `"3"`.
fn loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Id {
		Text(String),
		Number(serde_json::Number),
	}

	Ok(match Id::deserialize(deserializer)? {
		Id::Text(s) => s,
		Id::Number(n) => n.to_string(),
	})
}
