//! Mind-map domain: prompt templating and model-response normalization.

mod normalize;
mod prompt;
mod types;

pub use normalize::{MapError, normalize, strip_code_fence};
pub use prompt::build_prompt;
pub use types::{
	EDGE_STROKE, EDGE_STROKE_WIDTH, EdgeStyle, FALLBACK_SUMMARY, MindMap, MindMapEdge,
	MindMapNode, NODE_TYPE, NodeData, Position, ROOT_NODE_ID,
};
