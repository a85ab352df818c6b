use std::collections::{HashMap, HashSet, VecDeque};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};

use crate::mindmap::{MindMapEdge, MindMapNode};

const COLORS: &[&str] = &[
	"#1f77b4", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22",
	"#17becf",
];
pub const ROOT_COLOR: &str = "#ff7f0e";

pub const NODE_RADIUS: f64 = 7.0;
pub const ROOT_RADIUS: f64 = 12.0;
pub const HIT_RADIUS: f64 = 14.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
const FIT_PADDING: f64 = 60.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub label: String,
	pub color: String,
	pub is_root: bool,
}

impl NodeInfo {
	pub fn radius(&self) -> f64 {
		if self.is_root { ROOT_RADIUS } else { NODE_RADIUS }
	}
}

#[derive(Clone, Debug)]
pub struct EdgeView {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub animated: bool,
	pub stroke: String,
	pub stroke_width: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// World-space bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}
}

pub struct DiagramState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeView>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	/// Force simulation running to pull overlapping nodes apart.
	pub spreading: bool,
	ids: HashMap<String, DefaultNodeIdx>,
}

impl DiagramState {
	pub fn new(nodes: &[MindMapNode], edges: &[MindMapEdge], width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 600.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let colors = branch_colors(nodes, edges);
		let mut ids = HashMap::new();

		for node in nodes {
			// Model positions are kept as-is; nodes only move when dragged or spread.
			let idx = graph.add_node(NodeData {
				x: node.position.x as f32,
				y: node.position.y as f32,
				mass: 10.0,
				is_anchor: true,
				user_data: NodeInfo {
					label: node.data.label.clone(),
					color: colors.get(node.id.as_str()).copied().unwrap_or(COLORS[0]).into(),
					is_root: node.is_root(),
				},
			});
			ids.insert(node.id.clone(), idx);
		}

		let mut views = Vec::new();
		for edge in edges {
			match (ids.get(&edge.source), ids.get(&edge.target)) {
				(Some(&src), Some(&tgt)) => {
					graph.add_edge(src, tgt, EdgeData::default());
					views.push(EdgeView {
						source: src,
						target: tgt,
						animated: edge.animated,
						stroke: edge.style.stroke.clone(),
						stroke_width: edge.style.stroke_width,
					});
				}
				_ => warn!(
					"skipping edge {} ({} -> {}): unknown node",
					edge.id, edge.source, edge.target
				),
			}
		}

		let mut state = Self {
			graph,
			edges: views,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			spreading: false,
			ids,
		};
		state.fit_view();
		debug!(
			"diagram state: {} nodes, {} edges",
			state.ids.len(),
			state.edges.len()
		);
		state
	}

	#[cfg(test)]
	pub fn index_of(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.ids.get(id).copied()
	}

	pub fn position(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn bounds(&self) -> Option<Bounds> {
		let mut bounds: Option<Bounds> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => Bounds {
					min_x: x,
					min_y: y,
					max_x: x,
					max_y: y,
				},
				Some(b) => Bounds {
					min_x: b.min_x.min(x),
					min_y: b.min_y.min(y),
					max_x: b.max_x.max(x),
					max_y: b.max_y.max(y),
				},
			});
		});
		bounds
	}

	/// Centre the nodes and zoom so they all fit with some padding.
	pub fn fit_view(&mut self) {
		let Some(b) = self.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (avail_w, avail_h) = (
			(self.width - 2.0 * FIT_PADDING).max(1.0),
			(self.height - 2.0 * FIT_PADDING).max(1.0),
		);
		let k = (avail_w / b.width().max(1.0))
			.min(avail_h / b.height().max(1.0))
			.clamp(MIN_ZOOM, 1.5);
		let (cx, cy) = ((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// Zoom by `factor` keeping the screen point (`sx`, `sy`) fixed.
	pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn zoom_centered(&mut self, factor: f64) {
		self.zoom_at(factor, self.width / 2.0, self.height / 2.0);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS.max(node.data.user_data.radius()) {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_spreading(&mut self, on: bool) {
		self.spreading = on;
		self.graph.visit_nodes_mut(|node| {
			node.data.is_anchor = !on || node.data.user_data.is_root;
		});
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Drop any pointer interaction in progress.
	pub fn release(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.spreading {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Colour per node id: each child of the root starts a branch colour its
/// descendants inherit. The root gets [`ROOT_COLOR`].
fn branch_colors<'a>(nodes: &'a [MindMapNode], edges: &'a [MindMapEdge]) -> HashMap<&'a str, &'static str> {
	let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
	for edge in edges {
		children.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
	}

	let mut colors = HashMap::new();
	let Some(root) = nodes.iter().find(|n| n.is_root()) else {
		return colors;
	};
	colors.insert(root.id.as_str(), ROOT_COLOR);

	let mut queue = VecDeque::new();
	for (i, &child) in children.get(root.id.as_str()).into_iter().flatten().enumerate() {
		if colors.contains_key(child) {
			continue;
		}
		colors.insert(child, COLORS[i % COLORS.len()]);
		queue.push_back(child);
	}
	while let Some(id) = queue.pop_front() {
		let color = colors[id];
		for &child in children.get(id).into_iter().flatten() {
			if !colors.contains_key(child) {
				colors.insert(child, color);
				queue.push_back(child);
			}
		}
	}
	colors
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mindmap::normalize;

	fn sample() -> (Vec<MindMapNode>, Vec<MindMapEdge>) {
		let map = normalize(
			r#"{"mapa": {
				"nodes": [
					{"id": "1", "position": {"x": 0, "y": 0}, "data": {"label": "Root"}},
					{"id": "2", "position": {"x": 200, "y": 0}, "data": {"label": "A"}},
					{"id": "3", "position": {"x": 0, "y": 100}, "data": {"label": "B"}},
					{"id": "4", "position": {"x": 300, "y": 50}, "data": {"label": "A1"}}
				],
				"edges": [
					{"id": "e1", "source": "1", "target": "2"},
					{"id": "e2", "source": "1", "target": "3"},
					{"id": "e3", "source": "2", "target": "4"},
					{"id": "e4", "source": "2", "target": "99"}
				]
			}}"#,
		)
		.unwrap();
		(map.nodes, map.edges)
	}

	#[test]
	fn dangling_edges_are_skipped() {
		let (nodes, edges) = sample();
		let state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		assert_eq!(state.edges.len(), 3);
	}

	#[test]
	fn keeps_model_positions() {
		let (nodes, edges) = sample();
		let state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		let idx = state.index_of("4").unwrap();
		assert_eq!(state.position(idx), Some((300.0, 50.0)));
		let b = state.bounds().unwrap();
		assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 300.0, 100.0));
	}

	#[test]
	fn fit_view_centres_nodes() {
		let (nodes, edges) = sample();
		let state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		let (gx, gy) = state.screen_to_graph(400.0, 300.0);
		assert!((gx - 150.0).abs() < 1e-6);
		assert!((gy - 50.0).abs() < 1e-6);
	}

	#[test]
	fn hit_test_finds_node_under_cursor() {
		let (nodes, edges) = sample();
		let state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		let idx = state.index_of("2").unwrap();
		let t = &state.transform;
		let (sx, sy) = (200.0 * t.k + t.x, t.y);
		assert_eq!(state.node_at_position(sx, sy), Some(idx));
		assert_eq!(state.node_at_position(0.0, 599.0), None);
	}

	#[test]
	fn zoom_keeps_anchor_point_and_clamps() {
		let (nodes, edges) = sample();
		let mut state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		let before = state.screen_to_graph(100.0, 100.0);
		state.zoom_at(1.1, 100.0, 100.0);
		let after = state.screen_to_graph(100.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		for _ in 0..100 {
			state.zoom_centered(2.0);
		}
		assert_eq!(state.transform.k, MAX_ZOOM);
	}

	#[test]
	fn hover_collects_neighbors() {
		let (nodes, edges) = sample();
		let mut state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		let a = state.index_of("2").unwrap();
		state.set_hover(Some(a));
		assert!(state.is_highlighted(state.index_of("1").unwrap()));
		assert!(state.is_highlighted(state.index_of("4").unwrap()));
		assert!(!state.is_highlighted(state.index_of("3").unwrap()));
	}

	#[test]
	fn branches_share_colours() {
		let (nodes, edges) = sample();
		let colors = branch_colors(&nodes, &edges);
		assert_eq!(colors["1"], ROOT_COLOR);
		assert_eq!(colors["2"], colors["4"]);
		assert_ne!(colors["2"], colors["3"]);
	}

	#[test]
	fn anchored_nodes_stay_put_without_spreading() {
		let (nodes, edges) = sample();
		let mut state = DiagramState::new(&nodes, &edges, 800.0, 600.0);
		for _ in 0..10 {
			state.tick(0.016);
		}
		let idx = state.index_of("3").unwrap();
		assert_eq!(state.position(idx), Some((0.0, 100.0)));
	}

	#[test]
	fn empty_map_gets_default_view() {
		let state = DiagramState::new(&[], &[], 800.0, 600.0);
		assert_eq!(state.transform, ViewTransform { x: 400.0, y: 300.0, k: 1.0 });
		assert!(state.bounds().is_none());
	}
}
