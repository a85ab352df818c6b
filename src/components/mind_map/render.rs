use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{DiagramState, EdgeView};

const BACKGROUND: &str = "#1a1a2e";
const MINIMAP_WIDTH: f64 = 160.0;
const MINIMAP_HEIGHT: f64 = 110.0;
const MINIMAP_MARGIN: f64 = 12.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &DiagramState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_minimap(state, ctx);
}

fn draw_edges(state: &DiagramState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let positions = state.positions();

	for edge in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);
		let line_width = edge.stroke_width * 0.75 / k;

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&edge.stroke);
		ctx.set_line_width(width);
		set_dash(ctx, edge, dash, gap, dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		let (r1, r2) = (node_radius(state, edge.source), node_radius(state, edge.target));
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * r2, y2 - uy * r2);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn set_dash(ctx: &CanvasRenderingContext2d, edge: &EdgeView, dash: f64, gap: f64, offset: f64) {
	if edge.animated {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(offset);
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
}

fn node_radius(state: &DiagramState, idx: force_graph::DefaultNodeIdx) -> f64 {
	let mut radius = 0.0;
	state.graph.visit_nodes(|node| {
		if node.index() == idx {
			radius = node.data.user_data.radius();
		}
	});
	radius
}

fn draw_nodes(state: &DiagramState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, info.radius() * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.85));
		draw_label(ctx, &info.label, info.is_root, x + radius + 4.0, y + 4.0, k);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let base = info.radius();
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);

		let (radius, glow_radius) = if is_hovered {
			(base * (1.0 + 0.35 * t), base * (1.8 + 1.2 * t))
		} else {
			(base * (1.0 + 0.2 * t), base * (1.4 + 0.6 * t))
		};

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		draw_label(ctx, &info.label, info.is_root, x + radius + 4.0, y + 4.0, k);
	});
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &str, is_root: bool, x: f64, y: f64, k: f64) {
	let (weight, size) = if is_root { ("bold ", 14.0) } else { ("", 11.0) };
	ctx.set_font(&format!("{weight}{}px sans-serif", size / k.max(0.5)));
	let _ = ctx.fill_text(label, x, y);
}

/// Overview of every node plus the visible viewport, in the bottom-right corner.
fn draw_minimap(state: &DiagramState, ctx: &CanvasRenderingContext2d) {
	let Some(bounds) = state.bounds() else {
		return;
	};
	let (left, top) = (
		state.width - MINIMAP_WIDTH - MINIMAP_MARGIN,
		state.height - MINIMAP_HEIGHT - MINIMAP_MARGIN,
	);
	if left < 0.0 || top < 0.0 {
		return;
	}

	// Pad the node box so the viewport outline stays visible when zoomed out.
	let (view_x0, view_y0) = state.screen_to_graph(0.0, 0.0);
	let (view_x1, view_y1) = state.screen_to_graph(state.width, state.height);
	let (min_x, min_y) = (bounds.min_x.min(view_x0), bounds.min_y.min(view_y0));
	let (max_x, max_y) = (bounds.max_x.max(view_x1), bounds.max_y.max(view_y1));
	let scale = ((MINIMAP_WIDTH - 8.0) / (max_x - min_x).max(1.0))
		.min((MINIMAP_HEIGHT - 8.0) / (max_y - min_y).max(1.0));
	let to_map = |x: f64, y: f64| {
		(
			left + 4.0 + (x - min_x) * scale,
			top + 4.0 + (y - min_y) * scale,
		)
	};

	ctx.set_fill_style_str("rgba(10, 10, 25, 0.8)");
	ctx.fill_rect(left, top, MINIMAP_WIDTH, MINIMAP_HEIGHT);
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.4)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(left, top, MINIMAP_WIDTH, MINIMAP_HEIGHT);

	state.graph.visit_nodes(|node| {
		let (mx, my) = to_map(node.x() as f64, node.y() as f64);
		ctx.begin_path();
		let _ = ctx.arc(mx, my, if node.data.user_data.is_root { 3.0 } else { 2.0 }, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.data.user_data.color);
		ctx.fill();
	});

	let (vx, vy) = to_map(view_x0, view_y0);
	let (vx1, vy1) = to_map(view_x1, view_y1);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
	ctx.stroke_rect(vx, vy, vx1 - vx, vy1 - vy);
}
