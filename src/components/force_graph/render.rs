use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, ZOOM_FLASH_SECS, node_radius};
use super::types::{EdgeKind, GraphNode, NodeKind};

const BACKGROUND: &str = "#0a0f0a";

struct NodeStyle {
	fill: &'static str,
	stroke: &'static str,
}

fn node_style(kind: &NodeKind) -> NodeStyle {
	match kind {
		NodeKind::Center => NodeStyle {
			fill: "#00ff41",
			stroke: "#b3ffc6",
		},
		NodeKind::AccessPoint { .. } => NodeStyle {
			fill: "#ff9f1c",
			stroke: "#ffd8a8",
		},
		NodeKind::Device { .. } => NodeStyle {
			fill: "#2ec4ff",
			stroke: "#c2efff",
		},
	}
}

fn edge_color(kind: EdgeKind) -> &'static str {
	match kind {
		EdgeKind::CenterToAp => "rgba(0, 255, 65, 0.45)",
		EdgeKind::ApToDevice => "rgba(46, 196, 255, 0.55)",
	}
}

/// Draws one frame of `state` onto `ctx`.
pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_zoom_level(state, ctx);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let graph = state.graph();
	let k = state.transform.k;
	let (dash, gap) = (6.0 / k, 4.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);

	ctx.set_line_width(1.2 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
	ctx.set_line_dash_offset(dash_offset);

	for edge in &graph.edges {
		let (from, to) = (&graph.nodes[edge.source.0], &graph.nodes[edge.target.0]);
		let d = to.position - from.position;
		let dist = d.length();
		if dist < 0.001 {
			continue;
		}
		let u = d * (1.0 / dist);
		let start = from.position + u * node_radius(from.role());
		let end = to.position - u * node_radius(to.role());

		ctx.set_stroke_style_str(edge_color(edge.kind));
		ctx.begin_path();
		ctx.move_to(start.x, start.y);
		ctx.line_to(end.x, end.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let font_px = 10.0 / k.max(0.5);

	for node in &state.graph().nodes {
		let style = node_style(&node.kind);
		let radius = node_radius(node.role());
		let (x, y) = (node.position.x, node.position.y);

		if node.pin.is_some() && !matches!(node.kind, NodeKind::Center) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
			ctx.set_line_width(1.0 / k);
			ctx.stroke();
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.fill);
		ctx.fill();
		ctx.set_stroke_style_str(style.stroke);
		ctx.set_line_width(1.5 / k);
		ctx.stroke();

		draw_labels(state, ctx, node, radius, font_px);
	}
}

fn draw_labels(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	node: &GraphNode,
	radius: f64,
	font_px: f64,
) {
	let (x, y) = (node.position.x, node.position.y);
	ctx.set_font(&format!("{font_px}px monospace"));
	ctx.set_fill_style_str("#d8ffe0");

	match &node.kind {
		NodeKind::Center => {
			ctx.set_text_align("left");
			let _ = ctx.fill_text(&state.config().center_label, x + radius + 5.0, y + 4.0);
		}
		NodeKind::AccessPoint {
			display_index,
			name,
		} => {
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&display_index.to_string(), x, y - radius - 2.0);
			ctx.set_text_align("left");
			let _ = ctx.fill_text(name, x + radius + 5.0, y + 4.0);
		}
		NodeKind::Device { display_index, .. } => {
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&display_index.to_string(), x, y - radius - 4.0);
		}
	}
}

fn draw_zoom_level(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	if state.zoom_flash <= 0.0 {
		return;
	}
	ctx.set_global_alpha(state.zoom_flash / ZOOM_FLASH_SECS);
	ctx.set_text_align("left");
	ctx.set_font("12px monospace");
	ctx.set_fill_style_str("#00ff41");
	let _ = ctx.fill_text(
		&format!("Zoom: {}%", (state.transform.k * 100.0).round()),
		10.0,
		20.0,
	);
	ctx.set_global_alpha(1.0);
}
