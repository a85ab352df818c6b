use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::DiagramState;
use crate::mindmap::{MindMapEdge, MindMapNode};

const ZOOM_STEP: f64 = 1.2;

type SharedState = Rc<RefCell<Option<DiagramState>>>;

/// Browser callbacks registered by one mounted diagram.
#[derive(Default)]
struct Callbacks {
	animate: Option<Closure<dyn FnMut()>>,
	resize: Option<Closure<dyn FnMut()>>,
	frame: Option<i32>,
}

impl Callbacks {
	/// Unregister everything so the browser no longer calls into dropped closures.
	fn detach(&mut self) {
		let Callbacks {
			animate,
			resize,
			frame,
		} = std::mem::take(self);
		if let Some(window) = web_sys::window() {
			if let Some(id) = frame {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = &resize {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		debug!("diagram callbacks detached");
		drop((animate, resize));
	}
}

type SharedCallbacks = Rc<RefCell<Callbacks>>;

fn canvas_size(canvas: &HtmlCanvasElement, height: Option<f64>) -> (f64, f64) {
	let parent = canvas.parent_element();
	let w = parent
		.as_ref()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(800.0);
	let h = height.unwrap_or_else(|| {
		parent
			.as_ref()
			.map(|p| p.client_height() as f64)
			.filter(|h| *h > 0.0)
			.unwrap_or(600.0)
	});
	(w, h)
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive mind-map diagram drawn on a canvas.
///
/// While `locked` is true the diagram ignores pointer input and wheel events fall
/// through to the page.
#[component]
pub fn MindMapCanvas(
	#[prop(into)] nodes: Signal<Vec<MindMapNode>>,
	#[prop(into)] edges: Signal<Vec<MindMapEdge>>,
	#[prop(into)] locked: Signal<bool>,
	canvas_ref: NodeRef<leptos::html::Canvas>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let state: SharedState = Rc::new(RefCell::new(None));
	let callbacks: SharedCallbacks = Rc::new(RefCell::new(Callbacks::default()));
	let running = Arc::new(AtomicBool::new(true));
	let spreading = RwSignal::new(false);
	let (state_init, callbacks_init, running_init) =
		(state.clone(), callbacks.clone(), running.clone());

	let registered = StoredValue::new_local(callbacks);
	on_cleanup({
		let running = running.clone();
		move || {
			running.store(false, Ordering::Relaxed);
			registered.try_with_value(|cb| cb.borrow_mut().detach());
		}
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = canvas_size(&canvas, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => return,
		};
		let (nodes, edges) = (nodes.get_untracked(), edges.get_untracked());
		debug!("mounting diagram {w}x{h} with {} nodes", nodes.len());
		*state_init.borrow_mut() = Some(DiagramState::new(&nodes, &edges, w, h));

		let (state_resize, canvas_resize, running_resize) =
			(state_init.clone(), canvas.clone(), running_init.clone());
		let resize_cb: Closure<dyn FnMut()> = Closure::new(move || {
			if !running_resize.load(Ordering::Relaxed) {
				return;
			}
			let (nw, nh) = canvas_size(&canvas_resize, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		});
		let _ = window.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());

		let (state_anim, callbacks_anim, running_anim) =
			(state_init.clone(), callbacks_init.clone(), running_init.clone());
		let animate: Closure<dyn FnMut()> = Closure::new(move || {
			// Stop rescheduling once the component is gone.
			if !running_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			let frame = match (&callbacks_anim.borrow().animate, web_sys::window()) {
				(Some(cb), Some(win)) => win.request_animation_frame(cb.as_ref().unchecked_ref()).ok(),
				_ => None,
			};
			callbacks_anim.borrow_mut().frame = frame;
		});
		let frame = window.request_animation_frame(animate.as_ref().unchecked_ref()).ok();

		let mut cb = callbacks_init.borrow_mut();
		cb.detach();
		*cb = Callbacks {
			animate: Some(animate),
			resize: Some(resize_cb),
			frame,
		};
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if locked.get_untracked() {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag.active = true;
				s.drag.node_idx = Some(idx);
				s.drag.start_x = x;
				s.drag.start_y = y;
				if let Some((nx, ny)) = s.position(idx) {
					s.drag.node_start_x = nx as f32;
					s.drag.node_start_y = ny as f32;
				}
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if locked.get_untracked() {
				s.release();
				s.set_hover(None);
				return;
			}

			// Update hover state when not dragging
			if !s.drag.active {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
			}

			if s.drag.active {
				if let Some(idx) = s.drag.node_idx {
					let (dx, dy) = (
						(x - s.drag.start_x) / s.transform.k,
						(y - s.drag.start_y) / s.transform.k,
					);
					let (nx, ny) = (
						s.drag.node_start_x + dx as f32,
						s.drag.node_start_y + dy as f32,
					);
					s.graph.visit_nodes_mut(|node| {
						if node.index() == idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.release();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release();
			s.set_hover(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		// Locked: leave the event alone so the page scrolls.
		if locked.get_untracked() {
			return;
		}
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(factor, x, y);
		}
	};

	let with_state = move |f: fn(&mut DiagramState)| {
		let state = state.clone();
		move |_: MouseEvent| {
			if let Some(ref mut s) = *state.borrow_mut() {
				f(s);
			}
		}
	};
	let on_zoom_in = with_state(|s| s.zoom_centered(ZOOM_STEP));
	let on_zoom_out = with_state(|s| s.zoom_centered(1.0 / ZOOM_STEP));
	let on_fit = with_state(DiagramState::fit_view);
	let on_spread = with_state(|s| {
		let on = !s.spreading;
		s.set_spreading(on);
	});

	view! {
		<div class="mind-map" class:locked=move || locked.get()>
			<canvas
				node_ref=canvas_ref
				class="mind-map-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
			/>
			<div class="mind-map-controls">
				<button title="Aproximar" disabled=move || locked.get() on:click=on_zoom_in>"+"</button>
				<button title="Afastar" disabled=move || locked.get() on:click=on_zoom_out>"−"</button>
				<button title="Enquadrar" disabled=move || locked.get() on:click=on_fit>"⤢"</button>
				<button
					title="Espalhar nós sobrepostos"
					disabled=move || locked.get()
					class:active=move || spreading.get()
					on:click=move |ev| {
						spreading.update(|on| *on = !*on);
						on_spread(ev);
					}
				>
					"✣"
				</button>
			</div>
		</div>
	}
}
