//! Leptos component wrapping the graph canvas.
//!
//! The component owns a [`GraphView`], loads a dataset whenever the `ids`
//! signal changes, and runs an animation loop via `requestAnimationFrame`
//! that advances the layout and repaints. Mouse handlers translate pointer
//! events into drag, double-click and hover operations on the view.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use crate::config::ViewConfig;

use super::fetch::HttpDataSource;
use super::layout::ForceLayout;
use super::render;
use super::scene::Hit;
use super::theme::Theme;
use super::types::{CanvasSize, Position};
use super::view::{GraphView, LoadOutcome, load};

/// Pointer state between mouse events.
#[derive(Default)]
struct Pointer {
	/// Last pointer position seen while dragging.
	last: Position,
	/// Element under the pointer and where the pointer is.
	hover: Option<(Hit, Position)>,
}

/// Size the canvas to its container (or the explicit / fallback size) and
/// report the result.
fn measure(
	canvas: &HtmlCanvasElement,
	width: Option<f64>,
	height: Option<f64>,
	fallback: CanvasSize,
) -> CanvasSize {
	let parent = canvas.parent_element();
	let w = width.unwrap_or_else(|| {
		parent
			.as_ref()
			.map(|p| p.client_width() as f64)
			.filter(|w| *w > 0.0)
			.unwrap_or(fallback.width)
	});
	let h = height.unwrap_or_else(|| {
		parent
			.as_ref()
			.map(|p| p.client_height() as f64)
			.filter(|h| *h > 0.0)
			.unwrap_or(fallback.height)
	});
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	CanvasSize::new(w, h)
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Position> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Position::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders the traceroute graph for the identifiers in `ids`.
///
/// The canvas sizes itself to its parent container each time a dataset is
/// rendered; explicit `width`/`height` override the measurement.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] ids: Signal<Vec<String>>,
	#[prop(default = ViewConfig::default())] config: ViewConfig,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view = Rc::new(RefCell::new(GraphView::new(
		ForceLayout::new(config.simulation.clone()),
		config.pin_policy,
	)));
	let pointer = Rc::new(RefCell::new(Pointer::default()));
	let source = Rc::new(HttpDataSource::new(config.endpoint.clone()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let fallback = config.fallback_size();
	let (hit_radius, tolerance, dt) = (config.hit_radius, config.link_tolerance, config.frame_dt);

	// Animation loop, started once the canvas is mounted.
	let (view_anim, pointer_anim, animate_init, frame_init) =
		(view.clone(), pointer.clone(), animate.clone(), frame_id.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("graph: canvas has no 2d context");
			return;
		};
		let size = measure(&canvas, width, height, fallback);
		let theme = Theme::default();

		let (view_frame, pointer_frame, animate_inner, frame_inner) = (
			view_anim.clone(),
			pointer_anim.clone(),
			animate_init.clone(),
			frame_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut v = view_frame.borrow_mut();
				v.advance(dt);
				let size = v.canvas().unwrap_or(size);
				render::render(v.scene(), size, &ctx, &theme, pointer_frame.borrow().hover);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				frame_inner.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), animate_init.borrow().as_ref()) {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	// The frame closure holds itself; cancel the pending frame and drop it
	// when the component goes away.
	let loop_handle = StoredValue::new_local((animate.clone(), frame_id.clone()));
	on_cleanup(move || {
		loop_handle.update_value(|(animate, frame_id)| {
			if let (Some(window), Some(id)) = (web_sys::window(), frame_id.take()) {
				let _ = window.cancel_animation_frame(id);
			}
			animate.borrow_mut().take();
		});
	});

	// Fetch and render whenever the identifier set changes.
	let view_load = view.clone();
	Effect::new(move |_| {
		let ids = ids.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (view, source) = (view_load.clone(), source.clone());
		spawn_local(async move {
			let outcome = load(&view, source.as_ref(), &ids, move || {
				measure(&canvas, width, height, fallback)
			})
			.await;
			if outcome != LoadOutcome::Stale {
				debug!("graph: load of {} identifiers finished: {outcome:?}", ids.len());
			}
		});
	});

	let (view_md, pointer_md) = (view.clone(), pointer.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut v = view_md.borrow_mut();
		if let Some(Hit::Node(i)) = v.hit_test(p, hit_radius, tolerance) {
			ev.prevent_default();
			if v.on_drag_start(i) {
				pointer_md.borrow_mut().last = p;
			}
		}
	};

	let (view_mm, pointer_mm) = (view.clone(), pointer.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut v = view_mm.borrow_mut();
		let mut pointer = pointer_mm.borrow_mut();
		if let Some(i) = v.dragging() {
			v.on_drag_move(i, p.x - pointer.last.x, p.y - pointer.last.y);
			pointer.last = p;
			pointer.hover = Some((Hit::Node(i), p));
		} else {
			pointer.hover = v.hit_test(p, hit_radius, tolerance).map(|hit| (hit, p));
		}
	};

	let view_mu = view.clone();
	let on_mouseup = move |_: MouseEvent| {
		let mut v = view_mu.borrow_mut();
		if let Some(i) = v.dragging() {
			v.on_drag_end(i);
		}
	};

	let (view_ml, pointer_ml) = (view.clone(), pointer.clone());
	let on_mouseleave = move |_: MouseEvent| {
		let mut v = view_ml.borrow_mut();
		if let Some(i) = v.dragging() {
			v.on_drag_end(i);
		}
		pointer_ml.borrow_mut().hover = None;
	};

	let view_dc = view.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(p) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut v = view_dc.borrow_mut();
		if let Some(Hit::Node(i)) = v.hit_test(p, hit_radius, tolerance) {
			v.on_double_click(i);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
