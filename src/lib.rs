//! pathspider-view: Interactive traceroute topology and path-state charts for
//! pathspider.
//!
//! This crate provides WASM-based views over a running pathspider command
//! service: a force-directed graph of the traced paths towards a set of
//! target addresses, and a donut chart of measurement outcomes per state.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;
pub mod error;

pub use components::force_graph::{ForceGraphCanvas, GraphDataset, GraphView, PinPolicy};
pub use components::pie_chart::{PieChart, PieView, ProbeState};
pub use config::ViewConfig;
pub use error::{InvalidDatasetError, ViewError};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("pathspider-view: logging initialized");
}

/// Text of the `<script>` element with the given id, if the page has one.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load configuration overrides from a script element with id="view-config".
/// Falls back to defaults when the element is absent or malformed.
pub fn load_config() -> ViewConfig {
	let Some(text) = script_text("view-config") else {
		return ViewConfig::default();
	};
	match ViewConfig::from_json(&text) {
		Ok(config) => {
			info!("pathspider-view: using endpoint {}", config.endpoint);
			config
		}
		Err(e) => {
			warn!("pathspider-view: failed to parse view config: {}", e);
			ViewConfig::default()
		}
	}
}

/// One `[category, value]` entry of the state counts.
#[derive(Deserialize)]
struct StateCount(String, f64);

/// Parse a JSON array of `[category, value]` pairs.
pub fn parse_state_counts(text: &str) -> Result<Vec<(String, f64)>, serde_json::Error> {
	let counts: Vec<StateCount> = serde_json::from_str(text)?;
	Ok(counts.into_iter().map(|StateCount(c, v)| (c, v)).collect())
}

/// Load state counts from a script element with id="state-counts".
fn load_state_counts() -> Vec<(String, f64)> {
	let Some(text) = script_text("state-counts") else {
		return Vec::new();
	};
	match parse_state_counts(&text) {
		Ok(counts) => {
			info!("pathspider-view: loaded {} state counts", counts.len());
			counts
		}
		Err(e) => {
			warn!("pathspider-view: failed to parse state counts: {}", e);
			Vec::new()
		}
	}
}

/// Every `ip` value of a URL query string such as `?ip=a&ip=b`, decoded.
pub fn ips_from_query(search: &str) -> Vec<String> {
	search
		.trim_start_matches('?')
		.split('&')
		.filter_map(|pair| pair.split_once('='))
		.filter(|(key, _)| *key == "ip")
		.filter_map(|(_, value)| {
			let value = value.replace('+', " ");
			urlencoding::decode(&value).ok().map(|v| v.trim().to_string())
		})
		.filter(|v| !v.is_empty())
		.collect()
}

/// Split free text into identifiers on commas and whitespace.
pub fn parse_ids(text: &str) -> Vec<String> {
	text.split(|c: char| c == ',' || c.is_whitespace())
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

fn initial_ids() -> Vec<String> {
	web_sys::window()
		.and_then(|w| w.location().search().ok())
		.map(|search| ips_from_query(&search))
		.unwrap_or_default()
}

/// Main application component.
/// Shows the path graph for the addresses in the page URL, with a text box to
/// change them, next to the chart of measurement states.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let (ids, set_ids) = signal(initial_ids());
	let draft = RwSignal::new(ids.get_untracked().join(", "));
	let counts = load_state_counts();
	let counts_signal = Signal::derive(move || counts.clone());

	let reload = move |_| {
		let next = parse_ids(&draft.get_untracked());
		info!("pathspider-view: loading {} addresses", next.len());
		set_ids.set(next);
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="pathspider" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="pathspider">
			<form class="address-bar" on:submit=move |ev| ev.prevent_default()>
				<input
					type="text"
					placeholder="192.0.2.1, 198.51.100.7"
					prop:value=move || draft.get()
					on:input=move |ev| draft.set(event_target_value(&ev))
				/>
				<button type="submit" on:click=reload>"Load"</button>
			</form>
			<div class="graph-panel">
				<ForceGraphCanvas ids=ids config=config />
			</div>
			<div class="state-panel">
				<PieChart data=counts_signal />
			</div>
		</div>
	}
}
