//! Retrieval of graph datasets from the pathspider command service.

use async_trait::async_trait;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::error::{Result, ViewError};

use super::types::GraphDataset;

/// Path of the graph command relative to the service endpoint.
pub const GRAPH_PATH: &str = "/command/graph";

/// Asynchronous source of graph datasets keyed by target identifiers.
#[async_trait(?Send)]
pub trait DataSource {
	/// Fetch and validate the graph connecting the probes to `ids`.
	async fn fetch_graph(&self, ids: &[String]) -> Result<GraphDataset>;
}

/// Characters `encodeURIComponent` leaves alone but `urlencoding` escapes.
const UNRESERVED_MARKS: [(&str, &str); 5] =
	[("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")];

/// Percent-encode a query component the way `encodeURIComponent` does.
fn encode_component(value: &str) -> String {
	UNRESERVED_MARKS
		.iter()
		.fold(urlencoding::encode(value).into_owned(), |acc, (escaped, mark)| {
			acc.replace(escaped, mark)
		})
}

/// Percent-encode `key=value` for every value and join with `&`.
pub fn encode_key_values(key: &str, values: &[String]) -> String {
	let key = encode_component(key);
	values
		.iter()
		.map(|v| format!("{key}={}", encode_component(v)))
		.collect::<Vec<_>>()
		.join("&")
}

/// Full URL of the graph command for `ids`.
pub fn graph_url(endpoint: &str, ids: &[String]) -> String {
	format!(
		"{}{}?{}",
		endpoint.trim_end_matches('/'),
		GRAPH_PATH,
		encode_key_values("ip", ids)
	)
}

/// [`DataSource`] using the browser `fetch` API.
#[derive(Clone, Debug)]
pub struct HttpDataSource {
	endpoint: String,
}

impl HttpDataSource {
	/// Source for the service at `endpoint`, e.g. `http://localhost:37100`.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
		}
	}

	/// Base URL requests are sent to.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

fn js_error(context: &str, value: wasm_bindgen::JsValue) -> ViewError {
	ViewError::Fetch(format!("{context}: {value:?}"))
}

#[async_trait(?Send)]
impl DataSource for HttpDataSource {
	async fn fetch_graph(&self, ids: &[String]) -> Result<GraphDataset> {
		let url = graph_url(&self.endpoint, ids);
		debug!("graph: GET {url}");

		let window = web_sys::window().ok_or_else(|| ViewError::Fetch("no window".into()))?;
		let response = JsFuture::from(window.fetch_with_str(&url))
			.await
			.map_err(|e| js_error("request failed", e))?;
		let response: Response = response
			.dyn_into()
			.map_err(|e| js_error("unexpected fetch result", e))?;
		if !response.ok() {
			return Err(ViewError::Status(response.status()));
		}

		let body = response.text().map_err(|e| js_error("unreadable body", e))?;
		let text = JsFuture::from(body)
			.await
			.map_err(|e| js_error("unreadable body", e))?
			.as_string()
			.ok_or_else(|| ViewError::Fetch("body is not text".into()))?;

		GraphDataset::from_json(&text)
	}
}
