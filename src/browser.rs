//! Small wrappers over browser APIs.

use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

fn describe(value: JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Show a blocking alert. Outside a browser the message is only logged.
pub fn alert(message: &str) {
	match web_sys::window() {
		Some(window) => {
			if let Err(e) = window.alert_with_message(message) {
				warn!("alert failed: {}", describe(e));
			}
		}
		None => warn!("alert without window: {message}"),
	}
}

/// Save `bytes` as `file_name` through a temporary object URL.
pub fn download(bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), String> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or("no document")?;

	let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
	let options = BlobPropertyBag::new();
	options.set_type(mime_type);
	let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(describe)?;
	let url = Url::create_object_url_with_blob(&blob).map_err(describe)?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(describe)?
		.dyn_into()
		.map_err(|_| "not an anchor element")?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();

	Url::revoke_object_url(&url).map_err(describe)
}
