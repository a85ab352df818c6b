//! PDF export of a generated mind map.

mod pdf;
mod raster;
mod text;

use log::info;
use thiserror::Error;
use web_sys::HtmlCanvasElement;

use crate::browser;
use crate::mindmap::MindMapNode;

pub use pdf::{
	CONTENT_WIDTH, ExportDocument, Font, MARGIN, Op, PAGE_HEIGHT, PAGE_WIDTH, PageLayout, Raster,
	build_pdf, layout,
};
pub use raster::rasterize;
pub use text::{slug, wrap};

const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("diagram canvas is not available")]
	CanvasUnavailable,

	#[error("could not read the diagram pixels: {0}")]
	Raster(String),

	#[error("could not compress the diagram image: {0}")]
	Compress(#[from] std::io::Error),

	#[error("could not save the file: {0}")]
	Download(String),
}

/// Download name for a map about `topic`.
pub fn file_name(topic: &str) -> String {
	match slug(topic) {
		s if s.is_empty() => "mapa-mental.pdf".to_string(),
		s => format!("mapa-mental-{s}.pdf"),
	}
}

/// Rasterize `canvas`, build the PDF and hand it to the browser. Returns the file name.
pub fn export_canvas(
	canvas: &HtmlCanvasElement,
	topic: &str,
	summary: &str,
	nodes: &[MindMapNode],
) -> Result<String, ExportError> {
	let raster = rasterize(canvas)?;
	let bytes = build_pdf(&ExportDocument {
		topic,
		summary,
		nodes,
		diagram: Some(&raster),
	})?;
	let name = file_name(topic);
	browser::download(&bytes, &name, PDF_MIME_TYPE).map_err(ExportError::Download)?;
	info!("exported {name} ({} bytes)", bytes.len());
	Ok(name)
}
