use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::ExportError;
use super::pdf::Raster;

/// Capture the current pixels of a 2D canvas.
pub fn rasterize(canvas: &HtmlCanvasElement) -> Result<Raster, ExportError> {
	let (width, height) = (canvas.width(), canvas.height());
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|e| ExportError::Raster(format!("{e:?}")))?
		.ok_or(ExportError::CanvasUnavailable)?
		.dyn_into()
		.map_err(|_| ExportError::CanvasUnavailable)?;
	let image = ctx
		.get_image_data(0.0, 0.0, width as f64, height as f64)
		.map_err(|e| ExportError::Raster(format!("{e:?}")))?;
	debug!("rasterized canvas {width}x{height}");
	Raster::new(width, height, image.data().0)
}
