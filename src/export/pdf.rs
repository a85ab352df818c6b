use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use log::debug;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};

use super::ExportError;
use super::text::{text_width, win_ansi, wrap};
use crate::mindmap::MindMapNode;

// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 50.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 20.0;
const TITLE_MAX_LINES: usize = 3;
const HEADING_SIZE: f32 = 15.0;
const BODY_SIZE: f32 = 11.0;
const LEADING: f32 = 1.4;
const BULLET_INDENT: f32 = 14.0;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");
const DIAGRAM: Name<'static> = Name(b"Im1");

/// RGBA pixels captured from the diagram canvas.
#[derive(Clone, Debug)]
pub struct Raster {
	pub width: u32,
	pub height: u32,
	pub rgba: Vec<u8>,
}

impl Raster {
	pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ExportError> {
		let expected = width as usize * height as usize * 4;
		if width == 0 || height == 0 || rgba.len() != expected {
			return Err(ExportError::Raster(format!(
				"{width}x{height} image with {} bytes (expected {expected})",
				rgba.len()
			)));
		}
		Ok(Self {
			width,
			height,
			rgba,
		})
	}

	/// Drop alpha, compositing over white.
	fn to_rgb(&self) -> Vec<u8> {
		let mut rgb = Vec::with_capacity(self.rgba.len() / 4 * 3);
		for px in self.rgba.chunks_exact(4) {
			let a = px[3] as u16;
			for &c in &px[..3] {
				rgb.push(((c as u16 * a + 255 * (255 - a)) / 255) as u8);
			}
		}
		rgb
	}
}

/// Everything that goes into the exported file.
pub struct ExportDocument<'a> {
	pub topic: &'a str,
	pub summary: &'a str,
	pub nodes: &'a [MindMapNode],
	pub diagram: Option<&'a Raster>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Font {
	Regular,
	Bold,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
	Text {
		x: f32,
		y: f32,
		size: f32,
		font: Font,
		text: String,
	},
	Image {
		x: f32,
		y: f32,
		width: f32,
		height: f32,
	},
}

/// Laid-out page contents, origin bottom-left.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageLayout {
	pub ops: Vec<Op>,
}

struct Layout {
	pages: Vec<PageLayout>,
	y: f32,
}

impl Layout {
	fn new() -> Self {
		Self {
			pages: vec![PageLayout::default()],
			y: PAGE_HEIGHT - MARGIN,
		}
	}

	fn new_page(&mut self) {
		self.pages.push(PageLayout::default());
		self.y = PAGE_HEIGHT - MARGIN;
	}

	fn push(&mut self, op: Op) {
		if let Some(page) = self.pages.last_mut() {
			page.ops.push(op);
		}
	}

	fn line(&mut self, x: f32, size: f32, font: Font, text: String) {
		let height = size * LEADING;
		if self.y - height < MARGIN {
			self.new_page();
		}
		self.y -= height;
		self.push(Op::Text {
			x,
			y: self.y,
			size,
			font,
			text,
		});
	}

	fn block(&mut self, text: &str, size: f32, font: Font) {
		for line in wrap(text, size, CONTENT_WIDTH) {
			self.line(MARGIN, size, font, line);
		}
	}

	/// Title lines, cut to [`TITLE_MAX_LINES`] so the diagram stays on the first page.
	fn title(&mut self, text: &str) {
		let mut lines = wrap(text, TITLE_SIZE, CONTENT_WIDTH);
		if lines.len() > TITLE_MAX_LINES {
			lines.truncate(TITLE_MAX_LINES);
			if let Some(last) = lines.last_mut() {
				while !last.is_empty() && text_width(&format!("{last}…"), TITLE_SIZE) > CONTENT_WIDTH {
					last.pop();
				}
				let kept = last.trim_end().len();
				last.truncate(kept);
				last.push('…');
			}
		}
		for line in lines {
			self.line(MARGIN, TITLE_SIZE, Font::Bold, line);
		}
	}

	fn bullet(&mut self, text: &str) {
		let lines = wrap(text, BODY_SIZE, CONTENT_WIDTH - BULLET_INDENT);
		for (i, line) in lines.into_iter().enumerate() {
			if i == 0 {
				self.line(MARGIN, BODY_SIZE, Font::Regular, "•".into());
				self.y += BODY_SIZE * LEADING;
			}
			self.line(MARGIN + BULLET_INDENT, BODY_SIZE, Font::Regular, line);
		}
	}

	fn gap(&mut self, points: f32) {
		self.y -= points;
	}

	fn image(&mut self, raster: &Raster) {
		let available = self.y - MARGIN;
		let aspect = raster.height as f32 / raster.width as f32;
		let (mut width, mut height) = (CONTENT_WIDTH, CONTENT_WIDTH * aspect);
		if height > available {
			height = available.max(0.0);
			width = height / aspect;
		}
		self.y -= height;
		self.push(Op::Image {
			x: MARGIN + (CONTENT_WIDTH - width) / 2.0,
			y: self.y,
			width,
			height,
		});
	}
}

/// Place the title and diagram on page one, summary and topic list from page two.
pub fn layout(doc: &ExportDocument) -> Vec<PageLayout> {
	let mut layout = Layout::new();
	let title = if doc.topic.trim().is_empty() {
		"Mapa Mental"
	} else {
		doc.topic.trim()
	};
	layout.title(title);
	layout.gap(16.0);
	if let Some(raster) = doc.diagram {
		layout.image(raster);
	}

	layout.new_page();
	layout.block("Resumo", HEADING_SIZE, Font::Bold);
	layout.gap(4.0);
	layout.block(doc.summary, BODY_SIZE, Font::Regular);
	layout.gap(18.0);
	layout.block("Tópicos", HEADING_SIZE, Font::Bold);
	layout.gap(4.0);
	for node in doc.nodes {
		let item = if node.data.descricao.trim().is_empty() {
			node.data.label.clone()
		} else {
			format!("{}: {}", node.data.label, node.data.descricao)
		};
		layout.bullet(&item);
		layout.gap(2.0);
	}
	layout.pages
}

/// Assemble the PDF file for `doc`.
pub fn build_pdf(doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
	let pages = layout(doc);

	let mut alloc = Ref::new(1);
	let catalog_id = alloc.bump();
	let tree_id = alloc.bump();
	let regular_id = alloc.bump();
	let bold_id = alloc.bump();
	let image_id = alloc.bump();
	let page_ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc.bump(), alloc.bump())).collect();

	let mut pdf = Pdf::new();
	pdf.catalog(catalog_id).pages(tree_id);
	pdf.pages(tree_id)
		.kids(page_ids.iter().map(|&(page, _)| page))
		.count(page_ids.len() as i32);
	pdf.type1_font(regular_id)
		.base_font(Name(b"Helvetica"))
		.encoding_predefined(Name(b"WinAnsiEncoding"));
	pdf.type1_font(bold_id)
		.base_font(Name(b"Helvetica-Bold"))
		.encoding_predefined(Name(b"WinAnsiEncoding"));

	if let Some(raster) = doc.diagram {
		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(&raster.to_rgb())?;
		let compressed = encoder.finish()?;
		debug!(
			"diagram {}x{} compressed to {} bytes",
			raster.width,
			raster.height,
			compressed.len()
		);
		let mut image = pdf.image_xobject(image_id, &compressed);
		image.filter(Filter::FlateDecode);
		image.width(raster.width as i32);
		image.height(raster.height as i32);
		image.color_space().device_rgb();
		image.bits_per_component(8);
		image.finish();
	}

	for (page_layout, &(page_id, content_id)) in pages.iter().zip(&page_ids) {
		let mut page = pdf.page(page_id);
		page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
		page.parent(tree_id);
		page.contents(content_id);
		{
			let mut resources = page.resources();
			resources.fonts().pair(REGULAR, regular_id).pair(BOLD, bold_id);
			if doc.diagram.is_some() {
				resources.x_objects().pair(DIAGRAM, image_id);
			}
		}
		page.finish();

		let content = page_content(page_layout);
		pdf.stream(content_id, &content);
	}

	Ok(pdf.finish())
}

fn page_content(layout: &PageLayout) -> Vec<u8> {
	let mut content = Content::new();
	for op in &layout.ops {
		match op {
			Op::Text {
				x,
				y,
				size,
				font,
				text,
			} => {
				let name = match font {
					Font::Regular => REGULAR,
					Font::Bold => BOLD,
				};
				content.begin_text();
				content.set_font(name, *size);
				content.set_text_matrix([1.0, 0.0, 0.0, 1.0, *x, *y]);
				content.show(Str(&win_ansi(text)));
				content.end_text();
			}
			Op::Image {
				x,
				y,
				width,
				height,
			} => {
				content.save_state();
				content.transform([*width, 0.0, 0.0, *height, *x, *y]);
				content.x_object(DIAGRAM);
				content.restore_state();
			}
		}
	}
	content.finish().to_vec()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mindmap::normalize;

	fn widest(pages: &[PageLayout]) -> f32 {
		pages
			.iter()
			.flat_map(|p| &p.ops)
			.filter_map(|op| match op {
				Op::Text { x, size, text, .. } => Some(x + text_width(text, *size)),
				Op::Image { .. } => None,
			})
			.fold(0.0, f32::max)
	}

	fn nodes(count: usize) -> Vec<MindMapNode> {
		let items: Vec<String> = (1..=count)
			.map(|i| {
				format!(
					r#"{{"id": "{i}", "position": {{"x": {i}, "y": 0}}, "data": {{"label": "Tópico {i}", "descricao": "Uma descrição razoavelmente longa para o tópico número {i}, que deve quebrar em mais de uma linha no PDF."}}}}"#
				)
			})
			.collect();
		let raw = format!(r#"{{"mapa": {{"nodes": [{}], "edges": []}}}}"#, items.join(","));
		normalize(&raw).unwrap().nodes
	}

	#[test]
	fn raster_size_is_checked() {
		assert!(Raster::new(2, 2, vec![0; 16]).is_ok());
		assert!(matches!(Raster::new(2, 2, vec![0; 15]), Err(ExportError::Raster(_))));
		assert!(Raster::new(0, 2, Vec::new()).is_err());
	}

	#[test]
	fn transparent_pixels_become_white() {
		let raster = Raster::new(2, 1, vec![10, 20, 30, 255, 0, 0, 0, 0]).unwrap();
		assert_eq!(raster.to_rgb(), vec![10, 20, 30, 255, 255, 255]);
	}

	#[test]
	fn title_and_diagram_on_first_page_text_after() {
		let raster = Raster::new(4, 2, vec![255; 32]).unwrap();
		let nodes = nodes(3);
		let pages = layout(&ExportDocument {
			topic: "Sistema Solar",
			summary: "Resumo curto.",
			nodes: &nodes,
			diagram: Some(&raster),
		});
		assert_eq!(pages.len(), 2);
		let first = &pages[0].ops;
		assert!(matches!(&first[0], Op::Text { text, .. } if text == "Sistema Solar"));
		let image = first.iter().find_map(|op| match op {
			Op::Image { width, height, .. } => Some((*width, *height)),
			_ => None,
		});
		let (width, height) = image.unwrap();
		assert_eq!(width, CONTENT_WIDTH);
		assert_eq!(height, CONTENT_WIDTH / 2.0);
		assert!(pages[1].ops.iter().any(|op| matches!(op, Op::Text { text, .. } if text == "Resumo curto.")));
	}

	#[test]
	fn long_title_keeps_diagram_on_first_page() {
		let raster = Raster::new(4, 2, vec![255; 32]).unwrap();
		let topic = "um tema realmente muito comprido ".repeat(40);
		let pages = layout(&ExportDocument {
			topic: &topic,
			summary: "s",
			nodes: &[],
			diagram: Some(&raster),
		});
		assert_eq!(pages.len(), 2);
		let first = &pages[0].ops;
		let titles: Vec<&String> = first
			.iter()
			.filter_map(|op| match op {
				Op::Text { text, .. } => Some(text),
				Op::Image { .. } => None,
			})
			.collect();
		assert_eq!(titles.len(), TITLE_MAX_LINES);
		assert!(titles[TITLE_MAX_LINES - 1].ends_with('…'));
		assert!(first.iter().any(|op| matches!(op, Op::Image { .. })));
		assert!(widest(&pages) <= MARGIN + CONTENT_WIDTH);
		assert!(pages[1].ops.iter().any(|op| matches!(op, Op::Text { text, .. } if text == "Resumo")));
	}

	#[test]
	fn tall_diagram_is_scaled_to_fit_page() {
		let raster = Raster::new(1, 10, vec![0; 40]).unwrap();
		let pages = layout(&ExportDocument {
			topic: "t",
			summary: "s",
			nodes: &[],
			diagram: Some(&raster),
		});
		for op in &pages[0].ops {
			if let Op::Image { y, height, width, .. } = op {
				assert!(*y >= MARGIN - 0.01);
				assert!(*height <= PAGE_HEIGHT - 2.0 * MARGIN);
				assert!(*width < CONTENT_WIDTH);
			}
		}
	}

	#[test]
	fn long_topic_list_flows_onto_more_pages() {
		let nodes = nodes(60);
		let pages = layout(&ExportDocument {
			topic: "t",
			summary: "s",
			nodes: &nodes,
			diagram: None,
		});
		assert!(pages.len() > 2);
		assert!(widest(&pages) <= MARGIN + CONTENT_WIDTH);
		for page in &pages {
			for op in &page.ops {
				if let Op::Text { y, .. } = op {
					assert!(*y >= MARGIN);
				}
			}
		}
	}

	#[test]
	fn builds_a_pdf_file() {
		let raster = Raster::new(2, 2, vec![128; 16]).unwrap();
		let nodes = nodes(2);
		let bytes = build_pdf(&ExportDocument {
			topic: "Água",
			summary: "s",
			nodes: &nodes,
			diagram: Some(&raster),
		})
		.unwrap();
		assert!(bytes.starts_with(b"%PDF-"));
		let tail = String::from_utf8_lossy(&bytes[bytes.len() - 16..]).into_owned();
		assert!(tail.contains("%%EOF"));
	}
}
