use mapa_mental::export::{
	CONTENT_WIDTH, ExportDocument, MARGIN, Op, Raster, build_pdf, file_name, layout, wrap,
};
use mapa_mental::mindmap::normalize;

fn sample_nodes() -> Vec<mapa_mental::mindmap::MindMapNode> {
	normalize(
		r#"{"mapa": {"nodes": [
			{"id": "1", "position": {"x": 0, "y": 0}, "data": {"label": "Água", "descricao": "Substância essencial à vida"}},
			{"id": "2", "position": {"x": 100, "y": 0}, "data": {"label": "Ciclo", "descricao": ""}}
		], "edges": []}, "resumo": "A água cobre a maior parte da superfície da Terra."}"#,
	)
	.unwrap()
	.nodes
}

#[test]
fn second_page_lists_summary_then_topics() {
	let nodes = sample_nodes();
	let pages = layout(&ExportDocument {
		topic: "Água",
		summary: "Resumo.",
		nodes: &nodes,
		diagram: None,
	});
	let texts: Vec<&str> = pages[1]
		.ops
		.iter()
		.filter_map(|op| match op {
			Op::Text { text, .. } => Some(text.as_str()),
			Op::Image { .. } => None,
		})
		.collect();
	let resumo = texts.iter().position(|t| *t == "Resumo").unwrap();
	let topicos = texts.iter().position(|t| *t == "Tópicos").unwrap();
	assert!(resumo < topicos);
	assert!(texts.contains(&"Água: Substância essencial à vida"));
	// Nodes without a description show only the label.
	assert!(texts.contains(&"Ciclo"));
}

#[test]
fn pdf_contains_diagram_and_text_pages() {
	let nodes = sample_nodes();
	let raster = Raster::new(3, 2, vec![200; 24]).unwrap();
	let bytes = build_pdf(&ExportDocument {
		topic: "Água",
		summary: "Resumo.",
		nodes: &nodes,
		diagram: Some(&raster),
	})
	.unwrap();
	assert!(bytes.starts_with(b"%PDF-"));
	let text = String::from_utf8_lossy(&bytes);
	assert!(text.contains("/Helvetica"));
	assert!(text.contains("/FlateDecode"));
}

#[test]
fn wrapped_summary_stays_inside_margins() {
	let summary = "palavra ".repeat(200);
	let lines = wrap(&summary, 11.0, CONTENT_WIDTH);
	assert!(lines.len() > 5);
	let pages = layout(&ExportDocument {
		topic: "t",
		summary: &summary,
		nodes: &[],
		diagram: None,
	});
	for op in pages.iter().flat_map(|p| &p.ops) {
		if let Op::Text { x, y, .. } = op {
			assert!(*x >= MARGIN);
			assert!(*y >= MARGIN);
		}
	}
}

#[test]
fn names_file_after_topic() {
	assert_eq!(file_name("Sistema Solar"), "mapa-mental-sistema-solar.pdf");
	assert_eq!(file_name("   "), "mapa-mental.pdf");
}
