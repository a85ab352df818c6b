use leptos::prelude::*;

use crate::store::AppState;

/// Summary text followed by every node's label and description.
#[component]
pub fn SummaryPanel(state: RwSignal<AppState>) -> impl IntoView {
	let items = move || {
		state.with(|s| {
			s.nodes
				.iter()
				.map(|node| {
					let (label, descricao) = (node.data.label.clone(), node.data.descricao.clone());
					view! {
						<li class:root=node.is_root()>
							<strong>{label}</strong>
							<span>{descricao}</span>
						</li>
					}
				})
				.collect_view()
		})
	};

	view! {
		<section class="summary-panel">
			<h3>"Resumo"</h3>
			<p>{move || state.with(|s| s.summary.clone())}</p>
			<h3>"Tópicos"</h3>
			<ul>{items}</ul>
		</section>
	}
}
