use leptos::prelude::*;

#[component]
pub fn Loading(#[prop(into)] topic: Signal<String>) -> impl IntoView {
	view! {
		<div class="loading">
			<div class="spinner"></div>
			<p>"Gerando mapa mental sobre " <strong>{move || topic.get()}</strong> "…"</p>
		</div>
	}
}
