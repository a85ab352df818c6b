use leptos::prelude::*;

/// 404 - Not Found
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Página não encontrada"</h1>
			<a href="/">"Voltar ao início"</a>
		</div>
	}
}
