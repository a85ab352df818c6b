use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use super::dispatch;
use crate::store::{Action, AppState, Screen};

#[component]
pub fn TopicForm(state: RwSignal<AppState>, #[prop(into)] on_generate: Callback<()>) -> impl IntoView {
	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		on_generate.run(());
	};

	view! {
		<form class="topic-form" on:submit=on_submit>
			<h1>"Mapa Mental com IA"</h1>
			<p class="subtitle">"Digite um tema e gere um mapa mental interativo com resumo."</p>
			<input
				type="text"
				placeholder="Ex.: Revolução Industrial"
				prop:value=move || state.with(|s| s.topic.clone())
				on:input=move |ev| dispatch(state, Action::SetTopic(event_target_value(&ev)))
			/>
			<button type="submit" disabled=move || state.with(|s| s.screen != Screen::Home)>
				"Gerar mapa mental"
			</button>
		</form>
	}
}
