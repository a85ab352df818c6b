use leptos::ev::MouseEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};

use crate::browser::alert;
use crate::components::dispatch;
use crate::components::loading::Loading;
use crate::components::mind_map::MindMapCanvas;
use crate::components::summary_panel::SummaryPanel;
use crate::components::topic_form::TopicForm;
use crate::config::GeminiConfig;
use crate::export::export_canvas;
use crate::gemini::GeminiClient;
use crate::generate::{GenerateError, generate_mind_map};
use crate::store::{Action, AppState, Screen};

const DIAGRAM_HEIGHT: f64 = 560.0;

/// Single page: topic form, loading indicator, or the generated map.
#[component]
pub fn Home() -> impl IntoView {
	let state = RwSignal::new(AppState::default());
	let config = StoredValue::new(GeminiConfig::from_build_env());
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let screen = Memo::new(move |_| state.with(|s| s.screen));

	let on_generate = move |_: ()| {
		let snapshot = state.get_untracked();
		if snapshot.screen != Screen::Home {
			return;
		}
		if !snapshot.can_generate() {
			alert(GenerateError::MissingTopic.user_message());
			return;
		}
		let client = match GeminiClient::new(config.get_value()) {
			Ok(client) => client,
			Err(e) => {
				warn!("not generating: {e}");
				alert(e.user_message());
				return;
			}
		};

		let topic = snapshot.topic.trim().to_string();
		dispatch(state, Action::Generate);
		spawn_local(async move {
			match generate_mind_map(&client, &topic).await {
				Ok(map) => dispatch(state, Action::Generated(map)),
				Err(e) => {
					error!("generation failed: {e}");
					alert(e.user_message());
					dispatch(state, Action::Failed);
				}
			}
		});
	};

	let on_export = move |_: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			alert("O diagrama ainda não está pronto para exportação.");
			return;
		};
		dispatch(state, Action::ExportStarted);
		let result =
			state.with_untracked(|s| export_canvas(&canvas, &s.topic, &s.summary, &s.nodes));
		dispatch(state, Action::ExportFinished);
		match result {
			Ok(name) => info!("saved {name}"),
			Err(e) => {
				error!("export failed: {e}");
				alert("Erro ao exportar o PDF. Tente novamente.");
			}
		}
	};

	let result_view = move || {
		view! {
			<section class="result">
				<header class="result-header">
					<h2>{move || state.with(|s| s.topic.clone())}</h2>
					<div class="actions">
						<button on:click=move |_| dispatch(state, Action::ToggleLock)>
							{move || {
								if state.with(|s| s.locked) { "Desbloquear diagrama" } else { "Bloquear diagrama" }
							}}
						</button>
						<button on:click=on_export disabled=move || state.with(|s| s.exporting)>
							"Exportar PDF"
						</button>
						<button on:click=move |_| dispatch(state, Action::Reset)>"Novo mapa"</button>
					</div>
				</header>
				<div class="diagram-container">
					<MindMapCanvas
						nodes=Signal::derive(move || state.with(|s| s.nodes.clone()))
						edges=Signal::derive(move || state.with(|s| s.edges.clone()))
						locked=Signal::derive(move || state.with(|s| s.locked))
						canvas_ref=canvas_ref
						height=Some(DIAGRAM_HEIGHT)
					/>
				</div>
				<SummaryPanel state=state />
			</section>
		}
	};

	view! {
		<main class="app">
			{move || match screen.get() {
				Screen::Home => view! { <TopicForm state=state on_generate=on_generate /> }.into_any(),
				Screen::Loading => {
					view! { <Loading topic=Signal::derive(move || state.with(|s| s.topic.clone())) /> }
						.into_any()
				}
				Screen::Result => result_view().into_any(),
			}}
		</main>
	}
}
