pub mod loading;
pub mod mind_map;
pub mod summary_panel;
pub mod topic_form;

use leptos::prelude::*;

use crate::store::{Action, AppState};

/// Run `action` through the reducer and store the result.
pub fn dispatch(state: RwSignal<AppState>, action: Action) {
	state.update(|s| {
		let current = std::mem::take(s);
		*s = current.reduce(action);
	});
}
