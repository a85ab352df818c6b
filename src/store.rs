//! Application view state and its reducer.
//!
//! All UI state lives in one [`AppState`] value owned by the page. Every change goes
//! through [`AppState::reduce`], which is pure.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::mindmap::{MindMap, MindMapEdge, MindMapNode};

/// Which view is mounted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
	#[default]
	Home,
	Loading,
	Result,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
	pub topic: String,
	pub nodes: Vec<MindMapNode>,
	pub edges: Vec<MindMapEdge>,
	pub summary: String,
	pub screen: Screen,
	/// Diagram interaction lock.
	pub locked: bool,
	pub exporting: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	SetTopic(String),
	/// Start a generation request. Only honoured from [`Screen::Home`].
	Generate,
	Generated(MindMap),
	Failed,
	Reset,
	ToggleLock,
	ExportStarted,
	ExportFinished,
}

impl AppState {
	/// Apply `action`, returning the next state.
	pub fn reduce(self, action: Action) -> Self {
		debug!("{:?} <- {}", self.screen, action.name());
		match action {
			Action::SetTopic(topic) => Self { topic, ..self },
			Action::Generate if self.screen == Screen::Home => Self {
				screen: Screen::Loading,
				nodes: Vec::new(),
				edges: Vec::new(),
				summary: String::new(),
				..self
			},
			Action::Generated(map) if self.screen == Screen::Loading => Self {
				screen: Screen::Result,
				nodes: map.nodes,
				edges: map.edges,
				summary: map.summary,
				locked: false,
				..self
			},
			Action::Failed if self.screen == Screen::Loading => Self {
				screen: Screen::Home,
				nodes: Vec::new(),
				edges: Vec::new(),
				summary: String::new(),
				..self
			},
			Action::Reset => Self::default(),
			Action::ToggleLock => Self {
				locked: !self.locked,
				..self
			},
			Action::ExportStarted if self.screen == Screen::Result => Self {
				exporting: true,
				..self
			},
			Action::ExportFinished => Self {
				exporting: false,
				..self
			},
			// Out-of-order transitions (double submit, stale responses) are dropped.
			_ => self,
		}
	}

	/// Whether a new generation may be started.
	pub fn can_generate(&self) -> bool {
		self.screen == Screen::Home && !self.topic.trim().is_empty()
	}
}

impl Action {
	fn name(&self) -> &'static str {
		match self {
			Action::SetTopic(_) => "SetTopic",
			Action::Generate => "Generate",
			Action::Generated(_) => "Generated",
			Action::Failed => "Failed",
			Action::Reset => "Reset",
			Action::ToggleLock => "ToggleLock",
			Action::ExportStarted => "ExportStarted",
			Action::ExportFinished => "ExportFinished",
		}
	}
}
