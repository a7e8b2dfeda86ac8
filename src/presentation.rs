//! Turns transcript messages into view entries for the templates.

use serde::Serialize;

use crate::chart::BarChart;
use crate::feed::{self, FeedPayload};
use crate::message::{Content, Message, Role};
use crate::pipeline::Accumulate;
use crate::session::Transcript;

pub const NO_DATA: &str = "No data available.";
pub const NO_ASTEROIDS: &str = "No asteroid data available.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    UserText { text: String },
    AssistantText { text: String },
    AssistantError { error: String },
    FeedError { error: String },
    NoData { notice: &'static str },
    Chart { chart: BarChart },
}

impl Entry {
    pub fn is_user(&self) -> bool {
        matches!(self, Entry::UserText { .. })
    }
}

pub fn render_feed(payload: &FeedPayload) -> Entry {
    if let Some(error) = payload.error_message() {
        return Entry::FeedError {
            error: format!("Error fetching NASA data: {error}"),
        };
    }
    if !payload.has_near_earth_objects() {
        return Entry::NoData { notice: NO_DATA };
    }
    let asteroids = feed::shape(payload);
    if asteroids.is_empty() {
        Entry::NoData { notice: NO_ASTEROIDS }
    } else {
        Entry::Chart {
            chart: BarChart::from_asteroids(&asteroids),
        }
    }
}

pub fn render_entry(message: &Message) -> Entry {
    match (&message.role, &message.content) {
        (_, Content::Feed(payload)) => render_feed(payload),
        (_, Content::Failed(reason)) => Entry::AssistantError {
            error: format!("An error occurred: {reason}"),
        },
        (Role::User, Content::Text(text)) => Entry::UserText { text: text.clone() },
        (_, Content::Text(text)) => Entry::AssistantText { text: text.clone() },
    }
}

pub fn render_messages(messages: &[Message]) -> Vec<Entry> {
    messages.iter().map(render_entry).collect()
}

/// Text-only history line for the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryLine {
    pub speaker: &'static str,
    pub text: String,
}

pub fn history(messages: &[Message]) -> Vec<HistoryLine> {
    messages
        .iter()
        .filter_map(|m| {
            let speaker = match m.role {
                Role::User => "🧑 You",
                Role::Assistant => "🤖 AI",
                Role::FeedData => return None,
            };
            Some(HistoryLine {
                speaker,
                text: m.text()?.to_string(),
            })
        })
        .collect()
}

/// Everything a page render needs from a session.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub layout: &'static str,
    pub entries: Vec<Entry>,
    pub history: Vec<HistoryLine>,
}

/// Chat layout shows every entry; form layout shows only the latest run and
/// lists earlier turns in the sidebar.
pub fn page_view(transcript: &Transcript, accumulate: Accumulate) -> PageView {
    match accumulate {
        Accumulate::Append => PageView {
            layout: "chat",
            entries: render_messages(transcript.messages()),
            history: Vec::new(),
        },
        Accumulate::Replace => {
            let last_run = transcript.last_run();
            let earlier = &transcript.messages()[..transcript.len() - last_run.len()];
            PageView {
                layout: "form",
                entries: render_messages(last_run)
                    .into_iter()
                    .filter(|entry| !entry.is_user())
                    .collect(),
                history: history(earlier),
            }
        }
    }
}
