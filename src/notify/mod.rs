// src/notify/mod.rs
pub mod discord;
pub mod log;
pub mod slack;

use anyhow::Result;

use crate::config::{BotConfig, NotifierKind};
use crate::matcher::MatchResult;

pub use discord::DiscordNotifier;
pub use log::LogNotifier;
pub use slack::SlackNotifier;

/// What a single job alert says. Built from a [`MatchResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobAlert {
    pub posting_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub matched: Vec<String>, // keywords that triggered the alert
}

impl JobAlert {
    pub fn from_match(m: &MatchResult) -> Self {
        let p = &m.posting;
        Self {
            posting_id: p.id.clone(),
            title: display_text(&p.title),
            company: display_text(&p.company_name),
            location: display_text(&p.location_name),
            url: p.url.trim().to_string(),
            matched: m.matched.clone(),
        }
    }

    pub fn matched_str(&self) -> String {
        if self.matched.is_empty() {
            "—".to_string()
        } else {
            self.matched.join(", ")
        }
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert. `Ok` means the destination accepted it.
    async fn send(&self, alert: &JobAlert) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Pick the notifier the configuration asks for.
pub fn from_config(cfg: &BotConfig) -> Box<dyn Notifier> {
    match &cfg.notifier {
        NotifierKind::Discord { webhook } => Box::new(DiscordNotifier::new(webhook.clone())),
        NotifierKind::Slack { webhook } => Box::new(SlackNotifier::new(webhook.clone())),
        NotifierKind::Log => Box::new(LogNotifier),
    }
}

/// Decode HTML entities and collapse whitespace; provider text often has both.
pub fn display_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "—".to_string()
    } else {
        collapsed
    }
}

/// Cut `s` to at most `max` chars, marking the cut with an ellipsis.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
