//! Implementation scaffolding for a designed loyalty program.

use super::{event_slug, render};
use crate::domain::EventDefinition;

const DISCORD_BOT: &str = include_str!("../../templates/program/discord_bot.ts");
const TELEGRAM_BOT: &str = include_str!("../../templates/program/telegram_bot.ts");
const WEB_SDK: &str = include_str!("../../templates/program/web_sdk.html");
const WEBHOOK_HANDLER: &str = include_str!("../../templates/program/webhook_handler.ts");

/// What the program templates need to know.
#[derive(Debug, Clone, Copy)]
pub struct ProgramTemplate<'a> {
    pub name: &'a str,
    pub events: &'a [EventDefinition],
    /// Manual event URL the generated code posts to.
    pub endpoint: &'a str,
}

impl ProgramTemplate<'_> {
    fn primary_event(&self) -> String {
        self.events
            .first()
            .map(|e| {
                e.event_type
                    .clone()
                    .unwrap_or_else(|| event_slug(&e.name))
            })
            .unwrap_or_else(|| "daily_checkin".to_string())
    }

    fn event_comments(&self, indent: &str) -> String {
        if self.events.is_empty() {
            return format!("{}// (no events generated)", indent);
        }
        self.events
            .iter()
            .map(|e| {
                format!(
                    "{}// {} ({} LTZ): {}",
                    indent, e.name, e.default_reward, e.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(&self, template: &str, indent: &str) -> String {
        render(
            template,
            &[
                ("program_name", self.name),
                ("endpoint", self.endpoint),
                ("primary_event", &self.primary_event()),
                ("event_comments", &self.event_comments(indent)),
            ],
        )
    }
}

/// TypeScript discord.js bot with a vitest suite.
pub fn discord_bot(program: &ProgramTemplate<'_>) -> String {
    program.render(DISCORD_BOT, "")
}

/// TypeScript Telegraf bot.
pub fn telegram_bot(program: &ProgramTemplate<'_>) -> String {
    program.render(TELEGRAM_BOT, "")
}

/// Browser SDK snippet.
pub fn web_sdk(program: &ProgramTemplate<'_>) -> String {
    program.render(WEB_SDK, "  ")
}

/// Express receiver that verifies signatures and forwards events.
pub fn webhook_handler(program: &ProgramTemplate<'_>) -> String {
    program.render(WEBHOOK_HANDLER, "")
}
