//! Slash-command handling.

use tracing::{info, warn};

use crate::platform::CommandInvocation;

use super::{clamp, Handler};

pub const CMD_CLEAR_HISTORY: &str = "gpt-hflush";
pub const CMD_SWITCH_MODEL: &str = "gpt-switch";
pub const CMD_SET_SYSTEM: &str = "gpt-system";
pub const OPT_PROMPT: &str = "prompt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    ClearHistory,
    SwitchModel,
    SetSystemRole { prompt: String },
}

impl BotCommand {
    /// `None` for unknown names or a `gpt-system` call without a prompt.
    pub fn parse(invocation: &CommandInvocation) -> Option<Self> {
        match invocation.name.as_str() {
            CMD_CLEAR_HISTORY => Some(Self::ClearHistory),
            CMD_SWITCH_MODEL => Some(Self::SwitchModel),
            CMD_SET_SYSTEM => invocation
                .options
                .get(OPT_PROMPT)
                .map(|prompt| Self::SetSystemRole {
                    prompt: prompt.clone(),
                }),
            _ => None,
        }
    }
}

impl Handler {
    pub async fn on_command(&mut self, invocation: CommandInvocation) {
        let reply = match BotCommand::parse(&invocation) {
            Some(command) => self.execute(command),
            None => {
                warn!(name = %invocation.name, "Unknown command");
                format!("Unknown command: {}", invocation.name)
            }
        };

        let reply = clamp(&reply, self.message_limit);
        if let Err(e) = self.platform.respond_to_command(&invocation, &reply).await {
            warn!(error = %e, name = %invocation.name, "Failed to answer command");
        }
    }

    fn execute(&mut self, command: BotCommand) -> String {
        match command {
            BotCommand::ClearHistory => {
                self.orchestrator.clear_history();
                info!("Chat history cleared");
                "Chat history cleared.".to_string()
            }
            BotCommand::SwitchModel => {
                let name = self.orchestrator.switch_model();
                info!(model = name, "Model switched");
                format!("Switched model engine to {name}.")
            }
            BotCommand::SetSystemRole { prompt } => {
                info!("system role: {prompt}");
                let reply = format!("Set role: system to:\n>>> {prompt}");
                self.orchestrator.set_system_role(prompt);
                reply
            }
        }
    }
}
