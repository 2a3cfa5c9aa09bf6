//! Slash-command definitions registered with Discord.

use crate::handler::commands::{CMD_CLEAR_HISTORY, CMD_SET_SYSTEM, CMD_SWITCH_MODEL, OPT_PROMPT};

/// Application command type for chat-input (slash) commands.
const CHAT_INPUT: u8 = 1;
/// Option type for strings.
const OPTION_STRING: u8 = 3;

pub fn command_definitions() -> serde_json::Value {
    serde_json::json!([
        {
            "name": CMD_CLEAR_HISTORY,
            "type": CHAT_INPUT,
            "description": "Clear the chat history",
        },
        {
            "name": CMD_SWITCH_MODEL,
            "type": CHAT_INPUT,
            "description": "Switch to the next model engine",
        },
        {
            "name": CMD_SET_SYSTEM,
            "type": CHAT_INPUT,
            "description": "Set the system role prompt",
            "options": [{
                "name": OPT_PROMPT,
                "type": OPTION_STRING,
                "description": "System role prompt",
                "required": true,
            }],
        },
    ])
}
