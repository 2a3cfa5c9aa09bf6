//! Default TOML config template with documentation comments.

/// Generate the default TOML config content with comments.
pub(super) fn default_config_toml() -> String {
    r##"# chatrelay configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# Secrets are read from the environment (or a .env file):
#   DISCORD_BOT_TOKEN_GPT, OPENAI_API_KEY, CHANNEL_ID_GPT (optional)

[discord]
# channel_id = ""        # the only channel the bot answers in
# api_base = "https://discord.com/api/v10"
# gateway_url = "wss://gateway.discord.gg/?v=10&encoding=json"
# register_commands = true
# reconnect_delay_secs = 1
# max_reconnect_delay_secs = 60

[openai]
# api_base = "https://api.openai.com/v1"
# default_model = "gpt-4o"   # gpt-4-turbo, gpt-4-vision-preview, gpt-4o
# max_output_tokens = 2000   # 1-128000
# timeout_secs = 120         # 1-600

[session]
# system_role_file = "systemrole.txt"
# token_budget = 3840
# max_retries = 3            # 1-10
# chunk_limit = 2000         # 100-2000

[pricing.fallback]
# input_per_1k = 0.01
# output_per_1k = 0.03

# Defining any [pricing.models.*] table replaces the built-in entries.
# [pricing.models."gpt-4o"]
# input_per_1k = 0.005
# output_per_1k = 0.015

[logging]
# level = "INFO"             # DEBUG, INFO, WARNING, ERROR
# file = ""                  # empty = stderr
"##
    .to_string()
}
