mod cli;
mod discord;
mod handler;
mod logging;
mod platform;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chatrelay_ai::{
    ChatSession, CostEstimator, ModelVariant, OpenAiClient, OpenAiClientConfig, PricingTable,
    Rates, ResponseOrchestrator, TextChunker,
};
use chatrelay_common::{ChatRelayError, ConfigError};
use chatrelay_config::schema::PricingConfig;
use chatrelay_config::{dotenv, load_config, read_system_role, ChatRelayConfig, Secrets};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::discord::{DiscordRest, GatewayConfig};
use crate::handler::{Exit, Handler};
use crate::platform::PlatformEvent;

fn main() -> Result<(), ChatRelayError> {
    let args = cli::parse();

    // Before the runtime starts any threads.
    dotenv::load_dotenv(&dotenv::default_candidates(args.config.as_deref()));

    let config = load_config(args.config.as_deref())?;
    logging::init(&config.logging, args.log_level.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, !args.no_register_commands))
}

async fn run(config: ChatRelayConfig, register_commands: bool) -> Result<(), ChatRelayError> {
    let secrets = Secrets::from_env()?;
    let channel_id = secrets
        .channel_id
        .clone()
        .unwrap_or_else(|| config.discord.channel_id.clone());
    if channel_id.trim().is_empty() {
        return Err(ConfigError::MissingSecret(chatrelay_config::secrets::CHANNEL_ID_VAR.into()).into());
    }

    let orchestrator = build_orchestrator(&config, &secrets)?;
    let rest = Arc::new(DiscordRest::new(&config.discord.api_base, &secrets.discord_token)?);
    let mut handler = Handler::new(orchestrator, rest, channel_id)
        .with_message_limit(config.session.chunk_limit)
        .with_command_registration(register_commands && config.discord.register_commands);

    let mut gateway = GatewayConfig::new(&config.discord.gateway_url, &secrets.discord_token);
    gateway.reconnect_delay_secs = config.discord.reconnect_delay_secs;
    gateway.max_reconnect_delay_secs = config.discord.max_reconnect_delay_secs;

    let (event_tx, mut event_rx) = mpsc::channel::<PlatformEvent>(64);
    let gateway_handle = tokio::spawn(discord::connection_loop(gateway, event_tx));

    info!(version = env!("CARGO_PKG_VERSION"), "chatrelay started");

    match handler.run(&mut event_rx, shutdown_signal()).await {
        Exit::Shutdown => info!("Shutting down"),
        Exit::EventsClosed => error!("Gateway task stopped"),
    }

    gateway_handle.abort();
    let tracker = handler.orchestrator().tracker();
    info!(
        calls = tracker.call_count(),
        spend_usd = tracker.spend_usd(),
        "Session totals"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn build_orchestrator(
    config: &ChatRelayConfig,
    secrets: &Secrets,
) -> Result<ResponseOrchestrator, ChatRelayError> {
    let model: ModelVariant = config
        .openai
        .default_model
        .parse()
        .map_err(|e: chatrelay_ai::model::UnknownModel| ConfigError::ValidationError(e.to_string()))?;

    let role = read_system_role(Path::new(&config.session.system_role_file));
    let session = ChatSession::new(role, model).with_token_budget(config.session.token_budget);

    let client_config = OpenAiClientConfig::new(&secrets.openai_api_key)
        .with_api_base(&config.openai.api_base)
        .with_timeout(Duration::from_secs(config.openai.timeout_secs));
    let client =
        OpenAiClient::new(client_config).map_err(|e| ChatRelayError::Provider(e.to_string()))?;

    info!(model = %model, budget = config.session.token_budget, "Session configured");

    Ok(ResponseOrchestrator::new(session, Arc::new(client))
        .with_chunker(TextChunker::new(config.session.chunk_limit))
        .with_estimator(CostEstimator::new(pricing_table(&config.pricing)))
        .with_max_output_tokens(config.openai.max_output_tokens)
        .with_max_retries(config.session.max_retries))
}

fn pricing_table(pricing: &PricingConfig) -> PricingTable {
    let rate = |r: &chatrelay_config::schema::RateConfig| Rates::new(r.input_per_1k, r.output_per_1k);
    let mut table = PricingTable::new(rate(&pricing.fallback));
    for (identifier, rates) in &pricing.models {
        table.insert(identifier.clone(), rate(rates));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_table_uses_configured_rates() {
        let mut pricing = PricingConfig::default();
        pricing.models.clear();
        pricing.models.insert(
            "gpt-4o".into(),
            chatrelay_config::schema::RateConfig::new(0.002, 0.004),
        );
        let table = pricing_table(&pricing);
        assert_eq!(table.rates_for("gpt-4o"), Rates::new(0.002, 0.004));
        assert_eq!(table.rates_for("gpt-4-turbo"), Rates::new(0.01, 0.03));
    }

    #[test]
    fn orchestrator_from_default_config() {
        let secrets = Secrets {
            discord_token: "d".into(),
            openai_api_key: "k".into(),
            channel_id: None,
        };
        let mut config = ChatRelayConfig::default();
        config.session.system_role_file = "/nonexistent/systemrole.txt".into();
        let orchestrator = build_orchestrator(&config, &secrets).unwrap();
        assert_eq!(orchestrator.session().model(), ModelVariant::Gpt4Omni);
        assert_eq!(orchestrator.session().system_role(), "");
        assert_eq!(orchestrator.session().token_budget(), 3840);
    }

    #[test]
    fn unknown_default_model_is_rejected() {
        let secrets = Secrets {
            discord_token: "d".into(),
            openai_api_key: "k".into(),
            channel_id: None,
        };
        let mut config = ChatRelayConfig::default();
        config.openai.default_model = "gpt-3".into();
        let err = build_orchestrator(&config, &secrets).err().unwrap();
        assert!(matches!(err, ChatRelayError::Config(ConfigError::ValidationError(_))));
    }
}
