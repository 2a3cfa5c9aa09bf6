//! Discord adapter: REST delivery, gateway events and slash-command definitions.

pub mod commands;
pub mod gateway;
pub mod rest;
pub mod types;

pub use gateway::{connection_loop, GatewayConfig};
pub use rest::DiscordRest;
