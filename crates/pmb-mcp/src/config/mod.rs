//! Configuration resolution for pm-bridge-mcp.
//!
//! The entry point is [`resolve_config`], which layers the config file and
//! `PMB_*` environment variables over compiled-in defaults into a
//! [`BridgeConfig`].
//!
//! See [`resolve`] for the full priority chain and [`types`] for all config types.

mod resolve;
mod types;

pub use resolve::{default_config_path, load_file, resolve_config};
pub use types::{BridgeConfig, TransportKind};
