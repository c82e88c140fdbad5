//! pm-bridge-mcp library crate.
//!
//! Exposes the admin API of a project-management service as MCP tools and
//! resources. The binary in `main.rs` wires these modules to the CLI.

pub mod cli;
pub mod commands;
pub mod config;
pub mod framing;
pub mod handlers;
pub mod http;
pub mod resources;
pub mod server;
pub mod stdio;
pub mod tools;

pub use server::McpServer;
