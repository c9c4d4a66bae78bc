//! MCP server for SEA news retrieval
//!
//! Exposes similarity, tag trends, keyword search and ingestion as tools.

mod server;

pub use server::run_mcp_server;
