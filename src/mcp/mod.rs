//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol for tool invocation.

pub mod catalog;
pub mod dispatcher;
pub mod result;
pub mod server;
pub mod tools;
pub mod types;
