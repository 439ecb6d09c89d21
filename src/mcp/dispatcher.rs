//! Tool call dispatch
//!
//! Resolves a call against the catalog, validates its arguments and runs the
//! matching handler. Whatever happens, the caller gets one [`ToolResult`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::mcp::catalog::ToolCatalog;
use crate::mcp::result::{FailureKind, ToolResult};
use crate::mcp::tools::WikipediaTools;
use crate::wikipedia::ContentProvider;

/// One inbound invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Routes tool calls to their handlers
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    tools: WikipediaTools,
}

impl Dispatcher {
    pub fn new(catalog: Arc<ToolCatalog>, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            catalog,
            tools: WikipediaTools::new(provider),
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Validate and execute a call
    ///
    /// Validation failures never reach the provider. A panic inside a handler
    /// is contained here and reported as [`FailureKind::Internal`].
    pub async fn dispatch(&self, call: ToolCall) -> ToolResult {
        let ToolCall { name, arguments } = call;

        let Some(tool) = self.catalog.find(&name) else {
            tracing::warn!(tool = %name, "Unknown tool");
            return ToolResult::failure(FailureKind::UnknownTool, format!("Unknown tool: {}", name));
        };

        let request = match tool.kind.parse(arguments) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(tool = %name, error = %e, "Rejected tool arguments");
                return ToolResult::failure(FailureKind::Validation, e.to_string());
            }
        };

        tracing::debug!(tool = %name, ?request, "Executing tool");

        match AssertUnwindSafe(self.tools.execute(request)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = %name, panic = %message, "Tool handler panicked");
                ToolResult::failure(
                    FailureKind::Internal,
                    format!("Internal error while running {}: {}", name, message),
                )
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
