//! Output printing for command results

use super::TableRenderer;
use crate::domain::resource::{flatten_all, ResourceKind};
use crate::shared::Result;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub struct Printer {
    format: OutputFormat,
    with_headers: bool,
    renderer: TableRenderer,
}

impl Printer {
    pub fn new(format: OutputFormat, with_headers: bool) -> Self {
        Self {
            format,
            with_headers,
            renderer: TableRenderer::new(),
        }
    }

    /// Render an API object or collection.
    pub fn render_resources(&self, kind: ResourceKind, response: &Value) -> Result<String> {
        match self.format {
            OutputFormat::Table => {
                let rows = flatten_all(kind, response);
                Ok(self.renderer.render_rows(kind, &rows, self.with_headers))
            }
            OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        }
    }

    pub fn render_message(&self, message: &str) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(message.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "message": message }))?),
        }
    }

    pub fn print_resources(&self, kind: ResourceKind, response: &Value) -> Result<()> {
        println!("{}", self.render_resources(kind, response)?);
        Ok(())
    }

    pub fn print_message(&self, message: &str) -> Result<()> {
        println!("{}", self.render_message(message)?);
        Ok(())
    }
}
