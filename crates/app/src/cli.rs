//! Command-line surface

use std::path::PathBuf;

use anyhow::bail;
use backoffice_domain::{Operation, ResourceFamily};
use backoffice_infra::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "backoffice")]
#[command(version, about = "Operator tool for the resilient back-office gateway", long_about = None)]
pub struct Cli {
    /// Diagnostic log format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Read a resource through the gateway
    Fetch(FetchArgs),

    /// Apply a mutation through the gateway, queueing it when no backend answers
    Submit(SubmitArgs),

    /// List queued mutations
    Pending {
        /// Only this resource family
        #[arg(value_parser = family)]
        family: Option<ResourceFamily>,
    },

    /// Replay queued mutations now
    Replay {
        /// Only this resource family
        #[arg(value_parser = family)]
        family: Option<ResourceFamily>,
    },

    /// Drop a queued mutation without replaying it
    Discard {
        /// Mutation id as listed by `pending`
        id: Uuid,
    },

    /// Availability of every family seen so far, plus degraded notices
    Status,
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct FetchArgs {
    /// Resource family, e.g. invoices
    #[arg(value_parser = family)]
    pub family: ResourceFamily,

    /// Path relative to the backend base address
    pub path: String,

    /// Query parameter, repeatable
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = query_pair)]
    pub query: Vec<(String, String)>,

    /// Fetch a binary document instead of JSON
    #[arg(long)]
    pub document: bool,

    /// Write the document to this file
    #[arg(long, value_name = "FILE", requires = "document")]
    pub output: Option<PathBuf>,
}

impl FetchArgs {
    pub fn operation(&self) -> Operation {
        let operation = if self.document {
            Operation::document(self.path.as_str())
        } else {
            Operation::get(self.path.as_str())
        };
        self.query
            .iter()
            .fold(operation, |operation, (key, value)| operation.with_query(key.as_str(), value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct SubmitArgs {
    /// Resource family, e.g. products
    #[arg(value_parser = family)]
    pub family: ResourceFamily,

    #[arg(value_enum, ignore_case = true)]
    pub method: MutationMethod,

    /// Path relative to the backend base address
    pub path: String,

    /// JSON request body
    #[arg(value_parser = json_body)]
    pub body: Option<Value>,
}

impl SubmitArgs {
    /// # Errors
    /// A DELETE given a body.
    pub fn operation(&self) -> anyhow::Result<Operation> {
        let path = self.path.as_str();
        let body = self.body.clone();
        Ok(match self.method {
            MutationMethod::Delete if body.is_some() => bail!("DELETE takes no body"),
            MutationMethod::Delete => Operation::delete(path),
            MutationMethod::Post => Operation::post(path, body.unwrap_or(Value::Null)),
            MutationMethod::Put => Operation::put(path, body.unwrap_or(Value::Null)),
            MutationMethod::Patch => Operation::patch(path, body.unwrap_or(Value::Null)),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum MutationMethod {
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable
    Pretty,
    /// One JSON object per line
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn family(raw: &str) -> Result<ResourceFamily, String> {
    let family = ResourceFamily::new(raw);
    if family.as_str().is_empty() {
        return Err("family must not be empty".to_string());
    }
    Ok(family)
}

fn query_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    Ok((key.to_string(), value.to_string()))
}

fn json_body(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("body is not valid JSON: {e}"))
}
