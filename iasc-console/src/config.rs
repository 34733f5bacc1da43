use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug, Clone, Deserialize)]
#[command(name = "iasc")]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    #[clap(long)]
    #[arg(short = 'c')]
    #[serde(default)]
    pub config: Option<String>,
    /// Base URL of the OData service this console administers.
    #[clap(long, env)]
    #[arg(default_value_t = default_api_url())]
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[clap(long, env)]
    #[arg(default_value_t = default_rust_log())]
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
    /// Request timeout in seconds.
    #[clap(long, env)]
    #[arg(default_value_t = 30)]
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Where the persisted view and selection state live.
    #[clap(long, env)]
    #[arg(default_value_t = default_prefs_path())]
    #[serde(default = "default_prefs_path")]
    pub prefs_path: String,
}

fn default_api_url() -> String {
    String::from("http://localhost:4004/odata/v4/IasReplicaService")
}

fn default_rust_log() -> String {
    String::from("iasc=info")
}

fn default_timeout() -> u64 {
    30
}

fn default_prefs_path() -> String {
    String::from("iasc-prefs.toml")
}

pub fn load(cfg: &str) -> Result<AppConfig> {
    let content =
        fs::read_to_string(cfg).context("could not read config file")?;
    toml::from_str(&content).context("could not parse config file")
}
