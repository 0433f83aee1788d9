pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bibcite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract bibliographic metadata from academic PDFs using LLMs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration and data directories
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Configure API keys for LLM providers
    #[command(long_about = "Configure API keys for LLM providers.\n\n\
        Supported providers: openai, anthropic, ollama.\n\
        All providers support a custom base_url in the config file, so you can\n\
        point any provider at a proxy, gateway, or compatible service.\n\n\
        The OpenAI provider works with any OpenAI-compatible API (Groq, DeepSeek,\n\
        Mistral, Together AI, OpenRouter, Azure, LM Studio, vLLM, etc.).\n\n\
        Set base_url in ~/.config/bibcite/config.toml for each provider.")]
    Auth {
        /// Provider to configure (openai, anthropic, ollama)
        #[arg(short, long)]
        provider: Option<LlmProvider>,

        /// Set API key directly (alternative to interactive prompt)
        #[arg(short, long)]
        key: Option<String>,

        /// List configured providers and their status
        #[arg(long, default_value = "false")]
        list: bool,
    },

    /// Extract bibliographic metadata from a directory of PDFs
    Extract {
        /// Input directory containing PDF files (defaults to input_dir from config)
        input: Option<PathBuf>,

        /// Output directory for the metadata file (defaults to output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for the metadata file
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// LLM provider (openai, anthropic, ollama). OpenAI-compatible APIs use 'openai' with a custom base_url in config
        #[arg(short, long, env = "BIBCITE_PROVIDER")]
        provider: Option<LlmProvider>,

        /// Model name (provider-specific, e.g. gpt-4o-mini, claude-sonnet-4-20250514, mistral)
        #[arg(short, long, env = "BIBCITE_MODEL")]
        model: Option<String>,

        /// Write one .txt file per PDF with the full extracted text
        #[arg(long, default_value = "false")]
        save_full_text: bool,

        /// Skip Crossref enrichment (venue, DOI, year, citation count)
        #[arg(long, default_value = "false")]
        no_enrich: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum LlmProvider {
    #[default]
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
