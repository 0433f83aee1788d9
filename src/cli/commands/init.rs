use anyhow::{Context, Result};
use console::{style, Emoji};
use std::fs;

use crate::config::{Config, ExtractionConfig, ProviderConfig, ProvidersConfig};

static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");

pub async fn run(force: bool) -> Result<()> {
    println!();
    println!("{}", style(" bibcite - Initialization ").bold().reverse());
    println!();

    let config_dir = Config::config_dir()?;
    let config_path = config_dir.join("config.toml");

    // Check if config already exists
    if config_path.exists() && !force {
        println!(
            "{}Configuration already exists at {}",
            WARN,
            style(config_path.display()).cyan()
        );
        println!("  Use {} to overwrite", style("--force").yellow());
        return Ok(());
    }

    // Create config directory
    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    let default_config = Config {
        default_provider: "openai".to_string(),
        default_model: Some("gpt-4o-mini".to_string()),
        input_dir: "data/input".into(),
        output_dir: "data/output".into(),
        extraction: ExtractionConfig::default(),
        providers: ProvidersConfig {
            openai: Some(ProviderConfig {
                api_key: "${OPENAI_API_KEY}".to_string(),
                base_url: None,
                model: Some("gpt-4o-mini".to_string()),
            }),
            anthropic: Some(ProviderConfig {
                api_key: "${ANTHROPIC_API_KEY}".to_string(),
                base_url: None,
                model: Some("claude-sonnet-4-20250514".to_string()),
            }),
            ollama: Some(ProviderConfig {
                api_key: String::new(),
                base_url: Some("http://localhost:11434".to_string()),
                model: Some("mistral".to_string()),
            }),
        },
    };

    // Write config file
    let config_content = toml::to_string_pretty(&default_config)?;
    fs::write(&config_path, config_content).context("Failed to write config file")?;

    println!(
        "{}Created configuration at {}",
        CHECK,
        style(config_path.display()).cyan()
    );

    // Create the default input/output directories relative to the
    // working directory so the first run works out of the box.
    for dir in [&default_config.input_dir, &default_config.output_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        println!("{}Created {}", FOLDER, style(dir.display()).cyan());
    }

    println!();
    println!("{}", style("━".repeat(50)).dim());
    println!();
    println!("{}Next steps:", ROCKET);
    println!();
    println!("  {}Configure your LLM provider:", KEY);
    println!("    {} bibcite auth", style("$").dim());
    println!();
    println!("  {}Drop PDFs into data/input and extract:", ROCKET);
    println!("    {} bibcite extract", style("$").dim());
    println!();

    Ok(())
}
