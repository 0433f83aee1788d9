use anyhow::{Context, Result};
use console::{style, Emoji};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::{LlmProvider, OutputFormat};
use crate::config::Config;
use crate::export;
use crate::llm::LlmClient;
use crate::pipeline::{collect_pdfs, Pipeline, PipelineOptions};
use crate::record::DocumentRecord;
use crate::references::ReferenceExtractor;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");
static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
static DATABASE: Emoji<'_, '_> = Emoji("💾 ", "");

#[allow(clippy::too_many_arguments)]
pub async fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    provider: Option<LlmProvider>,
    model: Option<String>,
    save_full_text: bool,
    no_enrich: bool,
) -> Result<()> {
    let started = Instant::now();

    println!();
    println!(
        "{}",
        style(" bibcite - Bibliographic Metadata Extraction ")
            .bold()
            .reverse()
    );
    println!();

    // Load configuration
    let config = Config::load().context("Failed to load configuration. Run 'bibcite init' first.")?;

    // Determine provider and model
    let provider = provider.unwrap_or(match config.default_provider.as_str() {
        "anthropic" => LlmProvider::Anthropic,
        "ollama" => LlmProvider::Ollama,
        _ => LlmProvider::OpenAI,
    });
    let model = model.or(config.default_model.clone());
    let model_display = model.clone().unwrap_or_else(|| "default".to_string());

    let input_dir = input.unwrap_or_else(|| config.input_dir.clone());
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let enrich = !no_enrich && config.extraction.enrich;
    let save_full_text = save_full_text || config.extraction.save_full_text;

    println!(
        "{}Provider: {}",
        BRAIN,
        style(&provider.to_string()).cyan().bold()
    );
    println!("{}Model: {}", BRAIN, style(&model_display).cyan());
    println!("{}Input: {}", PAPER, style(input_dir.display()).cyan());
    println!("{}Output: {}", DATABASE, style(output_dir.display()).cyan());
    if enrich {
        println!("{}Enrichment: {}", LOOKING_GLASS, style("crossref").cyan());
    }
    println!();

    // Create LLM client first; a missing or empty API key is fatal before
    // any file or directory is touched.
    let llm_client = LlmClient::new(provider, &config, model.as_deref())?;

    // Collect PDFs
    print!("{}Scanning for PDFs... ", LOOKING_GLASS);
    let files = collect_pdfs(&input_dir)?;
    println!("{}", style(format!("found {}", files.len())).green().bold());

    if files.is_empty() {
        println!();
        println!("{}", style("No PDF files found in input directory").yellow());
        return Ok(());
    }

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let references = ReferenceExtractor::new(&config.extraction.reference_headings)
        .context("Invalid reference_headings in configuration")?;
    let pipeline = Pipeline::new(
        llm_client,
        references,
        PipelineOptions {
            enrich,
            save_full_text,
        },
    );

    // Process files sequentially, one record per PDF
    println!();
    println!("{}Extracting metadata...", BRAIN);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{}{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {{msg}}",
                PAPER
            ))
            .unwrap()
            .progress_chars("━━╸━"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut records: Vec<DocumentRecord> = Vec::with_capacity(files.len());
    for path in &files {
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(format!("{}", style(filename).dim()));
        records.push(pipeline.process_file(path, &output_dir).await);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let with_title = records.iter().filter(|r| r.title.is_some()).count();
    let with_refs = records.iter().filter(|r| !r.references.is_empty()).count();
    println!(
        "{}Processed {} PDFs ({} with extracted title, {} with references)",
        CHECK,
        style(records.len()).green().bold(),
        style(with_title).green(),
        style(with_refs).green(),
    );

    // Persist the accumulated records once, at the end. A write failure
    // here is fatal.
    println!();
    let output_path = match format {
        OutputFormat::Json => {
            let path = output_dir.join("extracted_data.json");
            export::write_json(&records, &path)?;
            path
        }
        OutputFormat::Csv => {
            let path = output_dir.join("extracted_data.csv");
            export::write_csv(&records, &path)?;
            path
        }
    };
    println!(
        "{}Wrote {} records to {}",
        DATABASE,
        style(records.len()).green().bold(),
        style(output_path.display()).cyan()
    );

    println!();
    println!(
        "{}Done in {}",
        SPARKLE,
        style(HumanDuration(started.elapsed())).green().bold()
    );

    Ok(())
}
