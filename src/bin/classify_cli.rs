//! Command-line front end for the classify gateway.
//!
//! Usage:
//!   classify-cli --tags <t1,t2,...> [--provider openai|gemini] [--prompt <text>] [--json] <file>...
//!
//! Reads each text file as one document, classifies the set against the tag
//! vocabulary, and prints the result. The API key comes from OPENAI_API_KEY
//! or GEMINI_API_KEY.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use classify_gateway::{
    ClassificationRequest, Document, GatewayResult, ModelGateway, ProviderConfig, ProviderId,
    TracingSink,
};
use tracing_subscriber::EnvFilter;

struct Args {
    provider: ProviderId,
    tags: Vec<String>,
    prompt: Option<String>,
    json: bool,
    files: Vec<PathBuf>,
}

fn print_usage() {
    println!(
        r#"classify-cli: classify text documents with an LLM provider

USAGE:
    classify-cli --tags <t1,t2,...> [OPTIONS] <file>...

OPTIONS:
    --tags <list>           Comma-separated tag vocabulary (required)
    --provider <name>       openai (default) or gemini
    --prompt <text>         Custom task prompt (default names the tag list)
    --json                  Print the full result as JSON
    --help                  Show this help message

ENVIRONMENT:
    OPENAI_API_KEY / GEMINI_API_KEY    Provider credential
    CLASSIFY_HTTP_TIMEOUT_SECS         HTTP timeout (default 30)
    RUST_LOG                           Log filter (e.g. classify_gateway=debug)"#
    );
}

fn parse_args() -> anyhow::Result<Args> {
    let mut provider = ProviderId::OpenAi;
    let mut tags = Vec::new();
    let mut prompt = None;
    let mut json = false;
    let mut files = Vec::new();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--provider" => {
                let value = iter.next().context("--provider requires a value")?;
                provider = value.parse()?;
            }
            "--tags" => {
                let value = iter.next().context("--tags requires a value")?;
                tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            "--prompt" => {
                prompt = Some(iter.next().context("--prompt requires a value")?);
            }
            "--json" => json = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            other => files.push(PathBuf::from(other)),
        }
    }

    if tags.is_empty() {
        bail!("--tags is required; define at least one tag");
    }
    if files.is_empty() {
        bail!("no input files given");
    }

    Ok(Args {
        provider,
        tags,
        prompt,
        json,
        files,
    })
}

fn read_documents(files: &[PathBuf]) -> anyhow::Result<Vec<Document>> {
    files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(Document::new(name, content))
        })
        .collect()
}

fn render(result: &GatewayResult, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    match result {
        GatewayResult::Structured(records) => {
            for record in records {
                println!("{}", record.document_name);
                println!("  tags: {}", record.assigned_tags.join(", "));
                if !record.explanation.is_empty() {
                    println!("  why:  {}", record.explanation);
                }
                if !record.key_terms.is_empty() {
                    println!("  terms: {}", record.key_terms.join(", "));
                }
            }
        }
        GatewayResult::RawText(text) => println!("{text}"),
        GatewayResult::Failure { kind, message } => {
            bail!("classification failed ({kind:?}): {message}")
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = parse_args()?;
    let documents = read_documents(&args.files)?;

    let request = match args.prompt {
        Some(prompt) => ClassificationRequest::new(prompt, documents, args.tags),
        None => ClassificationRequest::with_default_prompt(documents, args.tags),
    };

    let config = ProviderConfig::from_env(args.provider)?;
    let gateway = ModelGateway::with_sink(Arc::new(TracingSink))?;

    let result = gateway.classify(&config, &request).await;
    render(&result, args.json)
}
