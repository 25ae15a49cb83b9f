//! TCD CLI - Command-line interface
//!
//! Usage:
//!   tcd analyze "The cat eats fish. The cat sleeps."
//!   tcd analyze --file essay.txt --format markdown
//!   tcd split < essay.txt
//!   tcd models
//!
//! Author: hephaex@gmail.com

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tcd_analyzer::{
    render_json, render_markdown, render_text, split_fragments, TransitivityClassifier,
};
use tcd_core::{AnalysisResult, Annotator, AnnotatorBackend, AppConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tcd")]
#[command(about = "Detect transitive and intransitive verbs in English text")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Annotator backend
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<AnnotatorBackend>,

    /// Pre-parsed CoNLL-U document for the conllu backend
    #[arg(long, global = true, value_name = "PATH")]
    conllu: Option<PathBuf>,

    /// UDPipe model name or prefix (e.g. "english")
    #[arg(long, global = true)]
    model: Option<String>,

    /// UDPipe service base URL
    #[arg(long, global = true, value_name = "URL")]
    udpipe_url: Option<String>,

    /// Use the configured model as-is instead of resolving it first
    #[arg(long, global = true)]
    no_provision: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Text to process (reads stdin when neither TEXT nor --file is given)
    text: Option<String>,

    /// Read text from a file
    #[arg(long, short, value_name = "PATH", conflicts_with = "text")]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every verb as transitive or intransitive
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the fragments the text is split into
    Split {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Provision the annotator and show the model it resolves to
    Models,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

fn parse_backend(value: &str) -> Result<AnnotatorBackend, String> {
    value.parse().map_err(|e: tcd_core::ConfigError| e.to_string())
}

// ============================================================================
// Configuration and input
// ============================================================================

/// Build the effective configuration: file or environment, then flags
fn resolve_config(args: &GlobalArgs) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .and_then(AppConfig::with_env_override)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AppConfig::from_env().context("loading configuration from environment")?,
    };

    let annotator = &mut config.annotator;
    if let Some(path) = &args.conllu {
        annotator.conllu_path = Some(path.clone());
        // A CoNLL-U document implies the offline backend unless stated otherwise
        if args.backend.is_none() {
            annotator.backend = AnnotatorBackend::Conllu;
        }
    }
    if let Some(backend) = args.backend {
        annotator.backend = backend;
    }
    if let Some(model) = &args.model {
        annotator.model = model.clone();
    }
    if let Some(url) = &args.udpipe_url {
        annotator.udpipe_url = url.clone();
    }

    Ok(config)
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(input: &InputArgs) -> anyhow::Result<String> {
    if let Some(text) = &input.text {
        return Ok(text.clone());
    }
    if let Some(path) = &input.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading standard input")?;
    Ok(text)
}

// ============================================================================
// Commands
// ============================================================================

async fn load_annotator(
    config: &AppConfig,
    provision: bool,
) -> anyhow::Result<Arc<dyn Annotator>> {
    let annotator = if provision {
        tcd_annotator::provision(&config.annotator).await
    } else {
        tcd_annotator::build_annotator(&config.annotator).await
    };
    annotator.context("annotator is not available")
}

fn render(results: &[AnalysisResult], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(results),
        OutputFormat::Markdown => render_markdown(results),
        OutputFormat::Json => render_json(results)? + "\n",
    })
}

async fn analyze(
    config: &AppConfig,
    provision: bool,
    text: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    // Blank input never needs a model
    if split_fragments(text).is_empty() {
        return Ok(String::new());
    }

    let classifier = TransitivityClassifier::new(load_annotator(config, provision).await?);
    let results = classifier.analyze(text).await?;
    render(&results, format)
}

fn split(text: &str) -> String {
    split_fragments(text)
        .into_iter()
        .map(|fragment| fragment + "\n")
        .collect()
}

async fn models(config: &AppConfig) -> anyhow::Result<String> {
    match tcd_annotator::provision(&config.annotator).await {
        Ok(annotator) => Ok(format!(
            "backend: {}\nmodel: {}\n",
            annotator.name(),
            annotator.model()
        )),
        Err(e) if config.annotator.backend == AnnotatorBackend::Udpipe => {
            if let Ok(catalog) = tcd_annotator::list_models(&config.annotator).await {
                eprintln!("Available models at {}:", config.annotator.udpipe_url);
                for name in catalog.names() {
                    eprintln!("  {name}");
                }
            }
            Err(e).context("model provisioning failed")
        }
        Err(e) => Err(e).context("model provisioning failed"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli.global)?;
    init_tracing(cli.global.verbose, config.logging.json_format);
    tracing::debug!(
        backend = %config.annotator.backend,
        model = %config.annotator.model,
        "Configuration resolved"
    );

    let provision = !cli.global.no_provision;
    let output = match cli.command {
        Commands::Analyze { input, format } => {
            let text = read_input(&input)?;
            analyze(&config, provision, &text, format).await?
        }
        Commands::Split { input } => split(&read_input(&input)?),
        Commands::Models => models(&config).await?,
    };

    print!("{output}");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    const CORPUS: &str = "\
# text = The cat eats fish
1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tcat\tcat\tNOUN\tNN\t_\t3\tnsubj\t_\t_
3\teats\teat\tVERB\tVBZ\t_\t0\troot\t_\t_
4\tfish\tfish\tNOUN\tNN\t_\t3\tobj\t_\t_

# text = The cat sleeps
1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tcat\tcat\tNOUN\tNN\t_\t3\tnsubj\t_\t_
3\tsleeps\tsleep\tVERB\tVBZ\t_\t0\troot\t_\t_
";

    fn corpus_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CORPUS.as_bytes()).unwrap();
        file
    }

    fn conllu_config(path: PathBuf) -> AppConfig {
        let mut config = AppConfig::default();
        config.annotator.backend = AnnotatorBackend::Conllu;
        config.annotator.conllu_path = Some(path);
        config
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "tcd",
            "--backend",
            "conllu",
            "analyze",
            "--format",
            "markdown",
            "The cat sleeps.",
        ])
        .unwrap();

        assert_eq!(cli.global.backend, Some(AnnotatorBackend::Conllu));
        match cli.command {
            Commands::Analyze { input, format } => {
                assert_eq!(input.text.as_deref(), Some("The cat sleeps."));
                assert_eq!(format, OutputFormat::Markdown);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_text_and_file_conflict() {
        let result = Cli::try_parse_from(["tcd", "split", "text", "--file", "input.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_backend_rejected() {
        assert!(Cli::try_parse_from(["tcd", "--backend", "spacy", "models"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = GlobalArgs {
            model: Some("english-gum".to_string()),
            udpipe_url: Some("http://localhost:8001".to_string()),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.annotator.model, "english-gum");
        assert_eq!(config.annotator.udpipe_url, "http://localhost:8001");
    }

    #[test]
    fn test_conllu_flag_selects_backend() {
        let args = GlobalArgs {
            conllu: Some(PathBuf::from("corpus.conllu")),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.annotator.backend, AnnotatorBackend::Conllu);
        assert_eq!(
            config.annotator.conllu_path,
            Some(PathBuf::from("corpus.conllu"))
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "The cat sleeps.").unwrap();

        let input = InputArgs {
            text: None,
            file: Some(file.path().to_path_buf()),
        };
        assert_eq!(read_input(&input).unwrap(), "The cat sleeps.");
    }

    #[test]
    fn test_split_output() {
        assert_eq!(
            split("The cat eats fish. The cat sleeps."),
            "The cat eats fish\nThe cat sleeps\n"
        );
        assert_eq!(split(" . "), "");
    }

    #[tokio::test]
    async fn test_analyze_text_format() {
        let file = corpus_file();
        let config = conllu_config(file.path().to_path_buf());

        let output = analyze(
            &config,
            true,
            "The cat eats fish. The cat sleeps.",
            OutputFormat::Text,
        )
        .await
        .unwrap();

        assert!(output.contains("Sentence: The cat eats fish\n"));
        assert!(output.contains("Verb: eats | Object: fish | Type: Transitive"));
        assert!(output.contains("Verb: sleeps | Object: None | Type: Intransitive"));
    }

    #[tokio::test]
    async fn test_analyze_json_format() {
        let file = corpus_file();
        let config = conllu_config(file.path().to_path_buf());

        let output = analyze(&config, false, "The cat sleeps", OutputFormat::Json)
            .await
            .unwrap();
        assert!(output.contains("\"clause_type\": \"Intransitive\""));
        assert!(output.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_analyze_blank_input_needs_no_annotator() {
        // No conllu path configured: loading an annotator would fail
        let mut config = AppConfig::default();
        config.annotator.backend = AnnotatorBackend::Conllu;

        let output = analyze(&config, true, "   ", OutputFormat::Markdown)
            .await
            .unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_models_conllu() {
        let file = corpus_file();
        let config = conllu_config(file.path().to_path_buf());

        let output = models(&config).await.unwrap();
        assert!(output.starts_with("backend: conllu\n"));
    }
}
