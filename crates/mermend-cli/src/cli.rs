//! Command-line interface for the mermend utility
//!
//! Provides a CLI to repair Mermaid diagram markup and render it to SVG or
//! PNG files through a Kroki server.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::kroki::{KrokiEngine, DEFAULT_KROKI_URL};
use mermend::core::logging::init_logging;
use mermend::export::ExportFormat;
use mermend::normalizer::{Normalized, Normalizer};
use mermend::render::{self, EngineSettings, RenderPipeline, RenderResult, Theme};
use mermend::{DiagramError, DiagramSource, NormalizerConfig, PipelineConfig, DEFAULT_MAX_LABEL_CHARS};

/// Mermend - Repair and render Mermaid diagrams
#[derive(Parser)]
#[command(name = "mermend")]
#[command(about = "Repair malformed Mermaid diagram markup and render it to SVG or PNG")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Longest label kept before truncation
    #[arg(long, env = "MERMEND_MAX_LABEL_CHARS", default_value_t = DEFAULT_MAX_LABEL_CHARS, global = true)]
    pub max_label_chars: usize,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Repair diagram markup and print the result
    Normalize {
        /// Input file containing diagram markup (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the repaired markup (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print markup and repair statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repair, render through Kroki and export
    Render {
        /// Input file containing diagram markup (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory the exported files are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Export format
        #[arg(long, value_enum, default_value_t = ExportChoice::Svg)]
        format: ExportChoice,

        /// Diagram title, used for the file names (defaults to the input file name)
        #[arg(long)]
        title: Option<String>,

        /// Engine color theme
        #[arg(long, value_enum, default_value_t = ThemeChoice::Default)]
        theme: ThemeChoice,

        /// Kroki server base URL
        #[arg(long, env = "MERMEND_KROKI_URL", default_value = DEFAULT_KROKI_URL)]
        kroki_url: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Report whether markup survives repair
    Check {
        /// Input file to check (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Export formats selectable on the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ExportChoice {
    #[default]
    Svg,
    Png,
    Both,
}

impl ExportChoice {
    pub fn formats(&self) -> &'static [ExportFormat] {
        match self {
            ExportChoice::Svg => &[ExportFormat::Svg],
            ExportChoice::Png => &[ExportFormat::Png],
            ExportChoice::Both => &[ExportFormat::Svg, ExportFormat::Png],
        }
    }
}

/// Engine themes selectable on the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ThemeChoice {
    #[default]
    Default,
    Neutral,
    Dark,
    Forest,
    Base,
}

impl From<ThemeChoice> for Theme {
    fn from(value: ThemeChoice) -> Self {
        match value {
            ThemeChoice::Default => Theme::Default,
            ThemeChoice::Neutral => Theme::Neutral,
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Forest => Theme::Forest,
            ThemeChoice::Base => Theme::Base,
        }
    }
}

/// JSON shape of `normalize --json`
#[derive(Debug, Serialize)]
struct NormalizeReport<'a> {
    markup: &'a str,
    empty: bool,
    split_lines: usize,
    dropped_pairs: usize,
}

impl<'a> From<&'a Normalized> for NormalizeReport<'a> {
    fn from(normalized: &'a Normalized) -> Self {
        Self {
            markup: &normalized.markup,
            empty: normalized.is_empty(),
            split_lines: normalized.report.split_lines,
            dropped_pairs: normalized.report.dropped_pairs,
        }
    }
}

/// Failure notice: the reason, then the source exactly as supplied
pub fn failure_report(reason: &str, source: &str) -> String {
    format!("Render failed: {}\n\nOriginal source:\n{}", reason, source)
}

/// Title derived from the input file name
fn default_title(input: Option<&Path>) -> String {
    input
        .filter(|path| path.as_os_str() != "-")
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diagram".to_string())
}

/// Main CLI application
pub struct MermendApp {
    config: PipelineConfig,
}

impl MermendApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a new application instance with a pipeline config
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    fn normalizer(&self) -> Normalizer {
        Normalizer::with_config(self.config.normalizer.clone())
    }

    /// Run the application with the given CLI arguments
    pub fn run(mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("MERMEND_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("MERMEND_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            if cli.verbose {
                eprintln!("Warning: Failed to initialize logging: {}", e);
            }
        }

        if cli.verbose {
            eprintln!("Mermend v{}", env!("CARGO_PKG_VERSION"));
        }

        self.config.normalizer = NormalizerConfig::new().with_max_label_chars(cli.max_label_chars);

        match cli.command {
            Commands::Normalize {
                input,
                output,
                json,
            } => self.normalize_command(input, output, json, cli.verbose),
            Commands::Render {
                input,
                out_dir,
                format,
                title,
                theme,
                kroki_url,
                timeout,
            } => {
                let title = title.unwrap_or_else(|| default_title(input.as_deref()));
                let content = self.read_input(input)?;
                let engine = self.create_engine(theme, kroki_url, timeout);
                self.render_command(&content, &engine, &out_dir, format, &title, cli.verbose)
            }
            Commands::Check { input } => self.check_command(input, cli.verbose),
        }
    }

    /// Handle the normalize command
    fn normalize_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        json: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let normalized = self.normalizer().normalize(&content);

        let rendered = if json {
            serde_json::to_string_pretty(&NormalizeReport::from(&normalized))?
        } else {
            normalized.markup
        };
        self.write_output(output, &rendered)
    }

    /// Install the engine settings and build the Kroki engine
    fn create_engine(&self, theme: ThemeChoice, kroki_url: String, timeout: u64) -> KrokiEngine {
        let settings = EngineSettings::new().with_theme(theme.into());
        if let Err(e) = render::initialize(settings.clone()) {
            tracing::warn!(error = %e, "Keeping existing engine settings");
        }
        KrokiEngine::new(kroki_url, Duration::from_secs(timeout)).with_settings(settings)
    }

    /// Handle the render command
    pub fn render_command<E: render::RenderEngine + ?Sized>(
        &self,
        content: &str,
        engine: &E,
        out_dir: &Path,
        format: ExportChoice,
        title: &str,
        verbose: bool,
    ) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let mut pipeline = RenderPipeline::with_config(self.config.clone());
        runtime.block_on(pipeline.render(engine, DiagramSource::new(content)));

        let reason = match pipeline.result() {
            Some(RenderResult::Rendered { element_id, .. }) => {
                if verbose {
                    eprintln!("Rendered {}", element_id);
                }
                None
            }
            Some(failed) => failed.reason(),
            None => Some("render did not complete".to_string()),
        };

        if let Some(reason) = reason {
            eprintln!("{}", failure_report(&reason, pipeline.copy_code().unwrap_or_default()));
            eprintln!("{}", DiagramError::NothingToExport);
            return Err(anyhow!("render failed: {}", reason));
        }

        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory '{}'", out_dir.display()))?;

        for export_format in format.formats() {
            let artifact = match export_format {
                ExportFormat::Svg => pipeline.export_svg(title)?,
                ExportFormat::Png => pipeline.export_png(title)?,
            };
            let path = artifact.write_to(out_dir)?;
            println!("{}", path.display());
        }

        Ok(())
    }

    /// Handle the check command
    fn check_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let normalized = self.normalizer().normalize(&content);
        if normalized.is_empty() {
            println!("✗ Nothing left to render after repair");
            return Err(anyhow!("empty markup"));
        }

        let report = normalized.report;
        println!(
            "✓ {} lines after repair ({} split, {} node pairs dropped)",
            normalized.markup.lines().count(),
            report.split_lines,
            report.dropped_pairs
        );
        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let stdout_content = if content.is_empty() || content.ends_with('\n') {
                    content.to_string()
                } else {
                    format!("{}\n", content)
                };
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for MermendApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt};
    use mermend::EngineError;
    use tempfile::tempdir;

    struct FixedEngine(Result<&'static str, &'static str>);

    impl render::RenderEngine for FixedEngine {
        fn render<'a>(
            &'a self,
            _element_id: &'a str,
            _markup: &'a str,
        ) -> BoxFuture<'a, Result<String, EngineError>> {
            let reply = self.0.map(str::to_string).map_err(EngineError::new);
            async move { reply }.boxed()
        }
    }

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="10"><rect width="30" height="10" fill="teal"/></svg>"#;

    #[test]
    fn test_cli_parsing_render_command() {
        let args = vec![
            "mermend",
            "render",
            "--input",
            "flow.mmd",
            "--format",
            "both",
            "--theme",
            "dark",
            "--kroki-url",
            "http://localhost:8000",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Render {
                input,
                out_dir,
                format,
                title,
                theme,
                kroki_url,
                timeout,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "flow.mmd");
                assert_eq!(out_dir, PathBuf::from("."));
                assert_eq!(format, ExportChoice::Both);
                assert!(title.is_none());
                assert_eq!(theme, ThemeChoice::Dark);
                assert_eq!(kroki_url, "http://localhost:8000");
                assert_eq!(timeout, 30);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parsing_normalize_command() {
        let args = vec!["mermend", "normalize", "--json", "--max-label-chars", "40"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.max_label_chars, 40);

        match cli.command {
            Commands::Normalize { input, output, json } => {
                assert!(input.is_none());
                assert!(output.is_none());
                assert!(json);
            }
            _ => panic!("Expected Normalize command"),
        }
    }

    #[test]
    fn test_cli_parsing_check_command() {
        let cli = Cli::try_parse_from(vec!["mermend", "check", "-i", "x.mmd"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { input: Some(_) }));
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(Some(Path::new("docs/Login Flow.mmd"))), "Login Flow");
        assert_eq!(default_title(Some(Path::new("-"))), "diagram");
        assert_eq!(default_title(None), "diagram");
    }

    #[test]
    fn test_failure_report_keeps_source() {
        let report = failure_report("Parse error on line 2", "graph TD\nA → → B");
        assert_eq!(
            report,
            "Render failed: Parse error on line 2\n\nOriginal source:\ngraph TD\nA → → B"
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let app = MermendApp::new();
        let input = "graph TD\nA → B";

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.mmd");
        fs::write(&file_path, input).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, input);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = MermendApp::new();
        let error = app.read_input(Some(PathBuf::from("/nonexistent/x.mmd"))).unwrap_err();
        assert!(error.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = MermendApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.mmd");

        app.write_output(Some(file_path.clone()), "A --> B").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "A --> B");
    }

    #[test]
    fn test_normalize_command_json() {
        let app = MermendApp::new();
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("in.mmd");
        let output_path = dir.path().join("out.json");
        fs::write(&input_path, "graph TD\nA → B → C").unwrap();

        app.normalize_command(Some(input_path), Some(output_path.clone()), true, false)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output_path).unwrap()).unwrap();
        assert_eq!(value["markup"], "graph TD\n    A --> B\n    B --> C");
        assert_eq!(value["split_lines"], 1);
        assert_eq!(value["dropped_pairs"], 0);
        assert_eq!(value["empty"], false);
    }

    #[test]
    fn test_render_command_writes_both_formats() {
        let app = MermendApp::new();
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("exports");

        app.render_command(
            "graph LR\nA → B",
            &FixedEngine(Ok(SVG)),
            &out_dir,
            ExportChoice::Both,
            "My Flow",
            false,
        )
        .unwrap();

        assert_eq!(fs::read_to_string(out_dir.join("My_Flow.svg")).unwrap(), SVG);
        let png = fs::read(out_dir.join("My_Flow.png")).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn test_render_command_failure_writes_nothing() {
        let app = MermendApp::new();
        let dir = tempdir().unwrap();

        let error = app
            .render_command(
                "graph TD\nA -->",
                &FixedEngine(Err("Parse error on line 2")),
                dir.path(),
                ExportChoice::Both,
                "Broken",
                false,
            )
            .unwrap_err();

        assert_eq!(error.to_string(), "render failed: Parse error on line 2");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_render_command_empty_markup() {
        let app = MermendApp::new();
        let dir = tempdir().unwrap();

        let error = app
            .render_command(
                "```mermaid\n\n```",
                &FixedEngine(Ok(SVG)),
                dir.path(),
                ExportChoice::Svg,
                "Empty",
                false,
            )
            .unwrap_err();
        assert_eq!(error.to_string(), "render failed: empty markup");
    }

    #[test]
    fn test_check_command() {
        let app = MermendApp::new();
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.mmd");
        let empty = dir.path().join("empty.mmd");
        fs::write(&good, "graph TD\nA → B").unwrap();
        fs::write(&empty, "  \n").unwrap();

        assert!(app.check_command(Some(good), false).is_ok());
        assert!(app.check_command(Some(empty), false).is_err());
    }
}
