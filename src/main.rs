//! wix-ui-designer CLI - Preview WiX UI dialogs
//!
//! Usage:
//!   wix-ui-designer render WelcomeDlg.wxs             # Print the rendered dialog
//!   wix-ui-designer render WelcomeDlg.wxs --caret 5:3 # Mark the control under the caret
//!   wix-ui-designer locate WelcomeDlg.wxs 5 3         # Control at a position
//!   wix-ui-designer watch WelcomeDlg.wxs              # Re-render on every save
//!   wix-ui-designer analyze ./installer               # Analyse a project

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wix_ui_designer::render::Snapshot;
use wix_ui_designer::reconcile::SkippedControl;
use wix_ui_designer::*;

#[derive(Parser)]
#[command(name = "wix-ui-designer")]
#[command(about = "Live preview of WiX UI dialogs")]
#[command(version)]
struct Cli {
    /// Configuration file (default: probe the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug contexts to log (package, margin, document, wix, exceptions, all)
    #[arg(long, global = true, value_delimiter = ',')]
    debug: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a dialog and print the visual tree
    Render {
        /// WiX source file
        file: PathBuf,

        /// Caret position as LINE:COLUMN
        #[arg(long)]
        caret: Option<String>,

        /// Localization file(s)
        #[arg(long = "loc")]
        localizations: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the control at a source position
    Locate {
        /// WiX source file
        file: PathBuf,

        /// 1-based line
        line: u32,

        /// 1-based column
        column: u32,
    },

    /// Re-render whenever the file changes
    Watch {
        /// WiX source file
        file: PathBuf,

        /// Localization file(s)
        #[arg(long = "loc")]
        localizations: Vec<PathBuf>,
    },

    /// Analyse the .wxs and .wxl files below a directory
    Analyze {
        /// Project directory
        dir: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    #[serde(flatten)]
    snapshot: Snapshot<'a>,
    skipped: Vec<SkippedOutput>,
}

#[derive(Serialize)]
struct SkippedOutput {
    id: Option<String>,
    position: Option<SourcePosition>,
    reason: String,
}

impl From<&SkippedControl> for SkippedOutput {
    fn from(skipped: &SkippedControl) -> Self {
        Self {
            id: skipped.id.clone(),
            position: skipped.position,
            reason: skipped.reason.to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DesignerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DesignerConfig::load_default(&std::env::current_dir()?)?,
    };
    if !cli.debug.is_empty() {
        config.set_debug_contexts(cli.debug.clone())?;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let log: SharedLog = Arc::new(TracingLog::new(config.debug_mask()?));

    match cli.command {
        Commands::Render {
            file,
            caret,
            localizations,
            format,
        } => {
            let text = read(&file)?;
            let mut editor = BufferEditor::new(text);
            if let Some(caret) = caret {
                editor.move_caret_to(parse_caret(&caret)?);
            }

            let designer = DialogDesigner::open(
                &file,
                editor,
                MemorySink::new(),
                VirtualScheduler::new(),
                &config,
                load_evaluator(&localizations)?,
                log,
            )
            .with_context(|| format!("Cannot preview {}", file.display()))?;

            let skipped: Vec<SkippedOutput> = designer
                .last_plan()
                .map(|plan| plan.skipped.iter().map(SkippedOutput::from).collect())
                .unwrap_or_default();

            match format.as_str() {
                "json" => {
                    let output = RenderOutput {
                        snapshot: designer.sink().snapshot(),
                        skipped,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                _ => {
                    print!("{}", designer.sink().describe());
                    for skipped in &skipped {
                        let at = skipped
                            .position
                            .map(|p| format!("{}:{}", p.line, p.column))
                            .unwrap_or_else(|| "?".to_string());
                        println!(
                            "  skipped {} at {}: {}",
                            skipped.id.as_deref().unwrap_or("(no id)"),
                            at,
                            skipped.reason
                        );
                    }
                }
            }
        }

        Commands::Locate { file, line, column } => {
            let text = read(&file)?;
            let doc = ParsedDocument::load(&text)?;
            if !doc.is_single_dialog_fragment() {
                bail!("{} is not a single-dialog WiX UI fragment", file.display());
            }

            match find_control_at(&doc, line, column) {
                Some(node) => {
                    let element = doc.element(node);
                    let (l, c) = source_position(&doc, node);
                    println!(
                        "{} {} at {}:{}",
                        element.name(),
                        if element.id().is_empty() { "(no id)" } else { element.id() },
                        l,
                        c
                    );
                }
                None => println!("No control at {}:{}", line, column),
            }
        }

        Commands::Watch { file, localizations } => {
            watch(&file, &config, load_evaluator(&localizations)?, log)?;
        }

        Commands::Analyze { dir, format } => {
            if !dir.is_dir() {
                bail!("{} is not a directory", dir.display());
            }
            let reports = WixProject::open(&dir, log).finish();

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
                _ => {
                    println!("Analyzed {} file(s) in {}", reports.len(), dir.display());
                    println!("{}", "=".repeat(50));
                    for report in &reports {
                        let summary = match &report.summary {
                            FileSummary::Dialog { id, controls } => {
                                format!("dialog {} ({} controls)", id, controls)
                            }
                            FileSummary::Source => "source".to_string(),
                            FileSummary::Localization { strings } => {
                                format!("localization ({} strings)", strings)
                            }
                            FileSummary::Failed { error } => format!("error: {}", error),
                        };
                        println!("  {} - {}", report.path.display(), summary);
                    }
                }
            }
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_caret(caret: &str) -> Result<SourcePosition> {
    let Some((line, column)) = caret.split_once(':') else {
        bail!("Caret must be LINE:COLUMN, got {}", caret);
    };
    let line: u32 = line.trim().parse().context("Invalid caret line")?;
    let column: u32 = column.trim().parse().context("Invalid caret column")?;
    if line == 0 || column == 0 {
        bail!("Caret line and column are 1-based");
    }
    Ok(SourcePosition::new(line, column))
}

fn load_evaluator(files: &[PathBuf]) -> Result<TextEvaluator> {
    let mut evaluator = TextEvaluator::default();
    for file in files {
        let table = LocalizationTable::from_wxl(&read(file)?)
            .with_context(|| format!("Invalid localization file {}", file.display()))?;
        tracing::info!("Loaded {} strings from {}", table.len(), file.display());
        evaluator.add_table(table);
    }
    Ok(evaluator)
}

fn watch(file: &Path, config: &DesignerConfig, evaluator: TextEvaluator, log: SharedLog) -> Result<()> {
    const IDLE: Duration = Duration::from_millis(500);

    let mut designer = DialogDesigner::open(
        file,
        BufferEditor::new(read(file)?),
        MemorySink::new(),
        DeadlineScheduler::new(),
        config,
        evaluator,
        log,
    )
    .with_context(|| format!("Cannot preview {}", file.display()))?;
    print!("{}", designer.sink().describe());

    let watcher = FileWatcher::new(file).with_context(|| format!("Cannot watch {}", file.display()))?;
    loop {
        let timeout = designer
            .scheduler()
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE);

        if watcher.changed(timeout)? {
            match std::fs::read_to_string(file) {
                Ok(text) => {
                    designer.editor_mut().set_text(text);
                    designer.on_text_changed();
                }
                Err(e) => tracing::warn!("Failed to read {}: {}", file.display(), e),
            }
        }

        if !designer.poll(Instant::now()).is_empty() {
            println!();
            print!("{}", designer.sink().describe());
        }
    }
}
