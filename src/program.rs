//! Interactive front end for the image fetcher
//! Uses dialoguer for input, indicatif for progress and console for styling

use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::ProgressBar;
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::fetcher::{
    AppConfig, FetchEvent, FetchOptions, FetchOutcome, FetchPipeline, HashStore, HttpImageSource,
    PreviewProjector, Projection, RunSummary, SourceError,
};
use crate::tui::fetch_progress_bar;

/// The name of the cargo package.
const NAME: &str = env!("CARGO_PKG_NAME");

/// The version of the cargo package.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the interactive front end
#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("UI interaction error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    #[error("HTTP client error: {0}")]
    Source(#[from] SourceError),

    #[error("Fetch worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result type alias for front end operations
pub type ProgramResult<T> = Result<T, ProgramError>;

/// Main menu options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenuOption {
    FetchImages,
    OpenImagesFolder,
    Exit,
}

impl MainMenuOption {
    /// Get all menu options
    pub fn variants() -> &'static [MainMenuOption] {
        &[
            MainMenuOption::FetchImages,
            MainMenuOption::OpenImagesFolder,
            MainMenuOption::Exit,
        ]
    }

    /// Get the display name for the menu option
    pub fn display_name(&self) -> &'static str {
        match self {
            MainMenuOption::FetchImages => "Fetch images",
            MainMenuOption::OpenImagesFolder => "Open images folder",
            MainMenuOption::Exit => "Exit",
        }
    }
}

/// Handles the flow of the fetcher user experience.
pub(crate) struct Program {
    pipeline: Arc<FetchPipeline<HttpImageSource>>,
    projector: PreviewProjector,
    theme: ColorfulTheme,
}

impl Program {
    /// Creates the program, seeding the hash store from the download directory.
    pub(crate) fn new(config: &AppConfig) -> ProgramResult<Self> {
        let download_dir = &config.paths.download_directory;
        let hash_store = Arc::new(HashStore::load(download_dir));
        let source = HttpImageSource::from_config(config)?;

        Ok(Self {
            pipeline: Arc::new(FetchPipeline::new(source, hash_store, download_dir.clone())),
            projector: PreviewProjector::new(config.preview.max_dimension),
            theme: ColorfulTheme::default(),
        })
    }

    /// Runs the main menu loop until the user exits.
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        trace!("Program Name: {}", NAME);
        trace!("Program Version: {}", VERSION);

        if !Self::is_interactive_terminal() {
            println!("Warning: Not running in an interactive terminal.");
            println!("Please run this program from a proper terminal/command prompt.");
            return Ok(());
        }

        println!("\n{}", style("Image Fetcher").cyan().bold());
        let hash_store = self.pipeline.hash_store();
        if hash_store.is_empty() {
            println!(
                "{} Images are saved to {}",
                style("i").blue(),
                self.pipeline.destination().display()
            );
        } else {
            println!(
                "{} Images are saved to {} ({} already known)",
                style("i").blue(),
                self.pipeline.destination().display(),
                hash_store.len()
            );
        }

        loop {
            match self.show_main_menu()? {
                MainMenuOption::FetchImages => self.fetch_images().await?,
                MainMenuOption::OpenImagesFolder => self.open_images_folder(),
                MainMenuOption::Exit => {
                    println!("{}", style("Exiting...").cyan());
                    break;
                }
            }
        }

        Ok(())
    }

    /// Check if we're running in an interactive terminal
    fn is_interactive_terminal() -> bool {
        io::stdin().is_terminal() && io::stdout().is_terminal()
    }

    /// Show the main menu and get user selection
    fn show_main_menu(&self) -> ProgramResult<MainMenuOption> {
        let options = MainMenuOption::variants();
        let option_names: Vec<&str> = options.iter().map(|o| o.display_name()).collect();

        println!("\n{}", style("Main Menu").cyan().bold());

        let selection = Select::with_theme(&self.theme)
            .items(&option_names)
            .default(0)
            .interact()?;

        Ok(options[selection])
    }

    /// Collect URLs and options, then run the pipeline and render its events
    async fn fetch_images(&self) -> ProgramResult<()> {
        println!("\n{}", style("Fetch Images").cyan().bold());

        let urls = self.read_urls()?;
        if urls.is_empty() {
            println!("{}", style("Please enter at least one image URL").yellow());
            return Ok(());
        }

        let options = self.read_options()?;
        info!(count = urls.len(), ?options, "Starting fetch from interactive input");

        let (mut events, handle) = self.pipeline.clone().spawn(urls, options);
        let bar = fetch_progress_bar(0);

        while let Some(event) = events.recv().await {
            self.render_event(&bar, event).await;
        }

        let summary = handle.await?;
        bar.finish_and_clear();
        Self::print_summary(&summary);
        Ok(())
    }

    /// Read one URL per line until an empty line is entered
    fn read_urls(&self) -> ProgramResult<Vec<String>> {
        println!("Enter image URLs, one per line. Submit an empty line to finish.");

        let mut lines = Vec::new();
        loop {
            let line: String = Input::with_theme(&self.theme)
                .with_prompt(format!("URL {}", lines.len() + 1))
                .allow_empty(true)
                .interact_text()?;
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }

        Ok(parse_urls(&lines.join("\n")))
    }

    fn read_options(&self) -> ProgramResult<FetchOptions> {
        let skip_duplicates = Confirm::with_theme(&self.theme)
            .with_prompt("Skip duplicate images?")
            .default(true)
            .interact()?;
        let verify_integrity = Confirm::with_theme(&self.theme)
            .with_prompt("Verify image integrity?")
            .default(true)
            .interact()?;

        Ok(FetchOptions {
            skip_duplicates,
            verify_integrity,
        })
    }

    async fn render_event(&self, bar: &ProgressBar, event: FetchEvent) {
        match event {
            FetchEvent::Started { total, .. } => {
                bar.set_length(total as u64);
                bar.set_position(0);
            }
            progress @ FetchEvent::Progress { .. } => {
                if let Some(status) = progress.status_line() {
                    bar.set_message(status);
                }
            }
            FetchEvent::Outcome { outcome, line, .. } => {
                bar.inc(1);
                let styled = match outcome {
                    FetchOutcome::Saved { .. } => style(line).green(),
                    FetchOutcome::SkippedDuplicate => style(line).yellow(),
                    _ => style(line).red(),
                };
                bar.println(styled.to_string());
            }
            FetchEvent::Preview { filename, bytes } => {
                let projection = self.project_preview(bytes).await;
                bar.println(describe_projection(&filename, &projection));
            }
            FetchEvent::Finished(_) => {}
        }
    }

    /// Decode and scale the preview off the async workers.
    async fn project_preview(&self, bytes: Vec<u8>) -> Projection {
        let projector = self.projector;
        match tokio::task::spawn_blocking(move || projector.project(&bytes)).await {
            Ok(projection) => projection,
            Err(e) => {
                warn!("Preview task failed: {}", e);
                Projection::Unavailable
            }
        }
    }

    fn print_summary(summary: &RunSummary) {
        let elapsed = summary.finished_at - summary.started_at;
        println!(
            "{} ({:.1}s)",
            summary.status_line(),
            elapsed.num_milliseconds() as f64 / 1000.0
        );
        if summary.successful > 0 {
            println!("{}", style(summary.message()).green().bold());
        } else {
            println!("{}", style(summary.message()).yellow());
        }
    }

    /// Open the download directory in the platform file browser
    fn open_images_folder(&self) {
        let directory = self.pipeline.destination();
        match launch(open_command(directory)) {
            Ok(_) => println!("{} Opened {}", style("✓").green(), directory.display()),
            Err(e) => {
                warn!("Failed to open {}: {}", directory.display(), e);
                println!(
                    "{} Could not open {}: {}",
                    style("✗").red(),
                    directory.display(),
                    e
                );
            }
        }
    }
}

/// Split pasted text into URLs, dropping blank lines and surrounding whitespace
pub(crate) fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn open_command(directory: &Path) -> Command {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    let mut command = Command::new(program);
    command.arg(directory);
    command
}

/// Spawn `command` and wait for it in the background so it is reaped on exit.
fn launch(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    Ok(tokio::spawn(async move {
        let status = child.wait().await;
        debug!(?status, "Folder opener exited");
        status
    }))
}

/// One-line description of a preview for the activity log
fn describe_projection(filename: &str, projection: &Projection) -> String {
    match projection {
        Projection::Ready(preview) if preview.was_scaled() => format!(
            "{} Preview: {} ({}x{}, scaled from {}x{})",
            style("▣").cyan(),
            filename,
            preview.width,
            preview.height,
            preview.source_width,
            preview.source_height
        ),
        Projection::Ready(preview) => format!(
            "{} Preview: {} ({}x{})",
            style("▣").cyan(),
            filename,
            preview.width,
            preview.height
        ),
        Projection::Unavailable => style("Could not display preview").yellow().to_string(),
    }
}
