//! Codereel CLI - replay a branch's code changes as a typing animation

mod app;
mod color;
mod config;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use codereel_core::{diff_lines, DiffStats, FileChangeProvider, GitProvider, LineStatus, StyleContext};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "reel")]
#[command(author, version, about = "Replay a branch's code changes as a typing animation")]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Git repository to replay
    #[arg(default_value = ".")]
    workspace: PathBuf,

    /// Branch to replay (defaults to the first non-default branch)
    #[arg(short, long)]
    branch: Option<String>,

    /// Hide file tabs, rules and line numbers
    #[arg(long)]
    no_chrome: bool,

    /// Delay per typed character in milliseconds
    #[arg(long)]
    typing_ms: Option<u64>,

    /// Delay per removal highlight step in milliseconds
    #[arg(long)]
    highlight_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List branches that can be replayed
    Branches {
        #[arg(default_value = ".")]
        workspace: PathBuf,
    },
    /// Print the line edit script turning OLD into NEW
    Script {
        old: PathBuf,
        new: PathBuf,
        /// Print the script as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log to `reel.log`; the terminal belongs to the TUI
fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = config::Config::log_dir();
    let file_appender = tracing_appender::rolling::never(log_dir, "reel.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::Config::load();

    match &args.command {
        Some(Commands::Branches { workspace }) => {
            for branch in GitProvider.branches(workspace) {
                println!("{branch}");
            }
            Ok(())
        }
        Some(Commands::Script { old, new, json }) => print_script(old, new, *json),
        None => run_replay(&args, &config),
    }
}

fn print_script(old: &Path, new: &Path, json: bool) -> Result<()> {
    let old_content = std::fs::read_to_string(old)
        .context(format!("Failed to read: {}", old.display()))?;
    let new_content = std::fs::read_to_string(new)
        .context(format!("Failed to read: {}", new.display()))?;

    let script = diff_lines(&old_content, &new_content);
    if json {
        println!("{}", serde_json::to_string_pretty(&script)?);
        return Ok(());
    }

    for node in &script {
        let marker = match node.status {
            LineStatus::Same => ' ',
            LineStatus::Added => '+',
            LineStatus::Removed => '-',
        };
        println!("{marker} {}", node.text);
    }
    let stats = DiffStats::from_script(&script);
    println!("{} insertions(+), {} deletions(-)", stats.insertions, stats.deletions);
    Ok(())
}

fn run_replay(args: &Args, config: &config::Config) -> Result<()> {
    let _log_guard = configure_logging();
    let workspace = args
        .workspace
        .canonicalize()
        .context(format!("Failed to open workspace: {}", args.workspace.display()))?;

    if !codereel_core::git::is_git_repo(&workspace) {
        anyhow::bail!(
            "Not a git repository: {}\n\
             \n\
             Usage: reel [WORKSPACE] [--branch BRANCH]",
            workspace.display()
        );
    }

    // CLI flags override config
    let mut timings = config.playback.timings();
    if let Some(ms) = args.typing_ms {
        timings.typing = Duration::from_millis(ms);
    }
    if let Some(ms) = args.highlight_ms {
        timings.highlight = Duration::from_millis(ms);
    }

    let style = StyleContext {
        theme: config.ui.theme.resolve(),
        chrome: config.ui.chrome && !args.no_chrome,
        tab_width: config.ui.tab_width,
        gutter_digits: config.ui.gutter_digits,
        ..StyleContext::default()
    };

    let mut app = App::new(Box::new(GitProvider), timings, style, config.playback.autoplay);
    app.open_workspace(workspace, args.branch.as_deref());
    info!(branch = ?app.branch(), "replay ready");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(16);

    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                debug!(key = ?key.code, "key");
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                    KeyCode::Char(' ') | KeyCode::Enter => app.start_playback(),
                    KeyCode::Char('s') => app.stop_playback(),
                    KeyCode::Char('[') => app.prev_branch(),
                    KeyCode::Char(']') => app.next_branch(),
                    KeyCode::Char('c') => app.context_action(),
                    _ => {}
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
