mod app;
mod catalog;
mod clock;
mod commands;
mod config;
mod domain;
mod input;
mod ledger;
mod logging;
mod persistence;
mod report;
mod ticker;
mod timer;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use catalog::{Syllabus, TaskList, SYLLABUS_FILE, TASKS_FILE};
use clap::{Parser, Subcommand};
use clock::{parse_duration, SystemClock};
use commands::StartOptions;
use config::Config;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::{SessionEdit, Subject};
use ledger::SessionLedger;
use persistence::{atomic_write, ensure_data_dir, init_local_data_dir, FileStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use report::{generate_report, ReportOptions, SessionFilter};
use std::io;
use std::path::{Path, PathBuf};
use timer::StudyTimer;

#[derive(Parser)]
#[command(name = "studylog")]
#[command(about = "A terminal study timer that keeps a ledger of your study sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .studylog directory in the current directory
    Init,
    /// Start a run. Without options the run is a custom "Study session".
    Start {
        /// Subject of the chapter (physics, chemistry, maths)
        #[arg(short, long, value_parser = parse_subject)]
        subject: Option<Subject>,
        /// Chapter serial number within the subject
        #[arg(short, long)]
        chapter: Option<u32>,
        /// Study material, e.g. "Notes"
        #[arg(short, long)]
        material: Option<String>,
        /// Title of a custom run
        #[arg(short, long)]
        title: Option<String>,
        /// ID of a pending task to link the run to
        #[arg(long)]
        task: Option<String>,
    },
    /// Pause the running timer
    Pause,
    /// Resume a paused timer
    Resume,
    /// End the run and record it as a session
    End,
    /// Throw away the current run without recording it
    Discard,
    /// Show the timer state and elapsed time
    Status,
    /// List recorded sessions
    Sessions,
    /// Edit a recorded session
    Edit {
        /// Session ID or a unique prefix of it
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, value_parser = parse_subject)]
        subject: Option<Subject>,
        /// New material; an empty value clears it
        #[arg(short, long)]
        material: Option<String>,
        /// New duration, e.g. 45m, 1h30m or 01:30:00
        #[arg(short, long, value_parser = parse_duration_arg)]
        duration: Option<u64>,
    },
    /// Delete a recorded session
    Delete {
        /// Session ID or a unique prefix of it
        id: String,
    },
    /// Generate a Markdown study report
    Report {
        /// Only count this subject in the filtered total
        #[arg(short, long, value_parser = parse_subject)]
        subject: Option<Subject>,
        /// Only count this chapter serial in the filtered total
        #[arg(short, long)]
        chapter: Option<u32>,
        /// Only count this material in the filtered total
        #[arg(short, long)]
        material: Option<String>,
        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_subject(value: &str) -> Result<Subject, String> {
    Subject::from_name(value)
        .ok_or_else(|| format!("unknown subject '{}' (physics, chemistry, maths)", value))
}

fn parse_duration_arg(value: &str) -> Result<u64, String> {
    parse_duration(value).ok_or_else(|| format!("invalid duration '{}'", value))
}

/// Everything a command or the TUI needs, loaded from the data directory
struct Workspace {
    data_dir: PathBuf,
    config: Config,
    timer: StudyTimer<FileStore, SystemClock>,
    ledger: SessionLedger<FileStore>,
}

impl Workspace {
    fn open() -> Result<Self> {
        let data_dir = ensure_data_dir()?;
        let config = Config::load(&data_dir)?;

        if let Err(e) = logging::init_logging(&data_dir, &config.log_level) {
            eprintln!("Warning: logging disabled: {:#}", e);
        }
        tracing::debug!("Using data directory {}", data_dir.display());

        let store = FileStore::new(&data_dir);
        let timer = StudyTimer::recover(store.clone(), SystemClock);
        let ledger = SessionLedger::load(store)
            .with_context(|| format!("Failed to load sessions from {}", data_dir.display()))?;

        Ok(Self {
            data_dir,
            config,
            timer,
            ledger,
        })
    }

    fn catalog(&self) -> Result<(Syllabus, TaskList)> {
        let syllabus = Syllabus::load(self.data_dir.join(SYLLABUS_FILE))?;
        let tasks = TaskList::load(self.data_dir.join(TASKS_FILE))?;
        Ok((syllabus, tasks))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => init(),
        Some(command) => run_command(command),
        None => {
            // Run the normal TUI application
            run_tui()
        }
    }
}

fn init() -> Result<()> {
    let data_dir = init_local_data_dir()?;
    println!("Initialized studylog directory: {}", data_dir.display());
    println!();
    println!("studylog will now use this local directory for timers and sessions.");
    println!("Add {} and {} there to pick chapters and tasks.", SYLLABUS_FILE, TASKS_FILE);
    Ok(())
}

fn run_command(command: Commands) -> Result<()> {
    let mut ws = Workspace::open()?;

    let message = match command {
        Commands::Init => return init(),
        Commands::Start {
            subject,
            chapter,
            material,
            title,
            task,
        } => {
            let (syllabus, tasks) = ws.catalog()?;
            let options = StartOptions {
                subject,
                chapter,
                material,
                title,
                task,
            };
            commands::start(&mut ws.timer, options.selection(&syllabus, &tasks)?)
        }
        Commands::Pause => commands::pause(&mut ws.timer),
        Commands::Resume => commands::resume(&mut ws.timer),
        Commands::End => commands::end(&mut ws.timer, &mut ws.ledger)?,
        Commands::Discard => commands::discard(&mut ws.timer),
        Commands::Status => commands::status(&ws.timer),
        Commands::Sessions => commands::list_sessions(&ws.ledger),
        Commands::Edit {
            id,
            title,
            subject,
            material,
            duration,
        } => {
            let edit = SessionEdit {
                title,
                subject,
                material,
                duration,
            };
            commands::edit(&mut ws.ledger, &id, &edit)?
        }
        Commands::Delete { id } => commands::delete(&mut ws.ledger, &id)?,
        Commands::Report {
            subject,
            chapter,
            material,
            output,
        } => {
            let options = ReportOptions {
                filter: SessionFilter {
                    subject,
                    chapter,
                    material,
                },
                top_chapters_limit: ws.config.top_chapters_limit,
                report_days: ws.config.report_days,
            };
            let report = generate_report(ws.ledger.sessions(), &options);
            match output {
                Some(path) => write_report(Path::new(&path), &report)?,
                None => report,
            }
        }
    };

    println!("{}", message);
    Ok(())
}

fn write_report(path: &Path, report: &str) -> Result<String> {
    atomic_write(path, report)?;
    tracing::info!("Report written to {}", path.display());
    Ok(format!("Report generated: {}", path.display()))
}

fn run_tui() -> Result<()> {
    let ws = Workspace::open()?;
    eprintln!("Using studylog directory: {}", ws.data_dir.display());

    let (syllabus, tasks) = ws.catalog()?;
    let mut app = AppState::new(ws.timer, ws.ledger, syllabus, tasks, ws.config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // A run in progress stays in its snapshot and is picked up next time
    if app.timer.status().is_active() {
        println!(
            "Timer still {} at {}",
            app.timer.status().to_tag(),
            clock::format_clock(app.timer.elapsed_seconds())
        );
    }

    if let Err(err) = result {
        tracing::error!("TUI exited with error: {:#}", err);
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let tick_rate = ticker::tick_duration(app.config.tick_ms);

    loop {
        // Elapsed time is recomputed from the clock on every draw
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}
