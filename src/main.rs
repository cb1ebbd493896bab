mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use typehaki::{
    access::{normalize_code, AccessStore},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::HakiError,
    reference::ReferenceText,
    results::{average_accuracy, best_wpm, ResultRecord, ResultsLog},
    runtime::{CrosstermEventSource, FixedTicker, HakiEvent, Runner},
    scoring::WpmConvention,
    session::{Phase, Session, SessionConfig},
    typing_policy::InputPolicy,
};

/// timed typing test for typehaki rounds
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test: read the rules, start the clock, type the passage. Scores words per minute and positional accuracy, with a competition mode gated by round access codes."
)]
pub struct Cli {
    /// number of seconds the test runs for
    #[clap(short = 's', long)]
    duration_secs: Option<u32>,

    /// custom text to type
    #[clap(short = 'p', long, conflicts_with = "file")]
    prompt: Option<String>,

    /// read the text to type from a file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// competition mode: one attempt, no restart, access code required (`=false` for practice)
    #[clap(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    competition: Option<bool>,

    /// allow backspace and corrections while typing
    #[clap(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    allow_corrections: Option<bool>,

    /// count every five typed characters as one word
    #[clap(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    five_char_words: Option<bool>,

    /// round to enter or register for
    #[clap(long)]
    round: Option<String>,

    /// user id for the round
    #[clap(long)]
    user: Option<String>,

    /// six-digit access code for the round
    #[clap(long)]
    access_code: Option<String>,

    /// register the user for the round under this display name and print the access code
    #[clap(long, value_name = "NAME", requires_all = ["round", "user"])]
    register: Option<String>,

    /// payment reference stored with a registration
    #[clap(long, default_value = "manual")]
    payment_id: String,

    /// print personal best and average accuracy, then exit
    #[clap(long)]
    history: bool,

    /// persist the effective settings as defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line flags over stored settings.
    fn to_config(&self, base: Config) -> Config {
        Config {
            duration_secs: self.duration_secs.unwrap_or(base.duration_secs),
            competition: self.competition.unwrap_or(base.competition),
            input_policy: match self.allow_corrections {
                Some(true) => InputPolicy::AllowCorrections,
                Some(false) => InputPolicy::AppendOnly,
                None => base.input_policy,
            },
            wpm_convention: match self.five_char_words {
                Some(true) => WpmConvention::FiveCharWords,
                Some(false) => WpmConvention::WhitespaceWords,
                None => base.wpm_convention,
            },
        }
    }

    fn reference(&self) -> Result<ReferenceText, HakiError> {
        match (&self.prompt, &self.file) {
            (Some(prompt), _) => ReferenceText::new(prompt.clone()),
            (None, Some(path)) => ReferenceText::from_file(path),
            (None, None) => Ok(ReferenceText::sample()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    /// The countdown was just armed.
    Started,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub round: Option<String>,
    pub results: Option<ResultsLog>,
    pub status: Option<String>,
    /// Set when competition mode was granted by an access code. Attempts are
    /// only recorded against `round` while this is set.
    pub mode_locked: bool,
    recorded: bool,
}

impl App {
    pub fn new(reference: ReferenceText, config: SessionConfig) -> Self {
        Self {
            session: Session::new(reference, config),
            round: None,
            results: None,
            status: None,
            mode_locked: false,
            recorded: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return KeyOutcome::Quit;
        }

        let mut outcome = KeyOutcome::Continue;
        match (self.session.phase(), key.code) {
            (Phase::Rules, KeyCode::Enter) => {
                self.session.acknowledge();
            }
            (Phase::Rules, KeyCode::Char('m')) if !self.mode_locked => {
                let competition = !self.session.is_competition();
                self.session.set_competition(competition);
            }
            (Phase::Ready, KeyCode::Enter) => {
                if self.session.start() {
                    outcome = KeyOutcome::Started;
                }
            }
            (Phase::Typing, KeyCode::Char(c)) => {
                self.session.type_char(c);
            }
            (Phase::Typing, KeyCode::Backspace) => {
                self.session.backspace();
            }
            (Phase::Finished, KeyCode::Char('r')) => {
                if self.session.restart() {
                    self.status = None;
                }
            }
            _ => {}
        }
        self.record_if_finished();
        outcome
    }

    pub fn on_tick(&mut self) {
        self.session.tick();
        self.record_if_finished();
    }

    fn record_if_finished(&mut self) {
        if self.session.phase() != Phase::Finished {
            self.recorded = false;
            return;
        }
        if self.recorded {
            return;
        }
        self.recorded = true;

        let Some(log) = &self.results else {
            return;
        };
        // Only a round entered with a granted access code counts as competition.
        let round = if self.mode_locked {
            self.round.as_deref()
        } else {
            None
        };
        let Some(mut record) = ResultRecord::from_session(&self.session, round) else {
            return;
        };
        record.competition &= self.mode_locked;
        self.status = match log.append(&record) {
            Ok(()) => Some(format!("result saved to {}", log.path().display())),
            Err(e) => {
                warn!(error = %e, "could not save result");
                Some(format!("could not save result: {}", e))
            }
        };
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("TYPEHAKI_LOG")
        .unwrap_or_else(|_| EnvFilter::new("typehaki=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn access_store() -> Result<AccessStore, HakiError> {
    AppDirs::access_store_path()
        .map(AccessStore::with_path)
        .ok_or(HakiError::NoProjectDirs)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let store = FileConfigStore::new();
    let config = cli.to_config(store.load());
    if cli.save_config {
        store.save(&config)?;
        println!("settings saved to {}", store.path().display());
    }

    if let Some(name) = &cli.register {
        let (Some(round), Some(user)) = (&cli.round, &cli.user) else {
            unreachable!("clap enforces --round and --user with --register");
        };
        let registration =
            access_store()?.register(round, user, name, &cli.payment_id, chrono::Utc::now())?;
        println!(
            "registered {} for {}; access code {} (valid until {})",
            registration.user_name,
            registration.round_id,
            registration.access_code,
            registration.expires_at.format("%Y-%m-%d")
        );
        return Ok(());
    }

    let results = AppDirs::results_path().map(ResultsLog::with_path);

    if cli.history {
        let records = match &results {
            Some(log) => log.load()?,
            None => Vec::new(),
        };
        println!("attempts: {}", records.len());
        println!("best wpm: {}", best_wpm(&records));
        match average_accuracy(&records) {
            Some(acc) => println!("average accuracy: {:.1}%", acc),
            None => println!("average accuracy: -"),
        }
        return Ok(());
    }

    let session_config = config.session_config()?;
    let reference = cli.reference()?;

    if session_config.competition {
        let (Some(round), Some(user), Some(code)) = (&cli.round, &cli.user, &cli.access_code)
        else {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::MissingRequiredArgument,
                "competition mode needs --round, --user and --access-code",
            )
            .exit();
        };
        let verdict =
            access_store()?.verify(round, user, &normalize_code(code), chrono::Utc::now())?;
        if !verdict.is_granted() {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, verdict.to_string()).exit();
        }
        info!(round = %round, user = %user, "access granted");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(reference, session_config);
    app.round = cli.round.clone();
    app.results = results;
    app.mode_locked = session_config.competition;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::every_second());
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            HakiEvent::Tick => app.on_tick(),
            HakiEvent::Resize => {}
            HakiEvent::Key(key) => match app.handle_key(key) {
                KeyOutcome::Quit => break,
                KeyOutcome::Started => runner.rearm(),
                KeyOutcome::Continue => {}
            },
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
