use anyhow::{Context, Result};
use checklist_sort_config::Settings;
use checklist_sort_engine::{
    Frontmatter, LineBuffer, MutationOutcome, RopeBuffer, SortError, handle_toggle, io,
    sort_block, sort_document, toggle_in_place,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    env,
    fs::File,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "Usage:
  checklist-sort <file>                 interactive checklist
  checklist-sort toggle <file> <line>   toggle one item (1-based line)
  checklist-sort sort <file>            sort every enabled list
  checklist-sort init                   write a default config file";

enum Command {
    Interactive(PathBuf),
    Toggle(PathBuf, usize),
    Sort(PathBuf),
    Init,
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args {
        [_, cmd, path, line] if cmd == "toggle" => {
            let line: usize = line.parse().ok()?;
            line.checked_sub(1)
                .map(|line| Command::Toggle(PathBuf::from(path), line))
        }
        [_, cmd, path] if cmd == "sort" => Some(Command::Sort(PathBuf::from(path))),
        [_, cmd] if cmd == "init" => Some(Command::Init),
        [_, path] => Some(Command::Interactive(PathBuf::from(path))),
        _ => None,
    }
}

/// Toggle `line`, sorting its peer group when the resolved configuration
/// allows and falling back to a plain checkbox flip when it does not.
fn toggle_line(buffer: &mut RopeBuffer, settings: &Settings, line: usize) -> MutationOutcome {
    let frontmatter = Frontmatter::from_buffer(&*buffer);
    match handle_toggle(buffer, settings.policy(), &frontmatter, line) {
        MutationOutcome::Disabled(config) => {
            log::debug!("sorting disabled by {:?}, toggling in place", config.source);
            toggle_in_place(buffer, line)
        }
        outcome => outcome,
    }
}

fn describe(outcome: &MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Applied(splice) if splice.lines.len() == 1 => {
            format!("updated line {}", splice.lines.start + 1)
        }
        MutationOutcome::Applied(splice) => {
            format!(
                "sorted lines {}-{}",
                splice.lines.start + 1,
                splice.lines.end
            )
        }
        MutationOutcome::Unchanged => "already sorted".to_string(),
        MutationOutcome::Disabled(config) => format!("sorting disabled by {:?}", config.source),
        MutationOutcome::Aborted(SortError::NotAListItem { line }) => {
            format!("line {} is not a list item", line + 1)
        }
        MutationOutcome::Aborted(SortError::NotATask { line }) => {
            format!("list item on line {} has no checkbox to toggle", line + 1)
        }
        MutationOutcome::Aborted(error) => error.to_string(),
    }
}

struct App {
    path: PathBuf,
    settings: Settings,
    buffer: RopeBuffer,
    lines: Vec<String>,
    list_state: ListState,
    status: String,
}

impl App {
    fn open(path: PathBuf, settings: Settings) -> Result<Self> {
        let buffer = io::load_buffer(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let lines = buffer.lines();

        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Ok(Self {
            path,
            settings,
            buffer,
            lines,
            list_state,
            status: String::new(),
        })
    }

    fn selected_line(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    fn next_line(&mut self) {
        let i = (self.selected_line() + 1) % self.lines.len();
        self.list_state.select(Some(i));
    }

    fn previous_line(&mut self) {
        let i = match self.selected_line() {
            0 => self.lines.len() - 1,
            i => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn toggle_selected(&mut self) -> Result<()> {
        let line = self.selected_line();
        let outcome = toggle_line(&mut self.buffer, &self.settings, line);
        self.finish(outcome)
    }

    fn sort_selected(&mut self) -> Result<()> {
        let line = self.selected_line();
        let outcome = sort_block(&mut self.buffer, line);
        self.finish(outcome)
    }

    fn finish(&mut self, outcome: MutationOutcome) -> Result<()> {
        if outcome.is_applied() {
            io::save_buffer(&self.path, &self.buffer)?;
            self.lines = self.buffer.lines();
        }
        self.status = describe(&outcome);
        Ok(())
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(command) = parse_args(&args) else {
        eprintln!("{USAGE}");
        process::exit(1);
    };

    match command {
        Command::Interactive(path) => {
            let settings = load_settings();
            init_logging(&settings, true)?;
            run_interactive(path, settings)
        }
        Command::Toggle(path, line) => {
            let settings = load_settings();
            init_logging(&settings, false)?;
            run_toggle(&path, &settings, line)
        }
        Command::Sort(path) => {
            let settings = load_settings();
            init_logging(&settings, false)?;
            run_sort(&path, &settings)
        }
        Command::Init => init_config(&Settings::config_path()),
    }
}

fn load_settings() -> Settings {
    match Settings::load_or_default() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    }
}

/// Write default settings to `config_path` unless a file is already there.
fn init_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("config already exists at {}", config_path.display());
        return Ok(());
    }
    Settings::default().save_to_path(config_path)?;
    println!("wrote default config to {}", config_path.display());
    Ok(())
}

/// The terminal UI owns the screen, so it only logs when a log file is set.
fn init_logging(settings: &Settings, interactive: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    match &settings.log_file {
        Some(log_file) => {
            let file = File::create(log_file)
                .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
            builder
                .filter_level(log::LevelFilter::Debug)
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if interactive => {
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {
            builder.filter_level(log::LevelFilter::Warn);
        }
    }
    builder.init();
    Ok(())
}

fn run_toggle(path: &Path, settings: &Settings, line: usize) -> Result<()> {
    let mut buffer = io::load_buffer(path)?;
    let outcome = toggle_line(&mut buffer, settings, line);

    if let MutationOutcome::Aborted(_) = outcome {
        eprintln!("Error: {}", describe(&outcome));
        process::exit(1);
    }
    if outcome.is_applied() {
        io::save_buffer(path, &buffer)?;
    }
    println!("{}", describe(&outcome));
    Ok(())
}

fn run_sort(path: &Path, settings: &Settings) -> Result<()> {
    let mut buffer = io::load_buffer(path)?;
    let frontmatter = Frontmatter::from_buffer(&buffer);

    let rewrites = sort_document(&mut buffer, settings.policy(), &frontmatter)?;
    if rewrites > 0 {
        io::save_buffer(path, &buffer)?;
    }
    println!("{rewrites} list blocks rewritten");
    Ok(())
}

fn run_interactive(path: PathBuf, settings: Settings) -> Result<()> {
    let mut app = App::open(path, settings)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
        process::exit(1);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_line(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_line(),
                KeyCode::Char(' ') => app.toggle_selected()?,
                KeyCode::Char('s') => app.sort_selected()?,
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(f.area());

    let items: Vec<ListItem> = app
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", index + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(line.clone()),
            ]))
        })
        .collect();

    let title = app.path.display().to_string();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    f.render_widget(Paragraph::new(app.status.as_str()), chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next | "),
        Span::raw("Space: Toggle | s: Sort list"),
    ]);
    f.render_widget(Paragraph::new(help_text), chunks[2]);
}
