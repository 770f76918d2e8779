use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use quizcraft::app::{App, AppParts, Confirm, FormField, MENU_ITEMS, ProviderSetup, TopicChoice};
use quizcraft::catalog::{Difficulty, Grade};
use quizcraft::config::{Config, ProviderKind};
use quizcraft::event::{AppEvent, EventHandler};
use quizcraft::flow::{FlowEvent, Screen};
use quizcraft::generator::gemini::GeminiSettings;
use quizcraft::generator::sample::SampleProvider;
use quizcraft::session::question::QuizQuestion;
use quizcraft::session::quiz::{Phase, QUESTION_TIME_SECS};
use quizcraft::store::credentials::{CredentialStore, resolve_api_key};
use quizcraft::store::kv::{FileStore, KeyValueStore};
use quizcraft::ui::components::dashboard::Dashboard;
use quizcraft::ui::components::menu::Menu;
use quizcraft::ui::components::progress_bar::ProgressBar;
use quizcraft::ui::components::question_card::QuestionCard;
use quizcraft::ui::components::question_list::QuestionList;
use quizcraft::ui::components::score_table::ScoreTable;
use quizcraft::ui::layout::{AppLayout, centered_box, pack_hint_lines};
use quizcraft::ui::line_input::InputResult;
use quizcraft::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "quizcraft",
    version,
    about = "English quizzes for grades 5-8 in the terminal"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Use the built-in sample questions instead of the Gemini API")]
    offline: bool,

    #[arg(long, help = "Gemini API key for this run (not stored)")]
    api_key: Option<String>,

    #[arg(long, help = "Keep the question bank and high scores between runs")]
    keep_stores: bool,

    #[arg(long, help = "Directory for the question bank, high scores and log")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Log file path")]
    log_file: Option<PathBuf>,

    #[arg(long, help = "Write the effective configuration to the config file and exit")]
    write_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if cli.offline {
        config.provider = ProviderKind::Sample;
    }
    if cli.keep_stores {
        config.purge_stores = false;
    }

    if cli.write_config {
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let file_store = match &cli.data_dir {
        Some(dir) => FileStore::with_base_dir(dir.clone())?,
        None => FileStore::new()?,
    };
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| file_store.base_dir().join("quizcraft.log"));
    init_logging(&log_path, &config.log_level)?;
    log::info!("starting quizcraft {}", env!("CARGO_PKG_VERSION"));

    let store: Rc<dyn KeyValueStore> = Rc::new(file_store);

    let provider = match config.provider {
        ProviderKind::Sample => ProviderSetup::Keyless(Arc::new(SampleProvider::new())),
        ProviderKind::Gemini => ProviderSetup::Gemini(GeminiSettings {
            api_key: String::new(),
            model: config.model.clone(),
            base_url: config.api_base_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            temperature: config.temperature,
        }),
    };

    let credentials = CredentialStore::new(store.clone());
    let api_key = match resolve_api_key(
        cli.api_key.as_deref(),
        |var| std::env::var(var).ok(),
        &credentials,
    ) {
        Some((key, source)) => {
            log::info!("using API key from {source:?}");
            Some(key)
        }
        None => None,
    };

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        log::warn!("unknown theme {:?}, using the default", config.theme);
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let mut app = App::new(AppParts {
        config,
        theme,
        store,
        provider,
        api_key,
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    app.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }
    log::info!("bye");

    Ok(())
}

fn init_logging(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }
        app.on_tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    // Confirmation prompt takes priority
    if app.confirm.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.resolve_confirm(true, Instant::now()),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.resolve_confirm(false, Instant::now())
            }
            _ => {}
        }
        return;
    }

    match app.screen() {
        Screen::Credentials => handle_credentials_key(app, key),
        Screen::Welcome => handle_welcome_key(app, key),
        Screen::Settings => handle_settings_key(app, key),
        Screen::Loading => {}
        Screen::Preview => handle_preview_key(app, key),
        Screen::NameEntry => handle_name_key(app, key),
        Screen::Quiz => handle_quiz_key(app, key),
        Screen::Results => handle_results_key(app, key),
        Screen::GradePick | Screen::DifficultyPick => handle_pick_key(app, key),
        Screen::CountPick => handle_count_key(app, key),
        Screen::BankBrowse | Screen::HighScores => handle_list_key(app, key),
    }
}

fn handle_credentials_key(app: &mut App, key: KeyEvent) {
    match app.key_input.handle(key) {
        InputResult::Submit => app.submit_credentials(),
        InputResult::Cancel => app.quit(),
        InputResult::Continue => {}
    }
}

fn handle_welcome_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char(ch @ '1'..='4') => app.menu_activate(ch as usize - '1' as usize),
        KeyCode::Up | KeyCode::Char('k') => app.menu_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Enter => app.menu_activate(app.menu_selected),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if app.form.editing_topic {
        match app.form.custom_topic.handle(key) {
            InputResult::Submit | InputResult::Cancel => app.form.editing_topic = false,
            InputResult::Continue => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.dispatch(FlowEvent::Back),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => app.form.prev_field(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.form.next_field(),
        KeyCode::Right | KeyCode::Char('l') => app.form.cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.form.cycle_backward(),
        KeyCode::Char('e')
            if app.form.field == FormField::Topic && app.form.topic == TopicChoice::Custom =>
        {
            app.form.editing_topic = true;
        }
        KeyCode::Enter => {
            if app.form.field == FormField::Topic
                && app.form.topic == TopicChoice::Custom
                && app.form.topic().is_none()
            {
                app.form.editing_topic = true;
            } else {
                app.start_generation();
            }
        }
        _ => {}
    }
}

fn handle_preview_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => app.dispatch(FlowEvent::BeginNameEntry),
        KeyCode::Char('r') => app.dispatch(FlowEvent::Regenerate),
        KeyCode::Esc | KeyCode::Char('q') => app.dispatch(FlowEvent::GoHome),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        _ => {}
    }
}

fn handle_name_key(app: &mut App, key: KeyEvent) {
    match app.name_input.handle(key) {
        InputResult::Submit => app.submit_name(),
        InputResult::Cancel => app.dispatch(FlowEvent::Back),
        InputResult::Continue => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    if key.code == KeyCode::Esc {
        app.request_end_quiz();
        return;
    }

    let Some(session) = app.session.as_ref() else {
        return;
    };
    if !matches!(session.phase(), Phase::AwaitingAnswer { .. }) {
        return;
    }

    match session.current_question() {
        QuizQuestion::MultipleChoice { .. } => match key.code {
            KeyCode::Char(ch @ '1'..='9') => app.answer_option(ch as usize - '1' as usize, now),
            KeyCode::Up | KeyCode::Char('k') => app.answer_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.answer_next(),
            KeyCode::Enter => app.submit_answer(now),
            _ => {}
        },
        QuizQuestion::FillInTheBlank { .. } => {
            if app.answer_input.handle(key) == InputResult::Submit {
                app.submit_answer(now);
            }
        }
        QuizQuestion::Matching { .. } => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.answer_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.answer_next(),
            KeyCode::Right | KeyCode::Char('l') => app.answer_cycle(true),
            KeyCode::Left | KeyCode::Char('h') => app.answer_cycle(false),
            KeyCode::Enter => app.submit_answer(now),
            _ => {}
        },
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.dispatch(FlowEvent::PlayAgain),
        KeyCode::Char('q') | KeyCode::Esc => app.dispatch(FlowEvent::GoHome),
        _ => {}
    }
}

fn handle_pick_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dispatch(FlowEvent::Back),
        KeyCode::Up | KeyCode::Char('k') => app.pick_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.pick_next(),
        KeyCode::Enter => app.pick_confirm(),
        KeyCode::Char(ch) if app.screen() == Screen::GradePick => {
            if let Some(grade) = Grade::from_name(&ch.to_string()) {
                app.dispatch(FlowEvent::GradeChosen(grade));
            }
        }
        KeyCode::Char(ch @ '1'..='3') => {
            if let Some(difficulty) = Difficulty::ALL.get(ch as usize - '1' as usize) {
                app.dispatch(FlowEvent::DifficultyChosen(*difficulty));
            }
        }
        _ => {}
    }
}

fn handle_count_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dispatch(FlowEvent::Back),
        KeyCode::Up | KeyCode::Right | KeyCode::Char('k') | KeyCode::Char('l') => app.count_up(),
        KeyCode::Down | KeyCode::Left | KeyCode::Char('j') | KeyCode::Char('h') => {
            app.count_down()
        }
        KeyCode::Enter => app.choose_count(),
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dispatch(FlowEvent::Back),
        KeyCode::Char('q') => app.dispatch(FlowEvent::GoHome),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_clear(),
        _ => {}
    }
}

fn screen_title(screen: Screen) -> &'static str {
    match screen {
        Screen::Credentials => "API Key",
        Screen::Welcome => "Home",
        Screen::Settings => "New Quiz",
        Screen::Loading => "Generating",
        Screen::Preview => "Preview",
        Screen::NameEntry => "Player",
        Screen::Quiz => "Quiz",
        Screen::Results => "Results",
        Screen::GradePick => "Choose Grade",
        Screen::DifficultyPick => "Choose Difficulty",
        Screen::BankBrowse => "Question Bank",
        Screen::HighScores => "High Scores",
        Screen::CountPick => "Number of Questions",
    }
}

fn footer_hints(app: &App) -> Vec<&'static str> {
    if app.confirm.is_some() {
        return vec!["[y] Yes", "[n/Esc] No"];
    }
    match app.screen() {
        Screen::Credentials => vec!["[Enter] Save key", "[Esc] Quit"],
        Screen::Welcome => vec!["[1-4] Select", "[j/k] Move", "[Enter] Open", "[q] Quit"],
        Screen::Settings if app.form.editing_topic => vec!["[Enter/Esc] Done editing"],
        Screen::Settings => vec![
            "[j/k] Field",
            "[h/l] Change",
            "[e] Edit custom topic",
            "[Enter] Generate",
            "[Esc] Back",
        ],
        Screen::Loading => vec!["Please wait..."],
        Screen::Preview => vec![
            "[Enter] Start quiz",
            "[r] Regenerate",
            "[j/k] Scroll",
            "[Esc] Home",
        ],
        Screen::NameEntry => vec!["[Enter] Start", "[Esc] Back"],
        Screen::Quiz => match app.session.as_ref().map(|s| s.current_question()) {
            Some(QuizQuestion::MultipleChoice { .. }) => {
                vec!["[1-9] Answer", "[j/k] Move", "[Enter] Submit", "[Esc] End quiz"]
            }
            Some(QuizQuestion::Matching { .. }) => vec![
                "[j/k] Term",
                "[h/l] Definition",
                "[Enter] Submit",
                "[Esc] End quiz",
            ],
            _ => vec!["[Enter] Submit", "[Esc] End quiz"],
        },
        Screen::Results => vec!["[r/Enter] Play again", "[q/Esc] Home"],
        Screen::GradePick => vec!["[5-8] Grade", "[j/k] Move", "[Enter] Select", "[Esc] Home"],
        Screen::DifficultyPick => vec![
            "[1-3] Difficulty",
            "[j/k] Move",
            "[Enter] Select",
            "[Esc] Back",
        ],
        Screen::CountPick => vec!["[j/k] Change", "[Enter] Continue", "[Esc] Back"],
        Screen::BankBrowse => vec!["[j/k] Scroll", "[x] Clear", "[Esc] Back", "[q] Home"],
        Screen::HighScores => vec!["[x] Clear", "[Esc] Back"],
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = pack_hint_lines(&footer_hints(app), area.width as usize);
    let layout = AppLayout::new(area, hints.len() as u16);

    render_header(frame, app, layout.header);

    let footer: Vec<Line> = hints
        .into_iter()
        .map(|h| Line::styled(h, Style::default().fg(colors.text_dim())))
        .collect();
    frame.render_widget(Paragraph::new(footer), layout.footer);

    match app.screen() {
        Screen::Credentials => render_credentials(frame, app, layout.main),
        Screen::Welcome => render_welcome(frame, app, layout.main),
        Screen::Settings => render_settings(frame, app, layout.main),
        Screen::Loading => render_loading(frame, app, layout.main),
        Screen::Preview => render_preview(frame, app, layout.main),
        Screen::NameEntry => render_name_entry(frame, app, layout.main),
        Screen::Quiz => render_quiz(frame, app, layout.main),
        Screen::Results => render_results(frame, app, layout.main),
        Screen::GradePick => render_grade_pick(frame, app, layout.main),
        Screen::DifficultyPick => render_difficulty_pick(frame, app, layout.main),
        Screen::CountPick => render_count_pick(frame, app, layout.main),
        Screen::BankBrowse => render_bank(frame, app, layout.main),
        Screen::HighScores => render_high_scores(frame, app, layout.main),
    }

    if let Some(confirm) = app.confirm {
        render_confirm(frame, app, confirm, area);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let provider = if app.is_keyless() {
        "offline samples".to_string()
    } else {
        app.config.model.clone()
    };
    let left = format!(" quizcraft \u{00b7} {}", screen_title(app.screen()));
    let right = format!("{provider} ");
    let pad = (area.width as usize).saturating_sub(left.chars().count() + right.chars().count());
    let line = Line::from(vec![
        Span::styled(left, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(pad)),
        Span::styled(right, Style::default().fg(colors.text_dim())),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().fg(colors.header_fg()).bg(colors.header_bg())),
        area,
    );
}

fn error_line(app: &App) -> Option<Line<'static>> {
    app.flow.error.as_ref().map(|e| {
        Line::styled(
            format!("  {e}"),
            Style::default().fg(app.theme.colors.error()),
        )
    })
}

fn render_credentials(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let boxed = centered_box(70, 12, area);
    let block = Block::bordered()
        .title(" Gemini API Key ")
        .border_style(Style::default().fg(colors.border_focused()));

    let mut lines = vec![
        Line::from(""),
        Line::styled(
            "  Questions are generated with the Gemini API. Paste your API key below.",
            Style::default().fg(colors.fg()),
        ),
        Line::styled(
            "  It is kept in the quizcraft data directory on this machine.",
            Style::default().fg(colors.text_dim()),
        ),
        Line::from(""),
    ];
    let mut input = app.key_input.to_line(
        Style::default().fg(colors.fg()),
        Style::default().fg(colors.bg()).bg(colors.accent()),
    );
    input.spans.insert(0, Span::styled("  Key: ", Style::default().fg(colors.accent())));
    lines.push(input);
    lines.push(Line::from(""));
    if let Some(error) = error_line(app) {
        lines.push(error);
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        boxed,
    );
}

fn render_welcome(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    let mut menu = Menu::new("quizcraft", "English quizzes for grades 5-8", app.theme)
        .selected(app.menu_selected);
    for (key, label, description) in MENU_ITEMS {
        menu = menu.item(key, label, description);
    }
    frame.render_widget(&menu, centered_box(64, 20, layout[0]));

    if let Some(error) = error_line(app) {
        frame.render_widget(Paragraph::new(error).wrap(Wrap { trim: false }), layout[1]);
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let form = &app.form;
    let boxed = centered_box(72, 18, area);
    let block = Block::bordered()
        .title(" New Quiz ")
        .border_style(Style::default().fg(colors.border_focused()));

    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let selected = field == form.field;
        let value: Line = match field {
            FormField::Grade => Line::raw(format!("Grade {}", form.grade)),
            FormField::Topic => match form.topic {
                TopicChoice::Catalog(_) => Line::raw(form.topic().unwrap_or_default()),
                TopicChoice::Custom if form.editing_topic => form.custom_topic.to_line(
                    Style::default().fg(colors.fg()),
                    Style::default().fg(colors.bg()).bg(colors.accent()),
                ),
                TopicChoice::Custom => match form.topic() {
                    Some(topic) => Line::raw(format!("{topic} (custom)")),
                    None => Line::styled(
                        "(custom topic: press e to type)",
                        Style::default().fg(colors.text_dim()),
                    ),
                },
            },
            FormField::Difficulty => Line::raw(form.difficulty.to_string()),
            FormField::QuestionType => Line::raw(form.question_type.label()),
            FormField::Count => Line::raw(form.count.to_string()),
        };

        let label_style = if selected {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        let marker = if selected { " > " } else { "   " };
        let mut spans = vec![Span::styled(
            format!("{marker}{:<15}", field.label()),
            label_style,
        )];
        spans.push(Span::styled(
            if selected { "\u{2039} " } else { "  " },
            Style::default().fg(colors.text_dim()),
        ));
        spans.extend(value.spans);
        if selected && !form.editing_topic {
            spans.push(Span::styled(" \u{203a}", Style::default().fg(colors.text_dim())));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    if let Some(notice) = &form.notice {
        lines.push(Line::styled(
            format!("  {notice}"),
            Style::default().fg(colors.warning()),
        ));
    }
    if let Some(error) = error_line(app) {
        lines.push(error);
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        boxed,
    );
}

fn render_loading(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
    let colors = &app.theme.colors;
    let elapsed = app.generation_elapsed().unwrap_or_default();
    let spin = SPINNER[(elapsed.as_millis() / 250) as usize % SPINNER.len()];

    let about = app
        .flow
        .settings
        .as_ref()
        .map(|s| format!("{} questions about \"{}\"", s.count, s.topic))
        .unwrap_or_else(|| "questions".to_string());

    let lines = vec![
        Line::from(""),
        Line::styled(
            format!("{spin} Generating {about}..."),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("{}s", elapsed.as_secs()),
            Style::default().fg(colors.text_dim()),
        ),
    ];
    let boxed = centered_box(70, 7, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(Style::default().fg(colors.border()))),
        boxed,
    );
}

fn render_preview(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = match &app.flow.settings {
        Some(s) => format!(
            "Preview \u{00b7} Grade {} \u{00b7} {} \u{00b7} {}",
            s.grade, s.topic, s.difficulty
        ),
        None => "Preview".to_string(),
    };
    let mut list = QuestionList::new(&title, app.theme).scroll(app.scroll);
    for question in &app.flow.questions {
        list.push(question, None);
    }
    frame.render_widget(list, area);
}

fn render_name_entry(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let boxed = centered_box(50, 8, area);
    let block = Block::bordered()
        .title(" Who's playing? ")
        .border_style(Style::default().fg(colors.border_focused()));

    let mut input = app.name_input.to_line(
        Style::default().fg(colors.fg()),
        Style::default().fg(colors.bg()).bg(colors.accent()),
    );
    input.spans.insert(0, Span::styled("  Name: ", Style::default().fg(colors.accent())));

    let count = app.name_input.char_count();
    let max = app.name_input.max_chars().unwrap_or(count);
    let lines = vec![
        Line::from(""),
        input,
        Line::from(""),
        Line::styled(
            format!("  {count}/{max} characters"),
            Style::default().fg(colors.text_dim()),
        ),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), boxed);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(28)])
        .split(layout[0]);

    let time_left = session.time_left();
    let ratio = time_left as f64 / QUESTION_TIME_SECS as f64;
    ProgressBar::new("Time", &format!("{time_left}s"), ratio, app.theme)
        .urgent(time_left <= 10)
        .render(top[0], frame.buffer_mut());

    let score = Paragraph::new(Line::from(vec![
        Span::styled(" Score: ", Style::default().fg(colors.fg())),
        Span::styled(
            session.score().to_string(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({}/{})", session.correct_count(), session.total_questions()),
            Style::default().fg(colors.text_dim()),
        ),
    ]))
    .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(score, top[1]);

    let card = QuestionCard::new(session.current_question(), &app.answer_input, app.theme)
        .position(session.question_number(), session.total_questions())
        .draft(app.draft.as_ref())
        .feedback(session.feedback());
    frame.render_widget(card, layout[1]);
}

fn render_results(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let Some(result) = app.flow.last_result.as_ref() else {
        return;
    };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    let dashboard =
        Dashboard::new(result, &app.flow.player_name, app.theme).rank(app.recorded_rank());
    frame.render_widget(dashboard, layout[0]);

    let table = ScoreTable::new(&app.scores_view, app.theme)
        .highlight(app.recorded_score.as_ref().map(|s| s.id));
    frame.render_widget(table, layout[1]);
}

fn render_grade_pick(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut menu = Menu::new(
        "Choose a grade",
        "Questions are kept per grade and difficulty",
        app.theme,
    )
    .selected(app.pick_selected);
    for grade in Grade::ALL {
        menu = menu.item(grade.as_str(), &format!("Grade {grade}"), "");
    }
    frame.render_widget(&menu, centered_box(52, 12, area));
}

fn render_difficulty_pick(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut menu = Menu::new(
        "Choose a difficulty",
        &format!("Grade {}", app.flow.selected_grade),
        app.theme,
    )
    .selected(app.pick_selected);
    for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
        menu = menu.item(&(i + 1).to_string(), difficulty.as_str(), "");
    }
    frame.render_widget(&menu, centered_box(52, 11, area));
}

fn render_count_pick(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let available = app.flow.candidates.len();
    let max = app.count_max();
    let boxed = centered_box(56, 9, area);
    let lines = vec![
        Line::from(""),
        Line::styled(
            format!("{available} questions available in the bank"),
            Style::default().fg(colors.text_dim()),
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("How many?  \u{2039} ", Style::default().fg(colors.fg())),
            Span::styled(
                app.count_choice.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" \u{203a}  (1-{max})"), Style::default().fg(colors.fg())),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::bordered()
                .title(" Play from Question Bank ")
                .border_style(Style::default().fg(colors.border_focused())),
        ),
        boxed,
    );
}

fn render_bank(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = format!(
        "Question Bank \u{00b7} Grade {} \u{00b7} {} \u{00b7} {} questions",
        app.flow.selected_grade,
        app.flow.selected_difficulty,
        app.bank_view.len()
    );
    let mut list = QuestionList::new(&title, app.theme)
        .scroll(app.scroll)
        .empty_message("No questions saved for this grade and difficulty yet.");
    for stored in &app.bank_view {
        list.push(
            &stored.question,
            Some(format!(
                "{} \u{00b7} {} \u{00b7} {}",
                stored.topic,
                stored.question.kind().label(),
                stored
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
            )),
        );
    }
    frame.render_widget(list, area);
}

fn render_high_scores(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    frame.render_widget(ScoreTable::new(&app.scores_view, app.theme), area);
}

fn render_confirm(frame: &mut ratatui::Frame, app: &App, confirm: Confirm, area: Rect) {
    let colors = &app.theme.colors;
    let message = match confirm {
        Confirm::ClearBank => format!(
            "Delete all saved questions for Grade {} ({})?",
            app.flow.selected_grade, app.flow.selected_difficulty
        ),
        Confirm::ClearScores => "Delete all high scores?".to_string(),
        Confirm::EndQuiz => "End the quiz now? Your score so far will be kept.".to_string(),
    };
    let boxed = centered_box(60, 6, area);
    frame.render_widget(Clear, boxed);
    let lines = vec![
        Line::from(""),
        Line::styled(message, Style::default().fg(colors.fg())),
        Line::styled(
            "[y] Yes   [n] No",
            Style::default()
                .fg(colors.warning())
                .add_modifier(Modifier::BOLD),
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(" Confirm ")
                    .border_style(Style::default().fg(colors.warning()))
                    .style(Style::default().bg(colors.bg())),
            ),
        boxed,
    );
}
