use std::panic;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use smart_complete::buffer::CellAttributes;
use smart_complete::event::{Event, KeyCode};
use smart_complete::{
    Program, ProgramError, Props, Rect, RenderContext, Rgba, SmartCompleteState, Stylesheet,
    Theme, Transition,
};
use termwiz::escape::CSI;
use termwiz::escape::csi::{DecPrivateMode, DecPrivateModeCode, Mode};
use tracing::info;

/// Multi-line text field with inline suggestions. Tab accepts the grey text.
#[derive(Debug, Parser)]
#[command(name = "smart-complete-demo", version)]
struct Args {
    /// JSON theme (camelCase keys, e.g. `{"completionColor": "#6a9955"}`).
    #[arg(long)]
    theme: Option<PathBuf>,
    /// JSON stylesheet mapping class names to styles.
    #[arg(long)]
    stylesheet: Option<PathBuf>,
    /// Visible text rows.
    #[arg(long, default_value_t = smart_complete::DEFAULT_ROWS)]
    rows: u16,
    /// Drop the built-in classes and styles.
    #[arg(long)]
    unstyled: bool,
    /// Color of the suggestion text, `#rrggbb` or `#rrggbbaa`.
    #[arg(long)]
    completion_color: Option<String>,
    #[arg(long, default_value = "smart-complete.log")]
    log_file: PathBuf,
}

struct Settings {
    rows: u16,
    unstyled: bool,
    theme: Option<Theme>,
    stylesheet: Rc<Stylesheet>,
    completion_color: Option<Rgba>,
}

struct Model {
    value: String,
    completion: String,
    accepted: Vec<String>,
    state: SmartCompleteState,
    settings: Settings,
}

enum Msg {
    Input(Event, Instant),
    Tick(Instant),
    Changed(String),
    Accepted(String),
}

impl Model {
    fn new(settings: Settings) -> Self {
        let state = SmartCompleteState::new(&props_for("", "", &settings));
        Self {
            value: String::new(),
            completion: String::new(),
            accepted: Vec::new(),
            state,
            settings,
        }
    }

    fn props(&self) -> Props<Msg> {
        props_for(&self.value, &self.completion, &self.settings)
    }
}

fn props_for(value: &str, completion: &str, settings: &Settings) -> Props<Msg> {
    let mut props = Props::new(value, Msg::Changed)
        .with_completion(completion)
        .with_placeholder("Start typing... try \"Hello\", \"How are\" or \"Let me\"")
        .with_rows(settings.rows)
        .with_auto_focus(true)
        .with_unstyled(settings.unstyled)
        .with_stylesheet(Rc::clone(&settings.stylesheet))
        .on_accept(Msg::Accepted);
    if let Some(theme) = &settings.theme {
        props = props.with_theme(theme.clone());
    }
    if let Some(color) = settings.completion_color {
        props = props.with_completion_color(color);
    }
    props
}

fn update(model: &mut Model, msg: Msg) -> Transition {
    match msg {
        Msg::Input(Event::Key(key), _)
            if key.code == KeyCode::Esc || (key.ctrl && key.code == KeyCode::Char('c')) =>
        {
            Transition::Quit
        }
        Msg::Input(event, now) => {
            let props = model.props();
            let outcome = model.state.handle_event(&props, &event, now);
            apply_all(model, outcome.into_messages())
        }
        Msg::Tick(now) => {
            let props = model.props();
            let messages = model.state.tick(&props, now);
            apply_all(model, messages)
        }
        Msg::Changed(value) => {
            model.completion = suggest(&value).to_owned();
            model.value = value;
            Transition::Continue
        }
        Msg::Accepted(value) => {
            info!(%value, "suggestion accepted");
            model.accepted.push(value);
            Transition::Continue
        }
    }
}

fn apply_all(model: &mut Model, messages: Vec<Msg>) -> Transition {
    for message in messages {
        if update(model, message) == Transition::Quit {
            return Transition::Quit;
        }
    }
    Transition::Continue
}

fn view(model: &mut Model, ctx: &mut RenderContext<'_>) -> Result<(), ProgramError> {
    let area = ctx.area();
    let header = CellAttributes {
        bold: true,
        ..CellAttributes::default()
    };
    ctx.write_text(0, 0, "Smart autocomplete (Tab accepts, Esc quits)", &header);

    let field_height = usize::from(model.settings.rows) + 4;
    let field = Rect::new(0, 1, area.width, field_height);
    let props = model.props();
    {
        let mut field_ctx = ctx.with_area(field);
        model.state.render(&props, &mut field_ctx)?;
    }

    let dim = CellAttributes {
        dim: true,
        ..CellAttributes::default()
    };
    let mut row = field.bottom() + 1;
    let accessibility = model.state.accessibility(&props);
    if let Some(hint) = &accessibility.hint {
        ctx.write_text(0, row, &hint.text, &dim);
    }
    row += 1;

    let snapshot = serde_json::json!({
        "text": model.value,
        "completion": model.completion,
    });
    ctx.write_text(0, row, &snapshot.to_string(), &dim);
    row += 1;

    if let Some(last) = model.accepted.last() {
        ctx.write_text(0, row, &format!("accepted: {last:?}"), &dim);
    }
    Ok(())
}

/// Suggestions keyed on how the text ends, ignoring case.
fn suggest(text: &str) -> &'static str {
    const PATTERNS: [(&str, &str); 5] = [
        ("hello", " there!"),
        ("how are", " you?"),
        ("good", " morning!"),
        ("thank you", " for your time"),
        ("let me", " know if you have any questions"),
    ];

    let lower = text.to_lowercase();
    PATTERNS
        .iter()
        .find(|(ending, _)| lower.ends_with(ending))
        .map_or("", |(_, completion)| completion)
}

fn load_settings(args: &Args) -> color_eyre::Result<Settings> {
    let theme = args
        .theme
        .as_ref()
        .map(|path| {
            Theme::load(path).wrap_err_with(|| format!("loading theme {}", path.display()))
        })
        .transpose()?;

    let stylesheet = match &args.stylesheet {
        Some(path) => Stylesheet::load(path)
            .wrap_err_with(|| format!("loading stylesheet {}", path.display()))?,
        None => Stylesheet::base(),
    };

    let completion_color = args
        .completion_color
        .as_deref()
        .map(Rgba::parse)
        .transpose()
        .wrap_err("parsing --completion-color")?;

    if args.rows == 0 {
        return Err(eyre!("--rows must be at least 1"));
    }

    Ok(Settings {
        rows: args.rows,
        unstyled: args.unstyled,
        theme,
        stylesheet: Rc::new(stylesheet),
        completion_color,
    })
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();
    install_panic_hook()?;
    init_tracing(&args.log_file)?;

    let settings = load_settings(&args)?;
    info!(rows = settings.rows, unstyled = settings.unstyled, "starting demo");

    Program::new(Model::new(settings), update, view)
        .map_event(|event, now| Some(Msg::Input(event, now)))
        .with_timer(
            |model: &Model, now| model.state.next_deadline(now),
            Msg::Tick,
        )
        .run()
        .map_err(|err| eyre!(format!("{err:?}")))?;

    Ok(())
}

fn init_tracing(log_path: &std::path::Path) -> color_eyre::Result<()> {
    use std::fs::File;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    File::options().create(true).append(true).open(log_path)?;

    let writer = tracing_subscriber::fmt::writer::BoxMakeWriter::new({
        let log_path = log_path.to_path_buf();
        move || {
            File::options()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("log file should remain writable")
        }
    });

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .map_err(|error| eyre!(error))?;

    Ok(())
}

#[cfg(unix)]
fn install_panic_hook() -> color_eyre::Result<()> {
    use std::io::{self, Write};
    use std::os::fd::AsRawFd;
    use termios::{TCSANOW, Termios, tcsetattr};

    let stdout = std::io::stdout();
    let fd = stdout.as_raw_fd();
    let base_termios = Termios::from_fd(fd)?;

    panic::set_hook(Box::new(move |panic| {
        let _ = tcsetattr(fd, TCSANOW, &base_termios);
        let mut stderr = io::stderr();

        let restore_sequences = [
            CSI::Mode(Mode::ResetDecPrivateMode(DecPrivateMode::Code(
                DecPrivateModeCode::ClearAndEnableAlternateScreen,
            ))),
            CSI::Mode(Mode::ResetDecPrivateMode(DecPrivateMode::Code(
                DecPrivateModeCode::BracketedPaste,
            ))),
            CSI::Mode(Mode::ResetDecPrivateMode(DecPrivateMode::Code(
                DecPrivateModeCode::AnyEventMouse,
            ))),
            CSI::Mode(Mode::ResetDecPrivateMode(DecPrivateMode::Code(
                DecPrivateModeCode::SGRMouse,
            ))),
            CSI::Mode(Mode::SetDecPrivateMode(DecPrivateMode::Code(
                DecPrivateModeCode::ShowCursor,
            ))),
        ];

        for sequence in restore_sequences {
            let _ = write!(stderr, "{}", sequence);
        }
        let _ = stderr.flush();

        report_panic(panic);
    }));

    Ok(())
}

#[cfg(not(unix))]
fn install_panic_hook() -> color_eyre::Result<()> {
    panic::set_hook(Box::new(|panic| report_panic(panic)));
    Ok(())
}

fn report_panic(panic: &panic::PanicHookInfo<'_>) {
    match color_eyre::config::HookBuilder::default().try_into_hooks() {
        Ok((hook, _)) => eprintln!("{}", hook.panic_report(panic)),
        Err(_) => eprintln!("{panic}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_complete::ACCEPT_DELAY;

    #[test]
    fn suggestions_match_endings_ignoring_case() {
        assert_eq!(suggest("Hello"), " there!");
        assert_eq!(suggest("so, HOW ARE"), " you?");
        assert_eq!(suggest("Let me"), " know if you have any questions");
        assert_eq!(suggest("hello there!"), "");
        assert_eq!(suggest(""), "");
    }

    #[test]
    fn accepting_a_suggestion_commits_it_after_the_delay() {
        let mut model = Model::new(Settings {
            rows: 3,
            unstyled: false,
            theme: None,
            stylesheet: Rc::new(Stylesheet::base()),
            completion_color: None,
        });
        let start = Instant::now();

        update(&mut model, Msg::Input(Event::Paste("Hello".to_owned()), start));
        assert_eq!(model.completion, " there!");

        update(&mut model, Msg::Input(Event::key(KeyCode::Tab), start));
        assert!(model.state.next_deadline(start).is_some());
        update(&mut model, Msg::Tick(start + ACCEPT_DELAY));

        assert_eq!(model.value, "Hello there!");
        assert_eq!(model.completion, "");
        assert_eq!(model.accepted, vec!["Hello there!".to_owned()]);
    }

    #[test]
    fn escape_quits() {
        let mut model = Model::new(Settings {
            rows: 3,
            unstyled: true,
            theme: None,
            stylesheet: Rc::new(Stylesheet::base()),
            completion_color: None,
        });

        let transition = update(&mut model, Msg::Input(Event::key(KeyCode::Esc), Instant::now()));

        assert_eq!(transition, Transition::Quit);
    }
}
