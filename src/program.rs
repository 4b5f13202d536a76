use std::io::Write;
use std::time::{Duration, Instant};

use crate::buffer::DoubleBuffer;
use crate::error::ProgramError;
use crate::event::{Event, Key, KeyCode, MouseButtons, MouseEvent, Size};
use crate::palette::Palette;
use crate::render::RenderContext;

use termwiz::caps::Capabilities;
use termwiz::input::{InputEvent, KeyEvent, Modifiers as TwModifiers, MouseEvent as TwMouseEvent};
use termwiz::terminal::{Terminal, new_terminal};
use tracing::{debug, info};

pub type UpdateFn<Model, Msg> = Box<dyn FnMut(&mut Model, Msg) -> Transition>;
pub type ViewFn<Model> =
    Box<dyn FnMut(&mut Model, &mut RenderContext<'_>) -> Result<(), ProgramError>>;
pub type EventFn<Msg> = Box<dyn Fn(Event, Instant) -> Option<Msg>>;
pub type DeadlineFn<Model> = Box<dyn Fn(&Model, Instant) -> Option<Instant>>;
pub type TickFn<Msg> = Box<dyn Fn(Instant) -> Msg>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Quit,
}

/// Wakes the loop at the model's next deadline and turns it into a message.
struct Timer<Model, Msg> {
    deadline: DeadlineFn<Model>,
    tick: TickFn<Msg>,
}

pub struct Program<Model, Msg> {
    model: Model,
    update: UpdateFn<Model, Msg>,
    view: ViewFn<Model>,
    event_mapper: EventFn<Msg>,
    timer: Option<Timer<Model, Msg>>,
    buffer: DoubleBuffer,
    palette: Palette,
    current_size: Size,
    /// Time used by headless driving; the terminal loop reads the real clock.
    clock: Instant,
}

impl<Model, Msg> Program<Model, Msg> {
    pub fn new(
        model: Model,
        update: impl FnMut(&mut Model, Msg) -> Transition + 'static,
        view: impl FnMut(&mut Model, &mut RenderContext<'_>) -> Result<(), ProgramError> + 'static,
    ) -> Self {
        Self {
            model,
            update: Box::new(update),
            view: Box::new(view),
            event_mapper: Box::new(|_, _| None),
            timer: None,
            buffer: DoubleBuffer::new(usize::from(DEFAULT_WIDTH), usize::from(DEFAULT_HEIGHT)),
            palette: Palette::default(),
            current_size: Size::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            clock: Instant::now(),
        }
    }

    pub fn map_event(
        mut self,
        event_mapper: impl Fn(Event, Instant) -> Option<Msg> + 'static,
    ) -> Self {
        self.event_mapper = Box::new(event_mapper);
        self
    }

    /// Subscribes to the model's deadlines. `deadline` is asked after every
    /// update; once it passes, `tick` builds the message delivered to `update`.
    pub fn with_timer(
        mut self,
        deadline: impl Fn(&Model, Instant) -> Option<Instant> + 'static,
        tick: impl Fn(Instant) -> Msg + 'static,
    ) -> Self {
        self.timer = Some(Timer {
            deadline: Box::new(deadline),
            tick: Box::new(tick),
        });
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Rows of the last rendered frame.
    pub fn screen(&self) -> Vec<String> {
        self.buffer.lines()
    }

    pub fn run(mut self) -> Result<(), ProgramError> {
        let caps = Capabilities::new_from_env().map_err(ProgramError::from)?;
        let mut terminal = new_terminal(caps).map_err(ProgramError::from)?;

        terminal.enter_alternate_screen().map_err(ProgramError::from)?;
        terminal.set_raw_mode().map_err(ProgramError::from)?;

        let result = self.event_loop(&mut terminal);

        // Always attempt to restore terminal state.
        let _ = terminal.set_cooked_mode();
        let _ = terminal.exit_alternate_screen();
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x1b[?25h");
        let _ = stdout.flush();

        result
    }

    /// Delivers an event at the program's clock and renders the result.
    pub fn send(&mut self, event: Event) -> Result<Transition, ProgramError> {
        let now = self.clock;
        let (transition, needs_render) = self.handle_event(event, now);
        if needs_render {
            self.render_frame(now)?;
        }
        Ok(transition)
    }

    /// Moves the program's clock to `now`, firing the timer if it is due.
    pub fn advance_to(&mut self, now: Instant) -> Result<Transition, ProgramError> {
        self.clock = now;
        let transition = self.fire_timer(now);
        self.render_frame(now)?;
        Ok(transition)
    }

    pub fn render_at(&mut self, now: Instant) -> Result<(), ProgramError> {
        self.clock = now;
        self.render_frame(now)
    }

    fn event_loop<T: Terminal>(&mut self, terminal: &mut T) -> Result<(), ProgramError> {
        let size = terminal.get_screen_size().map_err(ProgramError::from)?;
        self.resize(Size::new(clamp_to_u16(size.cols), clamp_to_u16(size.rows)));
        info!(size = ?self.current_size, "event loop started");
        self.present(Instant::now())?;

        loop {
            let timeout = self
                .next_deadline(Instant::now())
                .map(|deadline| deadline.saturating_duration_since(Instant::now()));

            let first_input = terminal
                .poll_input(timeout)
                .map_err(ProgramError::from)?;

            let mut needs_render = false;
            let mut should_quit = false;

            if let Some(input) = first_input
                && let Some(event) = convert_input_event(input)
            {
                let (transition, render_flag) = self.handle_event(event, Instant::now());
                needs_render |= render_flag;
                should_quit |= transition == Transition::Quit;
            }

            while !should_quit
                && let Some(input) = terminal
                    .poll_input(Some(Duration::from_millis(0)))
                    .map_err(ProgramError::from)?
            {
                if let Some(event) = convert_input_event(input) {
                    let (transition, render_flag) = self.handle_event(event, Instant::now());
                    needs_render |= render_flag;
                    should_quit |= transition == Transition::Quit;
                }
            }

            if !should_quit && self.timer_due(Instant::now()) {
                should_quit |= self.fire_timer(Instant::now()) == Transition::Quit;
                needs_render = true;
            }

            if should_quit {
                break;
            }
            if needs_render {
                self.present(Instant::now())?;
            }
        }

        info!("event loop stopped");
        Ok(())
    }

    /// Renders and writes the frame diff to stdout inside a synchronized update.
    fn present(&mut self, now: Instant) -> Result<(), ProgramError> {
        self.render_frame(now)?;
        let mut out = Vec::new();
        // raw escape codes for `Synchronized Output`
        out.extend_from_slice(b"\x1b[?2026h");
        self.buffer.flush(&mut out)?;
        out.extend_from_slice(b"\x1b[?2026l");

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&out)?;
        stdout.flush()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, now: Instant) -> (Transition, bool) {
        let mut needs_render = false;

        if let Event::Resize(size) = &event {
            self.resize(*size);
            needs_render = true;
        }

        let transition = match (self.event_mapper)(event, now) {
            Some(message) => {
                let transition = (self.update)(&mut self.model, message);
                needs_render |= transition == Transition::Continue;
                transition
            }
            None => Transition::Continue,
        };

        (transition, needs_render)
    }

    fn resize(&mut self, size: Size) {
        if size != self.current_size {
            info!(?size, "terminal resized");
        }
        self.current_size = size;
        self.buffer
            .resize(usize::from(size.width), usize::from(size.height));
    }

    fn next_deadline(&self, now: Instant) -> Option<Instant> {
        self.timer
            .as_ref()
            .and_then(|timer| (timer.deadline)(&self.model, now))
    }

    fn timer_due(&self, now: Instant) -> bool {
        self.next_deadline(now).is_some_and(|deadline| deadline <= now)
    }

    fn fire_timer(&mut self, now: Instant) -> Transition {
        if !self.timer_due(now) {
            return Transition::Continue;
        }
        let Some(timer) = &self.timer else {
            return Transition::Continue;
        };
        debug!("timer fired");
        let message = (timer.tick)(now);
        (self.update)(&mut self.model, message)
    }

    fn render_frame(&mut self, now: Instant) -> Result<(), ProgramError> {
        self.buffer.clear();
        let mut ctx = RenderContext::new(&mut self.buffer, &self.palette, now);
        (self.view)(&mut self.model, &mut ctx)
    }
}

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;

fn convert_input_event(input: InputEvent) -> Option<Event> {
    debug!("termwiz input event: {:?}", input);
    match input {
        InputEvent::Key(key) => map_key_event(key),
        InputEvent::Mouse(mouse) => map_mouse_event(mouse),
        InputEvent::Paste(text) => Some(Event::Paste(text)),
        InputEvent::Resized { cols, rows } => Some(Event::Resize(Size::new(
            clamp_to_u16(cols),
            clamp_to_u16(rows),
        ))),
        _ => None,
    }
}

fn map_mouse_event(mouse: TwMouseEvent) -> Option<Event> {
    use termwiz::input::MouseButtons as TwButtons;
    let mut buttons = MouseButtons::new(
        mouse.mouse_buttons.contains(TwButtons::LEFT),
        mouse.mouse_buttons.contains(TwButtons::RIGHT),
        mouse.mouse_buttons.contains(TwButtons::MIDDLE),
    );
    if mouse.mouse_buttons.contains(TwButtons::VERT_WHEEL) {
        buttons.vert_wheel = true;
        buttons.wheel_positive = mouse.mouse_buttons.contains(TwButtons::WHEEL_POSITIVE);
    }
    if mouse.mouse_buttons.contains(TwButtons::HORZ_WHEEL) {
        buttons.horz_wheel = true;
        buttons.wheel_positive = mouse.mouse_buttons.contains(TwButtons::WHEEL_POSITIVE);
    }
    Some(Event::Mouse(MouseEvent::with_modifiers(
        // termwiz mouse x/y are 1 indexed
        mouse.x.saturating_sub(1),
        mouse.y.saturating_sub(1),
        buttons,
        mouse.modifiers.contains(TwModifiers::CTRL),
        mouse.modifiers.contains(TwModifiers::ALT),
        mouse.modifiers.contains(TwModifiers::SHIFT),
    )))
}

fn map_key_event(key: KeyEvent) -> Option<Event> {
    let code = map_key_code(key.key)?;
    let modifiers = key.modifiers;
    let event_key = Key {
        code,
        ctrl: modifiers.contains(TwModifiers::CTRL),
        alt: modifiers.contains(TwModifiers::ALT),
        shift: modifiers.contains(TwModifiers::SHIFT),
    };
    Some(Event::Key(event_key))
}

fn map_key_code(code: termwiz::input::KeyCode) -> Option<KeyCode> {
    use termwiz::input::KeyCode as TwKeyCode;

    match code {
        TwKeyCode::Char(c) => Some(KeyCode::Char(c)),
        TwKeyCode::Enter => Some(KeyCode::Enter),
        TwKeyCode::Escape => Some(KeyCode::Esc),
        TwKeyCode::Tab => Some(KeyCode::Tab),
        TwKeyCode::Backspace => Some(KeyCode::Backspace),
        TwKeyCode::Delete => Some(KeyCode::Delete),
        TwKeyCode::LeftArrow => Some(KeyCode::Left),
        TwKeyCode::RightArrow => Some(KeyCode::Right),
        TwKeyCode::UpArrow => Some(KeyCode::Up),
        TwKeyCode::DownArrow => Some(KeyCode::Down),
        TwKeyCode::Home => Some(KeyCode::Home),
        TwKeyCode::End => Some(KeyCode::End),
        TwKeyCode::PageUp => Some(KeyCode::PageUp),
        TwKeyCode::PageDown => Some(KeyCode::PageDown),
        _ => None,
    }
}

fn clamp_to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CellAttributes;
    use crate::palette::Rgba;

    #[derive(Default)]
    struct CounterModel {
        count: i32,
        due: Option<Instant>,
        ticks: usize,
        painted_with: Option<Rgba>,
    }

    enum Msg {
        Increment,
        Schedule(Instant),
        Tick,
        Quit,
    }

    fn update(model: &mut CounterModel, msg: Msg) -> Transition {
        match msg {
            Msg::Increment => model.count += 1,
            Msg::Schedule(at) => model.due = Some(at),
            Msg::Tick => {
                model.due = None;
                model.ticks += 1;
            }
            Msg::Quit => return Transition::Quit,
        }
        Transition::Continue
    }

    fn view(model: &mut CounterModel, ctx: &mut RenderContext<'_>) -> Result<(), ProgramError> {
        model.painted_with = Some(ctx.palette().foreground);
        ctx.write_text(0, 0, &format!("count: {}", model.count), &CellAttributes::default());
        Ok(())
    }

    fn program() -> Program<CounterModel, Msg> {
        Program::new(CounterModel::default(), update, view)
            .map_event(|event, now| match event {
                Event::Key(key) if key.code == KeyCode::Char('+') => Some(Msg::Increment),
                Event::Key(key) if key.code == KeyCode::Char('q') => Some(Msg::Quit),
                Event::Key(key) if key.code == KeyCode::Char('s') => {
                    Some(Msg::Schedule(now + Duration::from_millis(100)))
                }
                _ => None,
            })
            .with_timer(|model, _| model.due, |_| Msg::Tick)
    }

    #[test]
    fn send_updates_model_and_rerenders() {
        let mut program = program();

        let transition = program
            .send(Event::key(KeyCode::Char('+')))
            .expect("send should succeed");

        assert_eq!(transition, Transition::Continue);
        assert!(program.screen()[0].starts_with("count: 1"));
    }

    #[test]
    fn send_produces_quit_transition() {
        let mut program = program();

        let transition = program
            .send(Event::key(KeyCode::Char('q')))
            .expect("send should succeed");

        assert_eq!(transition, Transition::Quit);
    }

    #[test]
    fn resize_resizes_the_screen() {
        let mut program = program();

        program
            .send(Event::resize(12, 2))
            .expect("resize should succeed");

        assert_eq!(program.screen(), vec!["count: 0    ", "            "]);
    }

    #[test]
    fn timer_fires_once_its_deadline_passes() {
        let start = Instant::now();
        let mut program = program();
        program.render_at(start).expect("render should succeed");
        program
            .send(Event::key(KeyCode::Char('s')))
            .expect("send should succeed");

        program
            .advance_to(start + Duration::from_millis(99))
            .expect("advance should succeed");
        assert_eq!(program.model().ticks, 0);

        program
            .advance_to(start + Duration::from_millis(100))
            .expect("advance should succeed");
        program
            .advance_to(start + Duration::from_millis(500))
            .expect("advance should succeed");
        assert_eq!(program.model().ticks, 1);
    }

    #[test]
    fn frames_are_drawn_with_the_configured_palette() {
        let foreground = Rgba::opaque(0x12, 0x34, 0x56);
        let mut program = program().with_palette(Palette {
            foreground,
            ..Palette::default()
        });

        program
            .render_at(Instant::now())
            .expect("render should succeed");

        assert_eq!(program.model().painted_with, Some(foreground));
    }

    #[test]
    fn maps_termwiz_keys() {
        use termwiz::input::KeyCode as TwKeyCode;

        assert_eq!(map_key_code(TwKeyCode::Tab), Some(KeyCode::Tab));
        assert_eq!(map_key_code(TwKeyCode::PageDown), Some(KeyCode::PageDown));
        assert_eq!(map_key_code(TwKeyCode::Function(1)), None);
    }

    #[test]
    fn paste_becomes_a_paste_event() {
        assert_eq!(
            convert_input_event(InputEvent::Paste("hi".to_owned())),
            Some(Event::Paste("hi".to_owned()))
        );
    }
}
