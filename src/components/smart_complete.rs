//! Multi-line text input with inline ghost-text completion.
//!
//! The widget is controlled: the host owns `value` and `completion` and passes
//! them in through [`Props`] on every call. Edits and accepted completions come
//! back as messages built by the host's handlers.
//!
//! Rendering stacks three layers in one box: the container, the overlay with
//! `value + completion` where only the completion is visible, and the live
//! text area on top. The overlay's scroll position is copied from the text
//! area after every layout and after every scroll, before anything is painted.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::a11y::Accessibility;
use crate::box_layout::{self, BoxLayout, BoxSpec};
use crate::buffer::CellAttributes;
use crate::components::accept::{AcceptPhase, AcceptState};
use crate::components::overlay::OverlayState;
use crate::components::textarea::{self, EditPolicy, TextAreaMsg, TextAreaState};
use crate::error::ProgramError;
use crate::event::{Cancelable, Event, FocusEvent, Key, KeyCode, MouseEvent, ScrollEvent};
use crate::geometry::Point;
use crate::palette::Rgba;
use crate::render::{RenderContext, appearance_to_attributes};
use crate::scroll::{ScrollDelta, ScrollOffset};
use crate::style::classes::CallerClasses;
use crate::style::{self, Style, StyleInputs, StyleResolution, Stylesheet, Theme};
use crate::text_layout::TextLayout;

pub const DEFAULT_ROWS: u16 = 5;
pub const DEFAULT_ACCEPT_KEY: KeyCode = KeyCode::Tab;
/// Rows scrolled per wheel notch.
pub const WHEEL_STEP: i32 = 1;
/// Repaint interval while the ghost text fades out.
pub const FADE_FRAME: Duration = Duration::from_millis(16);

pub type ValueHandler<Msg> = Rc<dyn Fn(String) -> Msg>;
/// Runs before the widget's own handling. Calling `prevent_default` on the
/// event suppresses it.
pub type PassThrough<E, Msg> = Rc<dyn Fn(&mut Cancelable<E>) -> Option<Msg>>;

/// Everything the host supplies, rebuilt from the host's model on each pass.
pub struct Props<Msg> {
    pub value: String,
    pub completion: String,
    pub placeholder: String,
    pub rows: u16,
    pub disabled: bool,
    pub read_only: bool,
    pub required: bool,
    pub auto_focus: bool,
    pub name: Option<String>,
    pub id: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub accept_key: KeyCode,
    pub class_name: Option<String>,
    pub input_class_name: Option<String>,
    pub overlay_class_name: Option<String>,
    pub completion_class_name: Option<String>,
    pub style: Option<Style>,
    pub input_style: Option<Style>,
    pub completion_style: Option<Style>,
    pub completion_color: Option<Rgba>,
    pub theme: Option<Theme>,
    pub unstyled: bool,
    pub stylesheet: Rc<Stylesheet>,
    on_change: ValueHandler<Msg>,
    on_accept: Option<ValueHandler<Msg>>,
    on_key_down: Option<PassThrough<Key, Msg>>,
    on_key_up: Option<PassThrough<Key, Msg>>,
    on_focus: Option<PassThrough<FocusEvent, Msg>>,
    on_blur: Option<PassThrough<FocusEvent, Msg>>,
    on_scroll: Option<PassThrough<ScrollEvent, Msg>>,
}

impl<Msg> Clone for Props<Msg> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            completion: self.completion.clone(),
            placeholder: self.placeholder.clone(),
            rows: self.rows,
            disabled: self.disabled,
            read_only: self.read_only,
            required: self.required,
            auto_focus: self.auto_focus,
            name: self.name.clone(),
            id: self.id.clone(),
            min_length: self.min_length,
            max_length: self.max_length,
            accept_key: self.accept_key,
            class_name: self.class_name.clone(),
            input_class_name: self.input_class_name.clone(),
            overlay_class_name: self.overlay_class_name.clone(),
            completion_class_name: self.completion_class_name.clone(),
            style: self.style.clone(),
            input_style: self.input_style.clone(),
            completion_style: self.completion_style.clone(),
            completion_color: self.completion_color,
            theme: self.theme.clone(),
            unstyled: self.unstyled,
            stylesheet: Rc::clone(&self.stylesheet),
            on_change: Rc::clone(&self.on_change),
            on_accept: self.on_accept.clone(),
            on_key_down: self.on_key_down.clone(),
            on_key_up: self.on_key_up.clone(),
            on_focus: self.on_focus.clone(),
            on_blur: self.on_blur.clone(),
            on_scroll: self.on_scroll.clone(),
        }
    }
}

impl<Msg> Props<Msg> {
    pub fn new(value: impl Into<String>, on_change: impl Fn(String) -> Msg + 'static) -> Self {
        Self {
            value: value.into(),
            completion: String::new(),
            placeholder: String::new(),
            rows: DEFAULT_ROWS,
            disabled: false,
            read_only: false,
            required: false,
            auto_focus: false,
            name: None,
            id: None,
            min_length: None,
            max_length: None,
            accept_key: DEFAULT_ACCEPT_KEY,
            class_name: None,
            input_class_name: None,
            overlay_class_name: None,
            completion_class_name: None,
            style: None,
            input_style: None,
            completion_style: None,
            completion_color: None,
            theme: None,
            unstyled: false,
            stylesheet: Rc::new(Stylesheet::base()),
            on_change: Rc::new(on_change),
            on_accept: None,
            on_key_down: None,
            on_key_up: None,
            on_focus: None,
            on_blur: None,
            on_scroll: None,
        }
    }

    pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
        self.completion = completion.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_rows(mut self, rows: u16) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_accept_key(mut self, key: KeyCode) -> Self {
        self.accept_key = key;
        self
    }

    pub fn with_class_name(mut self, classes: impl Into<String>) -> Self {
        self.class_name = Some(classes.into());
        self
    }

    pub fn with_input_class_name(mut self, classes: impl Into<String>) -> Self {
        self.input_class_name = Some(classes.into());
        self
    }

    pub fn with_overlay_class_name(mut self, classes: impl Into<String>) -> Self {
        self.overlay_class_name = Some(classes.into());
        self
    }

    pub fn with_completion_class_name(mut self, classes: impl Into<String>) -> Self {
        self.completion_class_name = Some(classes.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_input_style(mut self, style: Style) -> Self {
        self.input_style = Some(style);
        self
    }

    pub fn with_completion_style(mut self, style: Style) -> Self {
        self.completion_style = Some(style);
        self
    }

    pub fn with_completion_color(mut self, color: Rgba) -> Self {
        self.completion_color = Some(color);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_unstyled(mut self, unstyled: bool) -> Self {
        self.unstyled = unstyled;
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: Rc<Stylesheet>) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    pub fn on_accept(mut self, handler: impl Fn(String) -> Msg + 'static) -> Self {
        self.on_accept = Some(Rc::new(handler));
        self
    }

    pub fn on_key_down(
        mut self,
        handler: impl Fn(&mut Cancelable<Key>) -> Option<Msg> + 'static,
    ) -> Self {
        self.on_key_down = Some(Rc::new(handler));
        self
    }

    pub fn on_key_up(
        mut self,
        handler: impl Fn(&mut Cancelable<Key>) -> Option<Msg> + 'static,
    ) -> Self {
        self.on_key_up = Some(Rc::new(handler));
        self
    }

    pub fn on_focus(
        mut self,
        handler: impl Fn(&mut Cancelable<FocusEvent>) -> Option<Msg> + 'static,
    ) -> Self {
        self.on_focus = Some(Rc::new(handler));
        self
    }

    pub fn on_blur(
        mut self,
        handler: impl Fn(&mut Cancelable<FocusEvent>) -> Option<Msg> + 'static,
    ) -> Self {
        self.on_blur = Some(Rc::new(handler));
        self
    }

    pub fn on_scroll(
        mut self,
        handler: impl Fn(&mut Cancelable<ScrollEvent>) -> Option<Msg> + 'static,
    ) -> Self {
        self.on_scroll = Some(Rc::new(handler));
        self
    }

    fn style_inputs(&self) -> StyleInputs<'_> {
        StyleInputs {
            stylesheet: &self.stylesheet,
            classes: CallerClasses {
                container: self.class_name.as_deref(),
                input: self.input_class_name.as_deref(),
                overlay: self.overlay_class_name.as_deref(),
                completion: self.completion_class_name.as_deref(),
            },
            unstyled: self.unstyled,
            style: self.style.as_ref(),
            input_style: self.input_style.as_ref(),
            completion_style: self.completion_style.as_ref(),
            completion_color: self.completion_color,
            theme: self.theme.as_ref(),
        }
    }

    /// Final attributes of every part, built fresh from the current props.
    pub fn resolve_styles(&self) -> StyleResolution {
        style::resolve(&self.style_inputs())
    }

    fn edit_policy(&self) -> EditPolicy {
        EditPolicy {
            editable: !self.read_only,
            max_length: self.max_length,
        }
    }
}

/// Messages produced while handling one event.
#[derive(Debug)]
pub struct Outcome<Msg> {
    pub messages: Vec<Msg>,
    /// The event's default action was suppressed, by the widget or by a
    /// pass-through handler. Hosts skip their own handling (focus navigation
    /// on Tab, for example) when this is set.
    pub default_prevented: bool,
    /// The widget consumed the event.
    pub handled: bool,
}

impl<Msg> Default for Outcome<Msg> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            default_prevented: false,
            handled: false,
        }
    }
}

impl<Msg> Outcome<Msg> {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn into_messages(self) -> Vec<Msg> {
        self.messages
    }

    fn handled(mut self) -> Self {
        self.handled = true;
        self
    }

    fn push(&mut self, msg: Option<Msg>) {
        self.messages.extend(msg);
    }
}

/// Constraint validation results, mirroring a form control's validity state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Validity {
    pub value_missing: bool,
    pub too_short: bool,
    pub too_long: bool,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        !(self.value_missing || self.too_short || self.too_long)
    }
}

/// Name and value submitted with a form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormEntry {
    pub name: String,
    pub value: String,
}

/// Per-instance state of the widget.
#[derive(Debug)]
pub struct SmartCompleteState {
    textarea: TextAreaState,
    overlay: OverlayState,
    accept: AcceptState,
    boxes: Option<BoxLayout>,
}

impl SmartCompleteState {
    pub fn new<Msg>(props: &Props<Msg>) -> Self {
        let mut textarea = TextAreaState::new(&props.value);
        if props.auto_focus && !props.disabled {
            textarea.set_focused(true);
        }
        Self {
            textarea,
            overlay: OverlayState::new(),
            accept: AcceptState::new(&props.value, &props.completion),
            boxes: None,
        }
    }

    /// Adopts the host's current value and completion.
    pub fn sync<Msg>(&mut self, props: &Props<Msg>) {
        self.textarea.sync_value(&props.value);
        self.accept.observe(&props.value, &props.completion);
        if props.disabled && self.textarea.is_focused() {
            self.textarea.set_focused(false);
        }
    }

    pub fn handle_event<Msg>(
        &mut self,
        props: &Props<Msg>,
        event: &Event,
        now: Instant,
    ) -> Outcome<Msg> {
        self.sync(props);
        if props.disabled {
            return Outcome::ignored();
        }

        match event {
            Event::Key(key) if self.textarea.is_focused() => self.key_down(props, *key, now),
            Event::KeyUp(key) if self.textarea.is_focused() => self.key_up(props, *key),
            Event::Paste(text) if self.textarea.is_focused() => {
                self.edit(props, TextAreaMsg::Insert(text.clone()))
            }
            Event::Mouse(mouse) => self.mouse(props, mouse),
            Event::FocusGained => self.focus(props),
            Event::FocusLost => self.blur(props),
            _ => Outcome::ignored(),
        }
    }

    fn key_down<Msg>(&mut self, props: &Props<Msg>, key: Key, now: Instant) -> Outcome<Msg> {
        let mut outcome = Outcome::default();
        let mut cancelable = Cancelable::new(key);
        if let Some(handler) = &props.on_key_down {
            outcome.push(handler(&mut cancelable));
        }
        if cancelable.is_default_prevented() {
            trace!(?key, "key handling prevented by host");
            outcome.default_prevented = true;
            return outcome.handled();
        }

        if key.code == props.accept_key && !key.shift {
            if self.accept.accept(now) {
                outcome.default_prevented = true;
                return outcome.handled();
            }
            if key.code == KeyCode::Tab {
                return outcome;
            }
        }

        let Some(msg) = textarea::default_keybindings(key) else {
            return outcome;
        };
        let edited = self.edit(props, msg);
        outcome.messages.extend(edited.messages);
        outcome.handled()
    }

    fn key_up<Msg>(&mut self, props: &Props<Msg>, key: Key) -> Outcome<Msg> {
        let mut outcome = Outcome::default();
        let mut cancelable = Cancelable::new(key);
        if let Some(handler) = &props.on_key_up {
            outcome.push(handler(&mut cancelable));
        }
        outcome.default_prevented = cancelable.is_default_prevented();
        outcome
    }

    fn edit<Msg>(&mut self, props: &Props<Msg>, msg: TextAreaMsg) -> Outcome<Msg> {
        let mut outcome = Outcome::default();
        if let Some(value) = self.textarea.update(msg, props.edit_policy()) {
            outcome.messages.push((props.on_change)(value));
        }
        self.sync_overlay_scroll();
        outcome.handled()
    }

    fn mouse<Msg>(&mut self, props: &Props<Msg>, mouse: &MouseEvent) -> Outcome<Msg> {
        let point = Point::new(usize::from(mouse.x), usize::from(mouse.y));
        let inside = self.boxes.is_some_and(|boxes| boxes.input.contains(point));

        if let Some(delta) = mouse.wheel_delta(WHEEL_STEP) {
            if !inside {
                return Outcome::ignored();
            }
            return self.wheel(props, delta);
        }

        if !mouse.buttons.left {
            return Outcome::ignored();
        }
        if !inside {
            return if self.textarea.is_focused() {
                self.blur(props)
            } else {
                Outcome::ignored()
            };
        }

        let mut outcome = self.focus(props);
        if self.textarea.is_focused() {
            self.textarea.update(
                TextAreaMsg::PlaceCaret {
                    x: point.x,
                    y: point.y,
                },
                props.edit_policy(),
            );
            self.sync_overlay_scroll();
        }
        outcome.handled = true;
        outcome
    }

    fn wheel<Msg>(&mut self, props: &Props<Msg>, delta: ScrollDelta) -> Outcome<Msg> {
        let target = self.textarea.scroll_target(delta);
        if target == self.textarea.scroll() {
            return Outcome::ignored();
        }

        let mut outcome = Outcome::default();
        let mut cancelable = Cancelable::new(ScrollEvent {
            offset: target,
            delta,
        });
        if let Some(handler) = &props.on_scroll {
            outcome.push(handler(&mut cancelable));
        }
        if cancelable.is_default_prevented() {
            outcome.default_prevented = true;
            return outcome.handled();
        }

        self.textarea.scroll_to(target);
        self.sync_overlay_scroll();
        outcome.handled()
    }

    /// Focuses the input, running the focus handler first.
    pub fn focus<Msg>(&mut self, props: &Props<Msg>) -> Outcome<Msg> {
        if props.disabled || self.textarea.is_focused() {
            return Outcome::ignored();
        }
        let mut outcome = Outcome::default();
        let mut cancelable = Cancelable::new(FocusEvent { focused: true });
        if let Some(handler) = &props.on_focus {
            outcome.push(handler(&mut cancelable));
        }
        if cancelable.is_default_prevented() {
            outcome.default_prevented = true;
            return outcome.handled();
        }
        self.textarea.set_focused(true);
        self.sync_overlay_scroll();
        outcome.handled()
    }

    pub fn blur<Msg>(&mut self, props: &Props<Msg>) -> Outcome<Msg> {
        if !self.textarea.is_focused() {
            return Outcome::ignored();
        }
        let mut outcome = Outcome::default();
        let mut cancelable = Cancelable::new(FocusEvent { focused: false });
        if let Some(handler) = &props.on_blur {
            outcome.push(handler(&mut cancelable));
        }
        if cancelable.is_default_prevented() {
            outcome.default_prevented = true;
            return outcome.handled();
        }
        self.textarea.set_focused(false);
        outcome.handled()
    }

    /// Scrolls the input programmatically. The overlay follows immediately.
    pub fn scroll_by(&mut self, delta: ScrollDelta) -> bool {
        let changed = self.textarea.scroll_by(delta);
        self.sync_overlay_scroll();
        changed
    }

    pub fn scroll_to(&mut self, offset: ScrollOffset) -> bool {
        let changed = self.textarea.scroll_to(offset);
        self.sync_overlay_scroll();
        changed
    }

    fn sync_overlay_scroll(&mut self) {
        if self.boxes.is_some() {
            self.textarea.after_layout();
        }
        let offset = self.textarea.scroll();
        if self.overlay.scroll() != offset {
            trace!(%offset, "overlay scroll synced");
        }
        self.overlay.sync_scroll(offset);
    }

    /// Delivers a pending commit once its delay has elapsed: the change
    /// message with the composed value, then the accept message.
    pub fn tick<Msg>(&mut self, props: &Props<Msg>, now: Instant) -> Vec<Msg> {
        self.sync(props);
        let Some(composed) = self.accept.poll(now) else {
            return Vec::new();
        };
        let mut messages = Vec::with_capacity(2);
        if let Some(on_accept) = &props.on_accept {
            messages.push((props.on_change)(composed.clone()));
            messages.push(on_accept(composed));
        } else {
            messages.push((props.on_change)(composed));
        }
        messages
    }

    /// When the widget next needs [`SmartCompleteState::tick`] or a repaint.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let commit = self.accept.deadline();
        if self.accept.is_fading(now) {
            let frame = now + FADE_FRAME;
            return Some(commit.map_or(frame, |deadline| deadline.min(frame)));
        }
        commit
    }

    pub fn render<Msg>(
        &mut self,
        props: &Props<Msg>,
        ctx: &mut RenderContext<'_>,
    ) -> Result<(), ProgramError> {
        self.sync(props);
        let styles = props.resolve_styles();
        let boxes = box_layout::compute(
            ctx.area(),
            &BoxSpec {
                border: styles.container.has_border(),
                rows: props.rows,
                typography: styles.typography,
            },
        )?;
        self.boxes = Some(boxes);
        if !boxes.input.has_area() {
            return Ok(());
        }

        self.textarea.layout_text(boxes.input, styles.typography);
        self.overlay.layout_text(
            &props.value,
            &props.completion,
            boxes.overlay,
            styles.overlay_typography,
        );
        self.sync_overlay_scroll();

        self.paint_container(ctx, &styles, boxes);
        if let Some(bg) = styles.input.bg {
            let mut fill = CellAttributes::default();
            fill.set_background(bg);
            ctx.fill(boxes.input, &fill);
        }

        let palette_fg = ctx.palette().foreground;
        let overlay_attrs = appearance_to_attributes(&styles.overlay, palette_fg);
        if let Some(bg) = overlay_attrs.background {
            let mut fill = CellAttributes::default();
            fill.set_background(bg);
            ctx.fill(boxes.overlay.intersection(boxes.input), &fill);
        }

        let mut ctx = ctx.with_area(boxes.input);
        let visibility = self.accept.visibility(ctx.frame_time());
        if !props.completion.is_empty() {
            self.overlay.paint(
                &mut ctx,
                &appearance_to_attributes(&styles.typed, palette_fg),
                &ghost_attributes(&styles, &overlay_attrs, palette_fg),
                visibility,
            );
        }

        let input_attrs = CellAttributes {
            background: None,
            ..appearance_to_attributes(&styles.input, palette_fg)
        };
        if props.value.is_empty() && props.completion.is_empty() && !props.placeholder.is_empty() {
            self.paint_placeholder(&mut ctx, props, &input_attrs, &styles);
        }
        self.textarea.paint(&mut ctx, &input_attrs);
        Ok(())
    }

    fn paint_container(&self, ctx: &mut RenderContext<'_>, styles: &StyleResolution, boxes: BoxLayout) {
        let container = &styles.container;
        if let Some(bg) = container.bg {
            let mut fill = CellAttributes::default();
            fill.set_background(bg);
            ctx.fill(boxes.container, &fill);
        }
        if container.has_border() {
            let mut attrs = CellAttributes::default();
            if let Some(color) = container.border_color.or(container.fg) {
                attrs.set_foreground(color);
            }
            ctx.draw_border(boxes.container, container.border, container.rounded, &attrs);
        }
    }

    fn paint_placeholder<Msg>(
        &self,
        ctx: &mut RenderContext<'_>,
        props: &Props<Msg>,
        input_attrs: &CellAttributes,
        styles: &StyleResolution,
    ) {
        let area = self.textarea.area();
        let width = area.width.saturating_sub(styles.typography.padding.horizontal());
        let layout = TextLayout::new(&props.placeholder, styles.typography, width);
        let attrs = CellAttributes {
            dim: true,
            ..input_attrs.clone()
        };
        ctx.draw_glyphs(area, &layout, ScrollOffset::ZERO, |_| Some(attrs.clone()));
    }

    pub fn accessibility<Msg>(&self, props: &Props<Msg>) -> Accessibility {
        Accessibility {
            required: props.required,
            disabled: props.disabled,
            read_only: props.read_only,
            ..Accessibility::describe(
                &props.placeholder,
                props.id.as_deref(),
                &props.completion,
                props.accept_key,
            )
        }
    }

    pub fn validity<Msg>(&self, props: &Props<Msg>) -> Validity {
        let len = props.value.chars().count();
        Validity {
            value_missing: props.required && len == 0,
            too_short: props.min_length.is_some_and(|min| len > 0 && len < min),
            too_long: props.max_length.is_some_and(|max| len > max),
        }
    }

    /// The entry submitted with a form. Unnamed and disabled inputs submit nothing.
    pub fn form_entry<Msg>(&self, props: &Props<Msg>) -> Option<FormEntry> {
        if props.disabled {
            return None;
        }
        let name = props.name.as_ref().filter(|name| !name.is_empty())?;
        Some(FormEntry {
            name: name.clone(),
            value: props.value.clone(),
        })
    }

    /// Teardown: drops any pending commit so nothing fires afterwards.
    pub fn unmount(&mut self) -> bool {
        let cancelled = self.accept.cancel();
        if cancelled {
            debug!("widget unmounted with a pending commit");
        }
        cancelled
    }

    pub fn phase(&self) -> AcceptPhase {
        self.accept.phase()
    }

    pub fn visibility(&self, now: Instant) -> f32 {
        self.accept.visibility(now)
    }

    pub fn input_scroll(&self) -> ScrollOffset {
        self.textarea.scroll()
    }

    pub fn overlay_scroll(&self) -> ScrollOffset {
        self.overlay.scroll()
    }

    pub fn overlay_text(&self) -> String {
        self.overlay.text()
    }

    pub fn overlay_completion(&self) -> String {
        self.overlay.completion_text()
    }

    pub fn cursor(&self) -> usize {
        self.textarea.cursor()
    }

    pub fn is_focused(&self) -> bool {
        self.textarea.is_focused()
    }

    pub fn boxes(&self) -> Option<BoxLayout> {
        self.boxes
    }
}

/// Completion attributes, falling back to the overlay layer's text color and
/// emphasis where the completion leaves them unset.
fn ghost_attributes(
    styles: &StyleResolution,
    overlay: &CellAttributes,
    palette_fg: Rgba,
) -> CellAttributes {
    let inherited = overlay.foreground.unwrap_or(palette_fg);
    let mut ghost = appearance_to_attributes(&styles.completion, inherited);
    if ghost.foreground.is_none() {
        ghost.foreground = overlay.foreground;
    }
    ghost.bold |= overlay.bold;
    ghost.dim |= overlay.dim;
    ghost.italic |= overlay.italic;
    ghost.underline |= overlay.underline;
    ghost
}
