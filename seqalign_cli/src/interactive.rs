use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use seqalign_core::{
    ClipboardSink, ComparisonRenderer, InputStage, LayoutBus, RendererOptions, Slot, StyledCell,
    SurfaceSize,
};
use std::io::{self, Write};
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// First screen row of the comparison view
pub const VIEW_TOP: u16 = 5;

const IDLE_POLL: Duration = Duration::from_millis(250);
const COPIED_BADGE: &str = " Sequence copied! ";
const HELP_LINE: &str = concat!(
    "[Enter] align  [Tab] switch field  [PgUp/PgDn] scroll  [Esc] quit  ",
    "drag over the result to copy"
);
const WHEEL_ROWS: usize = 3;

pub type ClipboardFactory = Box<dyn Fn() -> Box<dyn ClipboardSink>>;

/// Position in view coordinates (column, row of `App::view_rows`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridPoint {
    pub row: usize,
    pub col: usize,
}

/// Mouse selection over the rendered rows, ordered like text selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSelection {
    pub anchor: GridPoint,
    pub head: GridPoint,
}

impl GridSelection {
    fn ordered(&self) -> (GridPoint, GridPoint) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        let (start, end) = self.ordered();
        start <= point && point <= end
    }

    /// Selected characters, rows joined by newlines. Both ends are inclusive.
    pub fn text(&self, rows: &[String]) -> String {
        let (start, end) = self.ordered();
        let mut pieces = Vec::new();
        for row in start.row..=end.row {
            let line = rows.get(row).map(String::as_str).unwrap_or("");
            let from = if row == start.row { start.col } else { 0 };
            let piece: String = if row == end.row {
                line.chars()
                    .skip(from)
                    .take((end.col + 1).saturating_sub(from))
                    .collect()
            } else {
                line.chars().skip(from).collect()
            };
            pieces.push(piece);
        }
        pieces.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Session state, independent of the terminal
pub struct App {
    input: InputStage,
    focus: Slot,
    options: RendererOptions,
    clipboard: ClipboardFactory,
    bus: LayoutBus,
    renderer: Option<ComparisonRenderer>,
    selection: Option<GridSelection>,
    selecting: bool,
    screen: (u16, u16),
    // first view row shown at VIEW_TOP
    scroll: usize,
}

impl App {
    pub fn new(options: RendererOptions, clipboard: ClipboardFactory) -> Self {
        Self {
            input: InputStage::default(),
            focus: Slot::First,
            options,
            clipboard,
            bus: LayoutBus::new(),
            renderer: None,
            selection: None,
            selecting: false,
            screen: (0, 0),
            scroll: 0,
        }
    }

    pub fn focus(&self) -> Slot {
        self.focus
    }

    pub fn input(&self) -> &InputStage {
        &self.input
    }

    pub fn renderer(&self) -> Option<&ComparisonRenderer> {
        self.renderer.as_ref()
    }

    pub fn selection(&self) -> Option<GridSelection> {
        self.selection
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Screen rows available to the comparison view
    pub fn page_rows(&self) -> usize {
        usize::from(self.screen.1.saturating_sub(VIEW_TOP)).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.view_rows().len().saturating_sub(self.page_rows())
    }

    /// View rows currently on screen
    pub fn visible_range(&self) -> Range<usize> {
        let total = self.view_rows().len();
        let start = self.scroll.min(total);
        start..total.min(start + self.page_rows())
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta.unsigned_abs())
        };
        self.scroll = target.min(self.max_scroll());
    }

    /// Terminal resized; the view area below the form is the surface
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.screen = (columns, rows);
        self.bus.publish(SurfaceSize::from_cells(
            columns.max(1),
            rows.saturating_sub(VIEW_TOP),
        ));
        if let Some(renderer) = self.renderer.as_mut() {
            if renderer.poll_layout() {
                self.selection = None;
            }
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        if key.kind == KeyEventKind::Release {
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Esc => return AppAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return AppAction::Quit
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = self.focus.other();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::PageDown => self.scroll_by(self.page_rows() as isize),
            KeyCode::PageUp => self.scroll_by(-(self.page_rows() as isize)),
            KeyCode::Backspace => {
                let mut value = self.input.sequence(self.focus).as_str().to_string();
                if value.pop().is_some() {
                    self.edit(&value);
                }
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut value = self.input.sequence(self.focus).as_str().to_string();
                value.push(ch);
                self.edit(&value);
            }
            _ => {}
        }

        self.tick(now);
        AppAction::Continue
    }

    pub fn handle_paste(&mut self, text: &str) {
        let value = format!("{}{}", self.input.sequence(self.focus), text);
        self.edit(&value);
    }

    fn edit(&mut self, raw: &str) {
        self.input.edit(self.focus, raw);
        // any edit invalidates the rendered comparison
        if let Some(mut renderer) = self.renderer.take() {
            renderer.teardown();
        }
        self.selection = None;
        self.selecting = false;
        self.scroll = 0;
    }

    fn submit(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.teardown();
        }
        self.selection = None;
        self.scroll = 0;

        match self.input.submit() {
            Ok(pair) => {
                let mut renderer =
                    ComparisonRenderer::new(pair, self.options.clone(), (self.clipboard)());
                renderer.mount(&self.bus);
                info!(chunk_width = renderer.chunk_width(), "Comparison rendered");
                self.renderer = Some(renderer);
            }
            Err(e) => debug!("Submit blocked: {}", e),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.renderer.is_none() {
            return;
        }
        let point = GridPoint {
            row: usize::from(mouse.row.saturating_sub(VIEW_TOP)) + self.scroll,
            col: usize::from(mouse.column),
        };

        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_ROWS as isize),
            MouseEventKind::ScrollUp => self.scroll_by(-(WHEEL_ROWS as isize)),
            MouseEventKind::Down(MouseButton::Left) => {
                if mouse.row < VIEW_TOP {
                    self.selection = None;
                    self.selecting = false;
                    return;
                }
                self.selection = Some(GridSelection {
                    anchor: point,
                    head: point,
                });
                self.selecting = true;
            }
            MouseEventKind::Drag(MouseButton::Left) if self.selecting => {
                if let Some(selection) = self.selection.as_mut() {
                    selection.head = point;
                }
            }
            MouseEventKind::Up(MouseButton::Left) if self.selecting => {
                self.selecting = false;
                if let Some(selection) = self.selection.as_mut() {
                    selection.head = point;
                }
                let text = self
                    .selection
                    .map(|selection| selection.text(&self.view_text_rows()));
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.on_selection_end(&text, now);
                }
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.tick(now);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.renderer.as_ref().and_then(ComparisonRenderer::next_deadline)
    }

    pub fn is_copied(&self) -> bool {
        self.renderer.as_ref().map(ComparisonRenderer::is_copied).unwrap_or(false)
    }

    /// Rendered view as screen rows: first row, second row, spacer
    pub fn view_rows(&self) -> Vec<Vec<StyledCell>> {
        let Some(renderer) = self.renderer.as_ref() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for chunk in renderer.render().chunks {
            rows.push(chunk.first);
            rows.push(chunk.second);
            rows.push(Vec::new());
        }
        rows
    }

    pub fn view_text_rows(&self) -> Vec<String> {
        self.view_rows()
            .iter()
            .map(|row| row.iter().map(|cell| cell.ch).collect())
            .collect()
    }

    pub fn shutdown(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.teardown();
        }
    }
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste,
            cursor::Hide
        )
        .context("failed to prepare terminal")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
    }
}

pub fn run(options: RendererOptions, clipboard: ClipboardFactory) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut stdout = io::stdout();
    let mut app = App::new(options, clipboard);

    let (columns, rows) = terminal::size().context("failed to read terminal size")?;
    app.resize(columns, rows);

    loop {
        draw(&mut stdout, &app)?;

        let timeout = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL);

        if event::poll(timeout)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key, now) == AppAction::Quit {
                        break;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, now),
                Event::Paste(text) => app.handle_paste(&text),
                Event::Resize(columns, rows) => app.resize(columns, rows),
                _ => {}
            }
        }
        app.tick(Instant::now());
    }

    app.shutdown();
    Ok(())
}

fn draw_field(
    out: &mut impl Write,
    app: &App,
    slot: Slot,
    row: u16,
    label: &str,
) -> io::Result<()> {
    let focused = app.focus() == slot;
    let value = app.input().sequence(slot);
    let placeholder = value.is_empty() && !focused;

    queue!(out, cursor::MoveTo(0, row), Print(label))?;
    if focused {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if placeholder {
        queue!(out, SetForegroundColor(Color::DarkGrey), Print("enter a sequence"))?;
    } else {
        queue!(out, Print(value.as_str()))?;
    }
    if focused {
        queue!(out, Print("_"))?;
    }
    queue!(out, SetAttribute(Attribute::Reset), ResetColor)
}

fn draw(out: &mut impl Write, app: &App) -> Result<()> {
    queue!(out, Clear(ClearType::All))?;
    draw_field(out, app, Slot::First, 0, "First:  ")?;
    draw_field(out, app, Slot::Second, 1, "Second: ")?;
    queue!(
        out,
        cursor::MoveTo(0, 2),
        SetForegroundColor(Color::DarkGrey),
        Print(HELP_LINE),
        ResetColor
    )?;

    if let Some(error) = app.input().error() {
        queue!(
            out,
            cursor::MoveTo(0, 3),
            SetForegroundColor(Color::Red),
            Print(error),
            ResetColor
        )?;
    } else if let Some(renderer) = app.renderer() {
        let summary = renderer.summary();
        let visible = app.visible_range();
        let status = format!(
            "{} positions, {} mismatches, {} per line, rows {}-{} of {}",
            summary.length,
            summary.mismatches,
            renderer.chunk_width(),
            visible.start + 1,
            visible.end,
            app.view_rows().len()
        );
        queue!(out, cursor::MoveTo(0, 3), Print(status))?;
    }

    if app.is_copied() {
        let column = app.screen.0.saturating_sub(COPIED_BADGE.len() as u16 + 1);
        queue!(
            out,
            cursor::MoveTo(column, 0),
            SetBackgroundColor(Color::Rgb { r: 0x33, g: 0x33, b: 0x33 }),
            SetForegroundColor(Color::White),
            Print(COPIED_BADGE),
            ResetColor
        )?;
    }

    let selection = app.selection();
    let rows = app.view_rows();
    let visible = app.visible_range();
    for (screen_row, row_index) in visible.enumerate() {
        queue!(out, cursor::MoveTo(0, VIEW_TOP + screen_row as u16))?;
        for (col, cell) in rows[row_index].iter().enumerate() {
            let point = GridPoint { row: row_index, col };
            if let Some(color) = cell.highlight.background() {
                queue!(
                    out,
                    SetBackgroundColor(Color::Rgb { r: color.0, g: color.1, b: color.2 }),
                    SetForegroundColor(Color::Black)
                )?;
            }
            if selection.is_some_and(|selection| selection.contains(point)) {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            }
            queue!(out, Print(cell.ch), SetAttribute(Attribute::Reset), ResetColor)?;
        }
    }

    out.flush()?;
    Ok(())
}
