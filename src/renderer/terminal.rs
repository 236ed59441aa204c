//! Interactive terminal host.
//!
//! [`Session`] holds the keyboard state (which control has the cursor, the
//! status line) and is driven by crossterm key events, so it can be exercised
//! without a terminal. [`TerminalApp`] wraps a session in a fullscreen
//! crossterm loop.
//!
//! | Key              | Action                                     |
//! |------------------|--------------------------------------------|
//! | Tab / Shift-Tab  | next / previous control                    |
//! | Enter / Space    | click the control (Space types in inputs)  |
//! | printable keys   | edit the focused input, then fire `input`  |
//! | Backspace        | delete the last character                  |
//! | Esc / Ctrl-C     | quit                                       |

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::{debug, info, warn};

use super::layout::{focus_stops, layout, Line, SpanStyle};
use crate::config::RenderOptions;
use crate::dom::{self, ElementTraits, Event, Node};
use crate::error::Result;

const HELP: &str = "Tab/Shift-Tab move · Enter/Space activate · Esc quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Exit,
}

// =============================================================================
// Session
// =============================================================================

pub struct Session {
    root: Node,
    options: RenderOptions,
    cursor: Option<Node>,
    /// Position of the cursor among the stops, kept to recover when the
    /// focused node goes away.
    last_index: usize,
    status: Option<String>,
}

impl Session {
    pub fn new(root: Node, options: RenderOptions) -> Self {
        Self { root, options, cursor: None, last_index: 0, status: None }
    }

    pub fn root(&self) -> Node {
        self.root
    }

    /// Control that receives keys.
    pub fn cursor(&self) -> Option<Node> {
        self.cursor
    }

    /// Last handler error, if the most recent action failed.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Current frame: the laid out tree plus a status line.
    pub fn frame(&self) -> Vec<Line> {
        layout(self.root, &self.options, self.cursor)
    }

    pub fn status_line(&self) -> String {
        match &self.status {
            Some(status) => format!("error: {status}"),
            None => HELP.to_string(),
        }
    }

    pub fn focus_next(&mut self) {
        self.step(1);
    }

    pub fn focus_previous(&mut self) {
        self.step(-1);
    }

    fn step(&mut self, delta: isize) {
        let stops = focus_stops(self.root);
        if stops.is_empty() {
            self.cursor = None;
            return;
        }
        let len = stops.len() as isize;
        let index = match self.cursor.and_then(|c| stops.iter().position(|s| *s == c)) {
            Some(index) => (index as isize + delta).rem_euclid(len),
            None if delta > 0 => 0,
            None => len - 1,
        } as usize;
        self.set_cursor(stops[index], index);
    }

    fn set_cursor(&mut self, node: Node, index: usize) {
        self.cursor = Some(node);
        self.last_index = index;
        let result = node.focus();
        self.record(result);
    }

    fn record(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.status = None,
            Err(err) => {
                warn!(error = %err, "action failed");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Re-anchor the cursor after an action may have changed the tree. A
    /// handler that moved focus takes the cursor along.
    fn settle(&mut self, active_before: Option<Node>) {
        let stops = focus_stops(self.root);
        if let Some(active) = dom::active_element().filter(|a| Some(*a) != active_before) {
            if self.cursor != Some(active) {
                if let Some(index) = stops.iter().position(|s| *s == active) {
                    self.cursor = Some(active);
                    self.last_index = index;
                    return;
                }
            }
        }
        match self.cursor.and_then(|c| stops.iter().position(|s| *s == c)) {
            Some(index) => self.last_index = index,
            None if stops.is_empty() => self.cursor = None,
            None => {
                let index = self.last_index.min(stops.len() - 1);
                self.cursor = Some(stops[index]);
                self.last_index = index;
            }
        }
    }

    fn is_text_entry(node: Node) -> bool {
        node.traits().contains(ElementTraits::TEXT_ENTRY) && !node.disabled()
    }

    fn edit(node: Node, edit: impl FnOnce(&mut String)) -> Result<()> {
        let mut value = node.value();
        edit(&mut value);
        node.set_value(&value);
        node.dispatch_event(&Event::new("input")).map(drop)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Continue;
        }
        let active_before = dom::active_element();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Esc => return KeyOutcome::Exit,
            KeyCode::Char('c') if ctrl => return KeyOutcome::Exit,
            KeyCode::Tab if shift => self.focus_previous(),
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_previous(),
            KeyCode::Enter => {
                if let Some(node) = self.cursor {
                    let result = if Self::is_text_entry(node) {
                        node.dispatch_event(&Event::new("change")).map(drop)
                    } else {
                        node.click()
                    };
                    self.record(result);
                }
            }
            KeyCode::Backspace => {
                if let Some(node) = self.cursor.filter(|n| Self::is_text_entry(*n)) {
                    let result = Self::edit(node, |value| {
                        value.pop();
                    });
                    self.record(result);
                }
            }
            KeyCode::Char(c) if !ctrl => match self.cursor {
                Some(node) if Self::is_text_entry(node) => {
                    let result = Self::edit(node, |value| value.push(c));
                    self.record(result);
                }
                Some(node) if c == ' ' => {
                    let result = node.click();
                    self.record(result);
                }
                _ => {}
            },
            _ => return KeyOutcome::Continue,
        }
        self.settle(active_before);
        debug!(key = ?key.code, cursor = ?self.cursor, "key handled");
        KeyOutcome::Continue
    }
}

// =============================================================================
// Terminal
// =============================================================================

/// Raw mode and the alternate screen, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best effort
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
    }
}

fn style_attributes(style: SpanStyle) -> impl Iterator<Item = Attribute> {
    [
        (SpanStyle::BOLD, Attribute::Bold),
        (SpanStyle::UNDERLINE, Attribute::Underlined),
        (SpanStyle::FOCUSED, Attribute::Reverse),
        (SpanStyle::CROSSED_OUT, Attribute::CrossedOut),
    ]
    .into_iter()
    .filter(move |(flag, _)| style.contains(*flag))
    .map(|(_, attribute)| attribute)
}

/// Fullscreen host for one mounted tree.
pub struct TerminalApp {
    session: Session,
}

impl TerminalApp {
    pub fn new(root: Node, options: RenderOptions) -> Self {
        Self { session: Session::new(root, options) }
    }

    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Run until Esc or Ctrl-C.
    pub fn run(mut self) -> Result<()> {
        let _guard = TerminalGuard::enter()?;
        let mut out = io::stdout();
        info!(root = ?self.session.root(), "terminal session started");

        self.session.focus_next();
        loop {
            self.draw(&mut out)?;
            match event::read()? {
                TermEvent::Key(key) => {
                    if self.session.handle_key(key) == KeyOutcome::Exit {
                        break;
                    }
                }
                TermEvent::Resize(width, height) => debug!(width, height, "resize"),
                _ => {}
            }
        }
        info!("terminal session ended");
        Ok(())
    }

    fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        queue!(out, Clear(ClearType::All))?;

        let body_rows = height.saturating_sub(1) as usize;
        for (row, line) in self.session.frame().iter().take(body_rows).enumerate() {
            queue!(out, MoveTo(0, row as u16))?;
            for span in &line.spans {
                for attribute in style_attributes(span.style) {
                    queue!(out, SetAttribute(attribute))?;
                }
                queue!(out, Print(&span.text), SetAttribute(Attribute::Reset))?;
            }
        }

        let status: String = self.session.status_line().chars().take(width as usize).collect();
        queue!(out, MoveTo(0, height.saturating_sub(1)), SetAttribute(Attribute::Dim), Print(status))?;
        queue!(out, SetAttribute(Attribute::Reset))?;
        out.flush()
    }
}
