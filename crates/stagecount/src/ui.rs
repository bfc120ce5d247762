use crate::engine::Engine;
use crate::panel::EntryView;
use anyhow::{anyhow, Result};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use figlet_rs::FIGfont;
use stagecount_core::model::{CountMode, DisplayMode, Snapshot};
use std::io::Write;

struct Theme {
    fg: Color,
    bg: Color,
    dim: Color,
    panel_bg: Color,
}

/// Theme names come from the persisted session; unknown names fall back
/// to the default dark theme.
fn theme_colors(name: &str) -> Theme {
    match name {
        "light" => Theme {
            fg: Color::Black,
            bg: Color::White,
            dim: Color::DarkGrey,
            panel_bg: Color::Grey,
        },
        "amber" => Theme {
            fg: Color::Yellow,
            bg: Color::Black,
            dim: Color::DarkYellow,
            panel_bg: Color::DarkGrey,
        },
        _ => Theme {
            fg: Color::White,
            bg: Color::Black,
            dim: Color::DarkGrey,
            panel_bg: Color::DarkGrey,
        },
    }
}

/// Draws the full-screen display: big digits (or the blank/message modes),
/// the start and next-set hints, and the control panel strip.
pub struct Ui {
    font: FIGfont,
}

impl Ui {
    pub fn new() -> Result<Self> {
        let font = FIGfont::standard().map_err(|e| anyhow!("loading FIGlet font: {e}"))?;
        Ok(Self { font })
    }

    pub fn draw(&self, out: &mut impl Write, engine: &Engine, width: u16, height: u16) -> Result<()> {
        let theme = theme_colors(engine.theme());
        queue!(
            out,
            SetBackgroundColor(theme.bg),
            SetForegroundColor(theme.fg),
            Clear(ClearType::All)
        )?;

        let snap = engine.store().snapshot();
        match engine.display_mode() {
            DisplayMode::Numbers => {
                self.draw_digits(out, &snap, width, height)?;
                self.draw_hints(out, engine, &snap, width, height, &theme)?;
            }
            DisplayMode::Blank => {}
            DisplayMode::Message => {
                centered(out, engine.standby_message(), width, height / 2)?;
            }
        }

        if engine.panel().visible() {
            self.draw_panel(out, engine, width, height, &theme)?;
        }

        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    fn draw_digits(&self, out: &mut impl Write, snap: &Snapshot, width: u16, height: u16) -> Result<()> {
        let text = snap.current_value.to_string();
        match self.font.convert(&text) {
            Some(figure) => {
                let rendered = figure.to_string();
                let lines: Vec<&str> = rendered.lines().collect();
                let top = height.saturating_sub(lines.len() as u16) / 2;
                for (i, line) in lines.iter().enumerate() {
                    let col = width.saturating_sub(line.chars().count() as u16) / 2;
                    queue!(out, MoveTo(col, top + i as u16), Print(line))?;
                }
            }
            None => centered(out, &text, width, height / 2)?,
        }
        Ok(())
    }

    fn draw_hints(
        &self,
        out: &mut impl Write,
        engine: &Engine,
        snap: &Snapshot,
        width: u16,
        height: u16,
        theme: &Theme,
    ) -> Result<()> {
        queue!(out, SetForegroundColor(theme.dim))?;
        let hint_row = height.saturating_sub(3);
        if snap.reached_zero {
            centered(out, "Press Shift+N to go to the next set", width, hint_row)?;
        } else if !snap.is_running && snap.current_value > 0 {
            centered(out, "Press Enter or Space", width, hint_row)?;
        }
        if engine.store().sets().is_empty() {
            centered(out, "No countdown sets yet. Press Esc for the panel", width, hint_row)?;
        }
        queue!(out, SetForegroundColor(theme.fg))?;
        Ok(())
    }

    fn draw_panel(
        &self,
        out: &mut impl Write,
        engine: &Engine,
        width: u16,
        height: u16,
        theme: &Theme,
    ) -> Result<()> {
        let panel_w = engine.panel().width().min(width);
        let left = width - panel_w;
        queue!(out, SetBackgroundColor(theme.panel_bg), SetForegroundColor(theme.fg))?;
        for row in 0..height {
            queue!(out, MoveTo(left, row), Print(" ".repeat(panel_w as usize)))?;
        }

        let x = left + 2;
        let inner = panel_w.saturating_sub(4) as usize;
        let mut y: u16 = 1;

        panel_line(out, x, &mut y, height, inner, "stagecount")?;
        y += 1;

        let store = engine.store();
        if store.sets().is_empty() {
            panel_line(out, x, &mut y, height, inner, "No countdown sets added yet")?;
        } else {
            for (i, set) in store.sets().iter().enumerate() {
                let marker = if i == store.active_index() { '>' } else { ' ' };
                let text = format!("{marker} {}. {} / {}", i + 1, set.current_value, set.start_value);
                panel_line(out, x, &mut y, height, inner, &text)?;
            }
        }
        y += 1;

        let mode = match store.mode() {
            CountMode::Single => "single press",
            CountMode::Hold => "hold",
        };
        let display = match engine.display_mode() {
            DisplayMode::Numbers => "numbers",
            DisplayMode::Blank => "blank",
            DisplayMode::Message => "message",
        };
        panel_line(out, x, &mut y, height, inner, &format!("count mode [m]: {mode}"))?;
        panel_line(out, x, &mut y, height, inner, &format!("display [b]:    {display}"))?;
        let state = if store.is_running() { "state: counting" } else { "state: paused" };
        panel_line(out, x, &mut y, height, inner, state)?;
        y += 1;

        let entry = match engine.panel().entry() {
            EntryView::Browsing => "type digits + Enter to add a set".to_string(),
            EntryView::Adding(buffer) => format!("add set: {buffer}_"),
            EntryView::Editing(index, buffer) => format!("edit set {}: {buffer}_", index + 1),
        };
        panel_line(out, x, &mut y, height, inner, &entry)?;
        y += 1;

        queue!(out, SetForegroundColor(theme.dim))?;
        for help in [
            "Up/Down select   e edit   x remove",
            "Space start/pause   r/R reset set/all",
            "Esc close   Ctrl+Q quit",
        ] {
            panel_line(out, x, &mut y, height, inner, help)?;
        }
        queue!(out, SetBackgroundColor(theme.bg), SetForegroundColor(theme.fg))?;
        Ok(())
    }
}

fn panel_line(
    out: &mut impl Write,
    x: u16,
    y: &mut u16,
    height: u16,
    inner: usize,
    text: &str,
) -> Result<()> {
    if *y < height {
        let clipped: String = text.chars().take(inner).collect();
        queue!(out, MoveTo(x, *y), Print(clipped))?;
    }
    *y += 1;
    Ok(())
}

fn centered(out: &mut impl Write, text: &str, width: u16, row: u16) -> Result<()> {
    let col = width.saturating_sub(text.chars().count() as u16) / 2;
    queue!(out, MoveTo(col, row), Print(text))?;
    Ok(())
}
