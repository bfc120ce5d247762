use crate::input::{Key, Modifiers};
use stagecount_core::config::PanelConfig;

/// What the panel asks the engine to do. The panel never touches the
/// store itself; it only collects input and emits requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    AddSet(u32),
    CommitEdit { index: usize, new_start: u32 },
    /// Start editing the active set; the engine answers with `begin_edit`.
    BeginEdit,
    RemoveSelected,
    SelectPrev,
    SelectNext,
    ToggleCountMode,
    CycleDisplayMode,
    ToggleRunning,
    ResetCurrent,
    ResetAll,
    Close,
}

/// Digit-entry state while the panel is open.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Browsing,
    /// Collecting digits for a new set.
    Adding { buffer: String },
    /// Collecting digits for an edit of the set at `index`.
    Editing { index: usize, buffer: String },
}

/// A read-only view of the entry state for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryView<'a> {
    Browsing,
    Adding(&'a str),
    Editing(usize, &'a str),
}

// u32::MAX has ten digits; nine digits always parse.
const MAX_DIGITS: usize = 9;

/// Derives panel show/hide from pointer proximity and explicit toggles,
/// and routes keys to set management while the panel is open.
#[derive(Debug)]
pub struct PanelController {
    visible: bool,
    /// The pointer has been on the panel strip since it became visible;
    /// leaving the strip afterwards hides the panel.
    entered: bool,
    edge_threshold: u16,
    width: u16,
    entry: Entry,
}

impl PanelController {
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            visible: false,
            entered: false,
            edge_threshold: config.edge_threshold,
            width: config.width,
            entry: Entry::Browsing,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn entry(&self) -> EntryView<'_> {
        match &self.entry {
            Entry::Browsing => EntryView::Browsing,
            Entry::Adding { buffer } => EntryView::Adding(buffer),
            Entry::Editing { index, buffer } => EntryView::Editing(*index, buffer),
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.entered = false;
        self.entry = Entry::Browsing;
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Pointer proximity: near any screen edge reveals the panel; leaving
    /// the panel strip after having been on it hides the panel again.
    pub fn pointer_moved(&mut self, column: u16, row: u16, width: u16, height: u16) {
        if !self.visible {
            let t = self.edge_threshold;
            let near_edge = column < t
                || row < t
                || column >= width.saturating_sub(t)
                || row >= height.saturating_sub(t);
            if near_edge {
                self.show();
            }
            return;
        }
        let on_panel = column >= width.saturating_sub(self.width);
        if on_panel {
            self.entered = true;
        } else if self.entered {
            self.hide();
        }
    }

    /// Keys while the panel is visible. Digit entry takes priority; in
    /// browsing state single keys map to management actions.
    pub fn handle_key(&mut self, key: Key, mods: Modifiers) -> Option<PanelAction> {
        match std::mem::replace(&mut self.entry, Entry::Browsing) {
            Entry::Browsing => self.handle_browsing(key, mods),
            Entry::Adding { buffer } => {
                let (entry, action) = Self::handle_buffer(key, buffer, None);
                self.entry = entry;
                action
            }
            Entry::Editing { index, buffer } => {
                let (entry, action) = Self::handle_buffer(key, buffer, Some(index));
                self.entry = entry;
                action
            }
        }
    }

    /// Called by the engine in answer to `BeginEdit`, with the selected
    /// set's index and start value for the prefilled buffer.
    pub fn begin_edit(&mut self, index: usize, start_value: u32) {
        self.entry = Entry::Editing {
            index,
            buffer: start_value.to_string(),
        };
    }

    fn handle_browsing(&mut self, key: Key, mods: Modifiers) -> Option<PanelAction> {
        match key {
            Key::Char(c) if c.is_ascii_digit() => {
                self.entry = Entry::Adding { buffer: c.to_string() };
                None
            }
            Key::Up => Some(PanelAction::SelectPrev),
            Key::Down => Some(PanelAction::SelectNext),
            Key::Char('e') => Some(PanelAction::BeginEdit),
            Key::Char('x') => Some(PanelAction::RemoveSelected),
            Key::Char('m') => Some(PanelAction::ToggleCountMode),
            Key::Char('b') => Some(PanelAction::CycleDisplayMode),
            Key::Char('R') if mods.shift => Some(PanelAction::ResetAll),
            Key::Char('r') => Some(PanelAction::ResetCurrent),
            Key::Space => Some(PanelAction::ToggleRunning),
            Key::Esc => Some(PanelAction::Close),
            _ => None,
        }
    }

    fn handle_buffer(
        key: Key,
        mut buffer: String,
        editing: Option<usize>,
    ) -> (Entry, Option<PanelAction>) {
        let keep = |buffer: String| match editing {
            Some(index) => Entry::Editing { index, buffer },
            None => Entry::Adding { buffer },
        };
        match key {
            Key::Char(c) if c.is_ascii_digit() => {
                if buffer.len() < MAX_DIGITS {
                    buffer.push(c);
                }
                (keep(buffer), None)
            }
            Key::Backspace => {
                buffer.pop();
                // An emptied add-entry falls back to browsing; an edit stays
                // open so the digits can be retyped
                if buffer.is_empty() && editing.is_none() {
                    (Entry::Browsing, None)
                } else {
                    (keep(buffer), None)
                }
            }
            Key::Enter => match buffer.parse::<u32>() {
                Ok(value) if value >= 1 => {
                    let action = match editing {
                        Some(index) => PanelAction::CommitEdit { index, new_start: value },
                        None => PanelAction::AddSet(value),
                    };
                    (Entry::Browsing, Some(action))
                }
                // 0 or unparsable: refuse, keep the buffer for correction
                _ => (keep(buffer), None),
            },
            Key::Esc => (Entry::Browsing, None),
            _ => (keep(buffer), None),
        }
    }
}
