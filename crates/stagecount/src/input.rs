use stagecount_core::model::DisplayMode;

/// Logical keys the router and panel care about. Everything printable
/// arrives as `Char`; the physical source is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Esc,
    Up,
    Down,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// Raw event from any physical source (keyboard or pointer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    KeyDown { key: Key, mods: Modifiers },
    KeyUp { key: Key },
    PointerDown { column: u16, row: u16 },
    PointerUp,
    PointerMove { column: u16, row: u16 },
}

/// Semantic commands the router produces, one per down-edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The count trigger: start if paused, otherwise decrement once
    /// (and arm the repeat cycle in hold mode).
    StartOrDecrement,
    /// The matching up-edge of a count trigger; ends any hold.
    ReleaseCount,
    ToggleRunning,
    ResetCurrent,
    ResetAll,
    /// Only actionable when the active set sits at zero; the engine gates.
    AdvanceToNext,
    /// Quick-access toggle into the named mode and back to the digits.
    /// Shift+1 for blank, Shift+2 for the standby message.
    ToggleDisplayMode(DisplayMode),
    TogglePanel,
    Quit,
}

fn is_count_key(key: Key) -> bool {
    matches!(key, Key::Enter | Key::Space)
}

/// Classifies raw input into commands and owns the held-input flags:
/// while a count key or the pointer button stays down, further down-edges
/// are suppressed so key-repeat floods never fire duplicate decrements.
#[derive(Debug, Default)]
pub struct InputRouter {
    key_held: bool,
    pointer_held: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&mut self, input: RawInput) -> Option<Command> {
        match input {
            RawInput::KeyDown { key, mods } => self.route_key_down(key, mods),
            RawInput::KeyUp { key } => {
                if is_count_key(key) && self.key_held {
                    self.key_held = false;
                    // A hold survives until the last held source releases
                    if !self.pointer_held {
                        return Some(Command::ReleaseCount);
                    }
                }
                None
            }
            RawInput::PointerDown { .. } => {
                if self.pointer_held {
                    return None;
                }
                self.pointer_held = true;
                Some(Command::StartOrDecrement)
            }
            RawInput::PointerUp => {
                if self.pointer_held {
                    self.pointer_held = false;
                    if !self.key_held {
                        return Some(Command::ReleaseCount);
                    }
                }
                None
            }
            RawInput::PointerMove { .. } => None,
        }
    }

    fn route_key_down(&mut self, key: Key, mods: Modifiers) -> Option<Command> {
        if is_count_key(key) {
            if self.key_held {
                return None;
            }
            self.key_held = true;
            return Some(Command::StartOrDecrement);
        }
        match key {
            Key::Esc => Some(Command::TogglePanel),
            Key::Char('p') => Some(Command::ToggleRunning),
            Key::Char('n') | Key::Char('N') if mods.shift => Some(Command::AdvanceToNext),
            Key::Char('r') | Key::Char('R') if mods.ctrl && mods.shift => Some(Command::ResetAll),
            Key::Char('r') if mods.ctrl => Some(Command::ResetCurrent),
            // Shifted digits arrive as '1'/'2' with the shift flag under the
            // kitty protocol and as '!'/'@' from legacy terminals
            Key::Char('1') if mods.shift => Some(Command::ToggleDisplayMode(DisplayMode::Blank)),
            Key::Char('!') => Some(Command::ToggleDisplayMode(DisplayMode::Blank)),
            Key::Char('2') if mods.shift => Some(Command::ToggleDisplayMode(DisplayMode::Message)),
            Key::Char('@') => Some(Command::ToggleDisplayMode(DisplayMode::Message)),
            Key::Char('q') | Key::Char('c') if mods.ctrl => Some(Command::Quit),
            _ => None,
        }
    }
}
