use serde::{Deserialize, Serialize};

/// One countdown unit: the template value and the live remaining value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSet {
    pub start_value: u32,
    pub current_value: u32,
}

impl CountdownSet {
    pub fn new(start_value: u32) -> Self {
        Self {
            start_value,
            current_value: start_value,
        }
    }

    pub fn at_zero(&self) -> bool {
        self.current_value == 0
    }
}

/// How a held count trigger behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// One decrement per discrete press.
    #[default]
    Single,
    /// Immediate decrement on press, then auto-repeat while the input stays held.
    Hold,
}

/// What the full-screen display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// The big countdown digits.
    #[default]
    Numbers,
    /// Background only, no digits.
    Blank,
    /// A configured standby message instead of the digits.
    Message,
}

impl DisplayMode {
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Numbers => DisplayMode::Blank,
            DisplayMode::Blank => DisplayMode::Message,
            DisplayMode::Message => DisplayMode::Numbers,
        }
    }
}

/// Read-only view of the store after a state change. Rendering is a pure
/// function of this plus externally-owned theme/display-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub current_value: u32,
    pub is_running: bool,
    /// The active set just hit 0; prompts the advance-to-next hint.
    pub reached_zero: bool,
}
