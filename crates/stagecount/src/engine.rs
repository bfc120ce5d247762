use crate::input::{Command, InputRouter, RawInput};
use crate::panel::{PanelAction, PanelController};
use crate::repeat::RepeatController;
use stagecount_core::config::Config;
use stagecount_core::model::{CountMode, DisplayMode};
use stagecount_core::session::{Session, SessionStore};
use stagecount_core::store::CountdownStore;
use std::time::Instant;
use tracing::{debug, warn};

/// Ties the store, router, repeat controller and panel together. All
/// mutation funnels through here, one event at a time; the session is
/// written out (best-effort) after every state change.
pub struct Engine {
    store: CountdownStore,
    router: InputRouter,
    repeat: RepeatController,
    panel: PanelController,
    display_mode: DisplayMode,
    standby_message: String,
    theme: String,
    session_store: Box<dyn SessionStore>,
    size: (u16, u16),
    should_quit: bool,
}

impl Engine {
    pub fn new(
        config: &Config,
        session: Session,
        session_store: Box<dyn SessionStore>,
        size: (u16, u16),
    ) -> Self {
        Self {
            store: CountdownStore::from_session(&session),
            router: InputRouter::new(),
            repeat: RepeatController::from_config(&config.hold),
            panel: PanelController::from_config(&config.panel),
            display_mode: config.display.mode,
            standby_message: config.display.standby_message.clone(),
            theme: session.theme,
            session_store,
            size,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &CountdownStore {
        &self.store
    }

    pub fn panel(&self) -> &PanelController {
        &self.panel
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn standby_message(&self) -> &str {
        &self.standby_message
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_size(&mut self, size: (u16, u16)) {
        self.size = size;
    }

    pub fn handle_input(&mut self, input: RawInput, now: Instant) {
        if let RawInput::PointerMove { column, row } = input {
            self.panel.pointer_moved(column, row, self.size.0, self.size.1);
            return;
        }

        if self.panel.visible() {
            match input {
                RawInput::KeyDown { key, mods } => {
                    if let Some(action) = self.panel.handle_key(key, mods) {
                        self.apply_panel_action(action);
                        self.save_session();
                    }
                }
                // Releases still reach the router so held flags cannot wedge
                RawInput::KeyUp { .. } | RawInput::PointerUp => {
                    if self.router.route(input) == Some(Command::ReleaseCount) {
                        self.repeat.end_hold();
                    }
                }
                _ => {}
            }
            return;
        }

        if let Some(cmd) = self.router.route(input) {
            self.dispatch(cmd, now);
            self.save_session();
        }
    }

    /// The repeat deadline fired (or may have); issue the due decrement.
    pub fn check_timer(&mut self, now: Instant) {
        if !self.repeat.check_timer(now) {
            return;
        }
        self.store.decrement_active();
        if !self.store.is_running() {
            // Auto-paused at zero; the remaining hold has nothing to do
            self.repeat.end_hold();
        }
        self.save_session();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.repeat.next_deadline()
    }

    fn dispatch(&mut self, cmd: Command, now: Instant) {
        match cmd {
            Command::StartOrDecrement => {
                if !self.store.is_running() {
                    self.store.start();
                } else {
                    self.store.decrement_active();
                    if self.store.mode() == CountMode::Hold {
                        if self.store.is_running() {
                            self.repeat.begin_hold(now);
                        } else {
                            // The down-edge decrement itself landed on zero
                            self.repeat.end_hold();
                        }
                    }
                }
            }
            Command::ReleaseCount => self.repeat.end_hold(),
            Command::ToggleRunning => {
                self.store.toggle_running();
                if !self.store.is_running() {
                    self.repeat.end_hold();
                }
            }
            Command::ResetCurrent => {
                self.store.reset_active();
                self.repeat.end_hold();
            }
            Command::ResetAll => {
                self.store.reset_all();
                self.repeat.end_hold();
            }
            Command::AdvanceToNext => {
                // Only meaningful straight after a set hit zero
                if self.store.snapshot().reached_zero {
                    self.store.advance_to_next();
                }
            }
            Command::ToggleDisplayMode(mode) => {
                if self.store.is_running() {
                    debug!("display mode locked while counting down");
                } else if self.display_mode == mode {
                    self.display_mode = DisplayMode::Numbers;
                } else {
                    self.display_mode = mode;
                }
            }
            Command::TogglePanel => self.panel.toggle(),
            Command::Quit => self.should_quit = true,
        }
    }

    fn apply_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::AddSet(value) => {
                if let Err(e) = self.store.add_set(value) {
                    debug!(error = %e, value, "add set refused");
                }
            }
            PanelAction::CommitEdit { index, new_start } => {
                if let Err(e) = self.store.edit_set(index, new_start) {
                    debug!(error = %e, index, "edit refused");
                }
            }
            PanelAction::BeginEdit => {
                if let Some(set) = self.store.active_set() {
                    self.panel.begin_edit(self.store.active_index(), set.start_value);
                }
            }
            PanelAction::RemoveSelected => {
                let index = self.store.active_index();
                if let Err(e) = self.store.remove_set(index) {
                    debug!(error = %e, index, "remove refused");
                }
            }
            PanelAction::SelectPrev => {
                let index = self.store.active_index().saturating_sub(1);
                if let Err(e) = self.store.select_set(index) {
                    debug!(error = %e, index, "select refused");
                }
            }
            PanelAction::SelectNext => {
                let index = self.store.active_index() + 1;
                if index < self.store.sets().len() {
                    if let Err(e) = self.store.select_set(index) {
                        debug!(error = %e, index, "select refused");
                    }
                }
            }
            PanelAction::ToggleCountMode => {
                let mode = match self.store.mode() {
                    CountMode::Single => CountMode::Hold,
                    CountMode::Hold => CountMode::Single,
                };
                self.store.set_mode(mode);
                if mode != CountMode::Hold {
                    self.repeat.end_hold();
                }
            }
            PanelAction::CycleDisplayMode => {
                if self.store.is_running() {
                    debug!("display mode locked while counting down");
                } else {
                    self.display_mode = self.display_mode.next();
                }
            }
            PanelAction::ToggleRunning => {
                self.store.toggle_running();
                if !self.store.is_running() {
                    self.repeat.end_hold();
                }
            }
            PanelAction::ResetCurrent => {
                self.store.reset_active();
                self.repeat.end_hold();
            }
            PanelAction::ResetAll => {
                self.store.reset_all();
                self.repeat.end_hold();
            }
            PanelAction::Close => self.panel.hide(),
        }
    }

    pub fn save_session(&self) {
        let session = self.store.to_session(&self.theme);
        if let Err(e) = self.session_store.save(&session) {
            warn!(error = %e, "session save failed");
        }
    }
}
