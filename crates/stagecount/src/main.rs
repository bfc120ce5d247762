mod engine;
mod input;
mod panel;
mod repeat;
mod ui;

use anyhow::{Context, Result};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{cursor, execute, terminal};
use engine::Engine;
use futures::StreamExt;
use input::{Key, Modifiers, RawInput};
use stagecount_core::config::Config;
use stagecount_core::session::{FileSessionStore, Session, SessionStore};
use std::time::Instant;
use tracing::{info, warn};
use ui::Ui;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stagecount=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("stagecount starting");

    let config = Config::load().context("loading config")?;

    let session_store = FileSessionStore::at_default_path();
    let session = match session_store.load() {
        Ok(Some(session)) => session.restored(),
        Ok(None) => Session::default(),
        Err(e) => {
            warn!(error = %e, "session load failed, starting fresh");
            Session::default()
        }
    };
    info!(sets = session.sets.len(), "session restored");

    let size = terminal::size().context("querying terminal size")?;
    let mut engine = Engine::new(&config, session, Box::new(session_store), size);

    let enhanced = setup_terminal().context("setting up terminal")?;
    let result = run(&mut engine, enhanced).await;
    teardown_terminal(enhanced);

    engine.save_session();
    info!("stagecount shutting down");
    result
}

/// Raw mode, alternate screen, mouse capture, and (where the terminal
/// supports it) key release reporting via the kitty keyboard protocol.
/// Returns whether release reporting is active.
fn setup_terminal() -> Result<bool> {
    terminal::enable_raw_mode().context("enabling raw mode")?;
    execute!(
        std::io::stdout(),
        terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture,
        cursor::Hide,
    )
    .context("entering alternate screen")?;
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES),
        )
        .context("enabling key release reporting")?;
    }
    Ok(enhanced)
}

fn teardown_terminal(enhanced: bool) {
    // Best-effort: restore as much as possible even if one step fails
    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = execute!(
        std::io::stdout(),
        cursor::Show,
        crossterm::event::DisableMouseCapture,
        terminal::LeaveAlternateScreen,
    );
    let _ = terminal::disable_raw_mode();
}

async fn run(engine: &mut Engine, enhanced: bool) -> Result<()> {
    let ui = Ui::new()?;
    let mut events = EventStream::new();
    let mut size = terminal::size().context("querying terminal size")?;
    let mut stdout = std::io::stdout();

    loop {
        ui.draw(&mut stdout, engine, size.0, size.1)?;

        // Event-driven timer: sleep only as long as the repeat needs
        let deadline = engine.next_deadline();
        let sleep_fut = match deadline {
            Some(dl) => tokio::time::sleep_until(tokio::time::Instant::from_std(dl)),
            None => tokio::time::sleep_until(
                tokio::time::Instant::now() + std::time::Duration::from_secs(86400),
            ),
        };
        let has_deadline = deadline.is_some();

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Resize(w, h))) => {
                        size = (w, h);
                        engine.set_size(size);
                    }
                    Some(Ok(event)) => {
                        let now = Instant::now();
                        for raw in translate(&event, enhanced) {
                            engine.handle_input(raw, now);
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "terminal event error");
                    }
                    None => break,
                }
            }
            _ = sleep_fut, if has_deadline => {
                engine.check_timer(Instant::now());
            }
        }

        if engine.should_quit() {
            break;
        }
    }
    Ok(())
}

/// Terminal events to logical inputs. Without release reporting a press
/// is immediately followed by a synthetic release, so holds degrade to
/// taps instead of wedging the held-key debounce.
fn translate(event: &Event, enhanced: bool) -> Vec<RawInput> {
    match event {
        Event::Key(key) => translate_key(key, enhanced),
        Event::Mouse(mouse) => translate_mouse(mouse),
        _ => Vec::new(),
    }
}

fn translate_key(key: &KeyEvent, enhanced: bool) -> Vec<RawInput> {
    let Some(logical) = logical_key(key.code) else {
        return Vec::new();
    };
    let mods = Modifiers {
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
    };
    match key.kind {
        KeyEventKind::Press => {
            let mut out = vec![RawInput::KeyDown { key: logical, mods }];
            if !enhanced {
                out.push(RawInput::KeyUp { key: logical });
            }
            out
        }
        KeyEventKind::Release => vec![RawInput::KeyUp { key: logical }],
        // Terminal auto-repeat is not a new press
        KeyEventKind::Repeat => Vec::new(),
    }
}

fn logical_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

fn translate_mouse(mouse: &MouseEvent) -> Vec<RawInput> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => vec![RawInput::PointerDown {
            column: mouse.column,
            row: mouse.row,
        }],
        MouseEventKind::Up(MouseButton::Left) => vec![RawInput::PointerUp],
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
            vec![RawInput::PointerMove {
                column: mouse.column,
                row: mouse.row,
            }]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    // --- key translation ---

    #[test]
    fn press_without_release_reporting_synthesizes_the_release() {
        let raw = translate_key(&press(KeyCode::Enter, KeyModifiers::NONE), false);
        assert_eq!(
            raw,
            vec![
                RawInput::KeyDown { key: Key::Enter, mods: Modifiers::default() },
                RawInput::KeyUp { key: Key::Enter },
            ]
        );
    }

    #[test]
    fn press_with_release_reporting_stays_a_bare_press() {
        let raw = translate_key(&press(KeyCode::Char(' '), KeyModifiers::NONE), true);
        assert_eq!(
            raw,
            vec![RawInput::KeyDown { key: Key::Space, mods: Modifiers::default() }]
        );
    }

    #[test]
    fn release_events_translate_to_key_up() {
        let mut event = press(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(translate_key(&event, true), vec![RawInput::KeyUp { key: Key::Enter }]);
    }

    #[test]
    fn terminal_auto_repeat_is_dropped() {
        let mut event = press(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Repeat;
        assert!(translate_key(&event, true).is_empty());
    }

    #[test]
    fn modifiers_carry_through() {
        let raw = translate_key(
            &press(KeyCode::Char('r'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            true,
        );
        assert_eq!(
            raw,
            vec![RawInput::KeyDown {
                key: Key::Char('r'),
                mods: Modifiers { shift: true, ctrl: true },
            }]
        );
    }

    #[test]
    fn function_keys_are_ignored() {
        assert!(translate_key(&press(KeyCode::F(5), KeyModifiers::NONE), true).is_empty());
    }

    // --- mouse translation ---

    #[test]
    fn left_click_maps_to_pointer_down_and_up() {
        let down = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 10,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            translate_mouse(&down),
            vec![RawInput::PointerDown { column: 10, row: 4 }]
        );
        let up = MouseEvent { kind: MouseEventKind::Up(MouseButton::Left), ..down };
        assert_eq!(translate_mouse(&up), vec![RawInput::PointerUp]);
    }

    #[test]
    fn motion_maps_to_pointer_move_and_scroll_is_ignored() {
        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 3,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            translate_mouse(&moved),
            vec![RawInput::PointerMove { column: 3, row: 7 }]
        );
        let scroll = MouseEvent { kind: MouseEventKind::ScrollUp, ..moved };
        assert!(translate_mouse(&scroll).is_empty());
    }
}
