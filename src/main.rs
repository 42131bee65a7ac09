mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use astral_shards::config::GameConfig;
use astral_shards::input::{Action, InputSnapshot};
use astral_shards::session::{Session, SessionSettings};
use astral_shards::state::GameStateManager;
use astral_shards::timer::SystemClock;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

const DEFAULT_CONFIG_DIR: &str = "assets/config";
const LOG_FILE: &str = "astral_shards.log";

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// How far (in cells) the arrow keys push the aim point from the player.
const AIM_REACH: f32 = 8.0;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| is_held(key_frame, key, frame))
}

/// -1, 0 or +1 along one axis.
fn axis(key_frame: &HashMap<KeyCode, u64>, neg: &[KeyCode], pos: &[KeyCode], frame: u64) -> f32 {
    let neg = any_held(key_frame, neg, frame) as i32;
    let pos = any_held(key_frame, pos, frame) as i32;
    (pos - neg) as f32
}

/// One-shot action for a key press, if it has one.
fn action_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(Action::Shop),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Char(c @ '1'..='9') => c
            .to_digit(10)
            .map(|digit| Action::UseSlot(digit as usize - 1)),
        _ => None,
    }
}

/// Last known mouse state.
#[derive(Default)]
struct Mouse {
    /// Screen position of the last mouse event.
    pointer: Option<Vec2>,
    held: bool,
}

/// Fold the held keys and the mouse into this frame's snapshot.
///
/// Aim priority: arrow keys around the player, then the mouse, then straight
/// ahead in the direction the player faces.
fn snapshot(
    key_frame: &HashMap<KeyCode, u64>,
    frame: u64,
    mouse: &Mouse,
    session: &Session,
    actions: Vec<Action>,
) -> InputSnapshot {
    let movement = Vec2::new(
        axis(
            key_frame,
            &[KeyCode::Char('a'), KeyCode::Char('A')],
            &[KeyCode::Char('d'), KeyCode::Char('D')],
            frame,
        ),
        axis(
            key_frame,
            &[KeyCode::Char('w'), KeyCode::Char('W')],
            &[KeyCode::Char('s'), KeyCode::Char('S')],
            frame,
        ),
    );
    let aim = Vec2::new(
        axis(key_frame, &[KeyCode::Left], &[KeyCode::Right], frame),
        axis(key_frame, &[KeyCode::Up], &[KeyCode::Down], frame),
    );

    let player = session.camera.apply(session.player.position);
    let reach = AIM_REACH * display::CELL.x;
    let pointer = match (aim.try_normalize(), mouse.pointer) {
        (Some(dir), _) => player + dir * reach,
        (None, Some(pointer)) => pointer,
        (None, None) if session.player.facing_right => player + Vec2::X * reach,
        (None, None) => player - Vec2::X * reach,
    };
    let space = is_held(key_frame, &KeyCode::Char(' '), frame);

    InputSnapshot {
        movement,
        fire: space || mouse.held,
        pointer,
        actions,
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs go to a file in the temp dir.
fn init_logging() -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join(LOG_FILE);
    let file =
        File::create(&path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

/// Content from the directory given on the command line, else
/// `assets/config` if present, else the copy compiled into the binary.
fn load_config() -> anyhow::Result<GameConfig> {
    match std::env::args_os().nth(1) {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            GameConfig::load_dir(&dir)
                .with_context(|| format!("loading content from {}", dir.display()))
        }
        None if Path::new(DEFAULT_CONFIG_DIR).is_dir() => {
            GameConfig::load_dir(Path::new(DEFAULT_CONFIG_DIR))
                .with_context(|| format!("loading content from {DEFAULT_CONFIG_DIR}"))
        }
        None => GameConfig::bundled().context("loading bundled content"),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames), so WASD, Space and the arrows can all be
/// held at once.  Presses additionally raise one-shot `Action`s.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let mut states = GameStateManager::new(session);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut mouse = Mouse::default();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut actions = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code.clone(), frame);
                        actions.extend(action_for(code, modifiers));
                    }
                    // Repeat: refresh timestamp so key stays "held"
                    KeyEventKind::Repeat => {
                        key_frame.insert(code.clone(), frame);
                    }
                    // Release: remove key immediately (keyboard-enhancement path)
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => {
                    mouse.pointer = Some(display::cell_to_screen(column, row));
                    match kind {
                        MouseEventKind::Down(MouseButton::Left) => mouse.held = true,
                        MouseEventKind::Up(MouseButton::Left) => mouse.held = false,
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    session.set_screen_size(display::screen_size(cols, rows));
                }
                _ => {}
            }
        }

        let input = snapshot(&key_frame, frame, &mouse, session, actions);
        states.tick(session, &input);
        if session.quit_requested {
            info!("quit requested");
            return Ok(());
        }

        display::render(out, session, &states).context("drawing frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let log_path = init_logging()?;
    let config = load_config()?;

    let (cols, rows) = terminal::size().context("reading terminal size")?;
    let settings = SessionSettings {
        screen_size: display::screen_size(cols, rows),
        ..SessionSettings::default()
    };
    let mut session = Session::new(
        config,
        settings,
        Box::new(SystemClock::new()),
        StdRng::from_entropy(),
    )
    .context("starting session")?;
    info!(log = %log_path.display(), "astral shards starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut session, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
