use astral_shards::config::GameConfig;
use astral_shards::input::{Action, InputSnapshot};
use astral_shards::render::RecordingCanvas;
use astral_shards::session::{Session, SessionSettings};
use astral_shards::state::{GameState, GameStateManager, StartState, StateId};
use astral_shards::timer::ManualClock;
use astral_shards::wave::WaveStatus;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_session() -> (ManualClock, Session) {
    let clock = ManualClock::new();
    let session = Session::new(
        GameConfig::bundled().unwrap(),
        SessionSettings::default(),
        Box::new(clock.clone()),
        StdRng::seed_from_u64(42),
    )
    .unwrap();
    (clock, session)
}

fn press(action: Action) -> InputSnapshot {
    InputSnapshot::default().with_action(action)
}

fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

fn assert_secs(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}s, got {actual}s");
}

/// A session already past the start screen.
fn playing() -> (ManualClock, Session, GameStateManager) {
    let (clock, mut session) = make_session();
    let mut states = GameStateManager::new(&mut session);
    states.tick(&mut session, &press(Action::Confirm));
    (clock, session, states)
}

// ── Start ─────────────────────────────────────────────────────────────────────

#[test]
fn game_opens_on_the_start_screen_with_time_stopped() {
    let (clock, mut session) = make_session();
    let states = GameStateManager::new(&mut session);
    clock.advance(10.0);
    assert_eq!(states.current(), StateId::Start);
    assert!(!session.timer.is_running());
    assert_secs(session.now(), 0.0);
    assert_eq!(session.waves.status(), WaveStatus::Idle);
}

#[test]
fn start_screen_ignores_gameplay_input() {
    let (clock, mut session) = make_session();
    let mut states = GameStateManager::new(&mut session);
    let mut input = idle();
    input.fire = true;
    input.movement.x = 1.0;
    states.tick(&mut session, &input);
    clock.advance(1.0);
    assert_eq!(states.current(), StateId::Start);
    assert!(session.weapons.projectiles.is_empty());
    assert_eq!(session.player.position, session.world.size() * 0.5);
}

#[test]
fn confirm_starts_play_and_the_first_wave() {
    let (_clock, session, states) = playing();
    assert_eq!(states.current(), StateId::Gameplay);
    assert!(session.timer.is_running());
    assert_eq!(session.waves.current_wave_number(), Some(1));
    assert_eq!(session.waves.wave_start_offset(), Some(0.0));
}

// ── Pause ─────────────────────────────────────────────────────────────────────

#[test]
fn pausing_freezes_game_time() {
    let (clock, mut session, mut states) = playing();
    clock.advance(5.0);
    states.tick(&mut session, &press(Action::Back));
    assert_eq!(states.current(), StateId::Paused);
    assert!(!session.timer.is_running());

    clock.advance(100.0);
    states.tick(&mut session, &idle());
    assert_secs(session.now(), 5.0);

    states.tick(&mut session, &press(Action::Back));
    assert_eq!(states.current(), StateId::Gameplay);
    clock.advance(3.0);
    assert_secs(session.now(), 8.0);
}

#[test]
fn restart_from_pause_resets_the_run() {
    let (clock, mut session, mut states) = playing();
    clock.advance(4.0);
    states.tick(&mut session, &idle());
    session.player.astral_shards = 999;
    session.player.hp = 12.0;

    states.tick(&mut session, &press(Action::Back));
    states.tick(&mut session, &press(Action::Restart));
    assert_eq!(states.current(), StateId::Start);
    assert_eq!(session.player.astral_shards, 50);
    assert_eq!(session.player.hp, 100.0);
    assert!(session.enemies.is_empty());
    assert_eq!(session.waves.status(), WaveStatus::Idle);
    assert_secs(session.now(), 0.0);
    assert!(session.weapons.active_weapon.is_some());
}

// ── Shop ──────────────────────────────────────────────────────────────────────

#[test]
fn shop_stops_time_and_sells() {
    let (clock, mut session, mut states) = playing();
    clock.advance(2.0);
    states.tick(&mut session, &press(Action::Shop));
    assert_eq!(states.current(), StateId::Shop);
    assert!(session.shop.visible);
    assert!(!session.timer.is_running());

    // First item: the max-hp sigil for 40 shards.
    states.tick(&mut session, &press(Action::Confirm));
    assert_eq!(session.player.max_hp, 175.0);
    assert_eq!(session.player.astral_shards, 10);
    assert!(session.shop.notice.is_some());

    // Too poor for a second one; the shop says so and nothing changes.
    states.tick(&mut session, &press(Action::Confirm));
    assert_eq!(session.player.astral_shards, 10);
    assert!(session
        .shop
        .notice
        .as_deref()
        .is_some_and(|notice| notice.contains("not enough")));

    clock.advance(50.0);
    states.tick(&mut session, &press(Action::Shop));
    assert_eq!(states.current(), StateId::Gameplay);
    assert!(!session.shop.visible);
    assert_secs(session.now(), 2.0);
}

#[test]
fn shop_cursor_follows_up_and_down() {
    let (_clock, mut session, mut states) = playing();
    states.tick(&mut session, &press(Action::Shop));
    states.tick(&mut session, &press(Action::Down));
    states.tick(&mut session, &press(Action::Down));
    assert_eq!(session.shop.selected, 2);
    states.tick(&mut session, &press(Action::Up));
    assert_eq!(session.shop.selected, 1);
}

// ── Death ─────────────────────────────────────────────────────────────────────

#[test]
fn death_ends_the_run_and_restart_goes_back_to_start() {
    let (clock, mut session, mut states) = playing();
    clock.advance(1.0);
    session.player.hp = 0.0;
    states.tick(&mut session, &idle());
    assert_eq!(states.current(), StateId::End);
    assert!(!session.timer.is_running());

    states.tick(&mut session, &idle());
    assert_eq!(states.current(), StateId::End);

    states.tick(&mut session, &press(Action::Restart));
    assert_eq!(states.current(), StateId::Start);
    assert!(!session.player.is_dead());
}

// ── Gameplay tick ─────────────────────────────────────────────────────────────

#[test]
fn holding_fire_shoots_at_the_pointer() {
    let (clock, mut session, mut states) = playing();
    let mut input = idle();
    input.fire = true;
    input.pointer = session.camera.apply(session.player.position) + glam::Vec2::new(200.0, 0.0);

    clock.advance(0.1);
    states.tick(&mut session, &input);
    assert_eq!(session.weapons.projectiles.len(), 1);
    let shot = &session.weapons.projectiles[0];
    assert!(shot.direction.abs_diff_eq(glam::Vec2::X, 1e-6));
}

#[test]
fn number_keys_use_inventory_slots() {
    let (clock, mut session, mut states) = playing();
    let potion = session.consumables.create_consumable("swift_draught").unwrap();
    session.player.inventory.add_consumable(potion).unwrap();

    clock.advance(0.1);
    states.tick(&mut session, &press(Action::UseSlot(0)));
    assert_eq!(session.player.stats.movement_speed, 8.0);
}

#[test]
fn gameplay_renders_the_scene() {
    let (clock, mut session, mut states) = playing();
    clock.advance(0.1);
    states.tick(&mut session, &idle());

    let mut canvas = RecordingCanvas::default();
    states.render(&session, &mut canvas);
    assert!(canvas.calls.iter().any(|(glyph, _)| glyph.starts_with("Player")));
}

#[test]
fn quit_is_honoured_everywhere() {
    let (_clock, mut session, mut states) = playing();
    states.tick(&mut session, &press(Action::Quit));
    assert!(session.quit_requested);
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[test]
fn switching_to_an_unregistered_state_is_ignored() {
    let (_clock, mut session) = make_session();
    let mut states = GameStateManager::empty(StateId::Start);
    states.register_state(StateId::Start, Box::new(StartState));
    states.switch_state(StateId::End, &mut session);
    assert_eq!(states.current(), StateId::Start);
}

/// A state that counts how often it is entered.
struct Counter {
    entered: std::rc::Rc<std::cell::Cell<u32>>,
}

impl GameState for Counter {
    fn on_enter(&mut self, _session: &mut Session) {
        self.entered.set(self.entered.get() + 1);
    }

    fn handle_events(&mut self, _session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        input.has(Action::Confirm).then_some(StateId::End)
    }
}

#[test]
fn switching_runs_on_enter_of_the_new_state() {
    let (_clock, mut session) = make_session();
    let entered = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut states = GameStateManager::empty(StateId::Start);
    states.register_state(StateId::Start, Box::new(StartState));
    states.register_state(
        StateId::End,
        Box::new(Counter {
            entered: entered.clone(),
        }),
    );

    states.switch_state(StateId::End, &mut session);
    assert_eq!(entered.get(), 1);
    states.tick(&mut session, &press(Action::Confirm));
    assert_eq!(entered.get(), 2);
}
