//! Top-level game modes.
//!
//! Exactly one state is live at a time.  The manager forwards every tick's
//! events, update and render to it; a state asks for a transition by
//! returning the id of the state to switch to.  Entering a state runs its
//! `on_enter`, which is where the shared timer is started, stopped or reset.

use std::collections::BTreeMap;

use tracing::{error, info, warn};

use crate::input::{Action, InputSnapshot};
use crate::render::Canvas;
use crate::session::{Session, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateId {
    Start,
    Gameplay,
    Paused,
    Shop,
    End,
}

pub trait GameState {
    fn on_enter(&mut self, session: &mut Session);

    /// React to this tick's one-shot actions.
    fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId>;

    fn update(&mut self, _session: &mut Session, _input: &InputSnapshot) -> Option<StateId> {
        None
    }

    fn render(&self, _session: &Session, _canvas: &mut dyn Canvas) {}
}

pub struct GameStateManager {
    states: BTreeMap<StateId, Box<dyn GameState>>,
    current: StateId,
}

impl GameStateManager {
    /// An empty manager.  Register states, then `switch_state` into the first.
    pub fn empty(initial: StateId) -> Self {
        Self {
            states: BTreeMap::new(),
            current: initial,
        }
    }

    /// The standard five states, entered at `start`.
    pub fn new(session: &mut Session) -> Self {
        let mut manager = Self::empty(StateId::Start);
        manager.register_state(StateId::Start, Box::new(StartState));
        manager.register_state(StateId::Gameplay, Box::new(GameplayState));
        manager.register_state(StateId::Paused, Box::new(PausedState));
        manager.register_state(StateId::Shop, Box::new(ShopState));
        manager.register_state(StateId::End, Box::new(EndState));
        manager.switch_state(StateId::Start, session);
        manager
    }

    pub fn register_state(&mut self, id: StateId, state: Box<dyn GameState>) {
        self.states.insert(id, state);
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn switch_state(&mut self, id: StateId, session: &mut Session) {
        let Some(state) = self.states.get_mut(&id) else {
            warn!(?id, "switch to unregistered state ignored");
            return;
        };
        info!(from = ?self.current, to = ?id, "state switch");
        self.current = id;
        state.on_enter(session);
    }

    pub fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) {
        let next = self
            .states
            .get_mut(&self.current)
            .and_then(|state| state.handle_events(session, input));
        if let Some(id) = next {
            self.switch_state(id, session);
        }
    }

    pub fn update(&mut self, session: &mut Session, input: &InputSnapshot) {
        let next = self
            .states
            .get_mut(&self.current)
            .and_then(|state| state.update(session, input));
        if let Some(id) = next {
            self.switch_state(id, session);
        }
    }

    pub fn render(&self, session: &Session, canvas: &mut dyn Canvas) {
        if let Some(state) = self.states.get(&self.current) {
            state.render(session, canvas);
        }
    }

    /// Events then update for one frame.
    pub fn tick(&mut self, session: &mut Session, input: &InputSnapshot) {
        self.handle_events(session, input);
        self.update(session, input);
    }
}

/// Rebuild the session for a new run.  A failure here means the settings no
/// longer match the content, so the game is asked to quit.
fn restart(session: &mut Session) -> Option<StateId> {
    match session.reset() {
        Ok(()) => Some(StateId::Start),
        Err(err) => {
            error!(%err, "restart failed");
            session.quit_requested = true;
            None
        }
    }
}

// ── States ────────────────────────────────────────────────────────────────────

pub struct StartState;

impl GameState for StartState {
    fn on_enter(&mut self, session: &mut Session) {
        session.timer.reset();
    }

    fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        if input.has(Action::Quit) {
            session.quit_requested = true;
            return None;
        }
        if input.has(Action::Confirm) {
            session.begin();
            return Some(StateId::Gameplay);
        }
        None
    }
}

pub struct GameplayState;

impl GameState for GameplayState {
    fn on_enter(&mut self, session: &mut Session) {
        session.shop.close();
        session.timer.start();
    }

    fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        if input.has(Action::Quit) {
            session.quit_requested = true;
            None
        } else if input.has(Action::Back) {
            Some(StateId::Paused)
        } else if input.has(Action::Shop) {
            Some(StateId::Shop)
        } else {
            None
        }
    }

    fn update(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        match session.tick(input) {
            TickOutcome::PlayerDied => Some(StateId::End),
            TickOutcome::Continue => None,
        }
    }

    fn render(&self, session: &Session, canvas: &mut dyn Canvas) {
        session.draw(canvas);
    }
}

pub struct PausedState;

impl GameState for PausedState {
    fn on_enter(&mut self, session: &mut Session) {
        session.timer.stop();
    }

    fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        if input.has(Action::Quit) {
            session.quit_requested = true;
            None
        } else if input.has(Action::Back) {
            Some(StateId::Gameplay)
        } else if input.has(Action::Restart) {
            restart(session)
        } else {
            None
        }
    }
}

pub struct ShopState;

impl GameState for ShopState {
    fn on_enter(&mut self, session: &mut Session) {
        session.shop.open();
        session.timer.stop();
    }

    fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        for action in &input.actions {
            match action {
                Action::Shop | Action::Back => {
                    session.shop.close();
                    return Some(StateId::Gameplay);
                }
                Action::Up => session.shop.select_prev(),
                Action::Down => session.shop.select_next(),
                Action::Confirm => {
                    let now = session.now();
                    let result =
                        session
                            .shop
                            .buy_selected(&mut session.player, &session.consumables, now);
                    session.shop.notice = Some(match result {
                        Ok(purchase) => format!("Bought {} for {} sh", purchase.item, purchase.cost),
                        Err(err) => err.to_string(),
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// The frozen scene stays visible behind the shop.
    fn render(&self, session: &Session, canvas: &mut dyn Canvas) {
        session.draw(canvas);
    }
}

pub struct EndState;

impl GameState for EndState {
    fn on_enter(&mut self, session: &mut Session) {
        session.timer.stop();
    }

    fn handle_events(&mut self, session: &mut Session, input: &InputSnapshot) -> Option<StateId> {
        if input.has(Action::Quit) {
            session.quit_requested = true;
            None
        } else if input.has(Action::Restart) {
            restart(session)
        } else {
            None
        }
    }

    fn render(&self, session: &Session, canvas: &mut dyn Canvas) {
        session.draw(canvas);
    }
}
