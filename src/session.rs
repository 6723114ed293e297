//! Session driver: one bus, one timer, one engine, one pause flag
//!
//! [`GameSession`] is what a frontend holds. It owns the wiring the game
//! pieces need and exposes a per-frame [`GameSession::tick`] that drains
//! input and advances the round. Pausing is a bus event like any other,
//! so the timer, the engine driver, and any overlay all hear it the same
//! way.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::Millis;
use crate::game::bus::{EventBus, EventData, events};
use crate::game::{ButtonSource, GameTimer, RoundEngine, RoundSnapshot};
use crate::input::InputSource;

/// End-of-run summary, printed by the demo as one JSON line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub score: u32,
    /// Why the run ended; `None` while it is still going
    pub reason: Option<&'static str>,
}

/// Pause indicator driven purely by bus traffic.
///
/// Frontends draw it; nothing ever polls the session for pause state.
#[derive(Clone, Default)]
pub struct PauseOverlay {
    visible: Rc<Cell<bool>>,
}

impl PauseOverlay {
    pub fn new(bus: &EventBus) -> Self {
        let overlay = Self::default();
        {
            let visible = Rc::clone(&overlay.visible);
            bus.subscribe(events::GAME_PAUSED, move |_| visible.set(true));
        }
        {
            let visible = Rc::clone(&overlay.visible);
            bus.subscribe(events::GAME_RESUMED, move |_| visible.set(false));
        }
        overlay
    }

    pub fn visible(&self) -> bool {
        self.visible.get()
    }
}

/// Per-frame sink for the current round picture
pub trait Renderer {
    fn draw(&mut self, frame: &RoundSnapshot, paused: bool);
}

/// A complete game wired and ready to tick
pub struct GameSession {
    bus: Rc<EventBus>,
    engine: RoundEngine,
    paused: Rc<Cell<bool>>,
}

impl GameSession {
    /// Wire up a fresh session. The first sequence growth lands
    /// `PLAYBACK_DELAY_MS` after `now`.
    pub fn new(buttons: Box<dyn ButtonSource>, initial_score: u32, now: Millis) -> Self {
        let bus = Rc::new(EventBus::new());
        let timer = GameTimer::new(&bus);
        let engine = RoundEngine::new(&bus, timer, buttons, initial_score, now);

        let paused = Rc::new(Cell::new(false));
        {
            let flag = Rc::clone(&paused);
            bus.subscribe(events::GAME_PAUSED, move |_| flag.set(true));
        }
        {
            let flag = Rc::clone(&paused);
            bus.subscribe(events::GAME_RESUMED, move |_| flag.set(false));
        }

        Self {
            bus,
            engine,
            paused,
        }
    }

    /// One frame: drain input, then advance the round.
    ///
    /// Input is drained even while paused so presses made during the pause
    /// are gone by the time play resumes. The engine itself drops presses
    /// that arrive outside the echo phase.
    pub fn tick(&self, now: Millis, input: &mut dyn InputSource) {
        let presses = input.drain();
        if self.paused.get() {
            return;
        }
        for press in presses {
            self.engine.handle_input(press.button, press.at);
        }
        self.engine.update(now);
    }

    /// Flip the pause state by emitting the matching bus event.
    ///
    /// External emitters work just as well; the session only listens.
    pub fn toggle_pause(&self, now: Millis) {
        if self.paused.get() {
            log::info!("resumed at {now} ms");
            self.bus.emit(events::GAME_RESUMED, EventData::Now { now });
        } else {
            log::info!("paused at {now} ms");
            self.bus.emit(events::GAME_PAUSED, EventData::Now { now });
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn timer(&self) -> &GameTimer {
        self.engine.timer()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.engine.snapshot()
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            score: self.engine.score(),
            reason: self.engine.gameover_reason(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::round::{REASON_WRONG_INPUT, RoundState};
    use crate::game::{ButtonName, FlashState};
    use crate::input::PressQueue;
    use std::collections::VecDeque;

    struct Script {
        queue: VecDeque<ButtonName>,
    }

    impl ButtonSource for Script {
        fn next_button(&mut self) -> ButtonName {
            self.queue.pop_front().unwrap_or(ButtonName::Up)
        }
    }

    fn session(buttons: &[ButtonName]) -> GameSession {
        GameSession::new(
            Box::new(Script {
                queue: buttons.iter().copied().collect(),
            }),
            0,
            0,
        )
    }

    /// Ticks a fresh session along the exact first-round beats; echo
    /// starts at t=2300.
    fn drive_to_input(session: &GameSession, queue: &mut PressQueue) -> Millis {
        for t in [800, 1600, 2200, 2300] {
            session.tick(t, &mut *queue);
        }
        assert_eq!(session.engine().state(), RoundState::Input);
        2300
    }

    #[test]
    fn test_session_plays_one_round() {
        let session = session(&[ButtonName::Up]);
        let mut queue = PressQueue::new();
        let t = drive_to_input(&session, &mut queue);
        assert!(session.timer().is_active());

        queue.push(ButtonName::Up, t + 100);
        session.tick(t + 100, &mut queue);
        assert_eq!(session.engine().state(), RoundState::Adding);
        assert_eq!(session.engine().score(), 1);
        assert!(!session.timer().is_active());
    }

    #[test]
    fn test_pause_freezes_playback() {
        let session = session(&[ButtonName::Up]);
        let mut queue = PressQueue::new();
        session.tick(800, &mut queue); // Showing, light due at 1600
        assert_eq!(session.engine().state(), RoundState::Showing);

        session.toggle_pause(900);
        assert!(session.is_paused());
        session.tick(1600, &mut queue);
        session.tick(1700, &mut queue);
        assert_eq!(session.engine().flash_button(), None);

        session.toggle_pause(1700);
        assert!(!session.is_paused());
        session.tick(1700, &mut queue);
        assert_eq!(session.engine().flash_button(), Some(ButtonName::Up));
        assert_eq!(session.engine().flash_state(), FlashState::Indicated);
    }

    #[test]
    fn test_pause_roundtrip_preserves_countdown() {
        let session = session(&[ButtonName::Up]);
        let mut queue = PressQueue::new();
        drive_to_input(&session, &mut queue); // timer started at 2300

        session.tick(4300, &mut queue);
        assert_eq!(session.snapshot().timer_fraction, 3000.0 / 5000.0);

        session.toggle_pause(4300);
        session.tick(30_000, &mut queue); // long pause, frame skipped
        session.toggle_pause(60_000);

        session.tick(61_000, &mut queue);
        assert_eq!(session.engine().state(), RoundState::Input);
        assert!(session.timer().is_active());
        assert_eq!(session.snapshot().timer_fraction, 2000.0 / 5000.0);
    }

    #[test]
    fn test_presses_made_while_paused_are_dropped() {
        let session = session(&[ButtonName::Up]);
        let mut queue = PressQueue::new();
        let t = drive_to_input(&session, &mut queue);

        session.toggle_pause(t + 100);
        queue.push(ButtonName::Up, t + 200);
        session.tick(t + 200, &mut queue);
        assert_eq!(session.engine().player_index(), 0);

        session.toggle_pause(t + 300);
        session.tick(t + 300, &mut queue);
        assert_eq!(session.engine().player_index(), 0);
        assert_eq!(session.engine().state(), RoundState::Input);
    }

    #[test]
    fn test_overlay_follows_pause_events() {
        let session = session(&[ButtonName::Up]);
        let overlay = PauseOverlay::new(session.bus());
        assert!(!overlay.visible());

        session.toggle_pause(100);
        assert!(overlay.visible());
        session.toggle_pause(200);
        assert!(!overlay.visible());
    }

    #[test]
    fn test_external_pause_emission_pauses_session() {
        let session = session(&[ButtonName::Up]);
        let mut queue = PressQueue::new();
        drive_to_input(&session, &mut queue);

        session
            .bus()
            .emit(events::GAME_PAUSED, EventData::Now { now: 2400 });
        assert!(session.is_paused());

        session
            .bus()
            .emit(events::GAME_RESUMED, EventData::Now { now: 2500 });
        assert!(!session.is_paused());
        session.tick(2600, &mut queue);
        assert_eq!(session.engine().state(), RoundState::Input);
    }

    #[test]
    fn test_report_reflects_run_end() {
        let session = session(&[ButtonName::Up]);
        let mut queue = PressQueue::new();
        let t = drive_to_input(&session, &mut queue);

        assert_eq!(session.report().reason, None);

        queue.push(ButtonName::Down, t + 100);
        session.tick(t + 100, &mut queue);
        let report = session.report();
        assert_eq!(report.score, 0);
        assert_eq!(report.reason, Some(REASON_WRONG_INPUT));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("Wrong input!"));
    }
}
