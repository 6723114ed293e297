//! Round state machine: grow the sequence, play it back, accept the echo
//!
//! One round is grow → playback → echo. The engine owns the sequence and
//! flash bookkeeping, leans on a [`GameTimer`] for the answer window, and
//! learns about expiry the same way everyone else does: over the bus.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::consts::{
    NEXT_ROUND_DELAY_MS, PLAYBACK_DELAY_MS, PLAYBACK_GAP_MS, PLAYBACK_LIT_MS, PRESS_FLASH_MS,
};
use crate::game::bus::{EventBus, EventData, events};
use crate::game::buttons::{ButtonName, ButtonSource};
use crate::game::timer::GameTimer;

/// Phase of the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting out the rest period before the sequence grows
    Adding,
    /// Playing the sequence back to the player
    Showing,
    /// Player is echoing the sequence against the countdown
    Input,
    /// A wrong press or an expired countdown ended the run
    GameOver,
}

/// How the flashed button is lit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlashState {
    /// Not lit
    #[default]
    Normal,
    /// Lit by playback
    Indicated,
    /// Lit by a player press
    Pressed,
}

/// Game-over reason shown when the player pressed the wrong button
pub const REASON_WRONG_INPUT: &str = "Wrong input!";
/// Game-over reason shown when the countdown ran out
pub const REASON_TIME_UP: &str = "Time's up!";

/// Read-only view of the round, assembled per frame for renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub state: RoundState,
    /// Round number, which is also the sequence length
    pub round: usize,
    pub player_index: usize,
    pub score: u32,
    pub flash_button: Option<ButtonName>,
    pub flash_state: FlashState,
    /// Countdown share left; only meaningful while echoing
    pub timer_fraction: f32,
}

struct RoundInner {
    sequence: Vec<ButtonName>,
    player_index: usize,
    score: u32,
    initial_score: u32,
    state: RoundState,
    flash_button: Option<ButtonName>,
    flash_state: FlashState,
    flash_end: Millis,
    /// Absolute deadline of the next scheduled beat (grow or light)
    next_time: Millis,
    show_index: usize,
    showing_lit: bool,
    gameover_reason: Option<&'static str>,
    buttons: Box<dyn ButtonSource>,
}

impl RoundInner {
    fn clear_flash(&mut self) {
        self.flash_button = None;
        self.flash_state = FlashState::Normal;
    }
}

enum PressVerdict {
    Wrong,
    Advanced,
    Completed,
}

/// The round engine.
///
/// Cloning yields another handle on the same engine. All methods take the
/// driver's `now`; the engine never reads a clock.
#[derive(Clone)]
pub struct RoundEngine {
    inner: Rc<RefCell<RoundInner>>,
    timer: GameTimer,
}

impl RoundEngine {
    /// Build an engine on `bus`, drawing sequence buttons from `buttons`.
    ///
    /// The first growth happens [`PLAYBACK_DELAY_MS`] after `now`.
    /// `initial_score` carries a score across retries; fresh runs pass 0.
    pub fn new(
        bus: &EventBus,
        timer: GameTimer,
        buttons: Box<dyn ButtonSource>,
        initial_score: u32,
        now: Millis,
    ) -> Self {
        let inner = Rc::new(RefCell::new(RoundInner {
            sequence: Vec::new(),
            player_index: 0,
            score: initial_score,
            initial_score,
            state: RoundState::Adding,
            flash_button: None,
            flash_state: FlashState::Normal,
            flash_end: 0,
            next_time: now + PLAYBACK_DELAY_MS,
            show_index: 0,
            showing_lit: false,
            gameover_reason: None,
            buttons,
        }));

        {
            let inner = Rc::clone(&inner);
            bus.subscribe(events::TIMER_EXPIRED, move |data| {
                Self::on_timer_expired(&inner, data);
            });
        }

        Self { inner, timer }
    }

    /// Advance the round to `now`. Called once per unpaused frame.
    pub fn update(&self, now: Millis) {
        let state = self.inner.borrow().state;
        match state {
            RoundState::Adding => self.update_adding(now),
            RoundState::Showing => self.update_showing(now),
            RoundState::Input => self.update_input(now),
            RoundState::GameOver => {}
        }
    }

    fn update_adding(&self, now: Millis) {
        let mut e = self.inner.borrow_mut();
        if now < e.next_time {
            return;
        }
        let button = e.buttons.next_button();
        e.sequence.push(button);
        e.player_index = 0;
        e.show_index = 0;
        e.showing_lit = false;
        e.clear_flash();
        e.next_time = now + PLAYBACK_DELAY_MS;
        e.state = RoundState::Showing;
        log::debug!("round {}: sequence grew (+{})", e.sequence.len(), button.as_str());
    }

    fn update_showing(&self, now: Millis) {
        let playback_done = {
            let mut e = self.inner.borrow_mut();
            if e.show_index >= e.sequence.len() {
                e.state = RoundState::Input;
                true
            } else if e.showing_lit {
                if now >= e.flash_end {
                    e.clear_flash();
                    e.show_index += 1;
                    e.showing_lit = false;
                    e.next_time = now + PLAYBACK_GAP_MS;
                }
                false
            } else {
                if now >= e.next_time {
                    e.flash_button = Some(e.sequence[e.show_index]);
                    e.flash_state = FlashState::Indicated;
                    e.flash_end = now + PLAYBACK_LIT_MS;
                    e.showing_lit = true;
                }
                false
            }
        };
        // timer.start emits on the bus; the engine borrow must already be
        // released when listeners run.
        if playback_done {
            self.timer.start(now);
        }
    }

    fn update_input(&self, now: Millis) {
        {
            let mut e = self.inner.borrow_mut();
            if e.flash_button.is_some() && now >= e.flash_end {
                e.clear_flash();
            }
        }
        // timer_expired re-enters the engine through its subscription; no
        // borrow may be held across this call.
        self.timer.update(now);
    }

    /// Feed one button press.
    ///
    /// Only meaningful while echoing: the driver gates presses on `Input`,
    /// and anything arriving in another phase is dropped here as well.
    pub fn handle_input(&self, button: ButtonName, now: Millis) {
        let verdict = {
            let mut e = self.inner.borrow_mut();
            if e.state != RoundState::Input {
                return;
            }
            e.flash_button = Some(button);
            e.flash_state = FlashState::Pressed;
            e.flash_end = now + PRESS_FLASH_MS;

            let Some(&expected) = e.sequence.get(e.player_index) else {
                return;
            };
            if button != expected {
                e.state = RoundState::GameOver;
                e.gameover_reason = Some(REASON_WRONG_INPUT);
                PressVerdict::Wrong
            } else {
                e.player_index += 1;
                if e.player_index == e.sequence.len() {
                    e.score += 1;
                    e.next_time = now + NEXT_ROUND_DELAY_MS;
                    e.state = RoundState::Adding;
                    PressVerdict::Completed
                } else {
                    PressVerdict::Advanced
                }
            }
        };

        match verdict {
            PressVerdict::Wrong => {
                self.timer.stop();
                log::info!("run over: {} (score {})", REASON_WRONG_INPUT, self.score());
            }
            PressVerdict::Completed => {
                self.timer.stop();
                log::debug!("sequence echoed, score {}", self.score());
            }
            PressVerdict::Advanced => {}
        }
    }

    /// Start the run over: empty sequence, score back to the carried
    /// initial value, next growth [`PLAYBACK_DELAY_MS`] after `now`.
    /// Subscriptions and the timer are kept.
    pub fn reset(&self, now: Millis) {
        let mut e = self.inner.borrow_mut();
        e.sequence.clear();
        e.player_index = 0;
        e.score = e.initial_score;
        e.show_index = 0;
        e.showing_lit = false;
        e.clear_flash();
        e.flash_end = 0;
        e.gameover_reason = None;
        e.next_time = now + PLAYBACK_DELAY_MS;
        e.state = RoundState::Adding;
    }

    pub fn state(&self) -> RoundState {
        self.inner.borrow().state
    }

    pub fn score(&self) -> u32 {
        self.inner.borrow().score
    }

    /// Round number, which is also how long the sequence has grown
    pub fn round(&self) -> usize {
        self.inner.borrow().sequence.len()
    }

    pub fn sequence(&self) -> Vec<ButtonName> {
        self.inner.borrow().sequence.clone()
    }

    pub fn player_index(&self) -> usize {
        self.inner.borrow().player_index
    }

    pub fn flash_button(&self) -> Option<ButtonName> {
        self.inner.borrow().flash_button
    }

    pub fn flash_state(&self) -> FlashState {
        self.inner.borrow().flash_state
    }

    pub fn flash_end(&self) -> Millis {
        self.inner.borrow().flash_end
    }

    pub fn gameover_reason(&self) -> Option<&'static str> {
        self.inner.borrow().gameover_reason
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    /// Snapshot for renderers
    pub fn snapshot(&self) -> RoundSnapshot {
        let e = self.inner.borrow();
        RoundSnapshot {
            state: e.state,
            round: e.sequence.len(),
            player_index: e.player_index,
            score: e.score,
            flash_button: e.flash_button,
            flash_state: e.flash_state,
            timer_fraction: self.timer.fraction(),
        }
    }

    fn on_timer_expired(inner: &Rc<RefCell<RoundInner>>, data: &EventData) {
        let mut e = inner.borrow_mut();
        if e.state != RoundState::Input {
            return;
        }
        e.state = RoundState::GameOver;
        e.gameover_reason = Some(REASON_TIME_UP);
        // Collapse any pending pressed flash right away.
        if let Some(now) = data.now() {
            e.flash_end = now;
        }
        log::info!("run over: {} (score {})", REASON_TIME_UP, e.score);
    }
}
