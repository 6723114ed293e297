//! Answer countdown, driven by `update(now)` and narrated over the bus
//!
//! The timer never reads a clock: every public call takes the driver's
//! `now`. Pausing happens purely through `game_paused` / `game_resumed`
//! events, so whoever pauses the game needs no timer handle.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::Millis;
use crate::consts::TIME_LIMIT_MS;
use crate::game::bus::{EventBus, EventData, events};

#[derive(Debug)]
struct TimerState {
    active: bool,
    /// Signed: a start rebased by resume may sit ahead of a stale `now`.
    start_ticks: i64,
    paused_remaining: Option<Millis>,
    fraction: f32,
}

fn remaining_at(start_ticks: i64, now: Millis) -> Millis {
    let elapsed = now as i64 - start_ticks;
    (TIME_LIMIT_MS as i64 - elapsed).max(0) as Millis
}

/// Countdown over [`TIME_LIMIT_MS`] for the player's answer window.
///
/// Emits `timer_started`, `timer_tick`, `timer_expired`, `timer_paused`
/// and `timer_resumed`. Cloning yields another handle on the same timer.
#[derive(Clone)]
pub struct GameTimer {
    inner: Rc<RefCell<TimerState>>,
    bus: Rc<EventBus>,
}

impl GameTimer {
    /// Build an inactive timer on `bus` and subscribe its pause handlers.
    pub fn new(bus: &Rc<EventBus>) -> Self {
        let inner = Rc::new(RefCell::new(TimerState {
            active: false,
            start_ticks: 0,
            paused_remaining: None,
            fraction: 1.0,
        }));

        {
            let inner = Rc::clone(&inner);
            let bus_weak = Rc::downgrade(bus);
            bus.subscribe(events::GAME_PAUSED, move |data| {
                Self::on_game_paused(&inner, &bus_weak, data);
            });
        }
        {
            let inner = Rc::clone(&inner);
            let bus_weak = Rc::downgrade(bus);
            bus.subscribe(events::GAME_RESUMED, move |data| {
                Self::on_game_resumed(&inner, &bus_weak, data);
            });
        }

        Self {
            inner,
            bus: Rc::clone(bus),
        }
    }

    /// Arm the countdown at `now` and emit `timer_started`.
    ///
    /// Restarting is always allowed; any stored pause is discarded.
    pub fn start(&self, now: Millis) {
        {
            let mut t = self.inner.borrow_mut();
            t.start_ticks = now as i64;
            t.active = true;
            t.paused_remaining = None;
            t.fraction = 1.0;
        }
        self.bus.emit(events::TIMER_STARTED, EventData::None);
    }

    /// Disarm without any announcement. The display fraction resets to full.
    pub fn stop(&self) {
        let mut t = self.inner.borrow_mut();
        t.active = false;
        t.fraction = 1.0;
    }

    /// Advance the countdown to `now`. No-op while inactive.
    ///
    /// Emits `timer_tick { remaining, fraction }`, then `timer_expired
    /// { now }` exactly once when the budget reaches zero. `fraction` is
    /// never negative but is not clamped above 1.0: a `now` earlier than
    /// the recorded start yields more than the full budget, and renderers
    /// are expected to cope.
    pub fn update(&self, now: Millis) {
        let (remaining, fraction) = {
            let mut t = self.inner.borrow_mut();
            if !t.active {
                return;
            }
            let remaining = remaining_at(t.start_ticks, now);
            t.fraction = remaining as f32 / TIME_LIMIT_MS as f32;
            (remaining, t.fraction)
        };
        self.bus
            .emit(events::TIMER_TICK, EventData::Tick { remaining, fraction });
        if remaining == 0 {
            self.inner.borrow_mut().active = false;
            self.bus.emit(events::TIMER_EXPIRED, EventData::Now { now });
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    /// Share of the answer budget left as of the last update
    pub fn fraction(&self) -> f32 {
        self.inner.borrow().fraction
    }

    fn on_game_paused(inner: &Rc<RefCell<TimerState>>, bus: &Weak<EventBus>, data: &EventData) {
        let Some(now) = data.now() else {
            log::warn!("game_paused without a timestamp payload, ignoring");
            return;
        };
        let remaining = {
            let mut t = inner.borrow_mut();
            if !t.active {
                return;
            }
            let remaining = remaining_at(t.start_ticks, now);
            t.paused_remaining = Some(remaining);
            t.active = false;
            remaining
        };
        if let Some(bus) = bus.upgrade() {
            bus.emit(events::TIMER_PAUSED, EventData::Remaining { remaining });
        }
    }

    fn on_game_resumed(inner: &Rc<RefCell<TimerState>>, bus: &Weak<EventBus>, data: &EventData) {
        let Some(now) = data.now() else {
            log::warn!("game_resumed without a timestamp payload, ignoring");
            return;
        };
        let remaining = {
            let mut t = inner.borrow_mut();
            let Some(remaining) = t.paused_remaining.take() else {
                return;
            };
            t.start_ticks = now as i64 - (TIME_LIMIT_MS as i64 - remaining as i64);
            t.active = true;
            remaining
        };
        if let Some(bus) = bus.upgrade() {
            bus.emit(events::TIMER_RESUMED, EventData::Remaining { remaining });
        }
    }
}
