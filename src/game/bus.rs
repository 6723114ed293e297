//! Synchronous publish/subscribe hub for game events
//!
//! The bus is string-keyed and deliberately minimal: subscribe appends,
//! emit invokes, nothing unsubscribes. Components hand each other a
//! shared `Rc<EventBus>` at construction; there is no global instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::Millis;

/// Event names used by the game core.
///
/// Names are ordinary strings as far as the bus is concerned; these
/// constants only exist so call sites cannot typo them.
pub mod events {
    pub const TIMER_STARTED: &str = "timer_started";
    pub const TIMER_TICK: &str = "timer_tick";
    pub const TIMER_EXPIRED: &str = "timer_expired";
    pub const TIMER_PAUSED: &str = "timer_paused";
    pub const TIMER_RESUMED: &str = "timer_resumed";
    pub const GAME_PAUSED: &str = "game_paused";
    pub const GAME_RESUMED: &str = "game_resumed";
}

/// Payload attached to an emitted event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventData {
    /// No payload
    None,
    /// Timestamp of the emitting call
    Now { now: Millis },
    /// Milliseconds left on a countdown
    Remaining { remaining: Millis },
    /// Countdown progress: milliseconds left and their share of the full
    /// budget (may exceed 1.0, see [`GameTimer::update`])
    ///
    /// [`GameTimer::update`]: crate::game::GameTimer::update
    Tick { remaining: Millis, fraction: f32 },
}

impl EventData {
    /// Timestamp carried by `Now` payloads
    pub fn now(&self) -> Option<Millis> {
        match *self {
            EventData::Now { now } => Some(now),
            _ => None,
        }
    }

    /// Remaining milliseconds carried by `Remaining` and `Tick` payloads
    pub fn remaining(&self) -> Option<Millis> {
        match *self {
            EventData::Remaining { remaining } | EventData::Tick { remaining, .. } => {
                Some(remaining)
            }
            _ => None,
        }
    }

    /// Fraction carried by `Tick` payloads
    pub fn fraction(&self) -> Option<f32> {
        match *self {
            EventData::Tick { fraction, .. } => Some(fraction),
            _ => None,
        }
    }
}

type Listener = Rc<RefCell<dyn FnMut(&EventData)>>;

/// String-keyed synchronous event bus.
///
/// Callbacks run on the emitting call stack, in subscription order. The
/// same callback can be registered more than once and runs once per
/// registration. Emitting a name nobody subscribed to is a no-op.
///
/// Handlers may emit further events and may subscribe new callbacks, but
/// a handler must not re-enter itself; the game core never does.
pub struct EventBus {
    listeners: RefCell<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Register `callback` for `event`.
    ///
    /// Names are case-sensitive and never validated; subscribing is the
    /// only thing that makes a name meaningful.
    pub fn subscribe<F>(&self, event: &str, callback: F)
    where
        F: FnMut(&EventData) + 'static,
    {
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(Rc::new(RefCell::new(callback)));
    }

    /// Invoke every callback registered for `event`, in subscription order.
    ///
    /// The listener list is snapshotted first, so callbacks subscribed
    /// during the emission only run on later emissions.
    ///
    /// Failure policy: a panicking callback unwinds out of `emit` to the
    /// emitter, and callbacks registered after it are skipped for this
    /// emission. The bus itself remains usable afterwards.
    pub fn emit(&self, event: &str, data: EventData) {
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(event) {
            Some(list) => list.clone(),
            None => return,
        };
        for listener in snapshot {
            (&mut *listener.borrow_mut())(&data);
        }
    }

    /// Number of callbacks currently registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
