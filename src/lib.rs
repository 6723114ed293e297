//! KeyEcho - a Simon-style sequence memory game
//!
//! Core modules:
//! - `game`: Deterministic game core (event bus, answer countdown, round state machine)
//! - `clock`: Millisecond clocks for the frame loop
//! - `input`: Button presses, press queues, key bindings
//! - `session`: Frame-loop driver tying the core to a host shell
//!
//! The whole crate is single-threaded: components share state through
//! `Rc`/`RefCell` and the public handle types are `!Send`.

pub mod clock;
pub mod game;
pub mod input;
pub mod session;

pub use game::{ButtonName, EventBus, EventData, FlashState, GameTimer, RoundEngine, RoundState};
pub use session::GameSession;

/// Millisecond timestamp as reported by a [`clock::Clock`].
pub type Millis = u64;

/// Game timing constants
pub mod consts {
    use crate::Millis;

    /// Countdown budget for echoing a full sequence
    pub const TIME_LIMIT_MS: Millis = 5_000;
    /// How long a pressed button stays lit
    pub const PRESS_FLASH_MS: Millis = 400;
    /// Rest between completing a sequence and growing it again
    pub const NEXT_ROUND_DELAY_MS: Millis = 1_000;
    /// Lead-in from growing the sequence to the first playback light
    pub const PLAYBACK_DELAY_MS: Millis = 800;
    /// Dark gap between playback lights
    pub const PLAYBACK_GAP_MS: Millis = 300;
    /// How long each playback light stays lit
    pub const PLAYBACK_LIT_MS: Millis = 600;

    /// Frame period of the cooperative driver loop (~60 Hz)
    pub const FRAME_MS: Millis = 16;
}
