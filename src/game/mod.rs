//! Game core - deterministic round logic
//!
//! Everything that decides gameplay lives here. This module must stay
//! deterministic and renderer-free:
//! - Time only enters through `now` timestamps passed in by the driver
//! - No direct rendering (drivers read state through snapshots)
//! - Randomness only through an injected [`ButtonSource`]

pub mod bus;
pub mod buttons;
pub mod round;
pub mod timer;

pub use bus::{EventBus, EventData, events};
pub use buttons::{ButtonName, ButtonSource, UniformButtons};
pub use round::{FlashState, RoundEngine, RoundSnapshot, RoundState};
pub use timer::GameTimer;
