//! Headless demo shell
//!
//! Drives a [`GameSession`] frame by frame with either a scripted clock
//! (default, deterministic) or the wall clock, playing a bot that echoes
//! sequences until the requested number of rounds is cleared and then
//! deliberately misses. `--keys` swaps the bot for a scripted key string
//! run through [`KeyBindings`]. The run ends with one JSON report line on
//! stdout.

use std::env;
use std::fmt;
use std::process;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use keyecho::Millis;
use keyecho::clock::{Clock, ManualClock, SystemClock};
use keyecho::consts::FRAME_MS;
use keyecho::game::{ButtonName, RoundSnapshot, RoundState, UniformButtons};
use keyecho::input::{KeyBindings, PressQueue};
use keyecho::session::{GameSession, PauseOverlay, Renderer};

const USAGE: &str = "\
keyecho demo
usage: keyecho [--seed N] [--rounds N] [--keys STRING] [--invert] [--realtime]
  --seed N      sequence RNG seed (default 7)
  --rounds N    rounds the bot clears before missing on purpose (default 3)
  --keys STRING play these keys instead of the bot (w/a/s/d/space)
  --invert      swap each direction key for its opposite
  --realtime    run on the wall clock instead of scripted 16 ms frames
  -h, --help    show this help";

/// Pace between presses while echoing
const PRESS_GAP_MS: Millis = 250;
/// The demo pauses once, mid-echo of the second round, for this long
const DEMO_PAUSE_LEN_MS: Millis = 1200;
/// Runaway guard for the frame loop
const MAX_FRAMES: u64 = 200_000;

struct DemoArgs {
    seed: u64,
    rounds: u32,
    keys: Option<String>,
    invert: bool,
    realtime: bool,
}

fn parse_args() -> Result<DemoArgs, String> {
    let mut args = DemoArgs {
        seed: 7,
        rounds: 3,
        keys: None,
        invert: false,
        realtime: false,
    };
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => args.seed = next_value(&mut it, "--seed")?,
            "--rounds" => args.rounds = next_value(&mut it, "--rounds")?,
            "--keys" => {
                args.keys = Some(
                    it.next()
                        .ok_or_else(|| "--keys needs a value".to_string())?,
                );
            }
            "--invert" => args.invert = true,
            "--realtime" => args.realtime = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn next_value<T: FromStr>(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<T, String>
where
    T::Err: fmt::Display,
{
    let raw = it
        .next()
        .ok_or_else(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|err| format!("bad value for {flag}: {err}"))
}

enum DemoClock {
    Real(SystemClock),
    Scripted(ManualClock),
}

impl DemoClock {
    fn now_ms(&self) -> Millis {
        match self {
            Self::Real(clock) => clock.now_ms(),
            Self::Scripted(clock) => clock.now_ms(),
        }
    }

    fn wait_frame(&self) {
        match self {
            Self::Real(_) => thread::sleep(Duration::from_millis(FRAME_MS)),
            Self::Scripted(clock) => clock.advance(FRAME_MS),
        }
    }
}

/// Log-line renderer: one line per visible change, nothing per idle frame
#[derive(Default)]
struct LogRenderer {
    last: Option<RoundSnapshot>,
    last_paused: bool,
}

impl Renderer for LogRenderer {
    fn draw(&mut self, frame: &RoundSnapshot, paused: bool) {
        if paused != self.last_paused {
            log::info!("{}", if paused { "== PAUSED ==" } else { "== RESUMED ==" });
            self.last_paused = paused;
        }
        let changed = self.last.map_or(true, |last| {
            last.state != frame.state
                || last.flash_button != frame.flash_button
                || last.flash_state != frame.flash_state
                || last.score != frame.score
        });
        if changed {
            let flash = frame.flash_button.map_or("-", |b| b.as_str());
            log::info!(
                "{:?} round {} idx {} score {} flash {} ({:?}) timer {:.2}",
                frame.state,
                frame.round,
                frame.player_index,
                frame.score,
                flash,
                frame.flash_state,
                frame.timer_fraction,
            );
        }
        self.last = Some(*frame);
    }
}

enum Player {
    Bot { last_press: Millis },
    Keys {
        chars: Vec<char>,
        cursor: usize,
        bindings: KeyBindings,
        last_press: Millis,
    },
}

impl Player {
    fn from_args(args: &DemoArgs) -> Self {
        match &args.keys {
            Some(keys) => {
                let mut bindings = KeyBindings::new();
                if args.invert {
                    bindings.toggle_invert();
                }
                Self::Keys {
                    chars: keys.chars().collect(),
                    cursor: 0,
                    bindings,
                    last_press: 0,
                }
            }
            None => Self::Bot { last_press: 0 },
        }
    }

    /// Queue at most one press per call, paced by [`PRESS_GAP_MS`].
    fn play(&mut self, session: &GameSession, queue: &mut PressQueue, rounds: u32, now: Millis) {
        if session.engine().state() != RoundState::Input {
            return;
        }
        match self {
            Self::Bot { last_press } => {
                if now < *last_press + PRESS_GAP_MS {
                    return;
                }
                let sequence = session.engine().sequence();
                let Some(&expected) = sequence.get(session.engine().player_index()) else {
                    return;
                };
                let button = if session.engine().score() >= rounds {
                    wrong_button(expected)
                } else {
                    expected
                };
                queue.push(button, now);
                *last_press = now;
            }
            Self::Keys {
                chars,
                cursor,
                bindings,
                last_press,
            } => {
                if now < *last_press + PRESS_GAP_MS {
                    return;
                }
                let Some(&key) = chars.get(*cursor) else {
                    return;
                };
                *cursor += 1;
                *last_press = now;
                match bindings.button_for(key) {
                    Some(button) => queue.push(button, now),
                    None => log::debug!("ignoring unbound key {key:?}"),
                }
            }
        }
    }
}

fn wrong_button(expected: ButtonName) -> ButtonName {
    ButtonName::ALL
        .iter()
        .copied()
        .find(|&b| b != expected)
        .unwrap_or(expected)
}

fn run(args: &DemoArgs) {
    let clock = if args.realtime {
        DemoClock::Real(SystemClock::new())
    } else {
        DemoClock::Scripted(ManualClock::new(0))
    };

    let session = GameSession::new(Box::new(UniformButtons::new(args.seed)), 0, clock.now_ms());
    let overlay = PauseOverlay::new(session.bus());
    let mut renderer = LogRenderer::default();
    let mut queue = PressQueue::new();
    let mut player = Player::from_args(args);

    log::info!(
        "seed {} rounds {} player {}",
        args.seed,
        args.rounds,
        if args.keys.is_some() { "keys" } else { "bot" },
    );

    let mut did_pause = false;
    let mut resume_at: Millis = 0;
    let mut frames: u64 = 0;
    loop {
        let now = clock.now_ms();

        if !did_pause
            && session.engine().state() == RoundState::Input
            && session.engine().score() == 1
        {
            session.toggle_pause(now);
            resume_at = now + DEMO_PAUSE_LEN_MS;
            did_pause = true;
        } else if session.is_paused() && now >= resume_at {
            session.toggle_pause(now);
        }

        if !session.is_paused() {
            player.play(&session, &mut queue, args.rounds, now);
        }
        session.tick(now, &mut queue);
        renderer.draw(&session.snapshot(), overlay.visible());

        if session.engine().state() == RoundState::GameOver {
            break;
        }
        frames += 1;
        if frames >= MAX_FRAMES {
            log::error!("frame cap hit after {frames} frames, bailing out");
            process::exit(1);
        }
        clock.wait_frame();
    }

    let report = session.report();
    match serde_json::to_string(&report) {
        Ok(line) => println!("{line}"),
        Err(err) => log::error!("report serialization failed: {err}"),
    }
}

fn main() {
    env_logger::init();
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };
    run(&args);
}
