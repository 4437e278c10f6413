pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod frames;
pub mod playback;
pub mod policy;
pub mod reference;
pub mod report;
pub mod session;
pub mod stattrack;

use command::{Command, HELP};
use config::{Config, Format, RunMode};
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use playback::{Mode, PlaybackController};
use session::{Inputs, Session};
use stattrack::Summary;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

/// Page identifiers as they appear in a reference string.
pub type PageId = i64;

pub const DEFAULT_REFERENCES: &str = "7,0,1,2,0,3,0,4,2,3,0,3,2,1,2,0,1,7,0,1";
pub const DEFAULT_FRAMES: u32 = 3;
pub const MAX_FRAMES: u32 = 10;
pub const DEFAULT_SPEED: f64 = 1.0;
pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 3.0;
/// Tick period at a speed multiplier of 1.
pub const BASE_TICK: Duration = Duration::from_millis(1000);

/// Build a session from the configuration and present it in the configured mode.
///
/// # Errors
///
/// Fails on invalid configuration, an unreadable reference file or a broken terminal.
pub fn run_simulation(config: Config) -> Result<()> {
    config.validate()?;
    let mut session = Session::build(Inputs {
        references: config.load_references()?,
        capacity: config.capacity(),
        policy: config.policy,
    });
    session.controller_mut().set_speed(config.speed)?;
    let details = !config.quiet_details;

    match (config.mode, config.format) {
        (RunMode::Compare, Format::Text) => {
            let summaries = report::compare(&session.inputs().references, config.capacity());
            report::write_comparison(&mut io::stdout().lock(), &summaries)?;
        }
        (RunMode::Compare, Format::Json) => {
            let summaries = report::compare(&session.inputs().references, config.capacity());
            print_json(&summaries)?;
        }
        (RunMode::Trace, Format::Text) => {
            report::write_trace(&mut io::stdout().lock(), session.trace(), details)?;
        }
        (RunMode::Trace, Format::Json) => {
            print_json(&report::TraceReport::new(
                &session.inputs().references,
                session.trace(),
            ))?;
        }
        (RunMode::Play, _) => play(&mut session, details)?,
        (RunMode::Step, _) => {
            let stdin = io::stdin();
            interact(&mut session, stdin.lock(), &mut io::stdout().lock(), details)?;
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Let the auto-play timer run until playback finishes or `limit` ticks have fired, then pause.
/// The timer is driven cooperatively: this thread sleeps until the next deadline and polls.
fn drive<F>(controller: &mut PlaybackController, limit: Option<usize>, mut on_step: F) -> Result<()>
where
    F: FnMut(&PlaybackController) -> Result<()>,
{
    let mut ticks = 0;
    while controller.mode() == Mode::Playing && limit.map_or(true, |limit| ticks < limit) {
        if let Some(due) = controller.next_due() {
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }
        if controller.poll(Instant::now()).is_some() {
            ticks += 1;
            on_step(controller)?;
        }
    }
    controller.pause();
    Ok(())
}

fn step_line(controller: &PlaybackController, details: bool) -> Option<String> {
    let cursor = controller.cursor()?;
    let step = controller.current_step()?;
    Some(match details {
        true => format!("{:>4}  {}  {}", cursor + 1, step, step.details()),
        false => format!("{:>4}  {}", cursor + 1, step),
    })
}

/// Auto-play the whole trace with a progress bar tracking the cursor.
fn play(session: &mut Session, details: bool) -> Result<()> {
    let controller = session.controller_mut();
    if controller.trace().is_empty() {
        println!("nothing to simulate: enter a valid reference string");
        return Ok(());
    }

    let bar = ProgressBar::new(controller.trace().len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.green/red} {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let reveal = |controller: &PlaybackController| {
        if let (Some(line), Some(cursor)) = (step_line(controller, details), controller.cursor()) {
            bar.println(line);
            bar.set_position(cursor as u64 + 1);
            bar.set_message(controller.statistics().to_string());
        }
    };

    controller.start();
    reveal(&*controller);
    drive(controller, None, |controller| {
        reveal(controller);
        Ok(())
    })?;
    bar.finish_with_message("playback complete");
    println!("{}", Summary::from(controller.trace()));
    Ok(())
}

/// Manual control loop: read one command per line from `input` and report to `out` until the
/// input ends or the user quits.
pub fn interact<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
    details: bool,
) -> Result<()> {
    writeln!(
        out,
        "{} with {} frames, {} references ('h' for help)",
        session.inputs().policy,
        session.inputs().capacity,
        session.trace().len()
    )?;

    for line in input.lines() {
        let command = match Command::parse(&line?) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{}", message)?;
                continue;
            }
        };

        let finished_before = session.controller().mode() == Mode::Finished;
        let replays = matches!(command, Command::Play(_));
        match command {
            Command::Step => {
                let controller = session.controller_mut();
                match controller.step() {
                    true => {
                        if let Some(line) = step_line(controller, details) {
                            writeln!(out, "{}", line)?;
                        }
                    }
                    false => writeln!(out, "nothing left to step ({})", controller.mode())?,
                }
            }
            Command::Play(limit) => {
                let controller = session.controller_mut();
                let before = controller.cursor();
                controller.start();
                if controller.cursor() != before || controller.mode() == Mode::Finished {
                    if let Some(line) = step_line(controller, details) {
                        writeln!(out, "{}", line)?;
                    }
                }
                drive(controller, limit, |controller| {
                    if let Some(line) = step_line(controller, details) {
                        writeln!(out, "{}", line)?;
                    }
                    Ok(())
                })?;
            }
            Command::Reset => {
                session.controller_mut().reset();
                writeln!(out, "playback reset")?;
            }
            Command::Speed(speed) => match session.controller_mut().set_speed(speed) {
                Ok(()) => writeln!(out, "speed set to {}x", speed)?,
                Err(err) => writeln!(out, "{}", err)?,
            },
            Command::References(text) => {
                session.set_references(&text);
                writeln!(out, "{} references, playback reset", session.trace().len())?;
            }
            Command::Frames(frames) => {
                session.set_capacity(frames.clamp(1, MAX_FRAMES as usize));
                writeln!(out, "{} frames, playback reset", session.inputs().capacity)?;
            }
            Command::Policy(policy) => {
                session.set_policy(policy);
                writeln!(out, "{} policy, playback reset", policy)?;
            }
            Command::Stats => writeln!(out, "{}", session.controller().statistics())?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => break,
        }

        if session.controller().mode() == Mode::Finished && (!finished_before || replays) {
            writeln!(out, "{}", Summary::from(session.trace()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::policy::Policy;
    use crate::reference::ReferenceSequence;

    fn make_session() -> Session {
        Session::build(Inputs {
            references: ReferenceSequence::parse("1,2,3,4"),
            capacity: 2,
            policy: Policy::Fifo,
        })
    }

    fn run_script(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        interact(session, script.as_bytes(), &mut out, true).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[cfg(test)]
    mod interact_tests {

        use super::*;

        #[test]
        fn steps_and_stats() {
            let mut session = make_session();
            let text = run_script(&mut session, "s\n\nstats\nq\ns\n");
            assert!(text.contains("Placed page 1 in empty frame 0"));
            assert!(text.contains("Placed page 2 in empty frame 1"));
            assert!(text.contains("hits: 0  misses: 2"));
            assert_eq!(session.controller().cursor(), Some(1));
        }

        #[test]
        fn steps_to_finish() {
            let mut session = make_session();
            let text = run_script(&mut session, "s\ns\ns\ns\ns\n");
            assert!(text.contains("Replaced page 2 in frame 1 (first in) with page 4"));
            assert!(text.contains("nothing left to step (finished)"));
            assert!(text.contains("page_faults:             00000004"));
            assert_eq!(session.controller().mode(), Mode::Finished);
        }

        #[test]
        fn input_change_resets() {
            let mut session = make_session();
            let text = run_script(&mut session, "s\ns\npolicy lru\nframes 20\nrefs 5 6\n");
            assert!(text.contains("LRU policy, playback reset"));
            assert!(text.contains("10 frames, playback reset"));
            assert!(text.contains("2 references, playback reset"));
            assert_eq!(session.controller().cursor(), None);
            assert_eq!(session.trace().capacity(), 10);
        }

        #[test]
        fn rejects_bad_input() {
            let mut session = make_session();
            let text = run_script(&mut session, "jump\nspeed 0\nrefs 1,x\ns\n");
            assert!(text.contains("unknown command 'jump'"));
            assert!(text.contains("playback speed must be a positive finite multiplier"));
            assert!(text.contains("0 references, playback reset"));
            assert!(text.contains("nothing left to step (stopped)"));
        }

        #[test]
        fn tiny_speed_rejected_before_play() {
            let mut session = make_session();
            let text = run_script(&mut session, "refs 8\nspeed 1e-20\nspeed 1e-300\np\n");
            assert_eq!(text.matches("schedulable period").count(), 2);
            assert!(text.contains("Placed page 8 in empty frame 0"));
            assert_eq!(session.controller().speed(), DEFAULT_SPEED);
            assert_eq!(session.controller().mode(), Mode::Finished);
        }

        #[test]
        fn play_single_step_trace() {
            let mut session = make_session();
            let text = run_script(&mut session, "refs 8\np\n");
            assert!(text.contains("Placed page 8 in empty frame 0"));
            assert_eq!(session.controller().mode(), Mode::Finished);
        }
    }
}
