use crate::policy::Policy;
use clap::ValueEnum;

/// A line of input in manual stepping mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Step,
    /// Auto-play, optionally limited to a number of ticks before pausing.
    Play(Option<usize>),
    Reset,
    Speed(f64),
    References(String),
    Frames(usize),
    Policy(Policy),
    Stats,
    Help,
    Quit,
}

pub const HELP: &str = "commands:
  <enter> | s        reveal the next step
  p [n]              auto-play to the end, or for n ticks then pause
  r                  reset playback
  speed <x>          set the playback speed multiplier
  refs <text>        replace the reference string
  frames <n>         replace the frame count
  policy <name>      replace the policy (fifo, lru, optimal)
  stats              show the running statistics
  h                  show this help
  q                  quit";

impl Command {
    /// Interpret one line of user input. Unknown commands and malformed arguments produce an
    /// error message suitable for printing back to the user.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" | "s" | "step" => Ok(Command::Step),
            "p" | "play" => match rest {
                "" => Ok(Command::Play(None)),
                ticks => ticks
                    .parse()
                    .map(|ticks| Command::Play(Some(ticks)))
                    .map_err(|_| format!("expected a tick count, got '{}'", ticks)),
            },
            "r" | "reset" => Ok(Command::Reset),
            "speed" => rest
                .parse()
                .map(Command::Speed)
                .map_err(|_| format!("expected a speed multiplier, got '{}'", rest)),
            "refs" => Ok(Command::References(rest.to_string())),
            "frames" => rest
                .parse()
                .map(Command::Frames)
                .map_err(|_| format!("expected a frame count, got '{}'", rest)),
            "policy" => Policy::from_str(rest, true)
                .map(Command::Policy)
                .map_err(|_| format!("unknown policy '{}'", rest)),
            "stats" => Ok(Command::Stats),
            "h" | "help" => Ok(Command::Help),
            "q" | "quit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}
