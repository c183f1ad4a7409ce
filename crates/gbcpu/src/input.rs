use std::io::BufRead;
use std::thread::{self, JoinHandle};

use gbcpu_core::RunSignal;

/// A line of console input, as understood by the run loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    Step,
}

/// Map one line of input to a command. Unknown input is ignored.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "q" | "Q" => Some(Command::Quit),
        "p" | "P" => Some(Command::TogglePause),
        "" | "s" | "S" => Some(Command::Step),
        _ => None,
    }
}

pub fn apply(signal: &RunSignal, command: Command) {
    match command {
        Command::Quit => {
            log::info!("quit requested");
            signal.stop();
        }
        Command::TogglePause => {
            let paused = signal.toggle_pause();
            log::info!("{}", if paused { "paused (step mode)" } else { "resumed" });
        }
        Command::Step => signal.request_step(),
    }
}

/// Feed commands from `reader` into `signal` until end of input or quit.
pub fn listen<R: BufRead>(reader: R, signal: &RunSignal) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("stopped reading input: {err}");
                return;
            }
        };
        match parse_command(&line) {
            Some(command) => {
                apply(signal, command);
                if command == Command::Quit {
                    return;
                }
            }
            None => log::debug!("ignoring input {line:?}"),
        }
    }
}

/// Start a detached thread that drives `signal` from stdin.
pub fn spawn_stdin_listener(signal: RunSignal) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("gbcpu-input".to_string())
        .spawn(move || listen(std::io::stdin().lock(), &signal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command(" P \n"), Some(Command::TogglePause));
        assert_eq!(parse_command("s"), Some(Command::Step));
        assert_eq!(parse_command(""), Some(Command::Step));
        assert_eq!(parse_command("run"), None);
    }

    #[test]
    fn pause_then_quit_updates_signal() {
        let signal = RunSignal::new();
        listen(Cursor::new("p\nq\np\n"), &signal);

        assert!(signal.is_paused());
        assert!(!signal.is_running());
    }

    #[test]
    fn end_of_input_leaves_signal_alone() {
        let signal = RunSignal::new();
        listen(Cursor::new("nonsense\n"), &signal);

        assert!(signal.is_running());
        assert!(!signal.is_paused());
    }
}
