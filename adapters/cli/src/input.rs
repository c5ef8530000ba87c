use std::{
    io::{self, BufRead},
    thread::{self, JoinHandle},
};

use tank_combat_core::{CoreError, InputAction};
use tank_combat_game::ActionSender;
use tracing::{debug, warn};

/// Parses a headless script: one entry per tick, separated by commas or
/// whitespace. `.` and `-` are ticks without input.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Option<InputAction>>, CoreError> {
    script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token {
            "." | "-" => Ok(None),
            action => action.parse().map(Some),
        })
        .collect()
}

/// Forwards actions typed on stdin, one per line, into `sender`.
///
/// The thread ends, closing the channel, when stdin reaches end of file.
pub(crate) fn spawn_stdin_reader(sender: ActionSender) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-input".to_owned())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(error) => {
                        warn!(%error, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<InputAction>() {
                    Ok(action) => {
                        debug!(?action, "input received");
                        sender.send(action);
                    }
                    Err(error) => warn!(%error, "ignoring input"),
                }
            }
            debug!("stdin closed");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_accepts_mixed_separators_and_idle_ticks() {
        let actions = parse_script("up, fire . -\nleft  q").expect("script parses");
        assert_eq!(
            actions,
            vec![
                Some(InputAction::Up),
                Some(InputAction::Fire),
                None,
                None,
                Some(InputAction::Left),
                Some(InputAction::Exit),
            ]
        );
    }

    #[test]
    fn script_rejects_unknown_actions() {
        assert_eq!(
            parse_script("up,jump"),
            Err(CoreError::UnknownAction("jump".to_owned()))
        );
        assert_eq!(parse_script(" , "), Ok(Vec::new()));
    }
}
