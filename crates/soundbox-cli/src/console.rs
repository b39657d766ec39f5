//! Interactive console command parsing.

/// One console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play {
        name: String,
        offset_seconds: Option<f64>,
    },
    Pause,
    Stop,
    Seek {
        ms: u64,
    },
    Mute(bool),
    Status,
    List,
    Help,
    Quit,
}

/// Parse one console line into a [`Command`].
pub fn parse_line(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().ok_or_else(|| "empty command".to_string())?;

    let cmd = match verb {
        "play" => {
            let name = parts
                .next()
                .ok_or_else(|| "usage: play <name> [offset-seconds]".to_string())?
                .to_string();
            let offset_seconds = match parts.next() {
                Some(raw) => Some(
                    raw.parse::<f64>()
                        .map_err(|_| format!("bad offset: {raw}"))?,
                ),
                None => None,
            };
            Command::Play {
                name,
                offset_seconds,
            }
        }
        "pause" => Command::Pause,
        "stop" => Command::Stop,
        "seek" => {
            let raw = parts
                .next()
                .ok_or_else(|| "usage: seek <position-ms>".to_string())?;
            let ms = raw
                .parse::<u64>()
                .map_err(|_| format!("bad position: {raw}"))?;
            Command::Seek { ms }
        }
        "mute" => match parts.next() {
            Some("on") => Command::Mute(true),
            Some("off") => Command::Mute(false),
            _ => return Err("usage: mute on|off".to_string()),
        },
        "status" => Command::Status,
        "list" => Command::List,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };

    if parts.next().is_some() {
        return Err(format!("trailing input after `{verb}`"));
    }
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_play_without_offset() {
        assert_eq!(
            parse_line("play beep").unwrap(),
            Command::Play {
                name: "beep".to_string(),
                offset_seconds: None
            }
        );
    }

    #[test]
    fn parse_play_with_offset() {
        assert_eq!(
            parse_line("play beep 2.5").unwrap(),
            Command::Play {
                name: "beep".to_string(),
                offset_seconds: Some(2.5)
            }
        );
    }

    #[test]
    fn parse_seek_requires_millis() {
        assert_eq!(parse_line("seek 1500").unwrap(), Command::Seek { ms: 1500 });
        assert!(parse_line("seek").is_err());
        assert!(parse_line("seek soon").is_err());
    }

    #[test]
    fn parse_mute_wants_on_or_off() {
        assert_eq!(parse_line("mute on").unwrap(), Command::Mute(true));
        assert_eq!(parse_line("mute off").unwrap(), Command::Mute(false));
        assert!(parse_line("mute").is_err());
        assert!(parse_line("mute maybe").is_err());
    }

    #[test]
    fn parse_simple_verbs() {
        assert_eq!(parse_line("pause").unwrap(), Command::Pause);
        assert_eq!(parse_line("stop").unwrap(), Command::Stop);
        assert_eq!(parse_line("status").unwrap(), Command::Status);
        assert_eq!(parse_line("list").unwrap(), Command::List);
        assert_eq!(parse_line("quit").unwrap(), Command::Quit);
        assert_eq!(parse_line("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn parse_rejects_unknown_and_trailing() {
        assert!(parse_line("dance").is_err());
        assert!(parse_line("pause now").is_err());
    }
}
