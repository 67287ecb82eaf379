//! Command queue and command interpretation.
//!
//! Spoken commands and UI-triggered commands travel the same path: a plain
//! normalized text token sequence pushed onto an unbounded
//! `std::sync::mpsc` channel (FIFO, multi-producer capable).  The
//! presentation loop drains the queue on its own schedule and classifies
//! each command with [`parse_command`] — parsing happens at dispatch time,
//! not at capture time.
//!
//! The dispatcher itself lives in the app: it is the single serialization
//! point where concurrent inputs become ordered, sequential effects against
//! the collection and the schedulers.

use std::sync::mpsc::{self, Receiver, Sender};

/// Producer half of the command queue.  Clone freely: the capture worker and
/// every UI control hold one.
pub type CommandSender = Sender<String>;

/// Consumer half of the command queue.  Owned by the presentation loop.
pub type CommandReceiver = Receiver<String>;

/// Create the command queue.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    mpsc::channel()
}

// ---------------------------------------------------------------------------
// CommandKind
// ---------------------------------------------------------------------------

/// The interpreted form of one command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Advance the collection cursor by +1.
    Next,
    /// Advance the collection cursor by -1.
    Previous,
    /// Enter slideshow mode.
    StartSlideshow,
    /// Leave slideshow mode.
    StopSlideshow,
    /// Search for `query` and download up to `count` results; `None` means
    /// use the configured default count.
    Download {
        query: String,
        count: Option<usize>,
    },
    /// Terminate the application.
    Quit,
    /// Anything that matched no rule; carries the raw command for the spoken
    /// echo.
    Unrecognized(String),
}

// ---------------------------------------------------------------------------
// parse_command
// ---------------------------------------------------------------------------

/// Classify one normalized command string.
///
/// The input is expected lowercase and trimmed (the capture worker and the
/// UI both normalize before enqueueing), but this function lowercases and
/// trims again so a stray producer cannot break classification.
///
/// Rules, in order:
///
/// * `next` — navigation +1
/// * `previous` / `prev` / `back` — navigation -1
/// * `start`/`play` + `slideshow` — slideshow on
/// * `stop`/`pause` + `slideshow` — slideshow off
/// * `download`/`fetch` `<query…>` `[count]` — fetch request; a numeric
///   trailing token is the result-count override, the remaining tokens are
///   the query
/// * `quit` / `exit` / `close` — shutdown
/// * everything else — [`CommandKind::Unrecognized`]
pub fn parse_command(raw: &str) -> CommandKind {
    let normalized = raw.trim().to_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let Some(&head) = tokens.first() else {
        return CommandKind::Unrecognized(raw.to_string());
    };

    match head {
        "next" => CommandKind::Next,
        "previous" | "prev" | "back" => CommandKind::Previous,
        "start" | "play" if tokens.get(1) == Some(&"slideshow") => CommandKind::StartSlideshow,
        "stop" | "pause" if tokens.get(1) == Some(&"slideshow") => CommandKind::StopSlideshow,
        "quit" | "exit" | "close" => CommandKind::Quit,
        "download" | "fetch" => parse_download(&tokens[1..], raw),
        _ => CommandKind::Unrecognized(raw.to_string()),
    }
}

/// Interpret the tokens after a `download`/`fetch` keyword.
///
/// A final numeric token is the count override; what remains is the query.
/// An empty query (e.g. bare `download` or `download 8`) is unrecognized
/// rather than a search for nothing.
fn parse_download(args: &[&str], raw: &str) -> CommandKind {
    let (count, query_tokens) = match args.split_last() {
        Some((last, rest)) => match last.parse::<usize>() {
            Ok(n) => (Some(n), rest),
            Err(_) => (None, args),
        },
        None => (None, args),
    };

    if query_tokens.is_empty() {
        return CommandKind::Unrecognized(raw.to_string());
    }

    CommandKind::Download {
        query: query_tokens.join(" "),
        count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_commands() {
        assert_eq!(parse_command("next"), CommandKind::Next);
        assert_eq!(parse_command("previous"), CommandKind::Previous);
        assert_eq!(parse_command("prev"), CommandKind::Previous);
        assert_eq!(parse_command("back"), CommandKind::Previous);
    }

    #[test]
    fn slideshow_commands() {
        assert_eq!(parse_command("start slideshow"), CommandKind::StartSlideshow);
        assert_eq!(parse_command("play slideshow"), CommandKind::StartSlideshow);
        assert_eq!(parse_command("stop slideshow"), CommandKind::StopSlideshow);
        assert_eq!(parse_command("pause slideshow"), CommandKind::StopSlideshow);
        // `start` alone starts nothing.
        assert_eq!(
            parse_command("start"),
            CommandKind::Unrecognized("start".into())
        );
    }

    #[test]
    fn download_with_count() {
        assert_eq!(
            parse_command("download cyn 8"),
            CommandKind::Download {
                query: "cyn".into(),
                count: Some(8),
            }
        );
    }

    #[test]
    fn download_without_count_uses_default() {
        assert_eq!(
            parse_command("download cyn"),
            CommandKind::Download {
                query: "cyn".into(),
                count: None,
            }
        );
    }

    #[test]
    fn download_multi_word_query() {
        assert_eq!(
            parse_command("fetch serial designation n 3"),
            CommandKind::Download {
                query: "serial designation n".into(),
                count: Some(3),
            }
        );
        // Non-numeric trailing token belongs to the query.
        assert_eq!(
            parse_command("download murder drones"),
            CommandKind::Download {
                query: "murder drones".into(),
                count: None,
            }
        );
    }

    #[test]
    fn bare_download_is_unrecognized() {
        assert!(matches!(
            parse_command("download"),
            CommandKind::Unrecognized(_)
        ));
        assert!(matches!(
            parse_command("download 8"),
            CommandKind::Unrecognized(_)
        ));
    }

    #[test]
    fn shutdown_commands() {
        assert_eq!(parse_command("quit"), CommandKind::Quit);
        assert_eq!(parse_command("exit"), CommandKind::Quit);
        assert_eq!(parse_command("close"), CommandKind::Quit);
    }

    #[test]
    fn unmapped_string_is_unrecognized() {
        assert_eq!(
            parse_command("frobnicate"),
            CommandKind::Unrecognized("frobnicate".into())
        );
        assert!(matches!(parse_command(""), CommandKind::Unrecognized(_)));
        assert!(matches!(parse_command("   "), CommandKind::Unrecognized(_)));
    }

    #[test]
    fn parser_renormalizes_input() {
        assert_eq!(parse_command("  NEXT "), CommandKind::Next);
        assert_eq!(
            parse_command("Download Cyn 2"),
            CommandKind::Download {
                query: "cyn".into(),
                count: Some(2),
            }
        );
    }

    /// Queue semantics: FIFO order, multiple producers.
    #[test]
    fn queue_preserves_fifo_across_producers() {
        let (tx, rx) = command_queue();
        let tx2 = tx.clone();

        tx.send("next".into()).unwrap();
        tx2.send("previous".into()).unwrap();
        tx.send("quit".into()).unwrap();

        let drained: Vec<String> = rx.try_iter().collect();
        assert_eq!(drained, vec!["next", "previous", "quit"]);
        // A later send is picked up on the next drain, not this one.
        tx.send("late".into()).unwrap();
        assert_eq!(rx.try_iter().count(), 1);
    }
}
