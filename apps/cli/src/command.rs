//! Line-oriented command parsing.

use relief_core::{parse_quantity, parse_round, round_key, RoundInput, ValidationError};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  round <n> <my> <c1> <c2>   submit (or resubmit) orders for round n
  reset                      clear all rounds
  show                       print the current table and forecast
  cards [n]                  per-participant cards for every round, or round n
  help                       this text
  quit                       exit";

/// A parsed command line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Round(RoundInput),
    Reset,
    Show,
    Cards(Option<u32>),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command: {0:?} (try `help`)")]
    Unknown(String),
    #[error("usage: round <n> <my> <c1> <c2>")]
    RoundUsage,
    #[error("usage: cards [n]")]
    CardsUsage,
    #[error("`{0}` takes no arguments")]
    UnexpectedArgs(&'static str),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    let rest: Vec<&str> = words.collect();
    let bare = |cmd: &'static str, c: Command| {
        if rest.is_empty() {
            Ok(Some(c))
        } else {
            Err(CommandError::UnexpectedArgs(cmd))
        }
    };
    match head.as_str() {
        "round" | "r" => {
            let [n, my, c1, c2] = rest[..] else {
                return Err(CommandError::RoundUsage);
            };
            let input = RoundInput::new(
                parse_round(n)?,
                parse_quantity(my)?,
                parse_quantity(c1)?,
                parse_quantity(c2)?,
            )?;
            Ok(Some(Command::Round(input)))
        }
        "cards" => match rest[..] {
            [] => Ok(Some(Command::Cards(None))),
            [n] => Ok(Some(Command::Cards(Some(round_key(parse_round(n)?)?)))),
            _ => Err(CommandError::CardsUsage),
        },
        "reset" => bare("reset", Command::Reset),
        "show" => bare("show", Command::Show),
        "help" | "?" => bare("help", Command::Help),
        "quit" | "exit" => bare("quit", Command::Quit),
        _ => Err(CommandError::Unknown(head)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_core::Participant;

    #[test]
    fn parses_round() {
        let cmd = parse_line("round 2 50 60 30").unwrap().unwrap();
        let Command::Round(input) = cmd else {
            panic!("expected round");
        };
        assert_eq!(input.round(), 2);
        assert_eq!(input.order(Participant::Competitor1), 60.0);
    }

    #[test]
    fn skips_blank_and_comments() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# round 1 1 1 1"), Ok(None));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(parse_line("RESET"), Ok(Some(Command::Reset)));
        assert_eq!(parse_line("Exit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn parses_cards() {
        assert_eq!(parse_line("cards"), Ok(Some(Command::Cards(None))));
        assert_eq!(parse_line("cards 3"), Ok(Some(Command::Cards(Some(3)))));
        assert_eq!(
            parse_line("cards 0"),
            Err(CommandError::Invalid(ValidationError::NonPositiveRound(0)))
        );
        assert_eq!(parse_line("cards 1 2"), Err(CommandError::CardsUsage));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_line("round 1 2 3"), Err(CommandError::RoundUsage));
        assert_eq!(
            parse_line("round 0 1 1 1"),
            Err(CommandError::Invalid(ValidationError::NonPositiveRound(0)))
        );
        assert_eq!(
            parse_line("round 1 x 1 1"),
            Err(CommandError::Invalid(ValidationError::NotANumber("x".into())))
        );
        assert!(matches!(
            parse_line("round 1 1 -5 1"),
            Err(CommandError::Invalid(ValidationError::NegativeOrder { .. }))
        ));
        assert_eq!(parse_line("show all"), Err(CommandError::UnexpectedArgs("show")));
        assert_eq!(
            parse_line("round 1 0 1.7e308 1.7e308"),
            Err(CommandError::Invalid(ValidationError::NonFiniteTotal))
        );
        assert_eq!(parse_line("plot"), Err(CommandError::Unknown("plot".into())));
    }
}
