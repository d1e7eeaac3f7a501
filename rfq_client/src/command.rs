//! Desk console commands read from stdin.
use std::str::FromStr;

use rfq_common::{RfqError, RfqId};

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// `claim <id>`
    Claim(RfqId),
    /// `release`
    Release,
    /// `price <id> <value>`
    Price(RfqId, f64),
    /// `show <id>`
    Show(RfqId),
    /// `queue`
    Queue,
    /// `quit`
    Quit,
}

impl FromStr for UserCommand {
    type Err = RfqError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();
        let id = |raw: &str| match raw.parse::<RfqId>() {
            Ok(id) => id,
            Err(never) => match never {},
        };

        match (verb.as_str(), args.as_slice()) {
            ("claim", [raw]) => Ok(UserCommand::Claim(id(raw))),
            ("release", []) => Ok(UserCommand::Release),
            ("price", [raw, value]) => {
                let price = value
                    .parse::<f64>()
                    .map_err(|e| RfqError::Format(format!("bad price `{}`: {}", value, e)))?;
                Ok(UserCommand::Price(id(raw), price))
            }
            ("show", [raw]) => Ok(UserCommand::Show(id(raw))),
            ("queue", []) => Ok(UserCommand::Queue),
            ("quit" | "exit", []) => Ok(UserCommand::Quit),
            _ => Err(RfqError::Format(format!(
                "unknown command `{}` (try: claim <id> | release | price <id> <value> | show <id> | queue | quit)",
                line.trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("claim 7".parse::<UserCommand>().unwrap(), UserCommand::Claim(RfqId::Num(7)));
        assert_eq!(
            "CLAIM abc".parse::<UserCommand>().unwrap(),
            UserCommand::Claim(RfqId::from("abc"))
        );
        assert_eq!(" release ".parse::<UserCommand>().unwrap(), UserCommand::Release);
        assert_eq!(
            "price 7 101.5".parse::<UserCommand>().unwrap(),
            UserCommand::Price(RfqId::Num(7), 101.5)
        );
        assert_eq!("queue".parse::<UserCommand>().unwrap(), UserCommand::Queue);
        assert_eq!("exit".parse::<UserCommand>().unwrap(), UserCommand::Quit);
    }

    #[test]
    fn rejects_bad_input() {
        assert!("claim".parse::<UserCommand>().is_err());
        assert!("price 7 cheap".parse::<UserCommand>().is_err());
        assert!("sell 7".parse::<UserCommand>().is_err());
        assert!("".parse::<UserCommand>().is_err());
    }
}
