//! Blinds action payloads (`action` topic)

use crate::error::CommandError;

/// A parsed blinds action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionCommand {
    /// Open fully, or to the given percentage
    Open { percent: Option<u16> },
    /// Close fully
    Close,
    /// Stop the motor
    Stop,
}

impl ActionCommand {
    /// Parse an action payload
    ///
    /// Percentages are parsed but not range-checked here; a value above 100
    /// becomes a target beyond the open position and is rejected by the
    /// translator.
    pub fn parse(payload: &str) -> Result<Self, CommandError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(CommandError::Empty);
        }

        match payload {
            "open" => return Ok(ActionCommand::Open { percent: None }),
            "close" => return Ok(ActionCommand::Close),
            "stop" => return Ok(ActionCommand::Stop),
            _ => {}
        }

        let value = payload
            .strip_prefix("open:")
            .ok_or(CommandError::UnknownKeyword)?
            .trim();
        if value.is_empty() {
            return Err(CommandError::MissingValue);
        }
        let percent = value
            .parse::<u16>()
            .map_err(|_| CommandError::InvalidNumber)?;

        Ok(ActionCommand::Open {
            percent: Some(percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keywords() {
        assert_eq!(
            ActionCommand::parse("open"),
            Ok(ActionCommand::Open { percent: None })
        );
        assert_eq!(ActionCommand::parse("close"), Ok(ActionCommand::Close));
        assert_eq!(ActionCommand::parse(" stop "), Ok(ActionCommand::Stop));
    }

    #[test]
    fn test_open_percentage() {
        assert_eq!(
            ActionCommand::parse("open:50"),
            Ok(ActionCommand::Open { percent: Some(50) })
        );
        assert_eq!(
            ActionCommand::parse("open:150"),
            Ok(ActionCommand::Open { percent: Some(150) })
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(ActionCommand::parse(""), Err(CommandError::Empty));
        assert_eq!(
            ActionCommand::parse("toggle"),
            Err(CommandError::UnknownKeyword)
        );
        assert_eq!(
            ActionCommand::parse("open:"),
            Err(CommandError::MissingValue)
        );
        assert_eq!(
            ActionCommand::parse("open:-5"),
            Err(CommandError::InvalidNumber)
        );
        assert_eq!(
            ActionCommand::parse("open:half"),
            Err(CommandError::InvalidNumber)
        );
        assert_eq!(
            ActionCommand::parse("closed"),
            Err(CommandError::UnknownKeyword)
        );
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(s in "\\PC{0,40}") {
            let _ = ActionCommand::parse(&s);
        }

        #[test]
        fn prop_percentages_roundtrip(p in 0u16..=1000) {
            let payload = std::format!("open:{}", p);
            prop_assert_eq!(
                ActionCommand::parse(&payload),
                Ok(ActionCommand::Open { percent: Some(p) })
            );
        }
    }
}
