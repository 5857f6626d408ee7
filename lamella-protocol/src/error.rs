//! Protocol error type

/// Errors produced while parsing inbound payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Line does not contain a recognised topic
    UnknownTopic,
    /// Line longer than the link buffer
    LineTooLong,
    /// Payload is empty where a keyword was expected
    Empty,
    /// Keyword not part of the grammar
    UnknownKeyword,
    /// Configuration key not recognised
    UnknownKey,
    /// Value is missing after `:`
    MissingValue,
    /// Integer value failed to parse
    InvalidNumber,
    /// Boolean value was neither `true` nor `false`
    InvalidBool,
    /// Value parsed but lies outside the accepted range
    OutOfRange,
    /// `SSID/password` pair malformed or too long
    InvalidCredentials,
    /// Bleep pattern lacks the `<repeats>x` prefix
    InvalidPattern,
}
