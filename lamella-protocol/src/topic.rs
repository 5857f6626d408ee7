//! Topics and line framing
//!
//! A message travels as `<topic> <payload>\n`. Topic names match either
//! exactly or as the trailing segments of a longer broker path, so the
//! bridge may forward `livingroom/blinds/action` untouched.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::error::CommandError;

/// Maximum line length on the link, topic and payload included
pub const MAX_LINE_SIZE: usize = 256;

/// Known topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topic {
    /// Inbound: blinds action (`open`, `close`, `stop`)
    Action,
    /// Inbound: application command or configuration change
    AppCmd,
    /// Inbound: bleep pattern
    Notify,
    /// Inbound: link heartbeat
    Ping,
    /// Outbound: blinds state report
    State,
    /// Outbound: configuration snapshot
    Config,
    /// Outbound: telemetry
    AppState,
}

impl Topic {
    const ALL: [Topic; 7] = [
        Topic::Action,
        Topic::AppCmd,
        Topic::Notify,
        Topic::Ping,
        Topic::State,
        Topic::Config,
        Topic::AppState,
    ];

    /// Canonical topic name
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Action => "blinds/action",
            Topic::AppCmd => "blinds/appcmd",
            Topic::Notify => "notify/bleep",
            Topic::Ping => "link/ping",
            Topic::State => "blinds/state",
            Topic::Config => "blinds/config",
            Topic::AppState => "blinds/app_state",
        }
    }

    /// Resolve a topic name, accepting a broker prefix before the canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|topic| {
            let canonical = topic.as_str();
            match name.strip_suffix(canonical) {
                Some("") => true,
                Some(prefix) => prefix.ends_with('/'),
                None => false,
            }
        })
    }

    /// Whether the controller accepts this topic as input
    pub fn is_inbound(self) -> bool {
        matches!(
            self,
            Topic::Action | Topic::AppCmd | Topic::Notify | Topic::Ping
        )
    }
}

/// A topic plus its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message<'a> {
    pub topic: Topic,
    pub payload: &'a str,
}

impl<'a> Message<'a> {
    /// Create a message
    pub fn new(topic: Topic, payload: &'a str) -> Self {
        Self { topic, payload }
    }

    /// Parse a single link line (without or with trailing line ending)
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (name, payload) = match line.split_once(' ') {
            Some((name, payload)) => (name, payload.trim()),
            None => (line, ""),
        };

        let topic = Topic::from_name(name.trim()).ok_or(CommandError::UnknownTopic)?;
        Ok(Self { topic, payload })
    }

    /// Encode as a link line, terminated by `\n`
    pub fn encode<const N: usize>(&self) -> Result<String<N>, CommandError> {
        let mut line = String::new();
        write!(line, "{} {}\n", self.topic.as_str(), self.payload)
            .map_err(|_| CommandError::LineTooLong)?;
        Ok(line)
    }
}

/// Incremental line assembler for a byte stream
///
/// Feed bytes one at a time; a complete line is returned when `\n` arrives.
/// Lines longer than [`MAX_LINE_SIZE`] are discarded up to the next newline.
pub struct LineAssembler {
    buffer: Vec<u8, MAX_LINE_SIZE>,
    overflowed: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed one byte
    ///
    /// Returns `Ok(Some(line))` once a full line is available, `Ok(None)`
    /// while more bytes are needed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<MAX_LINE_SIZE>>, CommandError> {
        if byte == b'\n' {
            let overflowed = core::mem::replace(&mut self.overflowed, false);
            let bytes = core::mem::take(&mut self.buffer);
            if overflowed {
                return Err(CommandError::LineTooLong);
            }
            if bytes.is_empty() {
                return Ok(None);
            }
            // Invalid UTF-8 is dropped like an unknown topic
            return String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| CommandError::UnknownTopic);
        }

        if self.overflowed {
            return Ok(None);
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.overflowed = true;
        }
        Ok(None)
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }
}
