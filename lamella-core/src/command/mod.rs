//! Command translation
//!
//! Turns inbound messages into validated requests for the control task or
//! configuration changes. Every rejection maps to an audible pattern.

mod translator;

pub use translator::{
    translate_action, CommandTranslator, Rejection, RemoteRequest, Response, REJECTED_PATTERN,
};
