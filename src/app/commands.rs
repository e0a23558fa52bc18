//! Inbound commands to the application service.
//!
//! The dispatcher hands the core a command name and an optional textual
//! parameter ([`CommandRequest`]).  [`Command::from_request`] turns that
//! into a typed [`Command`] the
//! [`AppService`](super::service::AppService) acts upon.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::state::{ActuatorKind, MAX_PERCENT};

/// Longest accepted command name.
pub const MAX_NAME_LEN: usize = 24;
/// Longest accepted parameter text.
pub const MAX_PARAM_LEN: usize = 16;

/// How percent parameters that are not an integer in `1..=100` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PercentPolicy {
    /// Anything unusable means "full intensity".
    #[default]
    Lenient,
    /// Anything unusable rejects the command.
    Strict,
}

// ───────────────────────────────────────────────────────────────
// Raw request
// ───────────────────────────────────────────────────────────────

/// A command as delivered by the dispatcher: name plus optional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: heapless::String<MAX_NAME_LEN>,
    /// `None` when the caller sent no parameter at all.
    pub param: Option<heapless::String<MAX_PARAM_LEN>>,
}

impl CommandRequest {
    /// Build a request, truncating over-long name or parameter text.
    pub fn new(name: &str, param: Option<&str>) -> Self {
        Self {
            name: truncated(name),
            param: param.map(truncated),
        }
    }

    /// Parse a console line: `<name>[ <param>]`.  Blank lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match line.split_once(char::is_whitespace) {
            Some((name, rest)) => Some(Self::new(name, Some(rest.trim()))),
            None => Some(Self::new(line, None)),
        }
    }
}

fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ───────────────────────────────────────────────────────────────
// Typed command
// ───────────────────────────────────────────────────────────────

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Turn one actuator on.  `None` resumes the last meaningful level.
    TurnOn {
        kind: ActuatorKind,
        percent: Option<u32>,
    },
    /// Turn one actuator off.
    TurnOff(ActuatorKind),
    /// Report whether anything is running (1 / 0).
    Status,
    /// Resume every actuator.
    AllOn,
    /// Switch every actuator off.
    AllOff,
    /// Log the six persisted bytes.
    DumpStore,
}

/// Why a [`CommandRequest`] could not be turned into a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The name matches no known command.
    Unknown,
    /// Strict policy: the percent parameter is not an integer in `1..=100`.
    InvalidPercent,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown command"),
            Self::InvalidPercent => write!(f, "percent must be 1-100"),
        }
    }
}

impl Command {
    /// Interpret a dispatcher request under the given percent policy.
    pub fn from_request(req: &CommandRequest, policy: PercentPolicy) -> Result<Self, CommandError> {
        let name = req.name.as_str();
        let is = |n: &str| name.eq_ignore_ascii_case(n);

        let turn_on = |kind| -> Result<Self, CommandError> {
            let percent = match (&req.param, policy) {
                (None, _) => None,
                (Some(p), PercentPolicy::Lenient) => Some(parse_percent(p)),
                (Some(p), PercentPolicy::Strict) => Some(
                    parse_percent_strict(p).ok_or(CommandError::InvalidPercent)?,
                ),
            };
            Ok(Self::TurnOn { kind, percent })
        };

        if is("fogOn") {
            turn_on(ActuatorKind::Fog)
        } else if is("fogOff") {
            Ok(Self::TurnOff(ActuatorKind::Fog))
        } else if is("pumpOn") {
            turn_on(ActuatorKind::Pump)
        } else if is("pumpOff") {
            Ok(Self::TurnOff(ActuatorKind::Pump))
        } else if is("ledOn") {
            turn_on(ActuatorKind::Light)
        } else if is("ledOff") {
            Ok(Self::TurnOff(ActuatorKind::Light))
        } else if is("homebridgeStatus") {
            Ok(Self::Status)
        } else if is("homebridgeOn") {
            Ok(Self::AllOn)
        } else if is("homebridgeOff") {
            Ok(Self::AllOff)
        } else if is("dumpStore") {
            Ok(Self::DumpStore)
        } else {
            Err(CommandError::Unknown)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Percent parsing
// ───────────────────────────────────────────────────────────────

/// Integer-prefix parse: leading whitespace, optional sign, then digits.
///
/// Empty or unparseable text yields 0, as do negative values.  Large values
/// saturate.  `"75abc"` reads as 75.
pub fn parse_percent(text: &str) -> u32 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(u32::from(d - b'0')));
    if negative { 0 } else { value }
}

/// Strict parse: the whole (trimmed) text must be an integer in `1..=100`.
pub fn parse_percent_strict(text: &str) -> Option<u32> {
    let value: u32 = text.trim().parse().ok()?;
    (1..=u32::from(MAX_PERCENT)).contains(&value).then_some(value)
}

/// Map an explicit turn-on percent to the level actually applied:
/// 0 and anything above 100 mean full intensity.
pub fn normalize_on_percent(percent: u32) -> u8 {
    if percent == 0 || percent > u32::from(MAX_PERCENT) {
        MAX_PERCENT
    } else {
        percent as u8
    }
}
