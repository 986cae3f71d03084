//! Command grammar for the emulator console.
//!
//! ```text
//! cw [n] | ccw [n]          rotate the encoder by n detents (default 1)
//! click | hold              short / long press of the encoder button
//! press | release           drive the raw button level
//! wait <n>[ms|s]            let simulated time pass
//! status | log | help [topic]
//! ```

use std::fmt;
use std::time::Duration;

use timer_core::input::Rotation;
use winnow::ascii::{Caseless, alpha1, dec_uint, space1};
use winnow::combinator::{alt, cut_err, opt, preceded};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;

/// Parsed console command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    Rotate { direction: Rotation, detents: u32 },
    Click,
    Hold,
    Press,
    Release,
    Wait(Duration),
    Status,
    Log,
    Help(Option<&'a str>),
}

/// Rejected input with the byte offset where parsing stopped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at column {}: {}", self.offset + 1, self.message)
    }
}

/// Parses one trimmed console line.
pub fn parse_command(line: &str) -> Result<Command<'_>, SyntaxError> {
    command.parse(line).map_err(|err| {
        let detail = err.inner().to_string();
        SyntaxError {
            offset: err.offset(),
            message: if detail.is_empty() {
                "unrecognised command".to_string()
            } else {
                detail
            },
        }
    })
}

fn command<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    alt((rotate, wait, help, keyword)).parse_next(input)
}

fn rotate<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    let direction = alt((
        Caseless("ccw").value(Rotation::CounterClockwise),
        Caseless("cw").value(Rotation::Clockwise),
    ))
    .parse_next(input)?;
    let detents = opt(preceded(
        space1,
        cut_err(dec_uint).context(StrContext::Expected(StrContextValue::Description(
            "detent count",
        ))),
    ))
    .parse_next(input)?
    .unwrap_or(1);
    Ok(Command::Rotate { direction, detents })
}

fn wait<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    preceded(
        (Caseless("wait"), space1),
        cut_err(duration).context(StrContext::Expected(StrContextValue::Description(
            "duration such as 500ms or 3s",
        ))),
    )
    .map(Command::Wait)
    .parse_next(input)
}

fn duration(input: &mut &str) -> ModalResult<Duration> {
    let amount: u64 = dec_uint.parse_next(input)?;
    let seconds = opt(alt((Caseless("ms").value(false), Caseless("s").value(true))))
        .parse_next(input)?
        .unwrap_or(false);
    Ok(if seconds {
        Duration::from_secs(amount)
    } else {
        Duration::from_millis(amount)
    })
}

fn help<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    preceded(Caseless("help"), opt(preceded(space1, alpha1)))
        .map(Command::Help)
        .parse_next(input)
}

fn keyword<'a>(input: &mut &'a str) -> ModalResult<Command<'a>> {
    alt((
        Caseless("click").value(Command::Click),
        Caseless("hold").value(Command::Hold),
        Caseless("press").value(Command::Press),
        Caseless("release").value(Command::Release),
        Caseless("status").value(Command::Status),
        Caseless("log").value(Command::Log),
    ))
    .parse_next(input)
}
