//! Memory access traces.
//!
//! A trace is a line-oriented text file that drives a cache the way a CPU would:
//!
//! ```text
//! # comment
//! cycle start
//! begin instruction
//! r 0x0000
//! r 0x0001
//! end
//! cycle finish
//! inst 0xC0
//! begin data
//! w 0x0100 0xFF
//! end
//! ```
//!
//! Numbers are decimal or `0x`-prefixed hex. Blank lines and `#` comments are skipped.

use cachesim_core::CacheMemory;
use cachesim_core::common::{AccessType, MemoryError};
use cachesim_core::soc::MemoryDevice;
use cachesim_core::stats::Transaction;
use thiserror::Error;

/// One trace command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOp {
    /// `begin <none|instruction|data>`
    Begin(AccessType),
    /// `end`
    End,
    /// `r <addr>`
    Read(u32),
    /// `w <addr> <value>`
    Write(u32, u8),
    /// `cycle start`
    CycleStart,
    /// `cycle finish`
    CycleFinish,
    /// `inst <opcode>`
    InstructionFinished(u8),
}

/// A command together with the 1-based line it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceLine {
    /// Source line number.
    pub line: usize,
    /// The parsed command.
    pub op: TraceOp,
}

/// Syntax errors in a trace.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// The first word is not a known command.
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand {
        /// Source line number.
        line: usize,
        /// The offending word.
        command: String,
    },

    /// A required argument is absent.
    #[error("line {line}: missing {expected}")]
    MissingArgument {
        /// Source line number.
        line: usize,
        /// What was expected.
        expected: &'static str,
    },

    /// Extra words follow a complete command.
    #[error("line {line}: unexpected `{text}`")]
    TrailingArgument {
        /// Source line number.
        line: usize,
        /// The first extra word.
        text: String,
    },

    /// A number is malformed or too large for its field.
    #[error("line {line}: invalid {expected} `{text}`")]
    InvalidNumber {
        /// Source line number.
        line: usize,
        /// What was expected.
        expected: &'static str,
        /// The offending word.
        text: String,
    },

    /// A keyword argument is not one of the allowed values.
    #[error("line {line}: `{text}` is not one of {allowed}")]
    InvalidKeyword {
        /// Source line number.
        line: usize,
        /// The offending word.
        text: String,
        /// The accepted spellings.
        allowed: &'static str,
    },
}

/// Failures while replaying a parsed trace.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// The backing memory rejected an access.
    #[error("line {line}: {source}")]
    Memory {
        /// Source line number.
        line: usize,
        /// The device error.
        source: MemoryError,
    },

    /// The trace drives the cache out of protocol (e.g., `end` with no open transaction).
    #[error("line {line}: {message}")]
    Protocol {
        /// Source line number.
        line: usize,
        /// What went wrong.
        message: &'static str,
    },
}

fn parse_number(line: usize, text: &str, expected: &'static str) -> Result<u32, TraceError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| TraceError::InvalidNumber {
        line,
        expected,
        text: text.to_owned(),
    })
}

fn parse_byte(line: usize, text: &str, expected: &'static str) -> Result<u8, TraceError> {
    let value = parse_number(line, text, expected)?;
    u8::try_from(value).map_err(|_| TraceError::InvalidNumber {
        line,
        expected,
        text: text.to_owned(),
    })
}

fn parse_line(line: usize, words: &[&str]) -> Result<TraceOp, TraceError> {
    let arg = |i: usize, expected: &'static str| {
        words
            .get(i)
            .copied()
            .ok_or(TraceError::MissingArgument { line, expected })
    };

    let (op, used) = match words[0] {
        "begin" => {
            let mode = match arg(1, "access type")? {
                "none" => AccessType::None,
                "instruction" => AccessType::Instruction,
                "data" => AccessType::Data,
                other => {
                    return Err(TraceError::InvalidKeyword {
                        line,
                        text: other.to_owned(),
                        allowed: "none, instruction, data",
                    });
                }
            };
            (TraceOp::Begin(mode), 2)
        }
        "end" => (TraceOp::End, 1),
        "r" => (TraceOp::Read(parse_number(line, arg(1, "address")?, "address")?), 2),
        "w" => {
            let address = parse_number(line, arg(1, "address")?, "address")?;
            let value = parse_byte(line, arg(2, "value")?, "byte value")?;
            (TraceOp::Write(address, value), 3)
        }
        "cycle" => match arg(1, "cycle phase")? {
            "start" => (TraceOp::CycleStart, 2),
            "finish" => (TraceOp::CycleFinish, 2),
            other => {
                return Err(TraceError::InvalidKeyword {
                    line,
                    text: other.to_owned(),
                    allowed: "start, finish",
                });
            }
        },
        "inst" => (
            TraceOp::InstructionFinished(parse_byte(line, arg(1, "opcode")?, "opcode")?),
            2,
        ),
        other => {
            return Err(TraceError::UnknownCommand {
                line,
                command: other.to_owned(),
            });
        }
    };

    if let Some(extra) = words.get(used) {
        return Err(TraceError::TrailingArgument {
            line,
            text: (*extra).to_owned(),
        });
    }
    Ok(op)
}

/// Parses a whole trace.
///
/// # Errors
///
/// Returns the first syntax error, tagged with its line number.
pub fn parse_trace(text: &str) -> Result<Vec<TraceLine>, TraceError> {
    let mut ops = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let content = raw.split('#').next().unwrap_or_default();
        let words: Vec<&str> = content.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let line = i + 1;
        ops.push(TraceLine {
            line,
            op: parse_line(line, &words)?,
        });
    }
    Ok(ops)
}

/// Replays `ops` against `cache`.
///
/// `on_transaction` is called with each transaction as it closes. Protocol mistakes in the
/// trace are reported as errors rather than reaching the cache's assertions.
///
/// # Returns
///
/// Every closed transaction, in order. Unlike the cache's own history, this survives
/// instruction boundaries.
///
/// # Errors
///
/// Returns the first memory or protocol error, tagged with its line number.
pub fn replay<M: MemoryDevice>(
    cache: &mut CacheMemory<M>,
    ops: &[TraceLine],
    mut on_transaction: impl FnMut(&Transaction),
) -> Result<Vec<Transaction>, ReplayError> {
    let mut closed = Vec::new();
    let mut in_cycle = false;

    for &TraceLine { line, op } in ops {
        let protocol = |message| ReplayError::Protocol { line, message };
        let memory = |source| ReplayError::Memory { line, source };

        match op {
            TraceOp::Begin(mode) => {
                if cache.in_transaction() {
                    return Err(protocol("transaction already open"));
                }
                cache.begin_transaction(mode);
            }
            TraceOp::End => {
                if !cache.in_transaction() {
                    return Err(protocol("no open transaction to end"));
                }
                cache.end_transaction();
                if let Some(tx) = cache.transactions().last() {
                    on_transaction(tx);
                    closed.push(*tx);
                }
            }
            TraceOp::Read(address) => {
                if !cache.in_transaction() {
                    return Err(protocol("read outside of a transaction"));
                }
                let _ = cache.read_byte(address).map_err(memory)?;
            }
            TraceOp::Write(address, value) => {
                if !cache.in_transaction() {
                    return Err(protocol("write outside of a transaction"));
                }
                cache.write_byte(address, value).map_err(memory)?;
            }
            TraceOp::CycleStart => {
                if in_cycle {
                    return Err(protocol("cycle already started"));
                }
                in_cycle = true;
                cache.on_cycle_started();
            }
            TraceOp::CycleFinish => {
                if !in_cycle {
                    return Err(protocol("no cycle to finish"));
                }
                in_cycle = false;
                cache.on_cycle_finished();
            }
            TraceOp::InstructionFinished(opcode) => {
                if cache.in_transaction() {
                    return Err(protocol("instruction finished inside a transaction"));
                }
                cache.on_instruction_finished(opcode);
            }
        }
    }

    if cache.in_transaction() {
        tracing::warn!("trace ended with an open transaction");
    }
    Ok(closed)
}
