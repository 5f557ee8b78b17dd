use std::collections::HashMap;

use super::config::TangentialConfig;
use super::PostProcessorError;

/// A single G-code word: an upper-cased letter and the number that follows it.
///
/// `value` is `None` when the letter is not followed by a well-formed number
/// (a bare letter, `X-`, `Y.` …).
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub letter: char,
    pub value: Option<f64>,
}

/// One line of G-code, tokenized once.
///
/// Parenthesized comments and everything after `;` are skipped. Each letter's
/// first occurrence claims the key: a malformed first occurrence reads as
/// absent even when the same letter appears again later in the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    raw: String,
    words: Vec<Word>,
    params: HashMap<char, Option<f64>>,
}

impl Block {
    pub fn parse(line: &str) -> Self {
        let mut words = Vec::new();
        let mut params = HashMap::new();
        let mut rest = line;

        while let Some(ch) = rest.chars().next() {
            let after = &rest[ch.len_utf8()..];
            match ch {
                '(' => {
                    // Unclosed comment runs to end of line.
                    rest = match after.find(')') {
                        Some(end) => &after[end + 1..],
                        None => "",
                    };
                }
                ';' => break,
                c if c.is_ascii_alphabetic() => {
                    let (value, consumed) = scan_number(after);
                    let letter = c.to_ascii_uppercase();
                    params.entry(letter).or_insert(value);
                    words.push(Word { letter, value });
                    rest = &after[consumed..];
                }
                _ => rest = after,
            }
        }

        Block {
            raw: line.to_string(),
            words,
            params,
        }
    }

    /// The line exactly as it was read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Value of the first occurrence of `letter`, or `None` if the letter is
    /// missing or not followed by a well-formed number.
    pub fn value(&self, letter: char) -> Option<f64> {
        self.params
            .get(&letter.to_ascii_uppercase())
            .copied()
            .flatten()
    }

    /// `true` when `letter` occurs but its first occurrence is not a number.
    pub fn is_malformed(&self, letter: char) -> bool {
        matches!(self.params.get(&letter.to_ascii_uppercase()), Some(None))
    }

    /// `true` when any word on the line equals `token` (`G01` matches `G1`).
    pub fn has_command(&self, token: &CommandToken) -> bool {
        self.words.iter().any(|w| token.matches(w))
    }

    pub fn has_any_command(&self, tokens: &[CommandToken]) -> bool {
        tokens.iter().any(|t| self.has_command(t))
    }
}

/// Scans `[+-]?digits[.digits]` from the start of `s`.
///
/// Returns the parsed value (`None` unless at least one digit was seen) and
/// the number of bytes the scan consumed.
fn scan_number(s: &str) -> (Option<f64>, usize) {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut digits = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }

    if digits == 0 {
        return (None, end);
    }
    (s[..end].parse::<f64>().ok(), end)
}

/// A command token such as `G1`, compared by letter and numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandToken {
    pub letter: char,
    pub number: f64,
}

impl CommandToken {
    /// Parses `"G1"`, `"g01"`, `"M3"` …; anything else is `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let letter = token.chars().next()?;
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let rest = &token[1..];
        match scan_number(rest) {
            (Some(number), consumed) if consumed == rest.len() => Some(CommandToken {
                letter: letter.to_ascii_uppercase(),
                number,
            }),
            _ => None,
        }
    }

    fn matches(&self, word: &Word) -> bool {
        word.letter == self.letter && word.value == Some(self.number)
    }
}

/// The command tokens of a [`TangentialConfig`], parsed once per run.
#[derive(Debug, Clone)]
pub struct MotionTokens {
    pub linear: CommandToken,
    pub arc_cw: CommandToken,
    pub arc_ccw: CommandToken,
    pub clockwise: CommandToken,
    pub supported: Vec<CommandToken>,
}

impl MotionTokens {
    pub fn from_config(cfg: &TangentialConfig) -> Result<Self, PostProcessorError> {
        let token = |name: &str, text: &str| {
            CommandToken::parse(text).ok_or_else(|| {
                PostProcessorError::Config(format!("{name} is not a command token: {text:?}"))
            })
        };
        Ok(MotionTokens {
            linear: token("motion.linear", &cfg.motion.linear)?,
            arc_cw: token("motion.arc_cw", &cfg.motion.arc_cw)?,
            arc_ccw: token("motion.arc_ccw", &cfg.motion.arc_ccw)?,
            clockwise: token(
                "tangential.clockwise_command",
                &cfg.tangential.clockwise_command,
            )?,
            supported: cfg
                .motion
                .supported
                .iter()
                .map(|t| token("motion.supported", t))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// What a line asks the machine to do, as far as arc expansion cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Linear,
    ArcCw,
    ArcCcw,
    Other,
}

/// Parsed view of one program line.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub i: Option<f64>,
    pub j: Option<f64>,
    pub feed: Option<f64>,
    pub block: Block,
}

impl Command {
    pub fn parse(line: &str, tokens: &MotionTokens) -> Self {
        let block = Block::parse(line);
        let kind = if block.has_command(&tokens.arc_cw) {
            CommandKind::ArcCw
        } else if block.has_command(&tokens.arc_ccw) {
            CommandKind::ArcCcw
        } else if block.has_command(&tokens.linear) {
            CommandKind::Linear
        } else {
            CommandKind::Other
        };

        Command {
            kind,
            x: block.value('X'),
            y: block.value('Y'),
            i: block.value('I'),
            j: block.value('J'),
            feed: block.value('F'),
            block,
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self.kind, CommandKind::ArcCw | CommandKind::ArcCcw)
    }

    /// `true` when the line names a new X or Y target.
    pub fn has_target(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    pub fn raw(&self) -> &str {
        self.block.raw()
    }
}
