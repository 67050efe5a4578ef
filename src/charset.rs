//! Character selection expressions, e.g. `32-254,-130-140,-159`.
//!
//! Tokens are comma-separated. Each is a single code or an inclusive
//! `start-end` range; a leading `-` turns it into an exclusion. Tokens are
//! applied left to right so later ones win where they overlap.

use crate::{GlyphError, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Printable and extended codes minus the line-drawing and symbol blocks.
pub const DEFAULT_SELECTION: &str = "32-254,-130-140,-145-156,-159";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub codes: RangeInclusive<u8>,
    pub include: bool,
}

/// Ordered include/exclude entries, validated as a whole before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSelection {
    entries: Vec<SelectionEntry>,
}

impl CharSelection {
    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    /// Whether `code` ends up selected after all entries are applied.
    pub fn selects(&self, code: u8) -> bool {
        self.entries
            .iter()
            .rev()
            .find(|e| e.codes.contains(&code))
            .is_some_and(|e| e.include)
    }
}

impl Default for CharSelection {
    fn default() -> Self {
        DEFAULT_SELECTION.parse().expect("default selection is valid")
    }
}

impl FromStr for CharSelection {
    type Err = GlyphError;

    fn from_str(s: &str) -> Result<Self> {
        let entries = s.split(',').map(parse_token).collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

impl fmt::Display for CharSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if !e.include {
                f.write_str("-")?;
            }
            if e.codes.start() == e.codes.end() {
                write!(f, "{}", e.codes.start())?;
            } else {
                write!(f, "{}-{}", e.codes.start(), e.codes.end())?;
            }
        }
        Ok(())
    }
}

fn parse_token(token: &str) -> Result<SelectionEntry> {
    let token = token.trim();
    let (include, body) = match token.strip_prefix('-') {
        Some(rest) => (false, rest),
        None => (true, token),
    };

    let codes = match body.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse_code(start, token)?, parse_code(end, token)?);
            if start > end {
                return Err(GlyphError::InvalidArgument(format!("invalid range: {start} - {end}")));
            }
            start..=end
        }
        None => {
            let code = parse_code(body, token)?;
            code..=code
        }
    };

    Ok(SelectionEntry { codes, include })
}

fn parse_code(s: &str, token: &str) -> Result<u8> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|_| GlyphError::InvalidArgument(format!("malformed character token '{token}'")))?;
    u8::try_from(value).map_err(|_| GlyphError::InvalidArgument(format!("invalid character: {value}")))
}
