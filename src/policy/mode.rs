use crate::platform::PERMISSION_MASK;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SLOTS: [char; 3] = ['r', 'w', 'x'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeParseError {
    #[error("expected 9 characters, got {0}")]
    WrongLength(usize),

    #[error("unexpected character '{found}' at position {position} (expected '{expected}' or '-')")]
    InvalidChar {
        found: char,
        expected: char,
        position: usize,
    },
}

/// The nine `rwxrwxrwx` permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionMode(u32);

impl PermissionMode {
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & PERMISSION_MASK)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// `0644` style rendering.
    pub fn octal(self) -> String {
        format!("{:04o}", self.0)
    }
}

impl FromStr for PermissionMode {
    type Err = ModeParseError;

    /// Each position only accepts its own letter or `-`, so `rw-r--r--` parses
    /// but `wr-r--r--` does not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != 9 {
            return Err(ModeParseError::WrongLength(count));
        }

        let mut bits = 0;
        for (position, found) in s.chars().enumerate() {
            let expected = SLOTS[position % 3];
            if found == expected {
                bits |= 1 << (8 - position);
            } else if found != '-' {
                return Err(ModeParseError::InvalidChar {
                    found,
                    expected,
                    position,
                });
            }
        }
        Ok(Self(bits))
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbolic: String = (0..9)
            .map(|position| {
                if self.0 & (1 << (8 - position)) != 0 {
                    SLOTS[position % 3]
                } else {
                    '-'
                }
            })
            .collect();
        f.write_str(&symbolic)
    }
}
