use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::OnceLock;

use crate::shared::errors::{AppError, AppResult};

static INTEGER_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Extract the first run of ASCII digits from a listing label.
///
/// `"Episode 37 - Finale"` yields 37, `"Capítulo 10.5"` yields 10. Labels
/// without digits, or with a token too large to represent, yield `None`.
pub fn first_integer_token(label: &str) -> Option<u64> {
    let pattern =
        INTEGER_TOKEN.get_or_init(|| Regex::new(r"[0-9]+").expect("integer token pattern is valid"));
    pattern
        .find(label)
        .and_then(|token| token.as_str().parse::<u64>().ok())
}

/// Requested episode or chapter number (1-based)
///
/// Episodes and chapters are matched by exactly the same rule: the first
/// integer token of the provider's label must equal the requested number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ResolutionUnit(NonZeroU32);

impl ResolutionUnit {
    pub fn new(number: u32) -> AppResult<Self> {
        NonZeroU32::new(number)
            .map(Self)
            .ok_or_else(|| AppError::InvalidInput("Unit numbers start at 1".to_string()))
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn matches_label(&self, label: &str) -> bool {
        first_integer_token(label) == Some(u64::from(self.get()))
    }
}

impl fmt::Display for ResolutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ResolutionUnit {
    type Error = AppError;

    fn try_from(number: u32) -> AppResult<Self> {
        Self::new(number)
    }
}
