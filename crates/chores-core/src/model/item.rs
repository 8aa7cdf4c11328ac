use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Stable identifier of a to-do item.
///
/// Serialized as a bare integer so lists written by older clients (which
/// keyed items by millisecond timestamp) load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(u64);

impl ItemKey {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemKey {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub key: ItemKey,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

impl Item {
    /// A fresh, unchecked item.
    pub fn new(key: ItemKey, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            checked: false,
        }
    }
}

/// Direction applied by the alphabetical sort toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The direction entered by the next toggle.
    ///
    /// The unsorted state is only ever the starting point: the first toggle
    /// enters ascending and later toggles alternate.
    #[must_use]
    pub const fn next(current: Option<Self>) -> Self {
        match current {
            None | Some(Self::Descending) => Self::Ascending,
            Some(Self::Ascending) => Self::Descending,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts shown in list headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}
