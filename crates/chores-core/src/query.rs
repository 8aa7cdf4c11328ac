//! Read-only views over the item list.

use crate::model::Item;
use serde::Serialize;

/// Filter criteria for [`ItemStore::query`](crate::store::ItemStore::query).
///
/// The default query matches every item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemQuery {
    /// Substring the item text must contain. Empty means "any".
    pub keyword: Option<String>,
    /// Match `keyword` ignoring case.
    pub ignore_case: bool,
    /// Only items whose completion flag equals this value.
    pub checked: Option<bool>,
}

impl ItemQuery {
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    #[must_use]
    pub const fn checked(mut self, checked: Option<bool>) -> Self {
        self.checked = checked;
        self
    }

    /// Build a reusable matcher for this query.
    #[must_use]
    pub fn matcher(&self) -> impl Fn(&Item) -> bool + '_ {
        let needle = self
            .keyword
            .as_deref()
            .filter(|keyword| !keyword.is_empty())
            .map(|keyword| {
                if self.ignore_case {
                    keyword.to_lowercase()
                } else {
                    keyword.to_string()
                }
            });

        move |item: &Item| {
            if self.checked.is_some_and(|checked| item.checked != checked) {
                return false;
            }
            match needle.as_deref() {
                None => true,
                Some(needle) if self.ignore_case => item.text.to_lowercase().contains(needle),
                Some(needle) => item.text.contains(needle),
            }
        }
    }
}

/// Items whose text contains `keyword` as a case-sensitive substring, in
/// list order. An empty keyword keeps everything.
pub fn filter_by_keyword<'a>(items: &'a [Item], keyword: &str) -> Vec<&'a Item> {
    if keyword.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.text.contains(keyword))
        .collect()
}
