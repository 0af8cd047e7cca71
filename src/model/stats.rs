//! Page view counters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// View counter aggregate stored in the site document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewStats {
    pub total_views: u64,
    /// Views per UTC calendar date, keyed `YYYY-MM-DD`.
    pub daily_views: BTreeMap<String, u64>,
}

impl ViewStats {
    /// Count one view on the given UTC date.
    pub fn record_view(&mut self, date: NaiveDate) {
        self.total_views += 1;
        *self.daily_views.entry(Self::date_key(date)).or_insert(0) += 1;
    }

    /// Views recorded on the given date.
    pub fn views_on(&self, date: NaiveDate) -> u64 {
        self.daily_views
            .get(&Self::date_key(date))
            .copied()
            .unwrap_or(0)
    }

    fn date_key(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}
