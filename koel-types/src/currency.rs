use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable reference record for a single ISO-like currency.
///
/// `code` is always canonical uppercase; the storage layer enforces
/// uniqueness on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub name_plural: Option<String>,
    pub symbol: String,
    pub decimal_digits: i32,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    /// Normalize a raw code into the canonical uppercase form used
    /// everywhere else in the system (cache keys, adapter URLs, row lookups).
    #[must_use]
    pub fn canonical_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}
