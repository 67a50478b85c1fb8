//! Ledger account code classification
//!
//! Account codes are free text typed in by staff, e.g. `B1-EX-F/DLR`. They
//! carry a dealer/retailer price tier and, usually, a distribution zone.
//! The price level is the code itself; the zone is decoded here.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder shown when a code carries no usable value
pub const NOT_AVAILABLE: &str = "N/A";

/// Zone keywords recognised as whole tokens
pub const KNOWN_ZONES: [&str; 6] = ["Z1", "Z2", "Z3", "B1", "B3", "AZ"];

/// Legacy codes whose zone cannot be read off the tokens. Checked in order.
const ZONE_OVERRIDES: [(&str, &str); 5] = [
    ("B1-EX", "B1"),
    ("RETAILER-Z1", "Z1"),
    ("DISTRIZ2", "Z2"),
    ("B3-Z3", "Z3"),
    ("AZ-Z1", "Z1"),
];

/// Distribution zone decoded from an account code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Zone {
    Z1,
    Z2,
    Z3,
    B1,
    B3,
    AZ,
    /// Zone-shaped leading token outside the known set, e.g. `Z9` or `B2`
    Other(String),
    #[default]
    NotAvailable,
}

impl Zone {
    fn from_keyword(token: &str) -> Option<Zone> {
        match token {
            "Z1" => Some(Zone::Z1),
            "Z2" => Some(Zone::Z2),
            "Z3" => Some(Zone::Z3),
            "B1" => Some(Zone::B1),
            "B3" => Some(Zone::B3),
            "AZ" => Some(Zone::AZ),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Zone::Z1 => "Z1",
            Zone::Z2 => "Z2",
            Zone::Z3 => "Z3",
            Zone::B1 => "B1",
            Zone::B3 => "B3",
            Zone::AZ => "AZ",
            Zone::Other(token) => token,
            Zone::NotAvailable => NOT_AVAILABLE,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Zone::NotAvailable)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Zone {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        if upper.is_empty() || upper == NOT_AVAILABLE {
            return Ok(Zone::NotAvailable);
        }
        Ok(Zone::from_keyword(&upper).unwrap_or(Zone::Other(upper)))
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Zone, D::Error> {
        let s = String::deserialize(deserializer)?;
        // Infallible
        Ok(s.parse().unwrap_or_default())
    }
}

/// Price level and zone of one account code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCodeDetails {
    pub price_level: String,
    pub zone: Zone,
}

impl Default for AccountCodeDetails {
    fn default() -> Self {
        Self {
            price_level: NOT_AVAILABLE.to_string(),
            zone: Zone::NotAvailable,
        }
    }
}

/// Classify an account code. Never fails: unknown shapes give zone `N/A`.
pub fn classify(code: &str) -> AccountCodeDetails {
    if code.is_empty() {
        return AccountCodeDetails::default();
    }

    AccountCodeDetails {
        price_level: code.to_string(),
        zone: resolve_zone(code),
    }
}

/// Classify an optional account code; absent codes classify like empty ones.
pub fn classify_optional(code: Option<&str>) -> AccountCodeDetails {
    code.map(classify).unwrap_or_default()
}

fn resolve_zone(code: &str) -> Zone {
    let upper = code.to_uppercase();
    let tokens: Vec<&str> = upper.split(|c: char| c == '-' || c == '/').collect();

    for (needle, zone) in ZONE_OVERRIDES {
        if upper.contains(needle) {
            return Zone::from_keyword(zone).unwrap_or_default();
        }
    }

    if let Some(zone) = tokens.iter().find_map(|t| Zone::from_keyword(t)) {
        return zone;
    }

    // Only the leading token may carry an unlisted zone
    let first = tokens.first().copied().unwrap_or_default();
    if let Some(zone) = Zone::from_keyword(first) {
        return zone;
    }
    if is_zone_like(first) {
        return Zone::Other(first.to_string());
    }

    Zone::NotAvailable
}

fn is_zone_like(token: &str) -> bool {
    static ZONE_LIKE: OnceCell<Regex> = OnceCell::new();
    let pattern = ZONE_LIKE.get_or_init(|| Regex::new(r"^[ZB]\d*$").expect("zone pattern is valid"));
    pattern.is_match(token) || token == "AZ"
}
