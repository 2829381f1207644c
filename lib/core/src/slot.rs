//! Missions, garment slots and the slot resolver.
//!
//! A [`Mission`] fixes which [`Slot`]s an outfit needs. The resolver is a
//! static lookup plus a set difference against whatever the cart already holds.

use ahash::AHashSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Garment category an outfit needs filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Top,
    Bottom,
    Shoes,
    Outerwear,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Top, Slot::Bottom, Slot::Shoes, Slot::Outerwear];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Top => "top",
            Slot::Bottom => "bottom",
            Slot::Shoes => "shoes",
            Slot::Outerwear => "outerwear",
        }
    }

    /// Case-insensitive parse; `None` for anything outside the closed set
    pub fn parse(s: &str) -> Option<Slot> {
        let s = s.trim();
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Style/occasion profile that determines the required slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum Mission {
    #[default]
    SmartCasual,
    BusinessCasual,
    OutdoorRain,
}

impl Mission {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mission::SmartCasual => "smart_casual",
            Mission::BusinessCasual => "business_casual",
            Mission::OutdoorRain => "outdoor_rain",
        }
    }

    pub fn parse(s: &str) -> Option<Mission> {
        [Mission::SmartCasual, Mission::BusinessCasual, Mission::OutdoorRain]
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Like [`Mission::parse`] but maps unknown and empty input to the default mission.
    pub fn parse_or_default(s: &str) -> Mission {
        if s.trim().is_empty() {
            return Mission::default();
        }
        Mission::parse(s).unwrap_or_else(|| {
            warn!(mission = s, "unknown mission, using {}", Mission::default());
            Mission::default()
        })
    }
}

impl From<Option<String>> for Mission {
    fn from(s: Option<String>) -> Self {
        Mission::parse_or_default(s.as_deref().unwrap_or_default())
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slots a mission requires, in canonical order
#[must_use]
pub fn required_slots(mission: Mission) -> &'static [Slot] {
    match mission {
        Mission::SmartCasual => &[Slot::Top, Slot::Bottom, Slot::Shoes],
        Mission::BusinessCasual => &[Slot::Top, Slot::Bottom, Slot::Shoes],
        Mission::OutdoorRain => &[Slot::Outerwear, Slot::Bottom, Slot::Shoes],
    }
}

/// Required slots not present in the cart, keeping the order of `required`
#[must_use]
pub fn missing_slots(required: &[Slot], present: &[Slot]) -> Vec<Slot> {
    let present: AHashSet<Slot> = present.iter().copied().collect();
    let mut seen = AHashSet::with_capacity(required.len());
    required
        .iter()
        .copied()
        .filter(|slot| !present.contains(slot) && seen.insert(*slot))
        .collect()
}

/// Deserializes a list of slot names, dropping entries outside the closed set.
pub fn deserialize_cart_slots<'de, D>(deserializer: D) -> std::result::Result<Vec<Slot>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|name| {
            let slot = Slot::parse(name);
            if slot.is_none() {
                warn!(slot = %name, "ignoring unknown cart slot");
            }
            slot
        })
        .collect())
}
