//! Maps a free-text address onto a Jharkhand district by substring match.

use std::fmt;

use serde::{Serialize, Serializer};

pub const REGION: &str = "Jharkhand";
pub const NOT_IN_REGION: &str = "Not in Jharkhand";
pub const UNKNOWN_DISTRICT: &str = "Jharkhand (District Unknown)";

/// Scanned in this order; the first hit wins.
pub const DISTRICTS: [&str; 24] = [
    "Bokaro",
    "Chatra",
    "Deoghar",
    "Dhanbad",
    "Dumka",
    "East Singhbhum",
    "Garhwa",
    "Giridih",
    "Godda",
    "Gumla",
    "Hazaribagh",
    "Jamtara",
    "Khunti",
    "Koderma",
    "Latehar",
    "Lohardaga",
    "Pakur",
    "Palamu",
    "Ramgarh",
    "Ranchi",
    "Sahibganj",
    "Seraikela Kharsawan",
    "Simdega",
    "West Singhbhum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum District {
    Known(&'static str),
    NotInRegion,
    Unknown,
}

impl District {
    pub fn as_str(&self) -> &'static str {
        match *self {
            District::Known(name) => name,
            District::NotInRegion => NOT_IN_REGION,
            District::Unknown => UNKNOWN_DISTRICT,
        }
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for District {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

pub fn classify_location(address: &str) -> District {
    let haystack = address.to_lowercase();
    if !haystack.contains(&REGION.to_lowercase()) {
        return District::NotInRegion;
    }
    DISTRICTS
        .iter()
        .find(|d| haystack.contains(&d.to_lowercase()))
        .map(|d| District::Known(*d))
        .unwrap_or(District::Unknown)
}
