use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// GTFS feeds store the same logical ID as text in one file and as a number in another (`42`,
/// `"42"`, `42.0`, `042`). Every ID is reduced to one canonical key when it's read, so lookups and
/// joins can compare plain strings.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(n) = parse_integer(trimmed) {
        return n.to_string();
    }
    // Written by a spreadsheet or dataframe that turned an integer column into floats
    if let Some((whole, fraction)) = trimmed.split_once('.') {
        if !fraction.is_empty() && fraction.bytes().all(|b| b == b'0') {
            if let Some(n) = parse_integer(whole) {
                return n.to_string();
            }
        }
    }
    trimmed.to_string()
}

fn parse_integer(x: &str) -> Option<i128> {
    // Rust accepts a leading '+', which shouldn't turn "+7" and "7" into the same ID
    if x.is_empty() || x.starts_with('+') {
        return None;
    }
    x.parse::<i128>().ok()
}

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: &str) -> Self {
                Self(normalize_id(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = <String>::deserialize(d)?;
                Ok(Self::new(&raw))
            }
        }
    };
}

define_id!(AgencyID);
define_id!(RouteID);
define_id!(ServiceID);
define_id!(ShapeID);
define_id!(StopID);
define_id!(TripID);
