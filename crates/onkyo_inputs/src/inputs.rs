//! Receiver input identifiers and the stock Onkyo input selector table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Receivers store at most this many characters for a renamed input.
pub const MAX_NAME_LEN: usize = 10;

/// Custom names reported by a receiver, keyed by input.
pub type CustomNames = BTreeMap<InputId, String>;

/// Input selector values and their default labels, as printed in the
/// Onkyo ISCP command reference for `SLI`.
pub const ONKYO_INPUTS: &[(&str, &str)] = &[
    ("00", "VIDEO1 ··· VCR/DVR ··· STB/DVR"),
    ("01", "VIDEO2 ··· CBL/SAT"),
    ("02", "VIDEO3 ··· GAME/TV ··· GAME ··· GAME1"),
    ("03", "VIDEO4 ··· AUX1(AUX)"),
    ("04", "VIDEO5 ··· AUX2 ··· GAME2"),
    ("05", "VIDEO6 ··· PC"),
    ("06", "VIDEO7"),
    ("07", "Hidden1 ··· EXTRA1"),
    ("08", "Hidden2 ··· EXTRA2"),
    ("09", "Hidden3 ··· EXTRA3"),
    ("10", "DVD ··· BD/DVD"),
    ("11", "STRM BOX"),
    ("12", "TV"),
    ("20", "TAPE(1) ··· TV/TAPE"),
    ("21", "TAPE2"),
    ("22", "PHONO"),
    ("23", "CD ··· TV/CD"),
    ("24", "FM"),
    ("25", "AM"),
    ("26", "TUNER"),
    ("27", "MUSIC SERVER ··· P4S ··· DLNA"),
    ("28", "INTERNET RADIO ··· iRadio Favorite"),
    ("29", "USB/USB(Front)"),
    ("2A", "USB(Rear)"),
    ("2B", "NETWORK ··· NET"),
    ("2C", "USB(toggle)"),
    ("2D", "Airplay"),
    ("2E", "Bluetooth"),
    ("30", "MULTI CH"),
    ("31", "XM"),
    ("32", "SIRIUS"),
    ("33", "DAB"),
    ("40", "Universal PORT"),
    ("41", "LINE"),
    ("42", "LINE2"),
    ("44", "OPTICAL"),
    ("45", "COAXIAL"),
    ("55", "HDMI 5"),
    ("56", "HDMI 6"),
    ("57", "HDMI 7"),
    ("80", "MAIN SOURCE"),
];

/// Two-character input code, e.g. `00`, `23` or `2B`.
///
/// The receiver encodes input selector values as two hex digits in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputId([u8; 2]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid input id {0:?}: expected two characters from 0-9 or A-F")]
pub struct InputIdError(pub String);

impl InputId {
    pub fn new(code: &str) -> Result<Self, InputIdError> {
        match code.as_bytes() {
            [a, b] if is_id_byte(*a) && is_id_byte(*b) => Ok(Self([*a, *b])),
            _ => Err(InputIdError(code.to_string())),
        }
    }

    /// Split a leading input id off `value`, returning the id and the rest.
    pub fn split_prefix(value: &str) -> Option<(Self, &str)> {
        let code = value.get(..2)?;
        let id = Self::new(code).ok()?;
        Some((id, &value[2..]))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII bytes are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputId {
    type Err = InputIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for InputId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InputId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::new(&code).map_err(serde::de::Error::custom)
    }
}
