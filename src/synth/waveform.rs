//! Waveform selection and its wire ordinal.
//!
//! The ordinal is part of the contract with the native engine, which decodes
//! it into its own wavetable enum. The mapping in `ordinal` is fixed; adding a variant
//! means appending a new ordinal, never renumbering an existing one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Oscillator waveform understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    /// Every waveform, in ordinal order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Square,
        Waveform::Sawtooth,
    ];

    /// Integer transmitted to the engine for this waveform.
    pub fn ordinal(self) -> i32 {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Square => 2,
            Waveform::Sawtooth => 3,
        }
    }

    /// Reverse lookup of [`Waveform::ordinal`].
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(Waveform::Sine),
            1 => Some(Waveform::Triangle),
            2 => Some(Waveform::Square),
            3 => Some(Waveform::Sawtooth),
            _ => None,
        }
    }

    /// Human-readable label for control surfaces.
    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Triangle => "Triangle",
            Waveform::Square => "Square",
            Waveform::Sawtooth => "Saw",
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "square" | "sq" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            other => Err(format!(
                "unknown waveform '{}' (expected sine, triangle, square or sawtooth)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_fixed() {
        assert_eq!(Waveform::Sine.ordinal(), 0);
        assert_eq!(Waveform::Triangle.ordinal(), 1);
        assert_eq!(Waveform::Square.ordinal(), 2);
        assert_eq!(Waveform::Sawtooth.ordinal(), 3);
    }

    #[test]
    fn test_ordinal_independent_of_call_order() {
        let reversed: Vec<i32> = Waveform::ALL.iter().rev().map(|w| w.ordinal()).collect();
        assert_eq!(reversed, vec![3, 2, 1, 0]);
        assert_eq!(Waveform::Square.ordinal(), 2);
    }

    #[test]
    fn test_from_ordinal() {
        for waveform in Waveform::ALL {
            assert_eq!(Waveform::from_ordinal(waveform.ordinal()), Some(waveform));
        }
        assert_eq!(Waveform::from_ordinal(4), None);
        assert_eq!(Waveform::from_ordinal(-1), None);
    }

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("saw".parse::<Waveform>(), Ok(Waveform::Sawtooth));
        assert_eq!(" Triangle ".parse::<Waveform>(), Ok(Waveform::Triangle));
        assert!("noise".parse::<Waveform>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Waveform::Sawtooth).unwrap();
        assert_eq!(json, "\"sawtooth\"");
        let parsed: Waveform = serde_json::from_str("\"square\"").unwrap();
        assert_eq!(parsed, Waveform::Square);
    }
}
