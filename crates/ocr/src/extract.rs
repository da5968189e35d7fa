use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::{EnergyQuantity, EnergyReading, EnergyUnit};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Matches "250 kwh", "300kwh/annum", "0.8 kw", "٢٥٠ kwh". Applied to lower-cased text.
// `\d` is Unicode-aware: labels in Hindi or Arabic print their own numerals.
re!(re_energy,
    r"(\d+\.?\d*)\s*(kwh|kw)");

re!(re_decimal_digit,
    r"^\d$");

// ── Digit normalization ──────────────────────────────────────────────────────

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    re_decimal_digit().is_match(c.encode_utf8(&mut buf))
}

/// Value of a decimal digit from any script.
///
/// Unicode encodes every decimal digit set as a contiguous run of ten code
/// points from zero to nine, so the position within the run is the value.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut position = 0;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        position += 1;
        code -= 1;
    }
    Some(position % 10)
}

/// Rewrite a matched number with ASCII digits so `f64` can parse it.
fn to_ascii_number(raw: &str) -> Option<String> {
    raw.chars()
        .map(|c| match c {
            '.' => Some('.'),
            _ => digit_value(c).and_then(|d| char::from_digit(d, 10)),
        })
        .collect()
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Normalize raw OCR text into an annual kWh figure.
    ///
    /// Text without a recognizable quantity is not an error; the reading simply
    /// carries no figure.
    pub fn extract(ocr_text: &str) -> EnergyReading {
        let energy_kwh = Self::find_quantity(ocr_text).map(|q| q.annual_kwh());
        EnergyReading {
            energy_kwh,
            raw_text: ocr_text.to_string(),
        }
    }

    /// First number/unit pair in document order, as printed.
    pub fn find_quantity(ocr_text: &str) -> Option<EnergyQuantity> {
        let lowered = ocr_text.to_lowercase();
        let c = re_energy().captures(&lowered)?;
        let value = f64::from_str(&to_ascii_number(c.get(1)?.as_str())?).ok()?;
        let unit = EnergyUnit::from_str(c.get(2)?.as_str()).ok()?;
        Some(EnergyQuantity::new(value, unit))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
