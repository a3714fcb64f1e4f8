/// Number of KiB in one MiB.
pub const KIB_PER_MIB: f64 = 1024.0;

/// Memory units that may trail a numeral in a CSV cell, e.g. `"512 KB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemUnit {
    Bytes,
    Kib,
    Mib,
    Gib,
}

impl MemUnit {
    /// Match a unit token case-insensitively. Both the decimal-looking
    /// (`KB`) and binary (`KiB`) spellings mean powers of 1024, which is
    /// what the benchmark harness reports.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "B" => Some(MemUnit::Bytes),
            "KB" | "KIB" => Some(MemUnit::Kib),
            "MB" | "MIB" => Some(MemUnit::Mib),
            "GB" | "GIB" => Some(MemUnit::Gib),
            _ => None,
        }
    }

    fn kib_factor(self) -> f64 {
        match self {
            MemUnit::Bytes => 1.0 / 1024.0,
            MemUnit::Kib => 1.0,
            MemUnit::Mib => KIB_PER_MIB,
            MemUnit::Gib => KIB_PER_MIB * KIB_PER_MIB,
        }
    }
}

/// A numeral with the unit token it carried, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<MemUnit>,
}

impl Quantity {
    /// Value in KiB. `default` applies when the cell had no unit token.
    pub fn in_kib(&self, default: MemUnit) -> f64 {
        self.value * self.unit.unwrap_or(default).kib_factor()
    }

    /// Value in MiB. `default` applies when the cell had no unit token.
    pub fn in_mib(&self, default: MemUnit) -> f64 {
        kib_to_mib(self.in_kib(default))
    }
}

/// Presentation-boundary conversion. Samples always stay in KiB.
pub fn kib_to_mib(kib: f64) -> f64 {
    kib / KIB_PER_MIB
}

/// Strip a trailing unit token and parse the remaining numeral.
///
/// Returns `None` when the numeral is not a finite number or the unit token
/// is not a known memory unit.
pub fn parse_quantity(raw: &str) -> Option<Quantity> {
    let trimmed = raw.trim();
    let numeral = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let token = &trimmed[numeral.len()..];

    let unit = if token.is_empty() {
        None
    } else {
        Some(MemUnit::from_token(token)?)
    };

    let value: f64 = numeral.trim_end().parse().ok()?;
    value.is_finite().then_some(Quantity { value, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_kb_suffix() {
        let q = parse_quantity("512 KB").unwrap();
        assert_eq!(q.value, 512.0);
        assert_eq!(q.unit, Some(MemUnit::Kib));
        assert_eq!(q.in_kib(MemUnit::Kib), 512.0);
    }

    #[test]
    fn rejects_non_numeric_remainder() {
        assert!(parse_quantity("abc KB").is_none());
        assert!(parse_quantity("").is_none());
        assert!(parse_quantity("KB").is_none());
    }

    #[test]
    fn rejects_unknown_unit_and_non_finite() {
        assert!(parse_quantity("12 XY").is_none());
        assert!(parse_quantity("NaN KB").is_none());
        assert!(parse_quantity("inf").is_none());
    }

    #[test]
    fn converts_between_units() {
        let q = parse_quantity("1.5 MB").unwrap();
        assert_eq!(q.in_kib(MemUnit::Kib), 1536.0);
        assert_eq!(q.in_mib(MemUnit::Kib), 1.5);

        let bare = parse_quantity(" 2048 ").unwrap();
        assert_eq!(bare.unit, None);
        assert_eq!(bare.in_mib(MemUnit::Kib), 2.0);
        assert_eq!(bare.in_mib(MemUnit::Mib), 2048.0);
    }

    #[test]
    fn keeps_negative_deltas() {
        let q = parse_quantity("-30 KB").unwrap();
        assert_eq!(q.in_kib(MemUnit::Kib), -30.0);
    }

    #[test]
    fn accepts_attached_and_lowercase_tokens() {
        assert_eq!(parse_quantity("64kb").unwrap().in_kib(MemUnit::Mib), 64.0);
        assert_eq!(parse_quantity("1 GiB").unwrap().in_mib(MemUnit::Kib), 1024.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a non-negative numeral never comes back negative
        #[test]
        fn sign_is_preserved(v in 0.0f64..1.0e12, unit in prop::sample::select(vec!["B", "KB", "MB", "GB", ""])) {
            let raw = format!("{v} {unit}");
            let q = parse_quantity(&raw).unwrap();
            prop_assert!(q.in_kib(MemUnit::Kib) >= 0.0);
        }

        /// Property: numerals round-trip through the unit strip unchanged
        #[test]
        fn numeral_survives_strip(v in -1.0e9f64..1.0e9) {
            let q = parse_quantity(&format!("{v} KB")).unwrap();
            prop_assert_eq!(q.value, v);
        }
    }
}
