//! Built-in printer bed profiles.

use serde::{Deserialize, Serialize};

/// Bed size of a known printer, used to prefill the bed dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterProfile {
    /// Short key used on the command line.
    pub key: String,
    /// Profile name.
    pub name: String,
    /// Maximum X coordinate (mm).
    pub bed_x: i64,
    /// Maximum Y coordinate (mm).
    pub bed_y: i64,
}

impl PrinterProfile {
    fn new(key: &str, name: &str, bed_x: i64, bed_y: i64) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            bed_x,
            bed_y,
        }
    }

    /// Generic 220mm printer.
    pub fn generic() -> Self {
        Self::new("generic", "Generic", 220, 220)
    }

    /// Creality Ender 3.
    pub fn ender3() -> Self {
        Self::new("ender3", "Creality Ender 3", 220, 220)
    }

    /// Prusa MK4.
    pub fn prusa_mk4() -> Self {
        Self::new("mk4", "Prusa MK4", 250, 210)
    }

    /// Bambu Lab X1 Carbon.
    pub fn bambu_x1c() -> Self {
        Self::new("x1c", "Bambu Lab X1 Carbon", 256, 256)
    }

    /// Bambu Lab P1S.
    pub fn bambu_p1s() -> Self {
        Self::new("p1s", "Bambu Lab P1S", 256, 256)
    }

    /// Bambu Lab A1.
    pub fn bambu_a1() -> Self {
        Self::new("a1", "Bambu Lab A1", 256, 256)
    }

    /// Voron 2.4, 350mm build.
    pub fn voron_24() -> Self {
        Self::new("voron24", "Voron 2.4 (350mm)", 350, 350)
    }

    /// Get all built-in profiles.
    pub fn all_profiles() -> Vec<Self> {
        vec![
            Self::generic(),
            Self::ender3(),
            Self::prusa_mk4(),
            Self::bambu_x1c(),
            Self::bambu_p1s(),
            Self::bambu_a1(),
            Self::voron_24(),
        ]
    }

    /// Look up a profile by key, ignoring case.
    pub fn find(key: &str) -> Option<Self> {
        Self::all_profiles()
            .into_iter()
            .find(|p| p.key.eq_ignore_ascii_case(key.trim()))
    }
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::generic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BedConfig, Pattern};
    use crate::pattern::generate_points;

    #[test]
    fn test_profiles() {
        for profile in PrinterProfile::all_profiles() {
            assert!(profile.bed_x > 0);
            assert!(profile.bed_y > 0);
            // Every built-in bed fits the grid pattern.
            let config = BedConfig::new(profile.bed_x, profile.bed_y, Pattern::Grid3x3);
            assert!(generate_points(&config).is_ok(), "{}", profile.name);
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let profiles = PrinterProfile::all_profiles();
        for (i, a) in profiles.iter().enumerate() {
            for b in &profiles[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(PrinterProfile::find("MK4").unwrap().bed_y, 210);
        assert_eq!(PrinterProfile::find("ender3"), Some(PrinterProfile::ender3()));
        assert!(PrinterProfile::find("unknown").is_none());
    }
}
