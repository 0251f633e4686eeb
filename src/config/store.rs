//! Sectioned key/value settings with typed, fallback-tolerant getters

use super::error::ConfigError;
use config::{Config, File, FileFormat, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Write as _};
use std::path::Path;

/// Every key the fishing loop knows about, with its documented default
const DEFAULTS: &[(&str, &[(&str, &str)])] = &[
    (
        "Coordinates",
        &[
            ("cast_button_x", "400"),
            ("cast_button_y", "500"),
            ("fishing_area_x", "400"),
            ("fishing_area_y", "300"),
            ("reel_button_x", "400"),
            ("reel_button_y", "600"),
            ("timing_area_x", "400"),
            ("timing_area_y", "400"),
            ("fishing_region_width", "200"),
            ("fishing_region_height", "200"),
        ],
    ),
    (
        "Timing",
        &[
            ("cast_delay_min", "2.0"),
            ("cast_delay_max", "4.0"),
            ("bite_timeout", "30"),
            ("reaction_time_min", "0.3"),
            ("reaction_time_max", "0.8"),
            ("reel_delay_min", "0.05"),
            ("reel_delay_max", "0.5"),
            ("reel_timeout", "10"),
            ("reel_max_attempts", "50"),
            ("detection_error_backoff", "2.0"),
        ],
    ),
    (
        "Detection",
        &[
            ("hook_sensitivity", "0.8"),
            ("green_threshold", "30"),
            ("detection_radius", "100"),
            ("motion_sensitivity", "20"),
            ("color_change_threshold", "0.05"),
            ("use_motion_detection", "True"),
            ("use_color_detection", "True"),
            ("use_template_matching", "True"),
        ],
    ),
    (
        "Safety",
        &[
            ("randomize_timings", "True"),
            ("anti_detection_enabled", "True"),
            ("break_interval_minutes", "30"),
            ("break_duration_min", "30"),
            ("break_duration_max", "120"),
            ("max_session_hours", "4"),
            ("mouse_movement_variation", "20"),
        ],
    ),
    ("Session", &[("max_fishing", "0")]),
    (
        "Statistics",
        &[
            ("total_fish_caught", "0"),
            ("total_casts_made", "0"),
            ("total_runtime_hours", "0.0"),
            ("best_session_fish", "0"),
            ("sessions_completed", "0"),
        ],
    ),
];

#[derive(Debug, Clone, Default, PartialEq)]
struct Section {
    name: String,
    entries: BTreeMap<String, String>,
}

/// Section and key lookups ignore case; section names keep the spelling
/// they were first written with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    sections: BTreeMap<String, Section>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for (section, entries) in DEFAULTS {
            for (key, value) in entries.iter() {
                store.set(section, key, value);
            }
        }
        store
    }

    /// Merge INI text into the store; keys absent from the text keep their value
    pub fn load_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let parsed = Config::builder()
            .add_source(File::from_str(text, FileFormat::Ini))
            .build()?;
        let table: HashMap<String, Value> = parsed.try_deserialize()?;

        for (section, value) in table {
            let entries = match value.into_table() {
                Ok(entries) => entries,
                Err(_) => {
                    log::debug!("Ignoring key '{section}' outside any section");
                    continue;
                }
            };
            for (key, value) in entries {
                match value.into_string() {
                    Ok(text) => self.set(&section, &key, text),
                    Err(e) => log::warn!("⚠️ Ignoring [{section}] {key}: {e}"),
                }
            }
        }
        Ok(())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&text)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, self.to_ini_string()).map_err(write_err)
    }

    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for section in self.sections.values() {
            let _ = writeln!(out, "[{}]", section.name);
            for (key, value) in &section.entries {
                let _ = writeln!(out, "{key} = {value}");
            }
            out.push('\n');
        }
        out
    }

    /// Store the `Display` form of `value`
    pub fn set(&mut self, section: &str, key: &str, value: impl Display) {
        self.sections
            .entry(section.to_lowercase())
            .or_insert_with(|| Section {
                name: section.to_string(),
                entries: BTreeMap::new(),
            })
            .entries
            .insert(key.to_lowercase(), value.to_string());
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_lowercase())
            .and_then(|s| s.entries.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    pub fn get_string(&self, section: &str, key: &str, fallback: &str) -> String {
        self.get(section, key).unwrap_or(fallback).to_string()
    }

    pub fn get_int(&self, section: &str, key: &str, fallback: i64) -> i64 {
        self.parsed(section, key).unwrap_or(fallback)
    }

    pub fn get_float(&self, section: &str, key: &str, fallback: f64) -> f64 {
        self.parsed(section, key)
            .filter(|v: &f64| v.is_finite())
            .unwrap_or(fallback)
    }

    pub fn get_bool(&self, section: &str, key: &str, fallback: bool) -> bool {
        match self.get(section, key).map(|v| v.trim().to_lowercase()) {
            Some(v) if matches!(v.as_str(), "1" | "yes" | "true" | "on") => true,
            Some(v) if matches!(v.as_str(), "0" | "no" | "false" | "off") => false,
            _ => fallback,
        }
    }

    fn parsed<T: std::str::FromStr>(&self, section: &str, key: &str) -> Option<T> {
        let raw = self.get(section, key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("⚠️ [{section}] {key} = '{raw}' is not a valid value, using default");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_fall_back() {
        let store = ConfigStore::new();
        assert_eq!(store.get_int("Coordinates", "cast_button_x", 400), 400);
        assert_eq!(store.get_float("Timing", "cast_delay_min", 2.0), 2.0);
        assert!(store.get_bool("Safety", "randomize_timings", true));
        assert_eq!(store.get_string("Profile", "name", "default"), "default");
    }

    #[test]
    fn test_typed_round_trip() {
        let mut store = ConfigStore::new();
        store.set("Coordinates", "cast_button_x", 1234);
        store.set("Timing", "cast_delay_min", 2.75_f64);
        store.set("Timing", "odd_float", 0.1_f64 + 0.2_f64);
        store.set("Safety", "randomize_timings", false);
        store.set("Profile", "name", "evening pond");

        assert_eq!(store.get_int("Coordinates", "cast_button_x", 0), 1234);
        assert_eq!(store.get_float("Timing", "cast_delay_min", 0.0), 2.75);
        assert_eq!(store.get_float("Timing", "odd_float", 0.0), 0.1 + 0.2);
        assert!(!store.get_bool("Safety", "randomize_timings", true));
        assert_eq!(store.get_string("Profile", "name", ""), "evening pond");
    }

    #[test]
    fn test_unparsable_value_uses_fallback() {
        let mut store = ConfigStore::new();
        store.set("Timing", "bite_timeout", "soon");
        store.set("Safety", "randomize_timings", "maybe");
        assert_eq!(store.get_int("Timing", "bite_timeout", 30), 30);
        assert!(store.get_bool("Safety", "randomize_timings", true));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let mut store = ConfigStore::new();
        store.set("Detection", "Green_Threshold", 45);
        assert_eq!(store.get_int("detection", "green_threshold", 0), 45);
    }

    #[test]
    fn test_bool_spellings() {
        let mut store = ConfigStore::new();
        for (raw, expected) in [("True", true), ("no", false), ("ON", true), ("0", false)] {
            store.set("Safety", "flag", raw);
            assert_eq!(store.get_bool("Safety", "flag", !expected), expected, "{raw}");
        }
    }

    #[test]
    fn test_ini_text_round_trip() {
        let mut store = ConfigStore::with_defaults();
        store.set("Coordinates", "reel_button_x", 812);
        store.set("Timing", "cast_delay_max", 5.5_f64);
        store.set("Statistics", "total_runtime_hours", 12.25_f64);

        let mut reloaded = ConfigStore::new();
        reloaded.load_str(&store.to_ini_string()).unwrap();

        assert_eq!(reloaded.get_int("Coordinates", "reel_button_x", 0), 812);
        assert_eq!(reloaded.get_float("Timing", "cast_delay_max", 0.0), 5.5);
        assert_eq!(reloaded.get_float("Statistics", "total_runtime_hours", 0.0), 12.25);
        assert!(reloaded.get_bool("Safety", "anti_detection_enabled", false));
    }

    #[test]
    fn test_load_keeps_defaults_for_omitted_keys() {
        let mut store = ConfigStore::with_defaults();
        store
            .load_str("[Timing]\nbite_timeout = 45\n")
            .unwrap();
        assert_eq!(store.get_int("Timing", "bite_timeout", 0), 45);
        assert_eq!(store.get_float("Timing", "cast_delay_min", 0.0), 2.0);
        assert_eq!(store.get_int("Coordinates", "timing_area_y", 0), 400);
    }

    #[test]
    fn test_huge_float_is_kept_as_written() {
        let mut store = ConfigStore::new();
        store.load_str("[Timing]\nbite_timeout = 1e300\n").unwrap();
        assert_eq!(store.get_float("Timing", "bite_timeout", 30.0), 1e300);
    }

    #[test]
    fn test_section_names_keep_spelling() {
        let store = ConfigStore::with_defaults();
        let text = store.to_ini_string();
        assert!(text.contains("[Coordinates]"));
        assert!(text.contains("cast_button_x = 400"));
    }
}
