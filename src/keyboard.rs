use serde::{Deserialize, Serialize};

use crate::mapper::{FrequencyMapper, KeyInfo};
use crate::tuning::Tuning;

// ── Keyboard Configuration ──────────────────────────────────

/// Largest number of keys a keyboard may have.
pub const MAX_KEYS: usize = 65_536;

/// Everything needed to lay out and tune a keyboard.
///
/// Built once per "apply" and never mutated; a new configuration produces a
/// new [`FrequencyTable`] through [`resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardConfig {
    /// Frequency of the root key in Hz.
    pub base_frequency: f64,
    pub rows: usize,
    pub columns: usize,
    /// Key that sounds `base_frequency`. Clamped into the keyboard by
    /// [`KeyboardConfig::clamped_root`].
    pub root_key: usize,
    /// Stored as its descriptor, e.g. `"19ed2"`.
    #[serde(with = "crate::tuning::descriptor")]
    pub tuning: Tuning,
    /// Optional step remap; steps outside it are silent keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<i64>>,
    /// Names cycled across steps from the root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note_names: Vec<String>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        KeyboardConfig {
            base_frequency: 440.0,
            rows: 4,
            columns: 12,
            root_key: 0,
            tuning: Tuning::default(),
            mapping: None,
            note_names: Vec::new(),
        }
    }
}

impl KeyboardConfig {
    /// `rows * columns`, capped at [`MAX_KEYS`]. Keys past the cap are never
    /// built.
    pub fn key_count(&self) -> usize {
        self.rows.saturating_mul(self.columns).min(MAX_KEYS)
    }

    /// Root key clamped into `[0, key_count)`.
    pub fn clamped_root(&self) -> usize {
        self.root_key.min(self.key_count().saturating_sub(1))
    }

    pub fn mapper(&self) -> FrequencyMapper<'_> {
        FrequencyMapper::new(&self.tuning, self.base_frequency, self.clamped_root())
            .with_mapping(self.mapping.as_deref())
            .with_note_names(&self.note_names)
    }
}

// ── Frequency Table ─────────────────────────────────────────

/// Resolved pitch and label of every key, in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyTable {
    keys: Vec<KeyInfo>,
    columns: usize,
    root_key: usize,
}

impl FrequencyTable {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KeyInfo> {
        self.keys.get(index)
    }

    pub fn keys(&self) -> &[KeyInfo] {
        &self.keys
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn root_key(&self) -> usize {
        self.root_key
    }

    /// Keys grouped by keyboard row.
    pub fn rows(&self) -> impl Iterator<Item = &[KeyInfo]> {
        self.keys.chunks(self.columns.max(1))
    }

    /// Frequency of every key, `None` for silent keys.
    pub fn frequencies(&self) -> Vec<Option<f64>> {
        self.keys.iter().map(|k| k.frequency).collect()
    }
}

/// Compute the whole frequency table for `config`.
pub fn resolve(config: &KeyboardConfig) -> FrequencyTable {
    let mapper = config.mapper();
    let keys: Vec<KeyInfo> = (0..config.key_count()).map(|i| mapper.key_info(i)).collect();
    let silent = keys.iter().filter(|k| k.is_silent()).count();

    log::debug!(
        "resolved {}x{} keyboard in {} (root {}, {} silent keys)",
        config.rows,
        config.columns,
        config.tuning,
        config.clamped_root(),
        silent
    );

    FrequencyTable {
        keys,
        columns: config.columns,
        root_key: config.clamped_root(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_caps_oversized_keyboard() {
        let config = KeyboardConfig {
            rows: 1_000_000_000,
            columns: 1_000_000_000,
            ..KeyboardConfig::default()
        };
        assert_eq!(config.key_count(), MAX_KEYS);
        let table = resolve(&config);
        assert_eq!(table.len(), MAX_KEYS);
        assert_eq!(table.root_key(), 0);

        let huge = KeyboardConfig {
            rows: usize::MAX,
            columns: usize::MAX,
            root_key: usize::MAX,
            ..KeyboardConfig::default()
        };
        assert_eq!(huge.clamped_root(), MAX_KEYS - 1);
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_default_keyboard() {
        let table = resolve(&KeyboardConfig::default());
        assert_eq!(table.len(), 48);
        assert_eq!(table.rows().count(), 4);

        let root = table.get(0).unwrap();
        assert_eq!(root.frequency, Some(440.0));
        assert_eq!(root.cents, Some(0));
        assert_eq!(root.name, "Key 0");

        let octave = table.get(12).unwrap();
        assert!((octave.frequency.unwrap() - 880.0).abs() < 1e-9);
        assert_eq!(octave.cents, Some(1200));
    }

    #[test]
    fn test_resolve_root_in_middle() {
        let config = KeyboardConfig {
            rows: 2,
            columns: 5,
            root_key: 4,
            note_names: names(&["Do", "Re", "Mi"]),
            ..KeyboardConfig::default()
        };
        let table = resolve(&config);

        assert_eq!(table.root_key(), 4);
        let steps: Vec<i64> = table.keys().iter().map(|k| k.step).collect();
        assert_eq!(steps, (-4..6).collect::<Vec<_>>());
        assert_eq!(table.get(4).unwrap().name, "Do");
        assert_eq!(table.get(3).unwrap().name, "Mi");
        assert_eq!(table.get(3).unwrap().cents, Some(-100));
    }

    #[test]
    fn test_root_clamped_into_keyboard() {
        let config = KeyboardConfig {
            rows: 1,
            columns: 3,
            root_key: 99,
            ..KeyboardConfig::default()
        };
        let table = resolve(&config);
        assert_eq!(table.root_key(), 2);
        assert_eq!(table.get(2).unwrap().cents, Some(0));
    }

    #[test]
    fn test_resolve_with_mapping() {
        let config = KeyboardConfig {
            rows: 1,
            columns: 5,
            mapping: Some(vec![0, 2, 4]),
            ..KeyboardConfig::default()
        };
        let table = resolve(&config);
        let cents: Vec<Option<i64>> = table.keys().iter().map(|k| k.cents).collect();
        assert_eq!(cents, vec![Some(0), Some(200), Some(400), None, None]);
        assert_eq!(table.frequencies()[3], None);
    }

    #[test]
    fn test_resolve_just_intonation() {
        let config = KeyboardConfig {
            base_frequency: 200.0,
            rows: 1,
            columns: 8,
            tuning: Tuning::z_limit(5).unwrap(),
            ..KeyboardConfig::default()
        };
        let table = resolve(&config);
        let cents: Vec<i64> = table.keys().iter().map(|k| k.cents.unwrap()).collect();
        assert_eq!(cents, vec![0, 316, 386, 498, 702, 814, 884, 0]);
    }

    #[test]
    fn test_empty_keyboard() {
        let config = KeyboardConfig {
            rows: 0,
            ..KeyboardConfig::default()
        };
        let table = resolve(&config);
        assert!(table.is_empty());
        assert_eq!(table.rows().count(), 0);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let config = KeyboardConfig {
            tuning: "19ed2".parse().unwrap(),
            ..KeyboardConfig::default()
        };
        assert_eq!(resolve(&config), resolve(&config));
    }

    #[test]
    fn test_config_json_uses_descriptor() {
        let config = KeyboardConfig {
            tuning: Tuning::z_limit(7).unwrap(),
            note_names: names(&["A"]),
            ..KeyboardConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["tuning"], "7-limit");
        assert_eq!(json["baseFrequency"], 440.0);
        assert!(json.get("mapping").is_none());

        let back: KeyboardConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_json_rejects_bad_descriptor() {
        let json = r#"{"baseFrequency": 440, "rows": 1, "columns": 1, "rootKey": 0, "tuning": "4-limit"}"#;
        assert!(serde_json::from_str::<KeyboardConfig>(json).is_err());
    }
}
