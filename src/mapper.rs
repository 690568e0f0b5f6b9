//! Frequency mapping: turns a key's distance from the root into a pitch.
//!
//! Equal divisions compound across periods (`interval^(step / divisions)`).
//! Just intonation does not: a step past either end of the ratio table
//! wraps around and reuses the same octave's ratio, with no factor of two
//! per wrap and no inversion for negative steps.

use serde::Serialize;

use crate::tuning::Tuning;

/// Frequency of the key `step` positions away from the root.
pub fn calculate_frequency(step: i64, tuning: &Tuning, base_freq: f64) -> f64 {
    match tuning {
        Tuning::EqualDivision { divisions, interval } => {
            let divisions = i64::from((*divisions).max(1));
            // interval^(step/d) split as interval^periods * interval^(rem/d).
            let periods = step.div_euclid(divisions).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
            let rem = step.rem_euclid(divisions);
            base_freq * interval.powi(periods as i32) * interval.powf(rem as f64 / divisions as f64)
        }
        Tuning::JustIntonation { ratios, .. } => {
            let len = ratios.len().max(1) as i64;
            let idx = step.rem_euclid(len) as usize;
            base_freq * ratios.get(idx).map_or(1.0, |r| r.value)
        }
    }
}

/// Like [`calculate_frequency`], but first remaps `step` through `mapping`.
/// `None` means the key has no tone: the step falls outside the mapping.
pub fn calculate_mapped_frequency(
    step: i64,
    tuning: &Tuning,
    base_freq: f64,
    mapping: Option<&[i64]>,
) -> Option<f64> {
    let step = match mapping {
        Some(table) => *usize::try_from(step).ok().and_then(|i| table.get(i))?,
        None => step,
    };
    Some(calculate_frequency(step, tuning, base_freq))
}

/// Distance from `reference` to `freq` in whole cents.
pub fn calculate_cents(freq: f64, reference: f64) -> i64 {
    (1200.0 * (freq / reference).log2()).round() as i64
}

/// Display name of the key `step` positions from the root. Names repeat in
/// both directions; an empty table yields `"Key {step}"`.
pub fn get_note_name<S: AsRef<str>>(step: i64, names: &[S]) -> String {
    if names.is_empty() {
        return format!("Key {step}");
    }
    let idx = step.rem_euclid(names.len() as i64) as usize;
    names[idx].as_ref().to_string()
}

/// Everything the UI needs for one key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    /// Row-major key position.
    pub index: usize,
    /// Signed distance from the root key.
    pub step: i64,
    /// `None` for a silent key.
    pub frequency: Option<f64>,
    /// Cents from the root key's pitch; `None` for a silent key.
    pub cents: Option<i64>,
    pub name: String,
}

impl KeyInfo {
    pub fn is_silent(&self) -> bool {
        self.frequency.is_none()
    }

    /// Label shown under the name, e.g. `"-386¢"`. Empty for silent keys.
    pub fn cents_label(&self) -> String {
        self.cents.map(|c| format!("{c}¢")).unwrap_or_default()
    }
}

/// Per-key queries against one tuning, base frequency and root key.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyMapper<'a> {
    tuning: &'a Tuning,
    base_frequency: f64,
    root_key: usize,
    mapping: Option<&'a [i64]>,
    note_names: &'a [String],
}

impl<'a> FrequencyMapper<'a> {
    pub fn new(tuning: &'a Tuning, base_frequency: f64, root_key: usize) -> Self {
        FrequencyMapper {
            tuning,
            base_frequency,
            root_key,
            mapping: None,
            note_names: &[],
        }
    }

    pub fn with_mapping(mut self, mapping: Option<&'a [i64]>) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_note_names(mut self, note_names: &'a [String]) -> Self {
        self.note_names = note_names;
        self
    }

    pub fn step_from_root(&self, key: usize) -> i64 {
        key as i64 - self.root_key as i64
    }

    pub fn frequency(&self, key: usize) -> Option<f64> {
        calculate_mapped_frequency(self.step_from_root(key), self.tuning, self.base_frequency, self.mapping)
    }

    /// Pitch that reads as `0¢`: the root key's own frequency, or the base
    /// frequency when the root key is silent.
    pub fn reference_frequency(&self) -> f64 {
        self.frequency(self.root_key).unwrap_or(self.base_frequency)
    }

    pub fn cents(&self, key: usize) -> Option<i64> {
        let reference = self.reference_frequency();
        self.frequency(key).map(|f| calculate_cents(f, reference))
    }

    pub fn name(&self, key: usize) -> String {
        get_note_name(self.step_from_root(key), self.note_names)
    }

    pub fn key_info(&self, key: usize) -> KeyInfo {
        let reference = self.reference_frequency();
        let frequency = self.frequency(key);
        KeyInfo {
            index: key,
            step: self.step_from_root(key),
            frequency,
            cents: frequency.map(|f| calculate_cents(f, reference)),
            name: self.name(key),
        }
    }
}
