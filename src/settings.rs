//! Settings: the keyboard form as the user typed it.
//!
//! Every field arrives as text. [`KeyboardConfig::from_raw`] validates it in
//! one go and either yields a complete configuration or an error; nothing is
//! coerced into `NaN` or a silently different tuning.

use serde::{Deserialize, Serialize};

use crate::error::{InputError, XenboardError};
use crate::keyboard::{KeyboardConfig, MAX_KEYS};
use crate::parse_tuning;

/// Raw form fields, named as in the browser UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    pub base_freq: String,
    pub rows: String,
    pub cols: String,
    pub root_note: String,
    pub tuning: String,
    /// Comma/whitespace-separated integers; blank for no mapping.
    #[serde(default)]
    pub mapping: String,
    /// Comma/whitespace-separated names; blank for `"Key n"` labels.
    #[serde(default)]
    pub note_names: String,
}

impl RawSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Split on runs of commas and whitespace, dropping empty pieces.
pub fn split_list(text: &str) -> Vec<&str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn parse_positive_f64(field: &'static str, text: &str) -> Result<f64, InputError> {
    let value: f64 = text.trim().parse().map_err(|_| InputError::NotANumber {
        field,
        text: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(InputError::NotANumber {
            field,
            text: text.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(InputError::NonPositive { field });
    }
    Ok(value)
}

fn parse_positive_count(field: &'static str, text: &str) -> Result<usize, InputError> {
    let value: usize = text.trim().parse().map_err(|_| InputError::NotANumber {
        field,
        text: text.to_string(),
    })?;
    if value == 0 {
        return Err(InputError::NonPositive { field });
    }
    Ok(value)
}

fn parse_mapping(text: &str) -> Result<Option<Vec<i64>>, InputError> {
    let pieces = split_list(text);
    if pieces.is_empty() {
        return Ok(None);
    }
    pieces
        .into_iter()
        .map(|piece| {
            piece.parse().map_err(|_| InputError::InvalidMappingEntry {
                text: piece.to_string(),
            })
        })
        .collect::<Result<Vec<i64>, _>>()
        .map(Some)
}

impl KeyboardConfig {
    /// Validate raw form input into a configuration.
    pub fn from_raw(raw: &RawSettings) -> Result<Self, XenboardError> {
        let base_frequency = parse_positive_f64("Base frequency", &raw.base_freq)?;
        let rows = parse_positive_count("Rows", &raw.rows)?;
        let columns = parse_positive_count("Columns", &raw.cols)?;
        let key_count = rows
            .checked_mul(columns)
            .filter(|&count| count <= MAX_KEYS)
            .ok_or(InputError::TooManyKeys {
                rows,
                columns,
                max: MAX_KEYS,
            })?;
        let root: i64 = raw.root_note.trim().parse().map_err(|_| InputError::NotANumber {
            field: "Root note",
            text: raw.root_note.clone(),
        })?;
        let tuning = parse_tuning(&raw.tuning)?;
        let mapping = parse_mapping(&raw.mapping)?;
        let note_names = split_list(&raw.note_names).into_iter().map(String::from).collect();

        let root_key = usize::try_from(root.max(0)).unwrap_or(usize::MAX).min(key_count - 1);

        Ok(KeyboardConfig {
            base_frequency,
            rows,
            columns,
            root_key,
            tuning,
            mapping,
            note_names,
        })
    }
}
