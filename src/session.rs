//! Keyboard session: the live keyboard behind the UI.
//!
//! Holds the current configuration and frequency table, and forwards key
//! presses to a [`ToneSink`] (the host's oscillators). The table is shared
//! as an `Arc` snapshot and replaced whole on every apply, so press handlers
//! only ever see a complete table.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::XenboardError;
use crate::keyboard::{FrequencyTable, KeyboardConfig, resolve};
use crate::settings::RawSettings;

/// Starts and stops one tone per key. Implemented by the playback host.
pub trait ToneSink {
    fn start_tone(&mut self, key: usize, frequency: f64);
    fn stop_tone(&mut self, key: usize);
}

pub struct KeyboardSession<S: ToneSink> {
    config: KeyboardConfig,
    table: Arc<FrequencyTable>,
    /// Keys with a running tone.
    held: BTreeSet<usize>,
    sink: S,
}

impl<S: ToneSink> KeyboardSession<S> {
    pub fn new(config: KeyboardConfig, sink: S) -> Self {
        let table = Arc::new(resolve(&config));
        KeyboardSession {
            config,
            table,
            held: BTreeSet::new(),
            sink,
        }
    }

    /// Replace the keyboard. The new table is fully built before anything is
    /// torn down; sounding keys are stopped since the old keys go away.
    pub fn apply(&mut self, config: KeyboardConfig) {
        let table = Arc::new(resolve(&config));
        self.release_all();
        self.table = table;
        self.config = config;
    }

    /// Validate and apply raw form input. On error the current keyboard stays
    /// in effect.
    pub fn apply_raw(&mut self, raw: &RawSettings) -> Result<(), XenboardError> {
        match KeyboardConfig::from_raw(raw) {
            Ok(config) => {
                self.apply(config);
                Ok(())
            }
            Err(e) => {
                log::warn!("keeping current keyboard, settings rejected: {e}");
                Err(e)
            }
        }
    }

    /// Start the key's tone. Returns `false` if nothing started: the key is
    /// outside the keyboard, silent, or already sounding.
    pub fn press(&mut self, key: usize) -> bool {
        let Some(frequency) = self.table.get(key).and_then(|k| k.frequency) else {
            return false;
        };
        if !self.held.insert(key) {
            return false;
        }
        self.sink.start_tone(key, frequency);
        true
    }

    /// Stop the key's tone if it is sounding.
    pub fn release(&mut self, key: usize) -> bool {
        if !self.held.remove(&key) {
            return false;
        }
        self.sink.stop_tone(key);
        true
    }

    pub fn release_all(&mut self) {
        for key in std::mem::take(&mut self.held) {
            self.sink.stop_tone(key);
        }
    }

    pub fn is_held(&self, key: usize) -> bool {
        self.held.contains(&key)
    }

    pub fn held_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.held.iter().copied()
    }

    pub fn table(&self) -> Arc<FrequencyTable> {
        Arc::clone(&self.table)
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[derive(Debug, Clone, PartialEq)]
    enum ToneEvent {
        Start(usize, f64),
        Stop(usize),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<ToneEvent>,
    }

    impl ToneSink for RecordingSink {
        fn start_tone(&mut self, key: usize, frequency: f64) {
            self.events.push(ToneEvent::Start(key, frequency));
        }

        fn stop_tone(&mut self, key: usize) {
            self.events.push(ToneEvent::Stop(key));
        }
    }

    fn small_keyboard() -> KeyboardConfig {
        KeyboardConfig {
            rows: 1,
            columns: 4,
            ..KeyboardConfig::default()
        }
    }

    fn settings(tuning: &str) -> RawSettings {
        RawSettings {
            base_freq: "300".into(),
            rows: "2".into(),
            cols: "3".into(),
            root_note: "0".into(),
            tuning: tuning.into(),
            ..RawSettings::default()
        }
    }

    #[test]
    fn test_press_and_release() {
        let mut session = KeyboardSession::new(small_keyboard(), RecordingSink::default());
        assert!(session.press(0));
        assert!(session.is_held(0));
        assert!(session.release(0));
        assert!(!session.is_held(0));
        assert_eq!(
            session.sink().events,
            vec![ToneEvent::Start(0, 440.0), ToneEvent::Stop(0)]
        );
    }

    #[test]
    fn test_repeated_press_starts_one_tone() {
        let mut session = KeyboardSession::new(small_keyboard(), RecordingSink::default());
        assert!(session.press(1));
        assert!(!session.press(1));
        assert!(session.release(1));
        assert!(!session.release(1));
        assert_eq!(session.sink().events.len(), 2);
    }

    #[test]
    fn test_silent_and_missing_keys_do_nothing() {
        let config = KeyboardConfig {
            mapping: Some(vec![0, 2]),
            ..small_keyboard()
        };
        let mut session = KeyboardSession::new(config, RecordingSink::default());
        assert!(!session.press(3));
        assert!(!session.press(99));
        assert!(session.sink().events.is_empty());
    }

    #[test]
    fn test_apply_swaps_table_and_stops_tones() {
        let mut session = KeyboardSession::new(small_keyboard(), RecordingSink::default());
        let old_table = session.table();
        session.press(0);
        session.press(2);

        session.apply(KeyboardConfig {
            tuning: Tuning::z_limit(3).unwrap(),
            ..small_keyboard()
        });

        assert_eq!(session.held_keys().count(), 0);
        assert!(session.sink().events.contains(&ToneEvent::Stop(0)));
        assert!(session.sink().events.contains(&ToneEvent::Stop(2)));
        assert_eq!(session.config().tuning.to_string(), "3-limit");
        // Snapshots taken before the apply are unaffected.
        assert_eq!(old_table.get(3).unwrap().cents, Some(300));
        assert_eq!(session.table().get(3).unwrap().cents, Some(0));
    }

    #[test]
    fn test_apply_raw_keeps_old_keyboard_on_error() {
        let mut session = KeyboardSession::new(small_keyboard(), RecordingSink::default());
        session.press(1);

        assert!(session.apply_raw(&settings("foo")).is_err());
        assert_eq!(session.config(), &small_keyboard());
        assert_eq!(session.table().len(), 4);
        assert!(session.is_held(1));

        session.apply_raw(&settings("7-limit")).unwrap();
        assert_eq!(session.table().len(), 6);
        assert!(!session.is_held(1));
        assert_eq!(session.table().get(0).unwrap().frequency, Some(300.0));
    }
}
