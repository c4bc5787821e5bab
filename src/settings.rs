//! Game settings and tuning
//!
//! Persisted as JSON through a [`PersistenceStore`], separately from records.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::persistence::PersistenceStore;
use crate::sim::InputKind;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particles emitted per enemy explosion
    pub fn explosion_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 16,
            QualityPreset::High => 32,
        }
    }

    /// Upper bound on live particles
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => MAX_PARTICLES,
            QualityPreset::High => MAX_PARTICLES * 4,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on kills and death
    pub screen_shake: bool,
    /// Explosion particles
    pub particles: bool,
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    // === Timing ===
    /// Simulation units per wall-clock millisecond at normal speed
    pub time_scale: f32,
    pub normal_speed: f32,
    /// Speed during the lull after death
    pub slow_motion_speed: f32,

    // === Gameplay ===
    /// Telegraph time before an enemy goes live
    pub warning_duration: f32,
    pub mouse_activation_radius: f32,
    pub touch_activation_radius: f32,
    pub player_damping_before_start: f32,
    pub player_damping_after_start: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            particles: true,
            reduced_motion: false,

            time_scale: TIME_SCALE,
            normal_speed: NORMAL_SPEED,
            slow_motion_speed: SLOW_MOTION_SPEED,

            warning_duration: WARNING_DURATION,
            mouse_activation_radius: MOUSE_ACTIVATION_RADIUS,
            touch_activation_radius: TOUCH_ACTIVATION_RADIUS,
            player_damping_before_start: PLAYER_DAMPING_BEFORE_START,
            player_damping_after_start: PLAYER_DAMPING_AFTER_START,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "tether_settings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Particles per explosion (0 when particles are off)
    pub fn explosion_particles(&self) -> usize {
        if self.particles {
            self.quality.explosion_particles()
        } else {
            0
        }
    }

    pub fn max_particles(&self) -> usize {
        if self.particles {
            self.quality.max_particles()
        } else {
            0
        }
    }

    /// How close the pointer must come to pick up the tether
    pub fn activation_radius(&self, kind: InputKind) -> f32 {
        match kind {
            InputKind::Mouse => self.mouse_activation_radius,
            InputKind::Touch => self.touch_activation_radius,
        }
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(|source| SimError::Decode {
            what: "settings",
            source,
        })
    }

    pub fn to_json(&self) -> String {
        // Plain data with no maps keyed by non-strings; serialisation cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Load settings, falling back to defaults if missing or corrupt
    pub fn load(store: &dyn PersistenceStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Some(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring stored settings: {err}");
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn PersistenceStore) {
        store.set(Self::STORAGE_KEY, self.to_json());
        log::info!("Settings saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"quality":"High","time_scale":0.08}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.time_scale, 0.08);
        assert_eq!(settings.warning_duration, WARNING_DURATION);
    }

    #[test]
    fn test_bad_json_is_a_decode_error() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, SimError::Decode { what: "settings", .. }));
    }

    #[test]
    fn test_store_round_trip_and_corrupt_fallback() {
        let mut store = MemoryStore::default();
        assert_eq!(Settings::load(&store), Settings::default());

        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.reduced_motion = true;
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);

        store.set(Settings::STORAGE_KEY, "garbage".to_string());
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_effective_flags() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());

        settings.particles = false;
        assert_eq!(settings.explosion_particles(), 0);
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }
}
