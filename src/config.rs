//! Remote mascot configuration: the record shape, defaults, and field-wise merging.
//!
//! The backend stores one row keyed by [`CONFIG_ID`]:
//!
//! ```json
//! { "enabled": true, "settings": { "speed": 1.0, "dodgeDistance": 150, ... } }
//! ```
//!
//! Both the initial read and every push update are decoded as a [`ConfigPatch`]
//! (all fields optional). The initial read is merged onto [`MascotConfig::default`],
//! pushes onto the last known config, so absent fields never reset anything.

use serde::{Deserialize, Serialize};

use crate::error::MascotError;

/// Row identifier of the shared config record.
pub const CONFIG_ID: &str = "cupid_mascot";

/// Lower bound on the planner interval; anything tighter would just thrash.
pub const MIN_ACTION_INTERVAL_MS: f64 = 250.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MascotSettings {
    /// Movement speed multiplier; scales CSS transition durations.
    pub speed: f64,
    /// Pointer radius (px) inside which a dodge may trigger.
    pub dodge_distance: f64,
    /// Mascot box size in px.
    pub size: f64,
    /// How long a catch lasts. `0` keeps the mascot caught until reset.
    pub hide_time_ms: f64,
    pub float_animation: bool,
    /// Probability of dodging per qualifying proximity sample.
    pub evasiveness: f64,
    pub sound_enabled: bool,
    pub action_interval_ms: f64,
    /// 0 = fully opaque, 1 = invisible.
    pub transparency: f64,
    pub shadow_intensity: f64,
}

impl Default for MascotSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            dodge_distance: 150.0,
            size: 64.0,
            hide_time_ms: 8_000.0,
            float_animation: true,
            evasiveness: 0.7,
            sound_enabled: true,
            action_interval_ms: 5_000.0,
            transparency: 0.0,
            shadow_intensity: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MascotConfig {
    pub enabled: bool,
    pub settings: MascotSettings,
}

impl Default for MascotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: MascotSettings::default(),
        }
    }
}

/// Partial settings as they arrive over the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub speed: Option<f64>,
    pub dodge_distance: Option<f64>,
    pub size: Option<f64>,
    pub hide_time_ms: Option<f64>,
    pub float_animation: Option<bool>,
    pub evasiveness: Option<f64>,
    pub sound_enabled: Option<bool>,
    pub action_interval_ms: Option<f64>,
    pub transparency: Option<f64>,
    pub shadow_intensity: Option<f64>,
}

/// Partial config record. Unknown columns (`id`, timestamps, ...) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub enabled: Option<bool>,
    pub settings: Option<SettingsPatch>,
}

impl ConfigPatch {
    /// Decode a record or push payload. `null` decodes to an empty patch.
    pub fn from_json(payload: &str) -> Result<Self, MascotError> {
        let patch: Option<ConfigPatch> = serde_json::from_str(payload)?;
        Ok(patch.unwrap_or_default())
    }
}

impl MascotConfig {
    /// Build the config from the initial remote read. Any failure or empty
    /// result yields the defaults (fail-open).
    pub fn from_remote(payload: Option<&str>) -> Self {
        let mut config = MascotConfig::default();
        match payload.map(ConfigPatch::from_json) {
            Some(Ok(patch)) => config.apply(&patch),
            Some(Err(err)) => log::warn!("mascot config unreadable, using defaults: {err}"),
            None => log::info!("no mascot config record, using defaults"),
        }
        config
    }

    /// Merge the fields present in `patch`, then re-sanitize.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(s) = &patch.settings {
            let dst = &mut self.settings;
            merge(&mut dst.speed, s.speed);
            merge(&mut dst.dodge_distance, s.dodge_distance);
            merge(&mut dst.size, s.size);
            merge(&mut dst.hide_time_ms, s.hide_time_ms);
            merge(&mut dst.float_animation, s.float_animation);
            merge(&mut dst.evasiveness, s.evasiveness);
            merge(&mut dst.sound_enabled, s.sound_enabled);
            merge(&mut dst.action_interval_ms, s.action_interval_ms);
            merge(&mut dst.transparency, s.transparency);
            merge(&mut dst.shadow_intensity, s.shadow_intensity);
        }
        self.settings.sanitize();
    }

    /// Serialize in the remote record shape, for seeding or saving the row.
    pub fn to_record_json(&self) -> Result<String, MascotError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl MascotSettings {
    fn sanitize(&mut self) {
        let d = MascotSettings::default();
        self.speed = positive_or(self.speed, d.speed);
        self.size = positive_or(self.size, d.size);
        self.dodge_distance = finite_or(self.dodge_distance, d.dodge_distance).max(0.0);
        self.hide_time_ms = finite_or(self.hide_time_ms, d.hide_time_ms).max(0.0);
        self.action_interval_ms =
            finite_or(self.action_interval_ms, d.action_interval_ms).max(MIN_ACTION_INTERVAL_MS);
        self.evasiveness = unit(self.evasiveness, d.evasiveness);
        self.transparency = unit(self.transparency, d.transparency);
        self.shadow_intensity = unit(self.shadow_intensity, d.shadow_intensity);
    }
}

fn merge<T: Copy>(dst: &mut T, src: Option<T>) {
    if let Some(v) = src {
        *dst = v;
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

fn positive_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

fn unit(v: f64, fallback: f64) -> f64 {
    finite_or(v, fallback).clamp(0.0, 1.0)
}
