// Copyright (c) 2024 Mike Tsao

//! Engine-wide configuration. Intended to be serialized.

use crate::{
    feedbacks::FeedbackKindTag,
    orchestration::{KindRegistry, Scheduler},
    prelude::*,
};
use anyhow::{anyhow, Result};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Contains persistent engine settings: the base time scale, how long a
/// single frame is allowed to be, and which kinds of feedback start out
/// disabled.
#[derive(Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineSettings {
    #[derivative(Default(value = "1.0"))]
    time_scale: f64,
    #[derivative(Default(value = "Some(Seconds(0.25))"))]
    max_delta: Option<Seconds>,
    disabled_kinds: Vec<FeedbackKindTag>,

    #[serde(skip)]
    e: EngineSettingsEphemerals,
}
#[derive(Debug, Default)]
pub struct EngineSettingsEphemerals {
    has_been_saved: bool,
}
impl HasSettings for EngineSettings {
    fn has_been_saved(&self) -> bool {
        self.e.has_been_saved
    }

    fn needs_save(&mut self) {
        self.e.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.e.has_been_saved = true;
    }
}
impl EngineSettings {
    /// Parses settings from JSON. Missing fields take their defaults. The
    /// result is marked clean.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        if settings.time_scale < 0.0 || !settings.time_scale.is_finite() {
            return Err(anyhow!("Invalid time scale {}", settings.time_scale));
        }
        if let Some(max_delta) = settings.max_delta {
            if max_delta.is_empty() {
                return Err(anyhow!("Max delta must be positive, got {}", max_delta.0));
            }
        }
        settings.mark_clean();
        Ok(settings)
    }

    /// Serializes the settings and marks them clean.
    pub fn to_json(&mut self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        self.mark_clean();
        Ok(json)
    }

    /// The global time scale when no feedback overrides it.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        if time_scale != self.time_scale {
            self.time_scale = time_scale;
            self.needs_save();
        }
    }

    /// Longest frame the scheduler will accept. Longer ones are clamped.
    pub fn max_delta(&self) -> Option<Seconds> {
        self.max_delta
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_max_delta(&mut self, max_delta: Option<Seconds>) {
        if max_delta != self.max_delta {
            self.max_delta = max_delta;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn disabled_kinds(&self) -> &[FeedbackKindTag] {
        &self.disabled_kinds
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_kind_enabled(&mut self, tag: FeedbackKindTag, enabled: bool) {
        let is_disabled = self.disabled_kinds.contains(&tag);
        if enabled && is_disabled {
            self.disabled_kinds.retain(|t| *t != tag);
            self.needs_save();
        } else if !enabled && !is_disabled {
            self.disabled_kinds.push(tag);
            self.needs_save();
        }
    }

    /// A [KindRegistry] with this configuration's disabled kinds.
    pub fn registry(&self) -> KindRegistry {
        KindRegistry::new_with(self.disabled_kinds.iter().copied())
    }

    /// A [Scheduler] configured from these settings.
    pub fn scheduler(&self) -> Scheduler {
        let scheduler = Scheduler::new_with(self.time_scale, self.max_delta);
        for tag in self.disabled_kinds.iter() {
            scheduler.disable(*tag);
        }
        scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let s = EngineSettings::from_json("{}").unwrap();
        assert_eq!(s.time_scale(), 1.0);
        assert_eq!(s.max_delta(), Some(Seconds(0.25)));
        assert!(s.disabled_kinds().is_empty());
        assert!(s.has_been_saved());
    }

    #[test]
    fn builds_configured_scheduler() {
        let s = EngineSettings::from_json(
            r#"{"time-scale": 0.5, "max-delta": null, "disabled-kinds": ["time-scale"]}"#,
        )
        .unwrap();
        assert_eq!(s.max_delta(), None);
        let scheduler = s.scheduler();
        assert_eq!(scheduler.time_scale(), 0.5);
        assert!(!scheduler.is_authorized(FeedbackKindTag::TimeScale));
        assert!(scheduler.is_authorized(FeedbackKindTag::Float));
        assert!(!s.registry().is_authorized(FeedbackKindTag::TimeScale));
    }

    #[test]
    fn rejects_nonsense() {
        assert!(EngineSettings::from_json(r#"{"time-scale": -1.0}"#).is_err());
        assert!(EngineSettings::from_json(r#"{"max-delta": 0.0}"#).is_err());
        assert!(EngineSettings::from_json(r#"{"disabled-kinds": ["juggling"]}"#).is_err());
        assert!(EngineSettings::from_json("not json").is_err());
    }

    #[test]
    fn changes_mark_dirty() {
        let mut s = EngineSettings::default();
        s.mark_clean();
        s.set_time_scale(1.0);
        assert!(s.has_been_saved(), "no change, still clean");
        s.set_kind_enabled(FeedbackKindTag::Spring, false);
        assert!(!s.has_been_saved());
        let json = s.to_json().unwrap();
        assert!(s.has_been_saved());
        let restored = EngineSettings::from_json(&json).unwrap();
        assert_eq!(restored.disabled_kinds(), &[FeedbackKindTag::Spring]);
        s.set_kind_enabled(FeedbackKindTag::Spring, true);
        assert!(s.disabled_kinds().is_empty());
    }
}
