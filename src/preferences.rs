// Visitor motion preferences, stored by the page as JSON, and the backdrop
// choices that follow from them.

use crate::field::FieldConfig;
use crate::orbit::OrbitConfig;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotionPreferences {
    pub reduced_motion: bool,
    pub lightweight_animations: bool,
    pub disable_particles: bool,
}

/// What runs behind the intro card.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IntroBackdrop {
    Particles(FieldConfig),
    Orbit(OrbitConfig),
    Nothing,
}

impl MotionPreferences {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[cfg(test)]
    pub fn to_json(&self) -> String {
        // A struct of bools always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Multiplier on simulated time. Reduced motion freezes every backdrop
    /// on its first frame.
    pub fn time_scale(&self) -> f64 {
        if self.reduced_motion {
            0.0
        } else {
            1.0
        }
    }

    pub fn intro_backdrop(&self) -> IntroBackdrop {
        if self.disable_particles {
            IntroBackdrop::Nothing
        } else if self.lightweight_animations {
            IntroBackdrop::Orbit(OrbitConfig::lite(30, 0.6))
        } else {
            IntroBackdrop::Particles(FieldConfig::intro())
        }
    }

    /// Page background field, if particles are allowed at all.
    pub fn background_field(&self) -> Option<FieldConfig> {
        if self.disable_particles {
            None
        } else if self.lightweight_animations {
            Some(FieldConfig::background(30, 80.0, 0.2, 0.4))
        } else {
            Some(FieldConfig::background(50, 100.0, 0.3, 0.4))
        }
    }

    /// How many floating decorations to show next to the background field.
    pub fn floating_count(&self) -> Option<usize> {
        if self.disable_particles {
            None
        } else if self.lightweight_animations {
            Some(8)
        } else {
            Some(12)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_page_settings() {
        let json = r#"{"reducedMotion":true,"lightweightAnimations":false,"disableParticles":true}"#;
        let prefs = MotionPreferences::from_json(json).unwrap();
        assert!(prefs.reduced_motion);
        assert!(!prefs.lightweight_animations);
        assert!(prefs.disable_particles);
    }

    #[test]
    fn test_missing_fields_default_to_off() {
        let prefs = MotionPreferences::from_json(r#"{"lightweightAnimations":true}"#).unwrap();
        assert_eq!(
            prefs,
            MotionPreferences {
                lightweight_animations: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(MotionPreferences::from_json("not json").is_err());
        assert!(MotionPreferences::from_json(r#"{"reducedMotion":"yes"}"#).is_err());
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let prefs = MotionPreferences {
            reduced_motion: true,
            ..Default::default()
        };
        let json = prefs.to_json();
        assert!(json.contains("\"reducedMotion\":true"));
        assert_eq!(MotionPreferences::from_json(&json).unwrap(), prefs);
    }

    #[test]
    fn test_reduced_motion_freezes_time() {
        assert_eq!(MotionPreferences::default().time_scale(), 1.0);
        let prefs = MotionPreferences {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(prefs.time_scale(), 0.0);
    }

    #[test]
    fn test_intro_backdrop_selection() {
        assert_eq!(
            MotionPreferences::default().intro_backdrop(),
            IntroBackdrop::Particles(FieldConfig::intro())
        );
        let light = MotionPreferences {
            lightweight_animations: true,
            ..Default::default()
        };
        assert_eq!(light.intro_backdrop(), IntroBackdrop::Orbit(OrbitConfig::lite(30, 0.6)));
        let off = MotionPreferences {
            lightweight_animations: true,
            disable_particles: true,
            ..Default::default()
        };
        assert_eq!(off.intro_backdrop(), IntroBackdrop::Nothing);
    }

    #[test]
    fn test_lightweight_background_is_smaller() {
        let light = MotionPreferences {
            lightweight_animations: true,
            ..Default::default()
        };
        let full = MotionPreferences::default().background_field().unwrap();
        let lite = light.background_field().unwrap();
        assert_eq!(full.count, 50);
        assert_eq!(lite.count, 30);
        assert!(lite.connection_distance < full.connection_distance);
        assert_eq!(light.floating_count(), Some(8));
    }
}
