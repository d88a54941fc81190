use crate::{
    core::Rgba8Premul,
    error::{SpotlightError, SpotlightResult},
};

pub const DEFAULT_BLUR_RADIUS: u32 = 8;
pub const DEFAULT_BLUR_DOWNSCALE_FACTOR: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub radius: u32,
    pub downscale_factor: f64,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLUR_RADIUS,
            downscale_factor: DEFAULT_BLUR_DOWNSCALE_FACTOR,
        }
    }
}

impl BlurConfig {
    pub fn validate(&self) -> SpotlightResult<()> {
        if self.radius > 256 {
            return Err(SpotlightError::validation("blur radius must be <= 256"));
        }
        if !self.downscale_factor.is_finite() || self.downscale_factor < 1.0 {
            return Err(SpotlightError::validation(
                "blur downscale_factor must be finite and >= 1",
            ));
        }
        Ok(())
    }
}

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    pub background_color: Rgba8Premul,
    /// Run the blur pipeline on attach and composite its result behind the
    /// background paint.
    pub blur_background: bool,
    pub blur: BlurConfig,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            background_color: Rgba8Premul::from_straight_rgba(0, 0, 0, 230),
            blur_background: false,
            blur: BlurConfig::default(),
        }
    }
}

impl SpotlightConfig {
    pub fn from_json(json: &str) -> SpotlightResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SpotlightError::serde(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SpotlightResult<()> {
        self.blur.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SpotlightConfig::default().validate().unwrap();
    }

    #[test]
    fn from_json_accepts_partial_documents() {
        let config = SpotlightConfig::from_json(r#"{ "blur_background": true }"#).unwrap();
        assert!(config.blur_background);
        assert_eq!(config.blur.radius, DEFAULT_BLUR_RADIUS);
    }

    #[test]
    fn from_json_rejects_bad_downscale() {
        let err = SpotlightConfig::from_json(r#"{ "blur": { "downscale_factor": 0.5 } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn json_roundtrip() {
        let config = SpotlightConfig::default();
        let s = serde_json::to_string(&config).unwrap();
        let de = SpotlightConfig::from_json(&s).unwrap();
        assert_eq!(de, config);
    }
}
