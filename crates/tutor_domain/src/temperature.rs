use serde::{Deserialize, Serialize};

/// Sampling temperature, valid between 0 and 2. The tutor runs cool
/// (0.3) to favor determinism over creativity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Temperature(f32);

impl Default for Temperature {
    /// The protocol's low-temperature setting
    fn default() -> Self {
        Self(0.3)
    }
}

impl Temperature {
    pub fn new(value: f32) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (0.0..=2.0).contains(&value),
            "temperature must be between 0.0 and 2.0, got {value}"
        );
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Temperature::new(value).map_err(serde::de::Error::custom)
    }
}
