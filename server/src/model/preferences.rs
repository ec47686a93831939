use serde::{Deserialize, Serialize};

/// Per-user ranking input, stored as the `preferences` jsonb column on `users`
/// (SPEC_FULL §3, §9 "dynamic JSON blobs for ... user preferences").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub learning_goals: Vec<String>,
    #[serde(default)]
    pub feature_weight_overrides: Option<FeatureWeightOverrides>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeightOverrides {
    pub sender: Option<f64>,
    pub thread: Option<f64>,
    pub freshness: Option<f64>,
    pub topic: Option<f64>,
    pub noise_penalty: Option<f64>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            learning_goals: Vec::new(),
            feature_weight_overrides: None,
            extra: serde_json::Map::new(),
        }
    }
}
