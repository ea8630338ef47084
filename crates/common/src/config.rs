//! Application and detector configuration.
//!
//! Every tunable of the concentration pipeline lives in [`DetectorConfig`].
//! Two weighting profiles exist in the field; they are exposed as
//! [`WeightingPreset`]s rather than folded into one constant set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AttentiveError, AttentiveResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Concentration pipeline settings.
    pub detector: DetectorConfig,

    /// Monitoring session defaults.
    pub session: SessionDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Named weighting/threshold profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightingPreset {
    /// 0.4/0.4/0.2 weights, 0.675 threshold, 15s dwell, every frame analyzed.
    #[default]
    Standard,
    /// 0.35/0.35/0.3 weights, 0.6 threshold, 10s dwell, every 2nd frame analyzed.
    Lightweight,
}

impl FromStr for WeightingPreset {
    type Err = AttentiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "lightweight" | "light" => Ok(Self::Lightweight),
            other => Err(AttentiveError::config(format!(
                "unknown preset '{other}' (expected standard|lightweight)"
            ))),
        }
    }
}

/// Settings for one concentration detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Number of face frames averaged into the baseline anchor position.
    pub calibration_frames: usize,

    /// Rolling window capacities, in analyzed frames.
    pub windows: WindowCapacities,

    /// Eye-aspect-ratio and blink-rate scoring.
    pub blink: BlinkConfig,

    /// Eyebrow and mouth geometry scoring.
    pub expression: ExpressionConfig,

    /// Deviation-from-baseline scoring.
    pub position: PositionConfig,

    /// Facing-the-camera decision.
    pub working: WorkingStatusConfig,

    /// Composite score weights.
    pub weights: AggregatorWeights,

    /// Level promotion rules.
    pub level: LevelConfig,

    /// Frame interval and skip factor used for time bookkeeping.
    pub timing: FrameTiming,
}

/// Rolling window capacities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowCapacities {
    pub blink: usize,
    pub position: usize,
    pub expression: usize,
    pub status: usize,
}

impl Default for WindowCapacities {
    fn default() -> Self {
        Self {
            blink: 180,
            position: 90,
            expression: 90,
            status: 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Average EAR below this marks the frame as a blink frame.
    pub ear_threshold: f64,
    /// Blink rate (per minute) that scores 1.0.
    pub target_rate_per_min: f64,
    /// Distance from the target rate at which the score reaches 0.
    pub tolerance: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.2,
            target_rate_per_min: 17.5,
            tolerance: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Resting vertical eyebrow position (normalized).
    pub eyebrow_target: f64,
    pub eyebrow_sensitivity: f64,
    /// Resting mouth-corner separation (normalized).
    pub mouth_target_width: f64,
    pub mouth_sensitivity: f64,
    /// Eyebrow share of the expression score; the mouth gets the rest.
    pub eyebrow_weight: f64,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            eyebrow_target: 0.35,
            eyebrow_sensitivity: 2.0,
            mouth_target_width: 0.4,
            mouth_sensitivity: 1.5,
            eyebrow_weight: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Score lost per unit of anchor deviation.
    pub sensitivity_gain: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            sensitivity_gain: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingStatusConfig {
    /// Minimum horizontal separation of the lateral anchors for WORKING.
    pub min_lateral_separation: f64,
}

impl Default for WorkingStatusConfig {
    fn default() -> Self {
        Self {
            min_lateral_separation: 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorWeights {
    pub position: f64,
    pub face: f64,
    pub stability: f64,
    /// Blink share of the face score; expression gets the rest.
    pub blink_share: f64,
}

impl Default for AggregatorWeights {
    fn default() -> Self {
        Self {
            position: 0.4,
            face: 0.4,
            stability: 0.2,
            blink_share: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Composite scores strictly above this count toward a deep run.
    pub promotion_threshold: f64,
    /// Continuous seconds above threshold before DEEP is credited.
    pub deep_dwell_secs: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            promotion_threshold: 0.675,
            deep_dwell_secs: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTiming {
    /// Interval between source frames, in seconds.
    pub frame_interval_secs: f64,
    /// Only every n-th source frame is analyzed.
    pub frame_skip: u32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::from_fps(30.0, 1)
    }
}

impl FrameTiming {
    pub fn from_fps(fps: f64, frame_skip: u32) -> Self {
        Self {
            frame_interval_secs: 1.0 / fps,
            frame_skip,
        }
    }

    /// Time credited to the tallies per analyzed frame.
    pub fn increment_secs(&self) -> f64 {
        self.frame_interval_secs * self.frame_skip.max(1) as f64
    }
}

impl DetectorConfig {
    /// Build the configuration for a named preset.
    pub fn preset(preset: WeightingPreset) -> Self {
        let standard = Self {
            calibration_frames: 60,
            windows: WindowCapacities::default(),
            blink: BlinkConfig::default(),
            expression: ExpressionConfig::default(),
            position: PositionConfig::default(),
            working: WorkingStatusConfig::default(),
            weights: AggregatorWeights::default(),
            level: LevelConfig::default(),
            timing: FrameTiming::default(),
        };

        match preset {
            WeightingPreset::Standard => standard,
            WeightingPreset::Lightweight => Self {
                calibration_frames: 30,
                windows: WindowCapacities {
                    blink: 60,
                    position: 30,
                    expression: 30,
                    status: 30,
                },
                working: WorkingStatusConfig {
                    min_lateral_separation: 0.1,
                },
                weights: AggregatorWeights {
                    position: 0.35,
                    face: 0.35,
                    stability: 0.3,
                    blink_share: 0.4,
                },
                level: LevelConfig {
                    promotion_threshold: 0.6,
                    deep_dwell_secs: 10.0,
                },
                timing: FrameTiming::from_fps(30.0, 2),
                ..standard
            },
        }
    }

    /// Check the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> AttentiveResult<()> {
        if self.calibration_frames == 0 {
            return Err(AttentiveError::config("calibration_frames must be at least 1"));
        }

        let w = &self.windows;
        for (name, capacity) in [
            ("blink", w.blink),
            ("position", w.position),
            ("expression", w.expression),
            ("status", w.status),
        ] {
            if capacity == 0 {
                return Err(AttentiveError::config(format!(
                    "{name} window capacity must be at least 1"
                )));
            }
        }

        let finite = [
            ("blink.ear_threshold", self.blink.ear_threshold),
            ("blink.target_rate_per_min", self.blink.target_rate_per_min),
            ("blink.tolerance", self.blink.tolerance),
            ("expression.eyebrow_target", self.expression.eyebrow_target),
            ("expression.eyebrow_sensitivity", self.expression.eyebrow_sensitivity),
            ("expression.mouth_target_width", self.expression.mouth_target_width),
            ("expression.mouth_sensitivity", self.expression.mouth_sensitivity),
            ("expression.eyebrow_weight", self.expression.eyebrow_weight),
            ("position.sensitivity_gain", self.position.sensitivity_gain),
            ("working.min_lateral_separation", self.working.min_lateral_separation),
            ("weights.position", self.weights.position),
            ("weights.face", self.weights.face),
            ("weights.stability", self.weights.stability),
            ("weights.blink_share", self.weights.blink_share),
            ("level.promotion_threshold", self.level.promotion_threshold),
            ("level.deep_dwell_secs", self.level.deep_dwell_secs),
            ("timing.frame_interval_secs", self.timing.frame_interval_secs),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(AttentiveError::config(format!(
                "{name} must be a finite number (got {value})"
            )));
        }

        let weights = &self.weights;
        if [weights.position, weights.face, weights.stability]
            .iter()
            .any(|w| *w < 0.0)
        {
            return Err(AttentiveError::config("aggregator weights must be non-negative"));
        }
        let sum = weights.position + weights.face + weights.stability;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AttentiveError::config(format!(
                "aggregator weights must sum to 1.0 (got {sum:.4})"
            )));
        }
        for (name, share) in [
            ("blink_share", weights.blink_share),
            ("eyebrow_weight", self.expression.eyebrow_weight),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(AttentiveError::config(format!(
                    "{name} must be within [0, 1] (got {share})"
                )));
            }
        }

        if self.blink.tolerance <= 0.0 {
            return Err(AttentiveError::config("blink tolerance must be positive"));
        }
        if self.blink.ear_threshold <= 0.0 {
            return Err(AttentiveError::config("blink EAR threshold must be positive"));
        }
        if self.position.sensitivity_gain < 0.0 {
            return Err(AttentiveError::config("sensitivity_gain must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.level.promotion_threshold) {
            return Err(AttentiveError::config(
                "promotion_threshold must be within [0, 1]",
            ));
        }
        if self.level.deep_dwell_secs < 0.0 {
            return Err(AttentiveError::config("deep_dwell_secs must not be negative"));
        }
        if self.timing.frame_interval_secs <= 0.0 {
            return Err(AttentiveError::config("frame_interval_secs must be positive"));
        }
        if self.timing.frame_skip == 0 {
            return Err(AttentiveError::config("frame_skip must be at least 1"));
        }

        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::preset(WeightingPreset::Standard)
    }
}

/// Defaults for monitoring sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    /// Stop automatically after this many minutes (None = unlimited).
    pub max_duration_minutes: Option<f64>,

    /// How long `stop` waits for the worker before abandoning it.
    pub stop_timeout_ms: u64,

    /// Pace replayed frames at the configured frame interval.
    pub realtime: bool,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            max_duration_minutes: None,
            stop_timeout_ms: 2_000,
            realtime: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "attentive=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Missing or invalid files are errors.
    pub fn load_from(path: impl AsRef<Path>) -> AttentiveResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AttentiveError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.detector.validate()?;
        Ok(config)
    }

    /// Save config to the standard location, returning the path written.
    pub fn save(&self) -> AttentiveResult<PathBuf> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("attentive").join("config.json")
}
