use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub theme: Theme,
    pub failure_policy: FailurePolicy,
    /// Fallback tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub editor: EditorMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
}

/// Geometry of the names editor, used to derive how many lines it shows at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorMetrics {
    pub height: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    TerminalDark,
    TerminalLight,
}

/// What a copy batch does after one destination fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Attempt every entry and collect the failures.
    #[default]
    ContinueAndReport,
    /// Stop at the first failure and delete what this batch created.
    AbortAndRollback,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            theme: Theme::TerminalDark,
            failure_policy: FailurePolicy::default(),
            log_filter: "info".to_string(),
            editor: EditorMetrics::default(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 480.0,
            min_width: 960.0,
            min_height: 350.0,
        }
    }
}

impl Default for EditorMetrics {
    fn default() -> Self {
        Self {
            height: 260.0,
            line_height: 20.0,
        }
    }
}

impl EditorMetrics {
    pub fn visible_lines(&self) -> usize {
        if self.line_height <= 0.0 {
            return 0;
        }

        (self.height / self.line_height).floor().max(0.0) as usize
    }
}
