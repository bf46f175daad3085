use std::env;
use std::time::Duration;

pub const DEFAULT_BREAKPOINT_PX: u32 = 900;
pub const DEFAULT_FALLBACK_MS: u64 = 250;
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub breakpoint_px: u32,
    /// Grace period after DOM readiness before the sample dataset may be shown.
    pub fallback_delay: Duration,
    pub resize_debounce: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: DEFAULT_BREAKPOINT_PX,
            fallback_delay: Duration::from_millis(DEFAULT_FALLBACK_MS),
            resize_debounce: Duration::from_millis(DEFAULT_RESIZE_DEBOUNCE_MS),
        }
    }
}

impl WidgetConfig {
    pub fn from_env() -> Self {
        let breakpoint_px = env_parse::<u32>("WIDGET_BREAKPOINT_PX")
            .unwrap_or(DEFAULT_BREAKPOINT_PX)
            .max(1);
        let fallback_ms = env_parse::<u64>("WIDGET_FALLBACK_MS").unwrap_or(DEFAULT_FALLBACK_MS);
        let debounce_ms =
            env_parse::<u64>("WIDGET_RESIZE_DEBOUNCE_MS").unwrap_or(DEFAULT_RESIZE_DEBOUNCE_MS);
        Self {
            breakpoint_px,
            fallback_delay: Duration::from_millis(fallback_ms),
            resize_debounce: Duration::from_millis(debounce_ms),
        }
    }
}

pub fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}
