use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use dioxus::logger::tracing::warn;

/// Id of the optional `<script type="application/json">` block holding overrides.
#[cfg(target_arch = "wasm32")]
const SETTINGS_SCRIPT_ID: &str = "cherryplay-settings";

/// `setTimeout` fires immediately for delays above `i32::MAX`.
const MAX_DELAY_MS: u32 = i32::MAX as u32;

/// Error type for settings parsing
#[derive(Debug)]
pub struct SettingsError(serde_json::Error);

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid player settings: {}", self.0)
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Player behaviour knobs. Every field has a default so a host page only
/// needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default = "default_video_id")]
    pub video_id: String,
    #[serde(default)]
    pub video_src: Option<String>,
    #[serde(default = "default_stop_after_ms")]
    pub stop_after_ms: u32,
    #[serde(default = "default_close_fallback_ms")]
    pub close_fallback_ms: u32,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_icon_href")]
    pub icon_href: String,
    #[serde(default = "default_icon_type")]
    pub icon_type: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_fullscreen_on_load_ms")]
    pub fullscreen_on_load_ms: Option<u32>,
}

fn default_video_id() -> String {
    "v".to_string()
}

fn default_stop_after_ms() -> u32 {
    1000
}

fn default_close_fallback_ms() -> u32 {
    150
}

fn default_fallback_url() -> String {
    "about:blank".to_string()
}

fn default_icon_href() -> String {
    "cherryicon.png".to_string()
}

fn default_icon_type() -> String {
    "image/png".to_string()
}

fn default_volume() -> f64 {
    1.0
}

fn default_fullscreen_on_load_ms() -> Option<u32> {
    Some(100)
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            video_id: default_video_id(),
            video_src: None,
            stop_after_ms: default_stop_after_ms(),
            close_fallback_ms: default_close_fallback_ms(),
            fallback_url: default_fallback_url(),
            icon_href: default_icon_href(),
            icon_type: default_icon_type(),
            volume: default_volume(),
            fullscreen_on_load_ms: default_fullscreen_on_load_ms(),
        }
    }
}

impl PlayerSettings {
    /// Parse a (possibly partial) JSON object.
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        serde_json::from_str::<Self>(raw)
            .map(Self::normalized)
            .map_err(SettingsError)
    }

    fn normalized(mut self) -> Self {
        self.volume = normalize_volume(self.volume);
        self.stop_after_ms = self.stop_after_ms.min(MAX_DELAY_MS);
        self.close_fallback_ms = self.close_fallback_ms.min(MAX_DELAY_MS);
        self.fullscreen_on_load_ms = self
            .fullscreen_on_load_ms
            .map(|delay| delay.min(MAX_DELAY_MS));
        if self.video_id.trim().is_empty() {
            self.video_id = default_video_id();
        }
        if self.icon_href.trim().is_empty() {
            self.icon_href = default_icon_href();
        }
        if self.icon_type.trim().is_empty() {
            self.icon_type = default_icon_type();
        }
        if self.fallback_url.trim().is_empty() {
            self.fallback_url = default_fallback_url();
        }
        if self
            .video_src
            .as_deref()
            .is_some_and(|src| src.trim().is_empty())
        {
            self.video_src = None;
        }
        self
    }
}

fn normalize_volume(value: f64) -> f64 {
    if !value.is_finite() {
        return default_volume();
    }
    value.clamp(0.0, 1.0)
}

/// Read overrides from the host document, falling back to defaults.
#[cfg(target_arch = "wasm32")]
pub fn load_settings() -> PlayerSettings {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|doc| doc.get_element_by_id(SETTINGS_SCRIPT_ID))
        .and_then(|script| script.text_content())
        .filter(|text| !text.trim().is_empty());

    let Some(raw) = raw else {
        return PlayerSettings::default();
    };
    match PlayerSettings::from_json(&raw) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(%err, "ignoring #{SETTINGS_SCRIPT_ID}");
            PlayerSettings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_settings() -> PlayerSettings {
    PlayerSettings::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_behaviour() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.video_id, "v");
        assert_eq!(settings.stop_after_ms, 1000);
        assert_eq!(settings.close_fallback_ms, 150);
        assert_eq!(settings.fallback_url, "about:blank");
        assert_eq!(settings.icon_href, "cherryicon.png");
        assert_eq!(settings.icon_type, "image/png");
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.fullscreen_on_load_ms, Some(100));
        assert_eq!(settings.video_src, None);
    }

    #[test]
    fn empty_object_yields_defaults() {
        let settings = PlayerSettings::from_json("{}").expect("valid json");
        assert_eq!(settings, PlayerSettings::default());
    }

    #[test]
    fn partial_object_overrides_only_listed_fields() {
        let settings = PlayerSettings::from_json(
            r#"{"stop_after_ms": 2500, "video_src": "clip.mp4", "fullscreen_on_load_ms": null}"#,
        )
        .expect("valid json");
        assert_eq!(settings.stop_after_ms, 2500);
        assert_eq!(settings.video_src.as_deref(), Some("clip.mp4"));
        assert_eq!(settings.fullscreen_on_load_ms, None);
        assert_eq!(settings.close_fallback_ms, 150);
        assert_eq!(settings.video_id, "v");
    }

    #[test]
    fn out_of_range_values_are_normalized() {
        let settings = PlayerSettings::from_json(
            r#"{"volume": 7.5, "video_id": "  ", "icon_href": "", "fallback_url": "", "video_src": " "}"#,
        )
        .expect("valid json");
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.video_id, "v");
        assert_eq!(settings.icon_href, "cherryicon.png");
        assert_eq!(settings.fallback_url, "about:blank");
        assert_eq!(settings.video_src, None);

        let quiet = PlayerSettings::from_json(r#"{"volume": -0.2}"#).expect("valid json");
        assert_eq!(quiet.volume, 0.0);
    }

    #[test]
    fn delays_are_capped_at_set_timeout_limit() {
        let settings = PlayerSettings::from_json(
            r#"{"stop_after_ms": 4294967295, "close_fallback_ms": 2147483648, "fullscreen_on_load_ms": 3000000000}"#,
        )
        .expect("valid json");
        assert_eq!(settings.stop_after_ms, 2_147_483_647);
        assert_eq!(settings.close_fallback_ms, 2_147_483_647);
        assert_eq!(settings.fullscreen_on_load_ms, Some(2_147_483_647));

        let in_range = PlayerSettings::from_json(r#"{"stop_after_ms": 2147483647}"#)
            .expect("valid json");
        assert_eq!(in_range.stop_after_ms, 2_147_483_647);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = PlayerSettings::from_json(r#"{"stop_after_ms": "soon"}"#)
            .expect_err("string is not a delay");
        assert!(err.to_string().starts_with("invalid player settings"));
        assert!(PlayerSettings::from_json("not json").is_err());
    }

    #[test]
    fn settings_round_trip_through_serde() {
        let mut settings = PlayerSettings::default();
        settings.video_src = Some("intro.webm".to_string());
        let json = serde_json::to_string(&settings).expect("serializable");
        assert_eq!(PlayerSettings::from_json(&json).expect("valid json"), settings);
    }
}
