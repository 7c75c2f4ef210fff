// Host seams for the playback controller: the video element, the page chrome, and timers.

/// Error returned by best-effort browser calls.
///
/// Callers in the controller discard these on purpose; the type exists so the
/// discarding stays visible at every call site.
#[derive(Debug, Clone, PartialEq)]
pub enum PageError {
    /// No element with the given id exists in the document.
    MissingElement(String),
    /// The element exists but is not the expected kind.
    WrongElementType(String),
    /// The browser does not expose the requested capability.
    Unsupported(&'static str),
    /// The browser threw or rejected the call.
    Rejected(String),
    /// A global (window, document, head) is not reachable.
    Unavailable(&'static str),
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingElement(id) => write!(f, "no element with id \"{id}\""),
            Self::WrongElementType(id) => write!(f, "element \"{id}\" is not a video element"),
            Self::Unsupported(what) => write!(f, "{what} is not supported by this browser"),
            Self::Rejected(reason) => write!(f, "browser rejected the call: {reason}"),
            Self::Unavailable(what) => write!(f, "{what} is not available"),
        }
    }
}

impl std::error::Error for PageError {}

pub type PageResult<T = ()> = Result<T, PageError>;

/// Work a scheduled timer performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTask {
    /// Pause the video and attempt to close the page.
    StopPlayback,
    /// Navigate away after a close attempt the browser may have ignored.
    CloseFallback,
    /// Delayed fullscreen attempt right after mount.
    FullscreenOnLoad,
}

/// Opaque identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Inline style that makes the video cover the whole viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStyle {
    pub position: &'static str,
    pub inset: &'static str,
    pub width: &'static str,
    pub height: &'static str,
    pub object_fit: &'static str,
}

impl FillStyle {
    pub const VIEWPORT: Self = Self {
        position: "fixed",
        inset: "0",
        width: "100%",
        height: "100%",
        object_fit: "cover",
    };

    /// CSS property/value pairs in application order.
    pub fn declarations(&self) -> [(&'static str, &'static str); 5] {
        [
            ("position", self.position),
            ("inset", self.inset),
            ("width", self.width),
            ("height", self.height),
            ("object-fit", self.object_fit),
        ]
    }
}

/// Fullscreen entry points, by the DOM method that implements them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenCall {
    Standard,
    /// Safari before 16.4.
    Webkit,
}

impl FullscreenCall {
    pub fn method(self) -> &'static str {
        match self {
            Self::Standard => "requestFullscreen",
            Self::Webkit => "webkitRequestFullscreen",
        }
    }
}

/// Whether a `<link rel>` value names an icon, matching the
/// `link[rel*='icon']` selector (`rel` compares case-insensitively in HTML).
pub fn is_icon_relation(rel: &str) -> bool {
    rel.to_ascii_lowercase().contains("icon")
}

/// The controlled `<video>` element.
pub trait VideoSurface {
    /// Turn native controls off, both the property and the attribute.
    fn hide_controls(&self) -> PageResult;
    fn set_muted(&self, muted: bool);
    fn set_volume(&self, volume: f64);
    fn apply_style(&self, style: &FillStyle) -> PageResult;
    /// Start playback. A returned promise is not awaited.
    fn play(&self) -> PageResult;
    fn pause(&self) -> PageResult;
    fn request_fullscreen(&self) -> PageResult;
    /// `webkitRequestFullscreen`, for engines without the standard call.
    fn request_fullscreen_webkit(&self) -> PageResult;
}

/// Window/document level capabilities.
pub trait PageHost {
    fn is_fullscreen(&self) -> bool;
    /// Fullscreen request on the document root element.
    fn request_root_fullscreen(&self) -> PageResult;
    fn close_window(&self) -> PageResult;
    fn navigate(&self, url: &str) -> PageResult;
    fn clear_media_session_metadata(&self) -> PageResult;
    /// Remove every `link[rel*='icon']` and append a single icon link to `<head>`.
    fn replace_icon(&self, href: &str, mime: &str) -> PageResult;
}

/// One-shot timers. Fired tasks are delivered back to the controller through
/// `PlaybackController::on_timer` by whoever drives the scheduler.
pub trait Scheduler {
    fn schedule(&mut self, delay_ms: u32, task: TimerTask) -> TimerId;
    /// Cancelling an unknown or already fired timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_calls_name_their_dom_methods() {
        assert_eq!(FullscreenCall::Standard.method(), "requestFullscreen");
        assert_eq!(FullscreenCall::Webkit.method(), "webkitRequestFullscreen");
    }

    #[test]
    fn icon_relations_match_substring_selector() {
        for rel in ["icon", "shortcut icon", "apple-touch-icon", "Shortcut Icon", "mask-icon"] {
            assert!(is_icon_relation(rel), "{rel} should be replaced");
        }
        for rel in ["stylesheet", "manifest", "preload", ""] {
            assert!(!is_icon_relation(rel), "{rel} should be kept");
        }
    }
}
