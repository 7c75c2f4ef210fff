// Playback controller: reacts to video/page events and owns the stop timer.
use dioxus::logger::tracing::debug;

use super::host::{
    FillStyle, PageError, PageHost, PageResult, Scheduler, TimerId, TimerTask, VideoSurface,
};
use crate::settings::PlayerSettings;

/// Which fullscreen path was taken by [`PlaybackController::attempt_fullscreen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenOutcome {
    AlreadyFullscreen,
    Element,
    Webkit,
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// First interaction: playback was retried and the listeners should be removed.
    Handled,
    /// The fallback already ran.
    AlreadyHandled,
}

/// Drives a single video element: fill the viewport, stop one second after
/// playback starts, then try to close the page.
///
/// Event listeners call the `on_*` methods; timer callbacks call
/// [`on_timer`](Self::on_timer) with the id and task they were scheduled with.
pub struct PlaybackController<V, P, S> {
    video: V,
    page: P,
    scheduler: S,
    settings: PlayerSettings,
    stop_timer: Option<TimerId>,
    interaction_armed: bool,
}

impl<V, P, S> PlaybackController<V, P, S>
where
    V: VideoSurface,
    P: PageHost,
    S: Scheduler,
{
    pub fn new(video: V, page: P, scheduler: S, settings: PlayerSettings) -> Self {
        Self {
            video,
            page,
            scheduler,
            settings,
            stop_timer: None,
            interaction_armed: true,
        }
    }

    #[cfg(test)]
    pub fn pending_stop_timer(&self) -> Option<TimerId> {
        self.stop_timer
    }

    #[cfg(test)]
    pub fn interaction_armed(&self) -> bool {
        self.interaction_armed
    }

    /// One-time page setup run right after the video is mounted.
    pub fn initialize(&mut self) {
        ignore("hide controls", self.video.hide_controls());
        self.force_audible();
        ignore(
            "clear media session metadata",
            self.page.clear_media_session_metadata(),
        );
        ignore("fill viewport", self.video.apply_style(&FillStyle::VIEWPORT));
        ignore(
            "replace favicon",
            self.page
                .replace_icon(&self.settings.icon_href, &self.settings.icon_type),
        );

        // Without a user gesture browsers reject this; it only helps when the
        // page was opened from one.
        if let Some(delay) = self.settings.fullscreen_on_load_ms {
            self.scheduler.schedule(delay, TimerTask::FullscreenOnLoad);
        }
    }

    /// Handles both `play` and `playing`.
    pub fn on_play(&mut self) {
        self.schedule_stop();
        ignore("fullscreen on play", self.attempt_fullscreen());
    }

    pub fn on_pause(&mut self) {
        self.cancel_stop();
    }

    pub fn on_ended(&mut self) {
        self.cancel_stop();
        self.attempt_close();
    }

    /// First click/touch anywhere on the page.
    pub fn on_interaction(&mut self) -> InteractionOutcome {
        if !self.interaction_armed {
            return InteractionOutcome::AlreadyHandled;
        }
        self.interaction_armed = false;

        self.force_audible();
        ignore("play on interaction", self.video.play());
        ignore("fullscreen on interaction", self.attempt_fullscreen());
        InteractionOutcome::Handled
    }

    pub fn on_timer(&mut self, id: TimerId, task: TimerTask) {
        match task {
            TimerTask::StopPlayback => {
                if self.stop_timer != Some(id) {
                    debug!(?id, "stale stop timer ignored");
                    return;
                }
                self.stop_timer = None;
                ignore("pause", self.video.pause());
                self.attempt_close();
            }
            TimerTask::CloseFallback => {
                ignore("close fallback", self.page.navigate(&self.settings.fallback_url));
            }
            TimerTask::FullscreenOnLoad => {
                ignore("fullscreen on load", self.attempt_fullscreen());
            }
        }
    }

    /// Try to close the page; the browser may refuse for tabs it did not open,
    /// so a navigation to the fallback url is always scheduled behind it.
    pub fn attempt_close(&mut self) {
        ignore("close window", self.page.close_window());
        self.scheduler
            .schedule(self.settings.close_fallback_ms, TimerTask::CloseFallback);
    }

    pub fn attempt_fullscreen(&self) -> PageResult<FullscreenOutcome> {
        if self.page.is_fullscreen() {
            return Ok(FullscreenOutcome::AlreadyFullscreen);
        }

        let standard = match self.video.request_fullscreen() {
            Ok(()) => return Ok(FullscreenOutcome::Element),
            Err(err) => err,
        };
        debug!(%standard, "element fullscreen refused");
        let webkit = match self.video.request_fullscreen_webkit() {
            Ok(()) => return Ok(FullscreenOutcome::Webkit),
            Err(err) => err,
        };
        debug!(%webkit, "webkit fullscreen refused");
        self.page
            .request_root_fullscreen()
            .map(|()| FullscreenOutcome::Root)
    }

    fn schedule_stop(&mut self) {
        self.cancel_stop();
        let id = self
            .scheduler
            .schedule(self.settings.stop_after_ms, TimerTask::StopPlayback);
        self.stop_timer = Some(id);
    }

    fn cancel_stop(&mut self) {
        if let Some(id) = self.stop_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn force_audible(&self) {
        self.video.set_muted(false);
        self.video.set_volume(self.settings.volume);
    }
}

fn ignore<T>(what: &str, result: Result<T, PageError>) {
    if let Err(err) = result {
        debug!(%err, "{what} failed");
    }
}
