use crate::settings::PlayerSettings;
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::components::video_manager;
#[cfg(target_arch = "wasm32")]
use dioxus::logger::tracing::warn;

/// Full-viewport video surface. The playback controller attaches once the
/// element is in the DOM.
#[component]
pub fn VideoStage(settings: PlayerSettings) -> Element {
    let video_id = settings.video_id.clone();
    let src = settings.video_src.clone();

    {
        let settings = settings.clone();
        use_effect(move || {
            #[cfg(target_arch = "wasm32")]
            if let Err(err) = video_manager::mount(settings.clone()) {
                warn!(%err, "playback controller not mounted");
            }
            #[cfg(not(target_arch = "wasm32"))]
            let _ = &settings;
        });
    }

    rsx! {
        div { class: "video-stage",
            video {
                id: "{video_id}",
                class: "video-stage__video",
                src,
                autoplay: true,
                playsinline: true,
                preload: "auto",
            }
        }
    }
}
