use dioxus::prelude::*;

mod components;
mod settings;

use components::VideoStage;

const APP_CSS: Asset = asset!("/assets/styling/app.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let settings = use_hook(settings::load_settings);

    rsx! {
        // The favicon is swapped at runtime by the playback controller.
        document::Meta { name: "theme-color", content: "#000000" }
        document::Stylesheet { href: APP_CSS }

        VideoStage { settings }
    }
}
