// Wires DOM events to the playback controller (wasm only).
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use dioxus::logger::tracing::{debug, info};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{AddEventListenerOptions, Event, EventTarget};

use super::controller::{InteractionOutcome, PlaybackController};
use super::host::{PageError, PageResult};
use super::listener_set::{Detach, ListenerSet};
use super::web_host::{find_video, WebPage, WebScheduler, WebVideo};
use crate::settings::PlayerSettings;

type WebController = PlaybackController<WebVideo, WebPage, WebScheduler>;
type Callback = Closure<dyn FnMut(Event)>;

type WebListeners = ListenerSet<Callback, Registration>;

/// Everything that must outlive the mount call: the controller and the JS
/// closures registered with the browser.
struct Mounted {
    _controller: Rc<RefCell<WebController>>,
    _listeners: WebListeners,
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

/// A registered listener that can later be detached.
#[derive(Clone)]
struct Registration {
    target: EventTarget,
    event: &'static str,
    callback: js_sys::Function,
}

impl Detach for Registration {
    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, &self.callback);
    }
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    passive: bool,
) -> impl FnOnce(&Callback) -> PageResult<Registration> + '_ {
    move |callback| {
        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let result = if passive {
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            target.add_event_listener_with_callback_and_add_event_listener_options(
                event, function, &options,
            )
        } else {
            target.add_event_listener_with_callback(event, function)
        };
        result.map_err(|err| PageError::Rejected(format!("{event}: {err:?}")))?;
        Ok(Registration {
            target: target.clone(),
            event,
            callback: function.clone(),
        })
    }
}

/// Run `f` against the controller if it is still alive and not already borrowed.
fn with_controller(
    controller: &Weak<RefCell<WebController>>,
    f: impl FnOnce(&mut WebController),
) {
    let Some(controller) = controller.upgrade() else {
        return;
    };
    let Ok(mut controller) = controller.try_borrow_mut() else {
        debug!("playback controller busy; event dropped");
        return;
    };
    f(&mut controller);
}

/// Attach the playback controller to the page's video element.
///
/// Mounting is once per page; later calls return `Ok(())` without touching
/// the DOM.
pub fn mount(settings: PlayerSettings) -> PageResult {
    if MOUNTED.with(|mounted| mounted.borrow().is_some()) {
        return Ok(());
    }

    let page = WebPage::current()?;
    let element = find_video(page.document(), &settings.video_id)?;
    let video = WebVideo::new(element);
    let playback_probe = video.element().clone();
    let video_target: EventTarget = video.element().clone().into();
    let window_target: EventTarget = page.window().clone().into();
    let video_id = settings.video_id.clone();

    let scheduler = WebScheduler::default();
    let controller = Rc::new(RefCell::new(PlaybackController::new(
        video,
        page,
        scheduler.clone(),
        settings,
    )));
    let weak = Rc::downgrade(&controller);

    {
        let weak = weak.clone();
        scheduler.set_dispatch(move |id, task| {
            with_controller(&weak, |controller| controller.on_timer(id, task));
        });
    }

    let mut listeners = WebListeners::default();
    if let Err(err) = attach_listeners(&mut listeners, &weak, &video_target, &window_target) {
        listeners.abandon();
        return Err(err);
    }

    controller.borrow_mut().initialize();

    // Autoplay may have started before the listeners were attached.
    if !playback_probe.paused() {
        with_controller(&weak, |controller| controller.on_play());
    }

    MOUNTED.with(|mounted| {
        *mounted.borrow_mut() = Some(Mounted {
            _controller: controller,
            _listeners: listeners,
        });
    });
    info!(video_id = %video_id, "playback controller mounted");
    Ok(())
}

fn attach_listeners(
    listeners: &mut WebListeners,
    weak: &Weak<RefCell<WebController>>,
    video_target: &EventTarget,
    window_target: &EventTarget,
) -> PageResult {
    let context_menu = Closure::wrap(Box::new(|event: Event| {
        event.prevent_default();
    }) as Box<dyn FnMut(Event)>);
    listeners.attach(context_menu, listen(video_target, "contextmenu", false))?;

    for event in ["play", "playing"] {
        let weak = weak.clone();
        let on_play = Closure::wrap(Box::new(move |_: Event| {
            with_controller(&weak, |controller| controller.on_play());
        }) as Box<dyn FnMut(Event)>);
        listeners.attach(on_play, listen(video_target, event, false))?;
    }

    let on_pause = {
        let weak = weak.clone();
        Closure::wrap(Box::new(move |_: Event| {
            with_controller(&weak, |controller| controller.on_pause());
        }) as Box<dyn FnMut(Event)>)
    };
    listeners.attach(on_pause, listen(video_target, "pause", false))?;

    let on_ended = {
        let weak = weak.clone();
        Closure::wrap(Box::new(move |_: Event| {
            with_controller(&weak, |controller| controller.on_ended());
        }) as Box<dyn FnMut(Event)>)
    };
    listeners.attach(on_ended, listen(video_target, "ended", false))?;

    // Autoplay is often blocked until the first gesture.
    let interaction_registrations: Rc<RefCell<Vec<Registration>>> = Rc::default();
    for event in ["click", "touchstart"] {
        let on_interaction = {
            let weak = weak.clone();
            let registrations = interaction_registrations.clone();
            Closure::wrap(Box::new(move |_: Event| {
                let mut outcome = InteractionOutcome::AlreadyHandled;
                with_controller(&weak, |controller| outcome = controller.on_interaction());
                if outcome == InteractionOutcome::Handled {
                    for registration in registrations.borrow_mut().drain(..) {
                        registration.detach();
                    }
                }
            }) as Box<dyn FnMut(Event)>)
        };
        let registration = listeners.attach(on_interaction, listen(window_target, event, true))?;
        interaction_registrations.borrow_mut().push(registration);
    }
    Ok(())
}
