// Bookkeeping for registered listeners so a half-finished mount can be unwound.
use super::host::PageResult;

/// A listener registration that can be taken off its target again.
pub trait Detach {
    fn detach(&self);
}

/// Callbacks kept alive for as long as their registrations exist.
///
/// A callback is stored before it is registered, so it is never dropped while
/// the browser still holds it. [`abandon`](Self::abandon) detaches everything
/// first and only then releases the callbacks.
pub struct ListenerSet<C, R: Detach> {
    callbacks: Vec<C>,
    registrations: Vec<R>,
}

impl<C, R: Detach> Default for ListenerSet<C, R> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
            registrations: Vec::new(),
        }
    }
}

impl<C, R: Detach + Clone> ListenerSet<C, R> {
    /// Keep `callback` alive and register it with `register`.
    pub fn attach(
        &mut self,
        callback: C,
        register: impl FnOnce(&C) -> PageResult<R>,
    ) -> PageResult<R> {
        self.callbacks.push(callback);
        let callback = &self.callbacks[self.callbacks.len() - 1];
        let registration = register(callback)?;
        self.registrations.push(registration.clone());
        Ok(registration)
    }

    /// Detach every successful registration, then drop the callbacks.
    pub fn abandon(self) {
        for registration in &self.registrations {
            registration.detach();
        }
        drop(self.callbacks);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::video_manager::host::PageError;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records when the callback is released relative to detaches.
    struct Callback {
        name: &'static str,
        log: Log,
    }

    impl Drop for Callback {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("drop:{}", self.name));
        }
    }

    #[derive(Clone, Debug)]
    struct Registration {
        name: &'static str,
        log: Log,
    }

    impl Detach for Registration {
        fn detach(&self) {
            self.log.borrow_mut().push(format!("detach:{}", self.name));
        }
    }

    fn register(log: &Log) -> impl FnOnce(&Callback) -> PageResult<Registration> + '_ {
        move |callback| {
            Ok(Registration {
                name: callback.name,
                log: log.clone(),
            })
        }
    }

    fn callback(name: &'static str, log: &Log) -> Callback {
        Callback {
            name,
            log: log.clone(),
        }
    }

    #[test]
    fn failed_registration_unwinds_before_releasing_callbacks() {
        let log: Log = Rc::default();
        let mut set = ListenerSet::default();

        set.attach(callback("play", &log), register(&log))
            .expect("play registers");
        set.attach(callback("pause", &log), register(&log))
            .expect("pause registers");
        let err = set
            .attach(callback("ended", &log), |_| {
                Err(PageError::Rejected("ended".to_string()))
            })
            .expect_err("ended is refused");
        assert_eq!(err, PageError::Rejected("ended".to_string()));
        assert_eq!(set.len(), 3);
        assert!(log.borrow().is_empty(), "nothing released before abandon");

        set.abandon();
        assert_eq!(
            *log.borrow(),
            [
                "detach:play",
                "detach:pause",
                "drop:play",
                "drop:pause",
                "drop:ended"
            ]
        );
    }

    #[test]
    fn successful_registrations_keep_callbacks_alive() {
        let log: Log = Rc::default();
        let mut set = ListenerSet::default();
        let registration = set
            .attach(callback("click", &log), register(&log))
            .expect("click registers");
        assert_eq!(registration.name, "click");
        assert!(log.borrow().is_empty());

        registration.detach();
        assert_eq!(*log.borrow(), ["detach:click"]);
        drop(set);
        assert_eq!(*log.borrow(), ["detach:click", "drop:click"]);
    }
}
