//! Single-threaded async driver.
//!
//! The driver owns the page handle and the [`PageSession`] and multiplexes
//! three sources on one task: host events from an mpsc channel, tree
//! mutations from the page's observer, and the session's nearest timer
//! deadline. Each wake-up is handled to completion before the next one is
//! polled, so a running cycle is never interleaved with another callback.
//!
//! Pages are not `Send` (the HTML tree is `Rc`-based), so the driver runs on
//! a [`tokio::task::LocalSet`].

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, trace};
use turnmark_dom::{HostPage, MutationObserver};

use crate::events::HostEvent;
use crate::frame::RenderFrame;
use crate::session::PageSession;

/// Host event channel capacity.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Sending half handed to the host environment.
#[derive(Clone, Debug)]
pub struct DriverHandle {
    /// Host events in.
    pub events: mpsc::Sender<HostEvent>,
    /// Render frames out.
    pub frames: watch::Receiver<RenderFrame>,
}

/// Event loop for one page view.
pub struct SessionDriver<P: HostPage> {
    page: Rc<RefCell<P>>,
    session: PageSession,
    events: mpsc::Receiver<HostEvent>,
    frames: watch::Sender<RenderFrame>,
    observer: MutationObserver,
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl<P: HostPage> SessionDriver<P> {
    /// Wire a driver to a shared page.
    pub fn new(page: Rc<RefCell<P>>, session: PageSession) -> (Self, DriverHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (frame_tx, frame_rx) = watch::channel(session.frame());
        let driver = Self {
            page,
            session,
            events: event_rx,
            frames: frame_tx,
            observer: MutationObserver::disconnected(),
        };
        let handle = DriverHandle {
            events: event_tx,
            frames: frame_rx,
        };
        (driver, handle)
    }

    /// Observe mutations only while a provider is active.
    fn sync_observer(&mut self) {
        match (self.session.is_dormant(), self.observer.is_connected()) {
            (true, true) => {
                debug!("dormant; disconnecting mutation observer");
                self.observer.disconnect();
            }
            (false, false) => {
                debug!("attaching mutation observer");
                self.observer = self.page.borrow().observe();
            }
            _ => {}
        }
    }

    fn publish(&self) {
        let frame = self.session.frame();
        let _ = self.frames.send_if_modified(|current| {
            if *current == frame {
                false
            } else {
                *current = frame;
                true
            }
        });
    }

    /// Run until every [`DriverHandle`] event sender is dropped.
    ///
    /// Returns the session for inspection.
    pub async fn run(mut self) -> PageSession {
        {
            let mut page = self.page.borrow_mut();
            let _ = self.session.attach(&mut *page, Instant::now());
        }
        self.sync_observer();
        self.publish();

        loop {
            let deadline = self.session.next_deadline();
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    trace!(?event, "host event");
                    let mut page = self.page.borrow_mut();
                    let _ = self.session.handle_event(&mut *page, event, Instant::now());
                }
                mutation = self.observer.changed() => {
                    if mutation.is_some() {
                        self.session.notify_mutation(Instant::now());
                    }
                }
                () = sleep_until(deadline) => {
                    let mut page = self.page.borrow_mut();
                    let _ = self.session.poll(&mut *page, Instant::now());
                }
            }
            self.sync_observer();
            self.publish();
        }
        debug!(cycles = self.session.cycles(), "session driver stopped");
        self.session
    }
}
