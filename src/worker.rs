//! Background generation.
//!
//! [`spawn`] moves an [`Engine`] onto its own thread and streams
//! [`Event`]s back over a channel, so a driving interface (CLI progress,
//! server request) stays responsive while pages render. The run itself is a
//! single sequential pass.

use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use crate::engine::{CancelToken, Engine, Progress, Summary};
use crate::error::StampError;
use crate::output::PageSink;

/// Messages from a running generation.
#[derive(Debug)]
pub enum Event {
    Progress(Progress),
    /// Always the last event of a run.
    Finished(Result<Summary, StampError>),
}

/// Handle to a generation running on a background thread.
pub struct Worker {
    events: Receiver<Event>,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

/// Start generating on a new thread, writing into `sink`.
pub fn spawn(engine: Engine, mut sink: Box<dyn PageSink + Send>) -> Result<Worker, StampError> {
    let (tx, events) = mpsc::channel();
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let handle = std::thread::Builder::new()
        .name("serial-stamp-worker".into())
        .spawn(move || {
            let progress_tx = tx.clone();
            let mut progress = move |p: Progress| {
                // A dropped receiver only means nobody is listening.
                let _ = progress_tx.send(Event::Progress(p));
            };
            let result = engine.generate_into(sink.as_mut(), &mut progress, &token);
            let _ = tx.send(Event::Finished(result));
        })?;

    Ok(Worker {
        events,
        cancel,
        handle,
    })
}

impl Worker {
    /// Events in the order they were sent. Ends after [`Event::Finished`].
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Ask the run to stop before its next page.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain events until the run finishes, forwarding progress to `on_progress`.
    pub fn wait(self, mut on_progress: impl FnMut(Progress)) -> Result<Summary, StampError> {
        let mut outcome = None;
        for event in self.events.iter() {
            match event {
                Event::Progress(p) => on_progress(p),
                Event::Finished(result) => outcome = Some(result),
            }
        }
        self.handle
            .join()
            .map_err(|_| StampError::Worker("generation thread panicked".into()))?;
        outcome.unwrap_or_else(|| Err(StampError::Worker("worker exited without a result".into())))
    }

    /// Wait for the thread without reading further events.
    pub fn join(self) -> Result<(), StampError> {
        self.handle
            .join()
            .map_err(|_| StampError::Worker("generation thread panicked".into()))
    }
}
