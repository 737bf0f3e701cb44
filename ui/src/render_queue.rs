//! Runs renderer invocations off the frame loop.
//!
//! Jobs are dispatched on a short-lived thread (native) or a local task (web)
//! and their results are sent back over a `flume` channel, which the app drains
//! once per frame through [`RenderQueue::drain`]. Tests use
//! [`Dispatch::Inline`], which renders immediately but still delivers through
//! the channel so the frame-loop path is the same.

use flume::{Receiver, Sender};
use qrgenie_business::{QrCodeRenderer, RenderError, RenderJob, RenderedImage};

/// What a finished render is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// The form submission currently holding the busy flag.
    Submit,
    /// The thumbnail of the history record with this fingerprint.
    Thumbnail(u64),
}

#[derive(Debug)]
pub struct Finished {
    pub kind: JobKind,
    pub job: RenderJob,
    pub outcome: Result<RenderedImage, RenderError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Background,
    Inline,
}

pub struct RenderQueue {
    renderer: QrCodeRenderer,
    dispatch: Dispatch,
    sender: Sender<Finished>,
    receiver: Receiver<Finished>,
    pending: usize,
}

impl RenderQueue {
    pub fn new(renderer: QrCodeRenderer, dispatch: Dispatch) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            renderer,
            dispatch,
            sender,
            receiver,
            pending: 0,
        }
    }

    pub fn dispatch_mode(&self) -> Dispatch {
        self.dispatch
    }

    /// Jobs dispatched but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn dispatch(&mut self, kind: JobKind, job: RenderJob, ctx: &egui::Context) {
        self.pending += 1;
        log::debug!("dispatching {kind:?} render ({} pending)", self.pending);

        match self.dispatch {
            Dispatch::Inline => {
                let outcome = job.run(&self.renderer);
                send(&self.sender, Finished { kind, job, outcome });
            }
            Dispatch::Background => {
                spawn(self.renderer, self.sender.clone(), kind, job, ctx.clone());
            }
        }
    }

    /// Everything that finished since the last call.
    pub fn drain(&mut self) -> Vec<Finished> {
        let finished: Vec<Finished> = self.receiver.try_iter().collect();
        self.pending = self.pending.saturating_sub(finished.len());
        finished
    }
}

fn send(sender: &Sender<Finished>, finished: Finished) {
    if sender.send(finished).is_err() {
        log::warn!("render result dropped: queue receiver is gone");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn(
    renderer: QrCodeRenderer,
    sender: Sender<Finished>,
    kind: JobKind,
    job: RenderJob,
    ctx: egui::Context,
) {
    let fallback = job.clone();
    let worker_sender = sender.clone();
    let spawned = std::thread::Builder::new()
        .name("qr-render".to_owned())
        .spawn(move || {
            let outcome = job.run(&renderer);
            send(&worker_sender, Finished { kind, job, outcome });
            ctx.request_repaint();
        });

    if let Err(err) = spawned {
        log::warn!("could not spawn render thread, rendering inline: {err}");
        let outcome = fallback.run(&renderer);
        send(
            &sender,
            Finished {
                kind,
                job: fallback,
                outcome,
            },
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn(
    renderer: QrCodeRenderer,
    sender: Sender<Finished>,
    kind: JobKind,
    job: RenderJob,
    ctx: egui::Context,
) {
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = job.run(&renderer);
        send(&sender, Finished { kind, job, outcome });
        ctx.request_repaint();
    });
}
