//! Background pyramid construction.
//!
//! Builds run on a dedicated worker thread. Each request gets an id and its
//! own cancellation token; a newer request cancels the older one, and only
//! the result of the newest request is ever handed back.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::io::source::ImageOrigin;
use crate::progress::NoProgress;
use crate::pyramid::{Pyramid, PyramidBuilder};

/// A finished build ready to be shown.
#[derive(Debug)]
pub struct LoadedImage {
    pub id: u64,
    pub origin: ImageOrigin,
    pub pyramid: Pyramid,
}

/// Commands sent to the loader thread.
enum LoaderCommand {
    Build {
        id: u64,
        origin: ImageOrigin,
        cancel: CancellationToken,
    },
}

/// Results sent back from the loader thread.
struct LoaderResult {
    id: u64,
    result: Result<LoadedImage>,
}

pub struct PyramidLoader {
    cmd_tx: Option<mpsc::Sender<LoaderCommand>>,
    result_rx: mpsc::Receiver<LoaderResult>,
    handle: Option<JoinHandle<()>>,
    next_id: u64,
    latest: Option<u64>,
    active: Option<CancellationToken>,
}

impl PyramidLoader {
    pub fn spawn(config: ViewerConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<LoaderCommand>();
        let (result_tx, result_rx) = mpsc::channel::<LoaderResult>();
        let builder = PyramidBuilder::new(config);

        let handle = std::thread::Builder::new()
            .name("folio-loader".into())
            .spawn(move || loader_loop(cmd_rx, result_tx, builder))?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            result_rx,
            handle: Some(handle),
            next_id: 0,
            latest: None,
            active: None,
        })
    }

    /// Queue a build, cancelling whatever was requested before. Returns the
    /// request id.
    pub fn request(&mut self, origin: ImageOrigin) -> Result<u64> {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        self.next_id += 1;
        let id = self.next_id;
        let cancel = CancellationToken::new();

        let tx = self.cmd_tx.as_ref().ok_or(ViewerError::LoaderStopped)?;
        tx.send(LoaderCommand::Build {
            id,
            origin,
            cancel: cancel.clone(),
        })
        .map_err(|_| ViewerError::LoaderStopped)?;

        debug!(id, "Load requested");
        self.latest = Some(id);
        self.active = Some(cancel);
        Ok(id)
    }

    /// Cancel the outstanding request; its result will be dropped.
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
        self.latest = None;
    }

    pub fn latest_request(&self) -> Option<u64> {
        self.latest
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Result of the latest request if it has arrived. Stale results are
    /// drained and dropped.
    pub fn poll(&mut self) -> Option<Result<LoadedImage>> {
        while let Ok(msg) = self.result_rx.try_recv() {
            if let Some(result) = self.accept(msg) {
                return Some(result);
            }
        }
        None
    }

    /// Block up to `timeout` for the result of the latest request.
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<LoadedImage>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(msg) => {
                    if let Some(result) = self.accept(msg) {
                        return Some(result);
                    }
                }
                Err(_) => return None,
            }
        }
    }

    fn accept(&mut self, msg: LoaderResult) -> Option<Result<LoadedImage>> {
        if self.latest != Some(msg.id) {
            debug!(id = msg.id, latest = ?self.latest, "Discarding stale load result");
            return None;
        }
        self.latest = None;
        self.active = None;
        Some(msg.result)
    }
}

impl Drop for PyramidLoader {
    fn drop(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
        // Closing the channel ends the worker loop.
        self.cmd_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Loader thread panicked");
            }
        }
    }
}

fn loader_loop(
    cmd_rx: mpsc::Receiver<LoaderCommand>,
    result_tx: mpsc::Sender<LoaderResult>,
    builder: PyramidBuilder,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            LoaderCommand::Build { id, origin, cancel } => {
                let result = build(&builder, &origin, &cancel).map(|pyramid| LoadedImage {
                    id,
                    origin,
                    pyramid,
                });
                match &result {
                    Ok(_) => info!(id, "Load finished"),
                    Err(ViewerError::Cancelled) => debug!(id, "Load cancelled"),
                    Err(e) => warn!(id, error = %e, "Load failed"),
                }
                let _ = result_tx.send(LoaderResult { id, result });
            }
        }
    }
}

fn build(
    builder: &PyramidBuilder,
    origin: &ImageOrigin,
    cancel: &CancellationToken,
) -> Result<Pyramid> {
    cancel.check()?;
    let source = origin.open(builder.config())?;
    builder.build_with(source, &NoProgress, cancel)
}
