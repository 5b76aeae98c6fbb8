// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parallel workers for independent frames.
//!
//! One carve is strictly sequential, but separate frames have nothing
//! to share.  Each worker owns a whole [`SeamCarver`], and with it a
//! private buffer pool; requests and responses move through channels,
//! taking their pixel buffers with them.

use crate::config::CarveConfig;
use crate::request::{ResizeRequest, ResizeResult};
use crate::seamcarver::SeamCarver;
use crossbeam::channel::{unbounded, Receiver, Sender};
use itertools::Itertools;
use log::debug;
use std::io;
use std::panic;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A fixed set of worker threads behind a request channel.  Responses
/// come back in completion order; use `request_index` to put frames
/// back in sequence.
pub struct WorkerPool {
    requests: Option<Sender<ResizeRequest>>,
    responses: Receiver<ResizeResult>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(workers: usize, config: CarveConfig) -> io::Result<Self> {
        let workers = workers.max(1);
        let (request_tx, request_rx) = unbounded::<ResizeRequest>();
        let (response_tx, response_rx) = unbounded();

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let requests = request_rx.clone();
            let responses = response_tx.clone();
            let config = config.clone();
            let handle = thread::Builder::new()
                .name(format!("liquidseam-{}", id))
                .spawn(move || {
                    let mut carver = SeamCarver::new(config);
                    for request in requests.iter() {
                        if responses.send(carver.process(request)).is_err() {
                            break;
                        }
                    }
                    debug!("worker {}: request channel closed", id);
                })?;
            handles.push(handle);
        }

        Ok(WorkerPool {
            requests: Some(request_tx),
            responses: response_rx,
            handles,
        })
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Hand a request to the next free worker.  If the pool is shutting
    /// down the request comes back untouched.
    pub fn submit(&self, request: ResizeRequest) -> Result<(), ResizeRequest> {
        match &self.requests {
            Some(tx) => tx.send(request).map_err(|e| e.into_inner()),
            None => Err(request),
        }
    }

    /// Block for the next finished request.
    ///
    /// The workers hold their response senders until the pool shuts
    /// down, so this waits forever when nothing is in flight.  Only call
    /// it as many times as requests were submitted, or use
    /// [`try_recv`](Self::try_recv) or [`recv_timeout`](Self::recv_timeout).
    pub fn recv(&self) -> Option<ResizeResult> {
        self.responses.recv().ok()
    }

    /// A finished request, if one is waiting.
    pub fn try_recv(&self) -> Option<ResizeResult> {
        self.responses.try_recv().ok()
    }

    /// Wait at most `timeout` for a finished request.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ResizeResult> {
        self.responses.recv_timeout(timeout).ok()
    }

    /// Stop accepting requests and wait for the workers to drain.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.requests.take();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.join() {
                panic::resume_unwind(e);
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !thread::panicking() {
            self.close();
        }
    }
}

/// Carve a batch of independent requests on up to `workers` scoped
/// threads and return the results in request order.
pub fn resize_batch(
    requests: Vec<ResizeRequest>,
    workers: usize,
    config: &CarveConfig,
) -> Vec<ResizeResult> {
    if requests.is_empty() {
        return Vec::new();
    }
    let per_worker = (requests.len() + workers.max(1) - 1) / workers.max(1);
    let groups: Vec<Vec<ResizeRequest>> = requests
        .into_iter()
        .chunks(per_worker)
        .into_iter()
        .map(|chunk| chunk.collect())
        .collect();

    crossbeam::scope(|scope| {
        let handles: Vec<_> = groups
            .into_iter()
            .map(|group| {
                let config = config.clone();
                scope.spawn(move |_| {
                    let mut carver = SeamCarver::new(config);
                    group
                        .into_iter()
                        .map(|request| carver.process(request))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|e| panic::resume_unwind(e))
}
