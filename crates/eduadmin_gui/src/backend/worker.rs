//! Background worker thread for list fetches.

mod cache;

use crate::backend::{FetchCmd, FetchEvent, Ticket};
use cache::{log_fetch_perf, ListCache};
use crossbeam_channel::{unbounded, Receiver, Sender};
use eduadmin_core::{config::env_flag_enabled, ListParams, ListSource};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::warn;

#[cfg(test)]
pub(crate) use cache::LIST_CACHE_MAX_AGE;

/// Handle for sending commands to, and receiving events from, the fetch worker.
///
/// Dropping the handle closes the command channel and ends the worker loop.
pub struct BackendHandle {
    pub cmd_tx: Sender<FetchCmd>,
    pub evt_rx: Receiver<FetchEvent>,
}

struct WorkerState {
    source: Arc<dyn ListSource>,
    evt_tx: Sender<FetchEvent>,
    cache: ListCache,
    perf_log_enabled: bool,
}

impl WorkerState {
    fn handle_list(&mut self, ticket: Ticket, resource: String, params: ListParams) {
        let started = Instant::now();
        if let Some(page) = self.cache.lookup(&resource, &params) {
            log_fetch_perf(
                self.perf_log_enabled,
                &self.cache,
                &resource,
                true,
                started.elapsed().as_secs_f64() * 1000.0,
                page.data.len(),
            );
            let _ = self.evt_tx.send(FetchEvent::Listed { ticket, page });
            return;
        }

        match self.source.fetch_list(&resource, &params) {
            Ok(page) => {
                self.cache.store(&resource, &params, &page);
                log_fetch_perf(
                    self.perf_log_enabled,
                    &self.cache,
                    &resource,
                    false,
                    started.elapsed().as_secs_f64() * 1000.0,
                    page.data.len(),
                );
                let _ = self.evt_tx.send(FetchEvent::Listed { ticket, page });
            }
            Err(error) => {
                warn!(
                    resource = resource.as_str(),
                    page = params.page,
                    "backend list failed: {}",
                    error
                );
                let _ = self.evt_tx.send(FetchEvent::Failed { ticket, error });
            }
        }
    }
}

/// Spawn the worker thread that performs blocking list fetches.
///
/// All I/O stays off the UI thread; the worker replies with [`FetchEvent`]
/// values that are polled each frame.
///
/// # Returns
/// A [`BackendHandle`] containing the command sender and event receiver.
///
/// # Panics
/// Panics if the worker thread cannot be spawned.
pub fn spawn_backend(source: Arc<dyn ListSource>) -> BackendHandle {
    let (cmd_tx, cmd_rx) = unbounded();
    let (evt_tx, evt_rx) = unbounded();

    thread::Builder::new()
        .name("eduadmin-gui-backend".to_string())
        .spawn(move || {
            let mut state = WorkerState {
                source,
                evt_tx,
                cache: ListCache::default(),
                perf_log_enabled: env_flag_enabled("EDUADMIN_BACKEND_PERF_LOG"),
            };
            for cmd in cmd_rx.iter() {
                match cmd {
                    FetchCmd::List {
                        ticket,
                        resource,
                        params,
                    } => state.handle_list(ticket, resource, params),
                    FetchCmd::InvalidateCache => state.cache.invalidate(),
                }
            }
        })
        .expect("spawn backend thread");

    BackendHandle { cmd_tx, evt_rx }
}
