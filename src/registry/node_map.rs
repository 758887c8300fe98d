// src/registry/node_map.rs
// =============================================================================
// The visitation registry: which pages have been discovered, keyed by
// normalized address.
//
// How it works:
// 1. NodeMap::spawn starts one tokio task (the registry loop) that owns the
//    HashMap of pages. Nothing else ever touches that map.
// 2. NodeMap is a cheap, cloneable handle. Each call sends a Request down an
//    unbounded channel, together with a oneshot channel for the answer, then
//    waits on that oneshot.
// 3. The loop handles one request at a time, in arrival order, until the
//    shutdown signal fires or every handle has been dropped.
//
// Because the duplicate check and the insert for an Add happen in the same
// loop iteration, two workers racing to Add the same page can never both win.
//
// After shutdown, calls return RegistryError::Shutdown instead of blocking:
// - handles check the signal before sending
// - once the loop exits its receiver is dropped, so sends fail and any queued
//   request's oneshot sender is dropped, which wakes the waiting caller
// =============================================================================

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use super::{normalize_key, RegistryError, Shutdown};
use crate::graph::Page;

// One message per registry operation. Each carries its own reply channel so
// concurrent callers never see each other's answers.
enum Request {
    Add {
        key: String,
        page: Arc<Page>,
        reply: oneshot::Sender<Result<(), RegistryError>>,
    },
    Exists {
        key: String,
        reply: oneshot::Sender<Option<Arc<Page>>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<(String, Arc<Page>)>>,
    },
}

/// Handle to the visitation registry. Clone it freely; all clones talk to the
/// same loop.
#[derive(Debug, Clone)]
pub struct NodeMap {
    requests: mpsc::UnboundedSender<Request>,
    shutdown: Shutdown,
}

impl NodeMap {
    /// Starts the registry loop on the current tokio runtime.
    ///
    /// The loop runs until `shutdown` is triggered or every handle is dropped.
    pub fn spawn(shutdown: &Shutdown) -> Self {
        let (requests, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_loop(rx, shutdown.clone()));
        Self {
            requests,
            shutdown: shutdown.clone(),
        }
    }

    /// Registers `page` under the normalized key of `address`.
    ///
    /// Fails with `KeyExists` if that key is already taken. The losing caller
    /// should treat the page as handled by someone else.
    pub async fn add(&self, address: impl AsRef<str>, page: Arc<Page>) -> Result<(), RegistryError> {
        let key = normalize_key(address.as_ref())?;
        let (reply, answer) = oneshot::channel();
        self.send(Request::Add { key, page, reply })?;
        answer.await.map_err(|_| RegistryError::Shutdown)?
    }

    /// Looks up the page registered under the normalized key of `address`.
    ///
    /// `Ok(None)` means nothing is registered there yet.
    pub async fn exists(&self, address: impl AsRef<str>) -> Result<Option<Arc<Page>>, RegistryError> {
        let key = normalize_key(address.as_ref())?;
        let (reply, answer) = oneshot::channel();
        self.send(Request::Exists { key, reply })?;
        answer.await.map_err(|_| RegistryError::Shutdown)
    }

    /// Every registered page with its key, sorted by key.
    pub async fn pages(&self) -> Result<Vec<(String, Arc<Page>)>, RegistryError> {
        let (reply, answer) = oneshot::channel();
        self.send(Request::Snapshot { reply })?;
        answer.await.map_err(|_| RegistryError::Shutdown)
    }

    fn send(&self, request: Request) -> Result<(), RegistryError> {
        if self.shutdown.is_triggered() {
            return Err(RegistryError::Shutdown);
        }
        self.requests
            .send(request)
            .map_err(|_| RegistryError::Shutdown)
    }
}

// The registry loop. Owns the page map for its whole life.
//
// Returns the number of pages registered when it stopped.
async fn run_loop(mut requests: mpsc::UnboundedReceiver<Request>, shutdown: Shutdown) -> usize {
    let mut pages: HashMap<String, Arc<Page>> = HashMap::new();

    let stopped = shutdown.wait();
    tokio::pin!(stopped);

    loop {
        tokio::select! {
            _ = &mut stopped => {
                debug!("registry loop stopping on shutdown");
                break;
            }
            request = requests.recv() => match request {
                Some(request) => handle(&mut pages, request),
                None => {
                    debug!("registry loop stopping, all handles dropped");
                    break;
                }
            },
        }
    }

    pages.len()
}

// A failed reply send only means the caller stopped waiting, so it is ignored
fn handle(pages: &mut HashMap<String, Arc<Page>>, request: Request) {
    match request {
        Request::Add { key, page, reply } => {
            let result = if pages.contains_key(&key) {
                debug!("key exists: {}", key);
                Err(RegistryError::KeyExists(key))
            } else {
                debug!("registered {}", key);
                pages.insert(key, page);
                Ok(())
            };
            let _ = reply.send(result);
        }
        Request::Exists { key, reply } => {
            let _ = reply.send(pages.get(&key).cloned());
        }
        Request::Snapshot { reply } => {
            let mut snapshot: Vec<(String, Arc<Page>)> = pages
                .iter()
                .map(|(key, page)| (key.clone(), Arc::clone(page)))
                .collect();
            snapshot.sort_by(|a, b| a.0.cmp(&b.0));
            let _ = reply.send(snapshot);
        }
    }
}
