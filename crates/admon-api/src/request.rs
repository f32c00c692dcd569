// Background XML request
//
// A fixed URL fetched either inline (`update`) or from a spawned task
// (`start`), once or on a repeating interval until `should_stop`. The
// latest outcome is kept behind a lock so UI-side readers never wait on
// the network.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::client::AdmonClient;
use crate::error::Error;
use crate::xml::{Row, XmlDocument};

#[derive(Debug, Clone)]
enum FetchState {
    Pending,
    Ready(XmlDocument),
    Failed(String),
}

/// State shared between the request handle and its background task.
#[derive(Debug)]
struct Shared {
    state: RwLock<FetchState>,
    completed: watch::Sender<u64>,
}

impl Shared {
    fn store(&self, url: &Url, outcome: Result<XmlDocument, Error>) -> Result<(), Error> {
        let (next, result) = match outcome {
            Ok(doc) => (FetchState::Ready(doc), Ok(())),
            Err(e) => {
                warn!(url = %url, error = %e, "xml request failed");
                (FetchState::Failed(e.to_string()), Err(e))
            }
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
        self.completed.send_modify(|n| *n += 1);
        result
    }

    fn read<T>(&self, f: impl FnOnce(&XmlDocument) -> Result<T, Error>) -> Result<T, Error> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            FetchState::Pending => Err(Error::Pending),
            FetchState::Failed(message) => Err(Error::Communication {
                message: message.clone(),
            }),
            FetchState::Ready(doc) => f(doc),
        }
    }
}

/// A fetch of one XML document whose result outlives the call.
#[derive(Debug)]
pub struct XmlRequest {
    client: AdmonClient,
    url: Url,
    repeat: Option<Duration>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl XmlRequest {
    pub fn new(client: AdmonClient, url: Url) -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            client,
            url,
            repeat: None,
            shared: Arc::new(Shared {
                state: RwLock::new(FetchState::Pending),
                completed,
            }),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Make `start` refetch every `interval` until stopped.
    pub fn repeating(mut self, interval: Duration) -> Self {
        self.repeat = Some(interval);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the document now, on the caller's task.
    ///
    /// The outcome replaces whatever an earlier fetch stored.
    pub async fn update(&self) -> Result<(), Error> {
        let outcome = self.client.fetch(self.url.clone()).await;
        self.shared.store(&self.url, outcome)
    }

    /// Fetch in a background task. Calling `start` on a request that is
    /// already running does nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() || self.cancel.is_cancelled() {
            return;
        }

        let client = self.client.clone();
        let url = self.url.clone();
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        let repeat = self.repeat;

        *task = Some(tokio::spawn(async move {
            loop {
                let outcome = client.fetch(url.clone()).await;
                // Failures are logged and stored; the loop keeps going.
                let _ = shared.store(&url, outcome);

                let Some(interval) = repeat else { break };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
            }
            debug!(url = %url, "xml request finished");
        }));
    }

    /// Ask the background task to stop after its current fetch.
    pub fn should_stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the background task and wait for it to exit.
    pub async fn stop(&self) {
        self.should_stop();
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Whether a document has been fetched successfully.
    pub fn is_ready(&self) -> bool {
        self.shared.read(|_| Ok(())).is_ok()
    }

    /// Receiver counting completed fetches, successful or not.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.completed.subscribe()
    }

    /// Snapshot of the latest document.
    pub fn document(&self) -> Result<XmlDocument, Error> {
        self.shared.read(|doc| Ok(doc.clone()))
    }

    /// Scalar value from the latest document; empty when the element is
    /// absent.
    pub fn value(&self, key: &str) -> Result<String, Error> {
        self.shared
            .read(|doc| Ok(doc.value(key).unwrap_or_default().to_owned()))
    }

    /// Rows of one section of the latest document.
    pub fn rows(&self, category: &str) -> Result<Vec<Row>, Error> {
        self.shared.read(|doc| doc.rows(category).map(<[Row]>::to_vec))
    }
}

impl Drop for XmlRequest {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
