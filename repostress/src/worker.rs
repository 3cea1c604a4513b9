//! The upload and download worker loops.

use std::fmt;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use yansi::Paint;

use crate::artifact::Artifact;
use crate::config::Config;
use crate::distributor::{Distributor, TryPop};
use crate::endpoint::{Endpoint, Outcome};

/// The role a worker plays, for log attribution.
#[derive(Debug, Clone, Copy)]
enum Role {
    Upload,
    Download,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Upload => f.pad("upload"),
            Role::Download => f.pad("download"),
        }
    }
}

/// Writes one classified log line for an attempt.
///
/// Successes go green to stdout, error-class outcomes red to stderr. This
/// stream of lines is the product output of the tool; there is no aggregate
/// summary at shutdown.
fn report(role: Role, worker_id: usize, path: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Success(status) => {
            let line = format!("{} - {role:<8} worker {worker_id} - {path}", status.as_u16());
            println!("{}", line.green());
        }
        Outcome::Failed(status) => {
            let line = format!("{} - {role:<8} worker {worker_id} - {path}", status.as_u16());
            eprintln!("{}", line.red());
        }
        Outcome::Transport(err) => {
            let line = format!("ERR - {role:<8} worker {worker_id} - {path} - {err}");
            eprintln!("{}", line.red());
        }
    }
}

/// Runs one upload worker until `shutdown` is cancelled.
///
/// Per iteration this generates a fresh artifact, uploads it under a path
/// derived from the worker identity and the content digest, and publishes
/// the path to the distributor if (and only if) the upload succeeded.
/// A failed attempt is logged, its content discarded, and the next
/// iteration starts over with a new artifact; there is no retry.
pub(crate) async fn upload(
    worker_id: usize,
    endpoint: Arc<dyn Endpoint>,
    config: Config,
    distributor: Arc<Distributor>,
    shutdown: CancellationToken,
) {
    tracing::debug!(worker_id, "upload worker starting");
    let size = config.file_size.as_u64() as usize;

    while !shutdown.is_cancelled() {
        let artifact = Artifact::generate(size);
        let path = artifact.object_path(&config.repo, worker_id);

        let outcome = Outcome::classify(endpoint.upload(&path, artifact.content).await);
        report(Role::Upload, worker_id, &path, &outcome);

        if outcome.is_success() {
            // The push blocks on a full queue; bail out if shutdown wins.
            tokio::select! {
                delivered = distributor.push(path) => {
                    if !delivered {
                        break;
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }
    }

    tracing::debug!(worker_id, "upload worker stopped");
}

/// Runs one download worker until the distributor is closed and drained.
///
/// Fresh paths from the distributor take priority and are recorded into the
/// worker's private [`AssignedSet`]. When nothing fresh is pending, a
/// uniformly random previously assigned path is replayed. A worker without
/// any history parks on the distributor instead of spinning.
pub(crate) async fn download(
    worker_id: usize,
    endpoint: Arc<dyn Endpoint>,
    distributor: Arc<Distributor>,
) {
    tracing::debug!(worker_id, "download worker starting");
    let mut assigned = AssignedSet::default();
    let mut rng = SmallRng::from_os_rng();

    loop {
        let path = match distributor.try_pop() {
            TryPop::Item(path) => assigned.record(path),
            TryPop::Closed => break,
            TryPop::Empty => match assigned.replay(&mut rng) {
                Some(path) => path,
                // No history yet; park until fresh work arrives.
                None => match distributor.pop().await {
                    Some(path) => assigned.record(path),
                    None => break,
                },
            },
        };

        let outcome = Outcome::classify(endpoint.download(&path).await);
        report(Role::Download, worker_id, &path, &outcome);
    }

    tracing::debug!(worker_id, "download worker stopped");
}

/// A download worker's private memory of the paths it has received fresh
/// from the distributor.
///
/// Append-only: replays never re-insert, nothing is ever evicted, and paths
/// are never handed to another worker. Load across download workers can
/// skew over time because of this stickiness; that imbalance is a known,
/// accepted tradeoff.
#[derive(Debug, Default)]
struct AssignedSet {
    paths: Vec<String>,
}

impl AssignedSet {
    /// Records a path freshly received from the distributor.
    fn record(&mut self, path: String) -> String {
        self.paths.push(path.clone());
        path
    }

    /// Selects a uniformly random previously assigned path, if any.
    fn replay(&self, rng: &mut SmallRng) -> Option<String> {
        if self.paths.is_empty() {
            return None;
        }
        Some(self.paths[rng.random_range(0..self.paths.len())].clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use bytesize::ByteSize;
    use reqwest::Response;
    use tokio::time::timeout;

    use super::*;

    /// What a [`ScriptedEndpoint`] answers to one call.
    #[derive(Debug, Clone, Copy)]
    pub(crate) enum Reply {
        Status(u16),
        Transport,
    }

    /// An endpoint answering from a fixed script, then from a fallback,
    /// recording the paths of all calls it receives.
    #[derive(Debug)]
    pub(crate) struct ScriptedEndpoint {
        script: Mutex<VecDeque<Reply>>,
        fallback: Reply,
        uploads: Mutex<Vec<String>>,
        downloads: Mutex<Vec<String>>,
    }

    impl ScriptedEndpoint {
        pub(crate) fn new(script: impl IntoIterator<Item = Reply>, fallback: Reply) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                fallback,
                uploads: Mutex::new(Vec::new()),
                downloads: Mutex::new(Vec::new()),
            })
        }

        fn reply(&self) -> anyhow::Result<Response> {
            let reply = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.fallback);

            match reply {
                Reply::Status(status) => Ok(http::Response::builder()
                    .status(status)
                    .body("")
                    .unwrap()
                    .into()),
                Reply::Transport => Err(anyhow::anyhow!("scripted transport failure")),
            }
        }

        pub(crate) fn uploads(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }

        pub(crate) fn downloads(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Endpoint for ScriptedEndpoint {
        async fn upload(&self, path: &str, _content: Bytes) -> anyhow::Result<Response> {
            self.uploads.lock().unwrap().push(path.to_owned());
            // Yield like a real network call would, so spinning worker
            // loops stay fair on a single-threaded test runtime.
            tokio::task::yield_now().await;
            self.reply()
        }

        async fn download(&self, path: &str) -> anyhow::Result<Response> {
            self.downloads.lock().unwrap().push(path.to_owned());
            tokio::task::yield_now().await;
            self.reply()
        }
    }

    pub(crate) fn test_config() -> Config {
        Config {
            upload_workers: 1,
            download_workers: 1,
            file_size: ByteSize::kib(1),
            repo: "test-repo".into(),
        }
    }

    #[tokio::test]
    async fn upload_publishes_only_successful_paths() {
        let endpoint = ScriptedEndpoint::new(
            [
                Reply::Status(200),
                Reply::Status(500),
                Reply::Transport,
                Reply::Status(201),
            ],
            Reply::Transport,
        );
        let distributor = Arc::new(Distributor::new(10));
        let shutdown = CancellationToken::new();

        let worker = tokio::spawn(upload(
            1,
            endpoint.clone(),
            test_config(),
            Arc::clone(&distributor),
            shutdown.clone(),
        ));

        timeout(Duration::from_secs(5), async {
            while endpoint.uploads().len() < 6 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        shutdown.cancel();
        worker.await.unwrap();

        let uploads = endpoint.uploads();
        assert!(uploads[0].starts_with("test-repo/1/"));

        // Exactly the two successful attempts got published, in order.
        let mut published = Vec::new();
        while let TryPop::Item(path) = distributor.try_pop() {
            published.push(path);
        }
        assert_eq!(published, vec![uploads[0].clone(), uploads[3].clone()]);
    }

    #[tokio::test]
    async fn download_replays_assigned_paths_when_queue_is_empty() {
        let endpoint = ScriptedEndpoint::new([], Reply::Status(200));
        let distributor = Arc::new(Distributor::new(5));

        assert!(distributor.push("test-repo/1/aabbcc".into()).await);

        let worker = tokio::spawn(download(1, endpoint.clone(), Arc::clone(&distributor)));

        timeout(Duration::from_secs(5), async {
            while endpoint.downloads().len() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        distributor.close();
        worker.await.unwrap();

        let downloads = endpoint.downloads();
        assert!(downloads.len() >= 3);
        assert!(downloads.iter().all(|path| path == "test-repo/1/aabbcc"));
    }

    #[tokio::test]
    async fn download_without_history_parks_instead_of_downloading() {
        let endpoint = ScriptedEndpoint::new([], Reply::Status(200));
        let distributor = Arc::new(Distributor::new(5));

        let worker = tokio::spawn(download(1, endpoint.clone(), Arc::clone(&distributor)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(endpoint.downloads().is_empty());

        distributor.close();
        timeout(Duration::from_secs(1), worker).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn download_stops_once_closed_and_drained() {
        let endpoint = ScriptedEndpoint::new([], Reply::Status(200));
        let distributor = Arc::new(Distributor::new(5));

        assert!(distributor.push("test-repo/1/aabbcc".into()).await);
        distributor.close();

        let worker = tokio::spawn(download(1, endpoint.clone(), Arc::clone(&distributor)));
        timeout(Duration::from_secs(1), worker).await.unwrap().unwrap();

        // The buffered path was still downloaded before stopping.
        assert!(!endpoint.downloads().is_empty());
    }

    #[test]
    fn replay_does_not_grow_the_assigned_set() {
        let mut assigned = AssignedSet::default();
        let mut rng = SmallRng::seed_from_u64(42);

        assigned.record("test-repo/1/aabbcc".into());
        for _ in 0..100 {
            assert_eq!(assigned.replay(&mut rng).unwrap(), "test-repo/1/aabbcc");
        }

        assert_eq!(assigned.paths.len(), 1);
    }
}
