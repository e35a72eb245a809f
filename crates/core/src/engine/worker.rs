//! Runs the blocking engine client on its own task
//!
//! The engine lives on a `spawn_blocking` task and is only reachable
//! through request messages, so a slow or dead engine never blocks the
//! caller that owns the game. Timeouts are applied here, per request.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::analysis::PositionAnalysis;
use super::config::EngineConfig;
use super::stockfish::{EngineError, KillSwitch, StockfishEngine};

const QUEUE_SIZE: usize = 16;
/// How long `shutdown` lets the engine quit on its own before killing it
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

pub enum EngineRequest {
    /// Up to `count` best moves for the position `record`, best first
    BestMoves {
        record: String,
        count: u8,
        reply: Reply<Vec<String>>,
    },
    /// Single-line analysis of `record` to `depth`
    Analyze {
        record: String,
        depth: u8,
        reply: Reply<PositionAnalysis>,
    },
}

/// Caller-side end of the engine worker
pub struct EngineHandle {
    requests: mpsc::Sender<EngineRequest>,
    worker: JoinHandle<()>,
    kill: KillSwitch,
    timeout: Duration,
    multipv: u8,
}

impl EngineHandle {
    /// Starts the engine on a blocking task and waits for its handshake.
    ///
    /// A missing or broken engine binary surfaces here as an error; the
    /// caller can carry on without an engine. An engine that does not
    /// finish the handshake in time is killed.
    pub async fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let mut engine = StockfishEngine::spawn(&config)?;
        let kill = engine.kill_switch();

        let (requests, mut inbox) = mpsc::channel::<EngineRequest>(QUEUE_SIZE);
        let (ready_tx, ready_rx) = oneshot::channel();
        let timeout = config.timeout();
        let multipv = config.multipv.max(1);

        let worker = tokio::task::spawn_blocking(move || {
            let handshake = engine.handshake();
            let failed = handshake.is_err();
            let _ = ready_tx.send(handshake);
            if failed {
                return;
            }

            while let Some(request) = inbox.blocking_recv() {
                match request {
                    EngineRequest::BestMoves { record, count, reply } => {
                        let _ = reply.send(engine.best_moves(&record, count));
                    }
                    EngineRequest::Analyze { record, depth, reply } => {
                        let result = engine
                            .set_position(Some(&record), &[])
                            .and_then(|_| engine.analyze(depth));
                        let _ = reply.send(result);
                    }
                }

                if engine.is_killed() {
                    // queued requests see their reply channel close
                    warn!("engine was killed, worker stopping");
                    return;
                }
            }
            debug!("engine worker stopping");
        });

        match tokio::time::timeout(timeout, ready_rx).await {
            Ok(Ok(Ok(()))) => {
                info!("engine worker started");
                Ok(EngineHandle {
                    requests,
                    worker,
                    kill,
                    timeout,
                    multipv,
                })
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(EngineError::WorkerGone),
            Err(_) => {
                kill.kill();
                Err(EngineError::Timeout(timeout))
            }
        }
    }

    /// Best moves using the configured MultiPV count.
    pub async fn suggest(&self, record: &str) -> Result<Vec<String>, EngineError> {
        self.best_moves(record, self.multipv).await
    }

    pub async fn best_moves(&self, record: &str, count: u8) -> Result<Vec<String>, EngineError> {
        let (reply, answer) = oneshot::channel();
        self.submit(
            EngineRequest::BestMoves {
                record: record.to_string(),
                count,
                reply,
            },
            answer,
        )
        .await
    }

    pub async fn analyze(&self, record: &str, depth: u8) -> Result<PositionAnalysis, EngineError> {
        let (reply, answer) = oneshot::channel();
        self.submit(
            EngineRequest::Analyze {
                record: record.to_string(),
                depth,
                reply,
            },
            answer,
        )
        .await
    }

    /// False once the engine has been killed after a timeout.
    pub fn is_alive(&self) -> bool {
        !self.kill.is_killed() && !self.worker.is_finished()
    }

    /// Sends `request` and waits for its answer. A request that runs past
    /// the timeout kills the engine; every later request then fails with
    /// [`EngineError::WorkerGone`].
    async fn submit<T>(
        &self,
        request: EngineRequest,
        answer: oneshot::Receiver<Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        if self.kill.is_killed() {
            return Err(EngineError::WorkerGone);
        }
        self.requests
            .send(request)
            .await
            .map_err(|_| EngineError::WorkerGone)?;

        match tokio::time::timeout(self.timeout, answer).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(EngineError::WorkerGone),
            Err(_) => {
                warn!(timeout = ?self.timeout, "engine request timed out, killing engine");
                self.kill.kill();
                Err(EngineError::Timeout(self.timeout))
            }
        }
    }

    /// Closes the request queue and waits for the engine to quit, killing
    /// it if it does not within a short grace period.
    pub async fn shutdown(mut self) {
        drop(self.requests);

        if let Ok(joined) = tokio::time::timeout(SHUTDOWN_GRACE, &mut self.worker).await {
            if let Err(e) = joined {
                warn!(error = %e, "engine worker panicked");
            }
            return;
        }

        warn!("engine did not quit, killing it");
        self.kill.kill();
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut self.worker).await {
            Ok(Err(e)) => warn!(error = %e, "engine worker panicked"),
            Ok(Ok(())) => {}
            Err(_) => warn!("engine worker still blocked after kill"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_engine_is_reported() {
        let config = EngineConfig {
            path: "/nonexistent/engine-binary".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            EngineHandle::start(config).await,
            Err(EngineError::Spawn(_))
        ));
    }
}
