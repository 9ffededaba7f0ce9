use std::sync::Arc;

use config_parser::config::SignerConfig;
use crypto_handler::{HandlerRegistry, SchemeHandler};
use crypto_transport::{DealerSocket, FrameSink, FrameSource};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, instrument};

use crate::dispatcher::Dispatcher;
use crate::error::SignerProcessorError;
use crate::registration::register_schemes;
use crate::worker::Worker;

/// Signer process: a set of scheme handlers served over one upstream connection.
pub struct SignerProcessor {
    config: SignerConfig,
    registry: HandlerRegistry,
}

impl SignerProcessor {
    pub fn new(config: SignerConfig) -> Self {
        Self {
            config,
            registry: HandlerRegistry::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn SchemeHandler>) -> Result<(), SignerProcessorError> {
        self.registry.add(handler)?;
        Ok(())
    }

    pub fn schemes(&self) -> Vec<String> {
        self.registry.schemes().map(str::to_string).collect()
    }

    /// Connects to the configured router and starts serving.
    #[instrument(level = "info", skip(self, cancellation_token), fields(url = self.config.router.url))]
    pub async fn start(self, cancellation_token: CancellationToken) -> Result<SignerHandle, SignerProcessorError> {
        self.config.validate()?;
        let addr = self.config.router.socket_addr()?;
        let (sink, source) = DealerSocket::connect(addr, cancellation_token.clone())
            .await?
            .into_split();
        self.start_with_transport(sink, source, cancellation_token).await
    }

    /// Spawns the workers, registers every scheme, then hands the connection to the dispatcher.
    ///
    /// Returns once all registrations are acknowledged. Any registration failure cancels
    /// `cancellation_token` and is returned as is.
    pub async fn start_with_transport<S, R>(
        self,
        sink: S,
        mut source: R,
        cancellation_token: CancellationToken,
    ) -> Result<SignerHandle, SignerProcessorError>
    where
        S: FrameSink + 'static,
        R: FrameSource + 'static,
    {
        self.config.validate()?;
        let schemes = self.schemes();
        let registry = Arc::new(self.registry);

        let (work_sender, work_receiver) = mpsc::channel(self.config.queue_size);
        let (reply_sender, mut reply_receiver) = mpsc::unbounded_channel();
        let queue = Arc::new(Mutex::new(work_receiver));

        let tracker = TaskTracker::new();
        for id in 0..self.config.workers {
            tracker.spawn(
                Worker {
                    id,
                    queue: queue.clone(),
                    registry: registry.clone(),
                    replies: reply_sender.clone(),
                    cancellation_token: cancellation_token.clone(),
                }
                .run(),
            );
        }
        tracker.close();
        drop(reply_sender);
        info!(workers = self.config.workers, queue_size = self.config.queue_size, "Worker pool started");

        if let Err(e) = register_schemes(
            &sink,
            &mut source,
            &schemes,
            &work_sender,
            &mut reply_receiver,
            &cancellation_token,
        )
        .await
        {
            error!("Registration failed: {e}");
            cancellation_token.cancel();
            tracker.wait().await;
            return Err(e);
        }
        info!(?schemes, "All schemes registered");

        let dispatcher = Dispatcher::new(
            sink,
            source,
            work_sender,
            reply_receiver,
            cancellation_token.clone(),
        );
        Ok(SignerHandle {
            dispatcher: tokio::spawn(dispatcher.run()),
            tracker,
            cancellation_token,
            schemes,
        })
    }
}

/// Running signer. Dropping it leaves the tasks running until the token is cancelled.
pub struct SignerHandle {
    dispatcher: JoinHandle<Result<(), SignerProcessorError>>,
    tracker: TaskTracker,
    cancellation_token: CancellationToken,
    schemes: Vec<String>,
}

impl SignerHandle {
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub async fn shutdown(self) -> Result<(), SignerProcessorError> {
        self.cancellation_token.cancel();
        self.join().await
    }

    /// Waits for the dispatcher and every worker to stop.
    pub async fn join(self) -> Result<(), SignerProcessorError> {
        let result = self
            .dispatcher
            .await
            .map_err(|e| SignerProcessorError::TaskFailed(e.to_string()))?;
        self.tracker.wait().await;
        info!("Signer processor stopped");
        result
    }
}
