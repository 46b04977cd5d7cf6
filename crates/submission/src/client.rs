//! Signing client and the per-package session that drives the workflow

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use xpisign_config::constants::DEFAULT_BASE_URL;
use xpisign_config::Config;
use xpisign_errors::{Error, SubmissionError};
use xpisign_events::{EventEmitter, EventSender, FailureContext, SubmissionEvent};
use xpisign_net::{join_url, parse_url, stream_to_file, MultipartUpload, Transport};
use xpisign_signing::TokenIssuer;
use xpisign_types::{
    LocalArtifact, SigningReport, SigningRequest, StatusSnapshot, SubmissionReceipt,
    WorkflowState,
};

use crate::decode::{decode_json, Stage};
use crate::poll::PollPolicy;
use crate::state::StateTracker;

/// Multipart field the service reads the package from.
pub const UPLOAD_FIELD: &str = "upload";

/// Client for the add-on signing service
///
/// Holds everything that is shared between submissions. Every request is
/// authorised with a credential minted just before it is sent.
pub struct SigningClient<T> {
    transport: T,
    issuer: TokenIssuer,
    base_url: String,
    policy: PollPolicy,
    verify_hash: bool,
    tx: Option<EventSender>,
    cancel: CancellationToken,
}

impl<T: Transport> SigningClient<T> {
    #[must_use]
    pub fn builder(transport: T, issuer: TokenIssuer) -> SigningClientBuilder<T> {
        SigningClientBuilder::new(transport, issuer)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Token that aborts in-flight work when cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Start a session for one package
    #[must_use]
    pub fn session<'a>(&'a self, request: &'a SigningRequest) -> Session<'a, T> {
        Session {
            client: self,
            request,
            tracker: StateTracker::new(),
            polls: 0,
        }
    }

    /// Submit, poll and download `request` in one go
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage. Nothing is retried.
    pub async fn register(&self, request: &SigningRequest) -> Result<SigningReport, Error> {
        self.session(request).run().await
    }

    fn authorization(&self) -> Result<String, Error> {
        Ok(self.issuer.issue()?.authorization())
    }

    async fn cancellable<F, R>(&self, fut: F) -> Result<R, Error>
    where
        F: Future<Output = Result<R, Error>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }

    async fn sleep(&self, delay: Duration) -> Result<(), Error> {
        self.cancellable(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }
}

/// Builder for [`SigningClient`]
pub struct SigningClientBuilder<T> {
    transport: T,
    issuer: TokenIssuer,
    base_url: String,
    policy: PollPolicy,
    verify_hash: bool,
    tx: Option<EventSender>,
    cancel: Option<CancellationToken>,
}

impl<T: Transport> SigningClientBuilder<T> {
    #[must_use]
    pub fn new(transport: T, issuer: TokenIssuer) -> Self {
        Self {
            transport,
            issuer,
            base_url: DEFAULT_BASE_URL.to_string(),
            policy: PollPolicy::default(),
            verify_hash: true,
            tx: None,
            cancel: None,
        }
    }

    /// Take base URL, poll policy and hash verification from `config`
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.base_url.clone_from(&config.service.base_url);
        self.policy = PollPolicy::from(&config.poll);
        self.verify_hash = config.download.verify_hash;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_verify_hash(mut self, verify_hash: bool) -> Self {
        self.verify_hash = verify_hash;
        self
    }

    /// Set event sender for progress reporting
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn build(self) -> Result<SigningClient<T>, Error> {
        parse_url(&self.base_url)?;

        let mut policy = self.policy;
        policy.max_attempts = policy.max_attempts.max(1);

        Ok(SigningClient {
            transport: self.transport,
            issuer: self.issuer,
            base_url: self.base_url,
            policy,
            verify_hash: self.verify_hash,
            tx: self.tx,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// One package moving through submit, poll and download
///
/// Stages must run in order; calling one out of turn fails with an
/// internal error instead of sending anything.
pub struct Session<'a, T> {
    client: &'a SigningClient<T>,
    request: &'a SigningRequest,
    tracker: StateTracker,
    polls: u32,
}

impl<T> EventEmitter for Session<'_, T> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.client.tx.as_ref()
    }

    fn correlation_id(&self) -> Option<&str> {
        Some(&self.request.addon_id)
    }
}

impl<T: Transport> Session<'_, T> {
    #[must_use]
    pub fn state(&self) -> Option<WorkflowState> {
        self.tracker.current()
    }

    #[must_use]
    pub fn history(&self) -> &[WorkflowState] {
        self.tracker.history()
    }

    /// Number of status requests made so far
    #[must_use]
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Run every stage, recording a failure if one of them errors
    ///
    /// # Errors
    ///
    /// Returns the error of the stage that failed.
    pub async fn run(mut self) -> Result<SigningReport, Error> {
        self.emit_operation_started("sign");

        match self.run_stages().await {
            Ok(report) => {
                self.emit_operation_completed("sign", true);
                Ok(report)
            }
            Err(err) => {
                let stage = self.tracker.current();
                if stage.is_none_or(|state| !state.is_terminal()) {
                    if let Err(e) = self.enter(WorkflowState::Failed) {
                        self.emit_debug(format!("could not record failure: {e}"));
                    }
                }
                self.emit_submission(SubmissionEvent::Failed {
                    stage,
                    failure: FailureContext::from_error(&err),
                });
                Err(err)
            }
        }
    }

    async fn run_stages(&mut self) -> Result<SigningReport, Error> {
        let receipt = self.submit().await?;
        let snapshot = self.poll(&receipt).await?;
        let artifact = self.download(&snapshot).await?;

        Ok(SigningReport {
            guid: receipt.guid,
            state: WorkflowState::Downloaded,
            artifact,
            polls: self.polls,
        })
    }

    /// Upload the package
    ///
    /// # Errors
    ///
    /// `Io` if the package cannot be read (nothing is sent), `Signing` if
    /// no credential can be minted, `Network` for transport failures and
    /// non-2xx statuses, `Decode` for an unparseable receipt.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, Error> {
        self.require(None)?;
        let client = self.client;
        let request = self.request;

        let contents = tokio::fs::read(&request.source)
            .await
            .map_err(|e| Error::io_with_path(&e, &request.source))?;
        let url = join_url(&client.base_url, &request.version_path())?;

        self.emit_submission(SubmissionEvent::Uploading {
            addon_id: request.addon_id.clone(),
            version: request.version.clone(),
            file_name: request.file_name.clone(),
            size: contents.len() as u64,
        });

        let authorization = client.authorization()?;
        let upload = MultipartUpload::new(UPLOAD_FIELD, request.file_name.clone(), contents);
        let receipt: SubmissionReceipt = client
            .cancellable(async {
                let response = client
                    .transport
                    .put_multipart(url.as_str(), &authorization, upload)
                    .await?;
                decode_json(response, Stage::Submit).await
            })
            .await?;

        self.enter(WorkflowState::Submitted)?;
        self.emit_submission(SubmissionEvent::Submitted {
            guid: receipt.guid.clone(),
            status_url: receipt.url.clone(),
        });

        Ok(receipt)
    }

    /// Wait for the service to process the upload
    ///
    /// Stops at the first snapshot with `processed` set, when the attempts
    /// run out, or when the next wait would overrun `max_wait`. The last
    /// snapshot is returned either way.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the token fires, otherwise the first network, decode
    /// or signing error.
    pub async fn poll(&mut self, receipt: &SubmissionReceipt) -> Result<StatusSnapshot, Error> {
        self.require(Some(WorkflowState::Submitted))?;
        let client = self.client;
        let policy = &client.policy;
        let mut waited = Duration::ZERO;
        let mut snapshot = None;

        for attempt in 1..=policy.max_attempts {
            let delay = policy.delay_for(attempt);
            if attempt > 1 && !policy.within_budget(waited, delay) {
                self.emit_debug(format!(
                    "poll budget exhausted after {}s",
                    waited.as_secs()
                ));
                break;
            }

            self.emit_submission(SubmissionEvent::PollScheduled {
                attempt,
                max_attempts: policy.max_attempts,
                delay,
            });
            client.sleep(delay).await?;
            waited += delay;

            let authorization = client.authorization()?;
            let current: StatusSnapshot = client
                .cancellable(async {
                    let response = client.transport.get(&receipt.url, &authorization).await?;
                    decode_json(response, Stage::Status).await
                })
                .await?;

            self.polls = attempt;
            if attempt == 1 {
                self.enter(WorkflowState::Polled)?;
            }
            self.emit_submission(SubmissionEvent::Polled {
                attempt,
                processed: current.processed,
                valid: current.valid,
            });

            let processed = current.processed;
            snapshot = Some(current);
            if processed {
                break;
            }
        }

        let snapshot =
            snapshot.ok_or_else(|| Error::internal("poll finished without a status response"))?;
        if !snapshot.processed {
            self.emit_warning(format!(
                "upload {} still processing after {} status checks",
                receipt.guid, self.polls
            ));
        }
        Ok(snapshot)
    }

    /// Fetch the first signed file of `snapshot`
    ///
    /// # Errors
    ///
    /// `ValidationFailed` or `NoFilesAvailable` before anything is sent,
    /// `Network` for transport, status and checksum failures, `Io` if the
    /// destination cannot be written.
    pub async fn download(&mut self, snapshot: &StatusSnapshot) -> Result<LocalArtifact, Error> {
        self.require(Some(WorkflowState::Polled))?;
        let client = self.client;

        self.emit_submission(SubmissionEvent::Validated {
            guid: snapshot.guid.clone(),
            valid: snapshot.valid,
            errors: snapshot.error_count(),
            warnings: snapshot.warning_count(),
            notices: snapshot.notice_count(),
            files: snapshot.files.len(),
        });

        if !snapshot.valid {
            return Err(SubmissionError::ValidationFailed {
                guid: snapshot.guid.clone(),
                processed: snapshot.processed,
                errors: snapshot.error_count(),
                warnings: snapshot.warning_count(),
            }
            .into());
        }

        let file = snapshot
            .first_file()
            .ok_or_else(|| SubmissionError::NoFilesAvailable {
                guid: snapshot.guid.clone(),
            })?;
        let destination = self.request.destination();
        let expected = file.sha256().filter(|_| client.verify_hash);

        self.emit_submission(SubmissionEvent::DownloadStarted {
            url: file.download_url.clone(),
            destination: destination.clone(),
        });

        let authorization = client.authorization()?;
        let result = client
            .cancellable(async {
                let response = client
                    .transport
                    .get(&file.download_url, &authorization)
                    .await?
                    .error_for_status()
                    .await?;
                stream_to_file(response.body, &destination, expected).await
            })
            .await?;

        self.enter(WorkflowState::Downloaded)?;
        self.emit_submission(SubmissionEvent::DownloadCompleted {
            path: result.path.clone(),
            size: result.size,
            sha256: result.sha256.clone(),
            verified: result.verified,
        });

        Ok(LocalArtifact {
            path: result.path,
            size: result.size,
            sha256: result.sha256,
        })
    }

    fn require(&self, expected: Option<WorkflowState>) -> Result<(), Error> {
        if self.tracker.current() == expected {
            return Ok(());
        }
        Err(Error::internal(format!(
            "stage called out of order: session is {}",
            self.tracker
                .current()
                .map_or("not started", WorkflowState::as_str)
        )))
    }

    fn enter(&mut self, next: WorkflowState) -> Result<(), Error> {
        let from = self.tracker.transition(next)?;
        self.emit_submission(SubmissionEvent::StateChanged { from, to: next });
        Ok(())
    }
}
