//! Boot Sequencer
//!
//! Fires once: after the splash delay, replace the splash screen with Login.
//! The pending transition is owned by a [`SplashGuard`]; tearing the guard
//! down (explicitly or by drop) cancels it.

use agrolens_core::{
    log_operation_start, precondition_error, AgroError, AgroResult, BootConfig, ErrorContext,
    Navigator,
};
use agrolens_navigation::routes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Login replaced the splash screen
    Navigated,
    /// Torn down before the delay elapsed
    Cancelled,
    /// The replace itself was rejected
    Failed(String),
}

/// Splash logo fade-in, opacity 0 to 1 over the splash delay
#[derive(Debug, Clone, Copy)]
pub struct SplashFade {
    duration: Duration,
}

impl SplashFade {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn opacity(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

pub struct BootSequencer {
    delay: Duration,
    started: AtomicBool,
}

impl BootSequencer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &BootConfig) -> Self {
        Self::new(Duration::from_millis(config.splash_delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the splash-to-login transition. Must be called from within a
    /// tokio runtime; a second call fails.
    pub fn start(&self, navigator: Arc<dyn Navigator>) -> AgroResult<SplashGuard> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(precondition_error!(
                "Boot sequence already started",
                "boot",
                "boot_sequencer"
            ));
        }

        log_operation_start!("boot", delay_ms = self.delay.as_millis() as u64);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    debug!("Splash torn down before delay elapsed");
                    BootOutcome::Cancelled
                }
                _ = tokio::time::sleep(delay) => match navigator.replace(routes::LOGIN) {
                    Ok(()) => {
                        info!("Splash handed over to login");
                        BootOutcome::Navigated
                    }
                    Err(e) => {
                        e.log();
                        BootOutcome::Failed(e.user_message())
                    }
                },
            }
        });

        Ok(SplashGuard {
            token,
            task: Some(task),
            fade: SplashFade::new(delay),
        })
    }
}

/// Scoped ownership of the pending transition
pub struct SplashGuard {
    token: CancellationToken,
    task: Option<JoinHandle<BootOutcome>>,
    fade: SplashFade,
}

impl SplashGuard {
    pub fn fade(&self) -> SplashFade {
        self.fade
    }

    /// Cancel the pending transition and wait for the task to settle
    pub async fn teardown(mut self) -> AgroResult<BootOutcome> {
        self.token.cancel();
        self.join().await
    }

    /// Wait for the transition without cancelling it
    pub async fn wait(mut self) -> AgroResult<BootOutcome> {
        self.join().await
    }

    async fn join(&mut self) -> AgroResult<BootOutcome> {
        let Some(task) = self.task.take() else {
            return Ok(BootOutcome::Cancelled);
        };
        task.await.map_err(|e| AgroError::Internal {
            message: format!("Boot task failed: {}", e),
            context: ErrorContext::new("boot_sequencer"),
        })
    }
}

impl Drop for SplashGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
