//! Read-loop data client base (spec §4.F.1): the lifecycle shared by every
//! data-client variant — direct devices, the controller protocol, SNMP,
//! the spectrum analyzer, and the thermal scanner. Each variant supplies a
//! `DataSource`; this module drives its `connect`/`setup_reading`/
//! `read_data`/`disconnect` through the reconnect-and-timeout-counting loop
//! the spec's pseudocode describes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::DataClientError;

/// One logical connection's read operations, supplied by each data-client
/// variant (§4.F.1-5). `connect`/`disconnect` acquire and release whatever
/// the variant talks to; `read_data` performs one unit of work — reading
/// and dispatching a device supervisor's next reading, a controller
/// telemetry frame, an SNMP poll, or a spectrum/thermal-scanner frame.
#[async_trait]
pub trait DataSource: Send {
    async fn connect(&mut self) -> Result<(), DataClientError>;

    /// One-time setup after a successful connect, before the read loop
    /// starts (§4.F.1: "setup_reading()"). Most variants have nothing to
    /// do here.
    async fn setup_reading(&mut self) -> Result<(), DataClientError> {
        Ok(())
    }

    async fn read_data(&mut self) -> Result<(), DataClientError>;

    async fn disconnect(&mut self);
}

/// Parameters shared by every read-loop data client (§4.F.1).
#[derive(Debug, Clone, Copy)]
pub struct ReadLoopConfig {
    pub max_read_timeouts: u32,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Minimum spacing between successive `read_data` calls; floored at
    /// 0.05s (§4.F.1, also enforced at config-validation time in
    /// `ess_types::DeviceConfig::validate`).
    pub rate_limit: Duration,
}

/// Drives one `DataSource` through the §4.F.1 lifecycle: connect, read
/// with rate limiting until `max_read_timeouts` consecutive failures or
/// cancellation, disconnect, cool down, repeat.
pub struct ReadLoopDriver<S: DataSource> {
    source: S,
    config: ReadLoopConfig,
    cancellation: CancellationToken,
}

impl<S: DataSource + 'static> ReadLoopDriver<S> {
    pub fn new(source: S, config: ReadLoopConfig) -> Self {
        Self { source, config, cancellation: CancellationToken::new() }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Spawns the driver as its own task and returns a handle that can stop
    /// it with a bounded grace period (§4.F.1 "Stop").
    pub fn spawn(self) -> DataClientHandle {
        let cancellation = self.cancellation.clone();
        let join = tokio::spawn(self.run());
        DataClientHandle { cancellation, join }
    }

    /// Runs the full reconnect loop to completion; returns once cancelled.
    pub async fn run(mut self) {
        while !self.cancellation.is_cancelled() {
            let connected = match tokio::time::timeout(self.config.connect_timeout, self.source.connect()).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "data client failed to connect");
                    false
                }
                Err(_) => {
                    tracing::warn!("data client connect attempt exceeded connect_timeout");
                    false
                }
            };

            if connected {
                if let Err(e) = self.source.setup_reading().await {
                    tracing::warn!(error = %e, "data client setup_reading failed");
                }
                self.read_until_timeout_or_cancelled().await;
            }

            self.source.disconnect().await;

            if !self.cancellation.is_cancelled() {
                tokio::select! {
                    _ = self.cancellation.cancelled() => {}
                    _ = tokio::time::sleep(self.config.connect_timeout) => {}
                }
            }
        }
    }

    async fn read_until_timeout_or_cancelled(&mut self) {
        let mut consecutive_timeouts: u32 = 0;
        loop {
            if self.cancellation.is_cancelled() {
                return;
            }
            // The rate-limit sleep runs concurrently with read_data (§4.F.1:
            // "schedule rate_limit sleep in parallel with read_data()").
            let rate_sleep = tokio::time::sleep(self.config.rate_limit);
            tokio::pin!(rate_sleep);

            let outcome = tokio::select! {
                _ = self.cancellation.cancelled() => return,
                result = self.source.read_data() => result,
            };

            match outcome {
                Ok(()) => consecutive_timeouts = 0,
                Err(e) => {
                    consecutive_timeouts += 1;
                    if consecutive_timeouts >= self.config.max_read_timeouts {
                        tracing::error!(
                            error = %e,
                            consecutive_timeouts,
                            "data client exceeded max_read_timeouts; disconnecting"
                        );
                        self.cancellation.cancel();
                        return;
                    }
                    tracing::warn!(error = %e, consecutive_timeouts, "data client read failed; continuing");
                }
            }

            tokio::select! {
                _ = self.cancellation.cancelled() => return,
                _ = &mut rate_sleep => {}
            }
        }
    }
}

/// A running data client's remote control (§4.F.1 "Stop"): request shutdown
/// and await the run task with a bounded grace period before hard-cancelling.
pub struct DataClientHandle {
    cancellation: CancellationToken,
    join: JoinHandle<()>,
}

impl DataClientHandle {
    pub async fn stop(self, grace_period: Duration) {
        self.cancellation.cancel();
        if tokio::time::timeout(grace_period, self.join).await.is_err() {
            tracing::warn!("data client exceeded its stop grace period; task left to finish in the background");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct AlwaysTimesOut {
        connects: Arc<AtomicU32>,
    }

    #[async_trait]
    impl DataSource for AlwaysTimesOut {
        async fn connect(&mut self) -> Result<(), DataClientError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn read_data(&mut self) -> Result<(), DataClientError> {
            Err(DataClientError::Timeout)
        }
        async fn disconnect(&mut self) {}
    }

    #[tokio::test]
    async fn stops_after_max_consecutive_timeouts() {
        let connects = Arc::new(AtomicU32::new(0));
        let source = AlwaysTimesOut { connects: connects.clone() };
        let driver = ReadLoopDriver::new(
            source,
            ReadLoopConfig {
                max_read_timeouts: 3,
                connect_timeout: Duration::from_millis(200),
                read_timeout: Duration::from_millis(50),
                rate_limit: Duration::from_millis(1),
            },
        );
        let handle = driver.spawn();
        // Give the driver time to hit the timeout threshold and cancel itself.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let stop = tokio::time::timeout(Duration::from_secs(1), handle.stop(Duration::from_millis(500))).await;
        assert!(stop.is_ok(), "stop() must complete within its grace period");
        assert_eq!(connects.load(Ordering::SeqCst), 1, "should not reconnect once cancelled");
    }

    struct AlwaysSucceeds {
        reads: Arc<AtomicU32>,
    }

    #[async_trait]
    impl DataSource for AlwaysSucceeds {
        async fn connect(&mut self) -> Result<(), DataClientError> {
            Ok(())
        }
        async fn read_data(&mut self) -> Result<(), DataClientError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn disconnect(&mut self) {}
    }

    #[tokio::test]
    async fn rate_limit_spaces_out_successful_reads() {
        let reads = Arc::new(AtomicU32::new(0));
        let source = AlwaysSucceeds { reads: reads.clone() };
        let driver = ReadLoopDriver::new(
            source,
            ReadLoopConfig {
                max_read_timeouts: 100,
                connect_timeout: Duration::from_millis(200),
                read_timeout: Duration::from_millis(200),
                rate_limit: Duration::from_millis(50),
            },
        );
        let handle = driver.spawn();
        tokio::time::sleep(Duration::from_millis(220)).await;
        handle.stop(Duration::from_millis(200)).await;
        let count = reads.load(Ordering::SeqCst);
        // ~220ms / 50ms rate limit: roughly 4-5 reads, never dozens.
        assert!(count >= 2 && count <= 8, "unexpected read count: {count}");
    }
}
