//! Per-device poll loop.
//!
//! One poller task per target, each driving its own
//! fetch / derive / probe / enqueue / sleep cycle. Nothing a cycle does
//! can terminate the task or touch another target: failures skip to the
//! sleep, and the sleep happens regardless of the cycle's outcome.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Target;
use crate::derive::derive_sample;
use crate::nmc::NmcApi;
use crate::probe;
use crate::sample::Sample;
use crate::snmp::{oids, BulkGet};

pub struct Poller<C, N> {
    target: Target,
    snmp: C,
    nmc: N,
    tx: mpsc::Sender<Sample>,
    shutdown: CancellationToken,
}

impl<C, N> Poller<C, N>
where
    C: BulkGet,
    N: NmcApi,
{
    pub fn new(
        target: Target,
        snmp: C,
        nmc: N,
        tx: mpsc::Sender<Sample>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            target,
            snmp,
            nmc,
            tx,
            shutdown,
        }
    }

    /// Runs until shutdown. Consumes the poller; the target and its
    /// cached NMC session live and die with this task.
    pub async fn run(mut self) {
        info!(
            target = %self.target.name,
            interval = ?self.target.fetch_interval,
            "poller started"
        );

        loop {
            self.cycle().await;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!(target = %self.target.name, "poller shutting down");
                    return;
                }
                _ = tokio::time::sleep(self.target.fetch_interval) => {}
            }
        }
    }

    /// One complete cycle. Never fails; anything that goes wrong skips
    /// to the next interval.
    async fn cycle(&mut self) {
        let raw = match self.fetch_primary().await {
            Ok(raw) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!(target = %self.target.name, "empty SNMP result, skipping cycle");
                return;
            }
            Err(err) => {
                warn!(target = %self.target.name, %err, "SNMP fetch failed, skipping cycle");
                return;
            }
        };

        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let mut sample = derive_sample(&raw, &self.target, time);

        for reading in probe::acquire(&self.snmp, &self.nmc, &mut self.target).await {
            sample.push_sensor(reading.name, reading.value);
        }

        match self.tx.try_send(sample) {
            Ok(()) => {}
            Err(TrySendError::Full(sample)) => {
                warn!(
                    target = %sample.name,
                    time = sample.time,
                    "ingestion queue full, dropping sample"
                );
            }
            Err(TrySendError::Closed(_)) => {
                debug!(target = %self.target.name, "ingestion queue closed");
            }
        }
    }

    /// The primary OIDs span more subtrees than one request can carry,
    /// so they go out as two bulk GETs merged into one result.
    async fn fetch_primary(&self) -> Result<HashMap<String, String>> {
        let mut raw = self.snmp.bulk_get(oids::PRIMARY_BATCH_A).await?;
        raw.extend(self.snmp.bulk_get(oids::PRIMARY_BATCH_B).await?);
        Ok(raw)
    }
}
