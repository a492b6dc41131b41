// =============================================================================
// Report sinks
// =============================================================================
//
// Optional fan-out of finished reports. The engine publishes after caching;
// a sink must not block.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

use crate::report::AnalysisReport;

pub trait ReportSink: Send + Sync {
    fn publish(&self, report: &AnalysisReport);
}

/// Publishes every report on a `tokio::sync::broadcast` channel.
///
/// Slow subscribers lag and lose the oldest reports; publishing with no
/// subscribers is a no-op.
pub struct BroadcastSink {
    tx: broadcast::Sender<Arc<AnalysisReport>>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AnalysisReport>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl ReportSink for BroadcastSink {
    fn publish(&self, report: &AnalysisReport) {
        match self.tx.send(Arc::new(report.clone())) {
            Ok(receivers) => trace!(symbol = %report.symbol, receivers, "report published"),
            Err(_) => trace!(symbol = %report.symbol, "report dropped, no subscribers"),
        }
    }
}
