//! Arrival notifier that logs notices and counts them.

use ps_04_realtime_reconciler::{ArrivalNotice, ArrivalNotifier};
use ps_telemetry::{metric_inc, ARRIVAL_NOTICES};
use tracing::info;

/// Stands in for the platform banner/haptics/sound sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ArrivalNotifier for TracingNotifier {
    fn notify(&self, notice: &ArrivalNotice) {
        metric_inc!(ARRIVAL_NOTICES);
        info!(
            owner = %notice.owner_id,
            activity = %notice.activity,
            state = ?notice.signal_state,
            distance_m = notice.distance_meters.round(),
            haptic = notice.haptic,
            sound = notice.sound,
            "New signal nearby"
        );
    }
}
