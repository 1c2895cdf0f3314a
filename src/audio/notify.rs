use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Changes to the detector's output buffer that consumers must track.
///
/// `FramesWritten` carries a watermark that only grows within a period.
/// `PeriodStarted`, `Resynchronized`, and `Reset` move it backwards (or
/// sideways), so consumers should drop any cached view when they see one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CaptureEvent {
    FramesWritten { valid: usize },
    PeriodStarted { second: u32 },
    Resynchronized { from: usize, to: usize },
    Reset,
}

impl CaptureEvent {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureEvent::FramesWritten { .. } => "frames_written",
            CaptureEvent::PeriodStarted { .. } => "period_started",
            CaptureEvent::Resynchronized { .. } => "resynchronized",
            CaptureEvent::Reset => "reset",
        }
    }
}

/// Fan-out of capture events to bounded subscriber queues.
///
/// Publishing never blocks: a full queue loses the event and bumps the drop
/// counter, a disconnected subscriber is pruned.
pub(crate) struct Notifier {
    subscribers: Mutex<Vec<Sender<CaptureEvent>>>,
    dropped: Arc<AtomicUsize>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn subscribe(&self, capacity: usize) -> Receiver<CaptureEvent> {
        let (sender, receiver) = bounded(capacity.max(1));
        crate::lock_or_recover(&self.subscribers, "notifier.subscribe").push(sender);
        receiver
    }

    pub(crate) fn publish(&self, events: &[CaptureEvent]) {
        if events.is_empty() {
            return;
        }
        let mut subscribers = crate::lock_or_recover(&self.subscribers, "notifier.publish");
        subscribers.retain(|sender| {
            for event in events {
                match sender.try_send(*event) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Disconnected(_)) => return false,
                }
            }
            true
        });
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_counts_drops() {
        let notifier = Notifier::new();
        let rx = notifier.subscribe(1);
        notifier.publish(&[
            CaptureEvent::FramesWritten { valid: 1 },
            CaptureEvent::FramesWritten { valid: 2 },
        ]);
        assert_eq!(rx.try_recv(), Ok(CaptureEvent::FramesWritten { valid: 1 }));
        assert!(rx.try_recv().is_err());
        assert_eq!(notifier.dropped(), 1);
    }

    #[test]
    fn disconnected_subscribers_are_pruned() {
        let notifier = Notifier::new();
        let rx = notifier.subscribe(4);
        drop(rx);
        notifier.publish(&[CaptureEvent::Reset]);
        assert!(crate::lock_or_recover(&notifier.subscribers, "test").is_empty());
        assert_eq!(notifier.dropped(), 0);
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&CaptureEvent::FramesWritten { valid: 12 })
            .expect("serialize event");
        assert_eq!(json, r#"{"event":"frames_written","valid":12}"#);
    }
}
