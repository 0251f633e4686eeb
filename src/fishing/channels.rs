// Outbound event channel from the fishing worker to whoever observes it
use super::types::FishingEvent;
use tokio::sync::mpsc;

/// Receives events from the state machine. `emit` must never block the worker.
pub trait EventSink {
    fn emit(&self, event: FishingEvent);
}

impl EventSink for mpsc::UnboundedSender<FishingEvent> {
    fn emit(&self, event: FishingEvent) {
        // Observer may have gone away; the loop keeps running regardless
        let _ = self.send(event);
    }
}

/// Helper function to create the event channel
pub fn create_event_channel() -> (
    mpsc::UnboundedSender<FishingEvent>,
    mpsc::UnboundedReceiver<FishingEvent>,
) {
    mpsc::unbounded_channel()
}
