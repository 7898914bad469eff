use insight_domain::InsightEvent;
use tokio::sync::broadcast;

const CHANNEL_BUFFER: usize = 256;

/// Fan-out of live events to websocket subscribers. Publishing with no subscribers is fine.
pub struct EventHub {
    tx: broadcast::Sender<InsightEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_BUFFER);
        Self { tx }
    }
}

impl EventHub {
    pub fn subscribe(&self) -> broadcast::Receiver<InsightEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: InsightEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use insight_domain::InsightEventKind;
    use serde_json::json;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let hub = EventHub::default();
        hub.publish(InsightEvent {
            event: InsightEventKind::GameUpdate,
            game_type: "mines".to_string(),
            user_id: None,
            data: json!({}),
            timestamp: Utc::now(),
        });

        let mut rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        hub.publish(InsightEvent {
            event: InsightEventKind::PatternDetected,
            game_type: "aviator".to_string(),
            user_id: None,
            data: json!({ "n": 1 }),
            timestamp: Utc::now(),
        });
        let event = rx.recv().await.expect("event");
        assert_eq!(event.event, InsightEventKind::PatternDetected);
        assert_eq!(event.game_type, "aviator");
    }
}
