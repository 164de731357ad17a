use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything carried over a pub/sub topic: acceptance pushes on
/// identity-keyed topics, chat and the terminal signal on room topics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    OrderAccepted {
        order_id: Uuid,
        driver_name: String,
    },
    ChatMessage {
        room_id: Uuid,
        from: String,
        message: String,
    },
    RideEnded {
        room_id: Uuid,
    },
}
