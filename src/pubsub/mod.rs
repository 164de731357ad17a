use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::event::Event;

/// Address of one pub/sub channel: a client's identity for acceptance
/// pushes, an order id for its ride-chat room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Client(String),
    Room(Uuid),
}

/// Transient broadcast relay. Channels are created on first subscribe,
/// carry no history, and deliver best-effort to whoever is subscribed at
/// publish time.
pub struct Topics {
    channels: DashMap<Topic, broadcast::Sender<Event>>,
    capacity: usize,
}

impl Topics {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels
            .entry(topic)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Fans the event to current subscribers; returns how many received it.
    /// Never blocks and never fails the caller: no channel or no subscriber
    /// means the event is simply dropped.
    pub fn publish(&self, topic: &Topic, event: Event) -> usize {
        match self.channels.get(topic) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Tears the channel down. Subscribers drain what was already published,
    /// then see end-of-stream.
    pub fn close(&self, topic: &Topic) {
        self.channels.remove(topic);
    }

    /// Drops the channel if its last subscriber is gone. Called by socket
    /// handlers on disconnect so abandoned topics do not accumulate.
    pub fn release(&self, topic: &Topic) {
        self.channels
            .remove_if(topic, |_, tx| tx.receiver_count() == 0);
    }

    pub fn open_rooms(&self) -> usize {
        self.channels
            .iter()
            .filter(|entry| matches!(entry.key(), Topic::Room(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Topic, Topics};
    use crate::models::event::Event;

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let topics = Topics::new(16);
        let delivered = topics.publish(
            &Topic::Client("client-1".to_string()),
            Event::OrderAccepted {
                order_id: Uuid::new_v4(),
                driver_name: "Dan".to_string(),
            },
        );

        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn room_fans_out_to_all_members() {
        let topics = Topics::new(16);
        let room = Topic::Room(Uuid::new_v4());
        let mut first = topics.subscribe(room.clone());
        let mut second = topics.subscribe(room.clone());

        let event = Event::ChatMessage {
            room_id: Uuid::new_v4(),
            from: "Ada".to_string(),
            message: "on my way".to_string(),
        };
        let delivered = topics.publish(&room, event.clone());

        assert_eq!(delivered, 2);
        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn close_delivers_buffered_events_then_ends() {
        let topics = Topics::new(16);
        let room_id = Uuid::new_v4();
        let room = Topic::Room(room_id);
        let mut member = topics.subscribe(room.clone());

        topics.publish(&room, Event::RideEnded { room_id });
        topics.close(&room);

        assert_eq!(member.recv().await.unwrap(), Event::RideEnded { room_id });
        assert!(member.recv().await.is_err());
    }

    #[test]
    fn release_keeps_channels_with_subscribers() {
        let topics = Topics::new(16);
        let topic = Topic::Client("client-1".to_string());
        let rx = topics.subscribe(topic.clone());

        topics.release(&topic);
        assert_eq!(
            topics.publish(
                &topic,
                Event::OrderAccepted {
                    order_id: Uuid::new_v4(),
                    driver_name: "Dan".to_string(),
                },
            ),
            1
        );

        drop(rx);
        topics.release(&topic);
        assert_eq!(
            topics.publish(
                &topic,
                Event::OrderAccepted {
                    order_id: Uuid::new_v4(),
                    driver_name: "Dan".to_string(),
                },
            ),
            0
        );
    }
}
