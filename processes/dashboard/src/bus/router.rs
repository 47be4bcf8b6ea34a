//! Per-topic delivery of arrivals to the view that subscribed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::Arrival;

struct Route {
    id: u64,
    sender: mpsc::UnboundedSender<Arrival>,
}

#[derive(Default)]
struct Routes {
    next_id: u64,
    by_topic: HashMap<String, Route>,
}

/// Shared topic-to-subscriber table.
///
/// Cloning shares the table; transports deliver through one clone while the
/// UI thread subscribes through another.
#[derive(Clone, Default)]
pub struct Router {
    routes: Arc<Mutex<Routes>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic. A later subscription to the same topic
    /// replaces this one.
    pub fn subscribe(&self, topic: &str) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut routes = self.lock();
        let id = routes.next_id;
        routes.next_id += 1;
        routes.by_topic.insert(topic.to_string(), Route { id, sender });
        info!(topic, "Subscribed");

        Subscription {
            topic: topic.to_string(),
            id,
            receiver,
            router: self.clone(),
        }
    }

    /// Hand an arrival to its topic's subscriber. Arrivals for topics
    /// nobody subscribed to are discarded.
    pub fn deliver(&self, arrival: Arrival) -> bool {
        let routes = self.lock();
        match routes.by_topic.get(&arrival.topic) {
            Some(route) => route.sender.send(arrival).is_ok(),
            None => {
                trace!(topic = %arrival.topic, "Discarding arrival without subscriber");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of one topic subscription; dropping it unsubscribes
pub struct Subscription {
    topic: String,
    id: u64,
    receiver: mpsc::UnboundedReceiver<Arrival>,
    router: Router,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Every arrival received since the last drain, oldest first
    pub fn drain(&mut self) -> Vec<Arrival> {
        let mut arrivals = Vec::new();
        while let Ok(arrival) = self.receiver.try_recv() {
            arrivals.push(arrival);
        }
        arrivals
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut routes = self.router.lock();
        if routes.by_topic.get(&self.topic).is_some_and(|route| route.id == self.id) {
            routes.by_topic.remove(&self.topic);
            info!(topic = %self.topic, "Unsubscribed");
        } else {
            debug!(topic = %self.topic, "Subscription already replaced");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;

    fn arrival(topic: &str, n: u64) -> Arrival {
        Arrival {
            topic: topic.to_string(),
            value: json!({ "data": n }),
            type_name: "std_msgs/UInt64".to_string(),
            size: 8,
            publisher: None,
            received_at: Instant::now(),
        }
    }

    #[test]
    fn delivers_in_order_to_subscriber() {
        let router = Router::new();
        let mut subscription = router.subscribe("/chatter");

        assert!(router.deliver(arrival("/chatter", 1)));
        assert!(router.deliver(arrival("/chatter", 2)));

        let values: Vec<_> = subscription.drain().into_iter().map(|a| a.value["data"].clone()).collect();
        assert_eq!(values, [json!(1), json!(2)]);
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn unsubscribed_topics_are_discarded() {
        let router = Router::new();
        let mut subscription = router.subscribe("/chatter");
        assert!(!router.deliver(arrival("/other", 1)));
        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn drop_unsubscribes() {
        let router = Router::new();
        let mut subscription = router.subscribe("/chatter");
        assert!(router.deliver(arrival("/chatter", 1)));
        assert_eq!(subscription.drain().len(), 1);

        drop(subscription);
        assert!(!router.deliver(arrival("/chatter", 2)));
    }

    #[test]
    fn dropping_replaced_subscription_keeps_newer_one() {
        let router = Router::new();
        let old = router.subscribe("/chatter");
        let mut new = router.subscribe("/chatter");

        drop(old);
        assert!(router.deliver(arrival("/chatter", 3)));
        assert_eq!(new.drain().len(), 1);
    }
}
