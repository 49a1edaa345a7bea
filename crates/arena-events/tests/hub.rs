//! Integration tests for the event hub's ordering and handoff guarantees.

use arena_events::{EventHub, GameId};
use serde_json::json;

#[tokio::test]
async fn concurrent_publishers_never_duplicate_or_skip_sequences() {
    let hub = EventHub::with_capacity(GameId::new(), 4096);

    let mut handles = Vec::new();
    for worker in 0..8 {
        let hub = hub.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50 {
                hub.publish("step", json!({"worker": worker, "i": i})).await;
            }
        }));
    }
    for handle in handles {
        handle.await.expect("publisher task");
    }

    let events = hub.replay_from(0).await;
    assert_eq!(events.len(), 400);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.sequence, i as u64 + 1);
    }
}

#[tokio::test]
async fn subscription_handoff_is_gapless_under_concurrent_publish() {
    // Subscribe repeatedly while a writer publishes continuously; each
    // observer's catch-up + live stream must be contiguous.
    let hub = EventHub::with_capacity(GameId::new(), 4096);

    let writer = {
        let hub = hub.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                hub.publish("step", json!({"i": i})).await;
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..20 {
        let (catch_up, mut live) = hub.subscribe_from(0).await;
        let last_caught = catch_up.last().map_or(0, |e| e.sequence);
        for (i, event) in catch_up.iter().enumerate() {
            assert_eq!(event.sequence, i as u64 + 1);
        }
        // The first live event must continue exactly where catch-up ended.
        if let Ok(event) =
            tokio::time::timeout(std::time::Duration::from_millis(200), live.recv())
                .await
        {
            let event = event.expect("live stream open");
            assert_eq!(event.sequence, last_caught + 1);
        }
        tokio::task::yield_now().await;
    }

    writer.await.expect("writer task");
}

#[tokio::test]
async fn live_receivers_are_independent() {
    let hub = EventHub::new(GameId::new());
    let (_, mut a) = hub.subscribe_from(0).await;
    let (_, mut b) = hub.subscribe_from(0).await;

    hub.publish("shared", json!({})).await;

    let ea = a.recv().await.expect("receiver a");
    let eb = b.recv().await.expect("receiver b");
    assert_eq!(ea.sequence, 1);
    assert_eq!(eb.sequence, 1);

    // Dropping one receiver must not affect the other.
    drop(a);
    hub.publish("again", json!({})).await;
    let eb = b.recv().await.expect("receiver b still live");
    assert_eq!(eb.sequence, 2);
}
