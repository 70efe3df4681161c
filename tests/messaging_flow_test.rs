//! End-to-end messaging flow against the in-memory store: encryption at
//! rest, listing enrichment, per-room event emission and read receipts.

mod common;

use common::{event_type, harness, harness_with, lake_view_villa, StubListingResolver, StubUserDirectory};
use marketplace_chat_service::error::AppError;
use marketplace_chat_service::models::message::NewMessage;
use marketplace_chat_service::services::message_service::{MessageService, DECRYPT_PLACEHOLDER};
use marketplace_chat_service::store::MessageStore;
use std::collections::HashSet;
use uuid::Uuid;

#[tokio::test]
async fn send_stores_ciphertext_and_returns_plaintext() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let view = MessageService::send(&h.state, alice, bob, "Is this still available?", None)
        .await
        .unwrap();
    assert_eq!(view.content, "Is this still available?");
    assert!(!view.read);

    // The persisted record never carries plaintext.
    let stored = h.store.find_between(alice, bob).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_encrypted);
    assert_ne!(stored[0].content, "Is this still available?");
    assert_eq!(
        h.state.cipher.decrypt(&stored[0].content).unwrap(),
        "Is this still available?"
    );
}

#[tokio::test]
async fn blank_content_is_rejected() {
    let h = harness();
    let result = MessageService::send(&h.state, Uuid::new_v4(), Uuid::new_v4(), "   ", None).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn send_emits_events_in_room_order() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let (_rid, mut receiver_rx) = h.state.registry.join(bob).await;
    let (_sid, mut sender_rx) = h.state.registry.join(alice).await;

    MessageService::send(&h.state, alice, bob, "hello", None)
        .await
        .unwrap();

    // Receiver's room: the new message strictly precedes the list refresh.
    assert_eq!(event_type(&receiver_rx.recv().await.unwrap()), "message:new");
    assert_eq!(
        event_type(&receiver_rx.recv().await.unwrap()),
        "conversations:update"
    );

    assert_eq!(
        event_type(&sender_rx.recv().await.unwrap()),
        "conversations:update"
    );
    assert_eq!(event_type(&sender_rx.recv().await.unwrap()), "message:sent");
}

#[tokio::test]
async fn listing_enrichment_is_baked_into_the_ciphertext() {
    let h = harness_with(
        StubListingResolver {
            listing: Some(lake_view_villa()),
            fail: false,
        },
        StubUserDirectory {
            inactive: HashSet::new(),
        },
    );
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let view = MessageService::send(&h.state, alice, bob, "What a view!", Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert!(view.content.starts_with("What a view!"));
    assert!(view.content.contains("Lake View Villa"));
    assert!(view.content.contains("$250000"));

    // The enriched body survives a full store round trip, so the block was
    // encrypted, not appended at read time.
    let thread = MessageService::fetch_thread(&h.state, alice, bob)
        .await
        .unwrap();
    assert!(thread[0].content.contains("Lake View Villa"));
}

#[tokio::test]
async fn listing_resolution_failure_skips_enrichment() {
    let h = harness_with(
        StubListingResolver {
            listing: None,
            fail: true,
        },
        StubUserDirectory {
            inactive: HashSet::new(),
        },
    );
    let view = MessageService::send(
        &h.state,
        Uuid::new_v4(),
        Uuid::new_v4(),
        "still interested",
        Some(Uuid::new_v4()),
    )
    .await
    .unwrap();
    assert_eq!(view.content, "still interested");
}

#[tokio::test]
async fn unknown_listing_sends_raw_content() {
    let h = harness();
    let view = MessageService::send(
        &h.state,
        Uuid::new_v4(),
        Uuid::new_v4(),
        "about the flat",
        Some(Uuid::new_v4()),
    )
    .await
    .unwrap();
    assert_eq!(view.content, "about the flat");
}

#[tokio::test]
async fn undecryptable_message_becomes_placeholder_not_error() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    MessageService::send(&h.state, alice, bob, "readable", None)
        .await
        .unwrap();
    // A record whose blob was corrupted out of band.
    h.store
        .insert(NewMessage {
            sender_id: alice,
            receiver_id: bob,
            listing_id: None,
            content: "deadbeef".into(),
        })
        .await
        .unwrap();

    let inbox = MessageService::fetch_inbox(&h.state, bob).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].content, DECRYPT_PLACEHOLDER);
    assert_eq!(inbox[1].content, "readable");
}

#[tokio::test]
async fn thread_is_ascending_and_inbox_descending() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    MessageService::send(&h.state, alice, bob, "first", None)
        .await
        .unwrap();
    MessageService::send(&h.state, bob, alice, "second", None)
        .await
        .unwrap();
    MessageService::send(&h.state, alice, bob, "third", None)
        .await
        .unwrap();

    let thread = MessageService::fetch_thread(&h.state, alice, bob)
        .await
        .unwrap();
    let bodies: Vec<&str> = thread.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(bodies, ["first", "second", "third"]);

    let inbox = MessageService::fetch_inbox(&h.state, bob).await.unwrap();
    let bodies: Vec<&str> = inbox.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(bodies, ["third", "first"]);

    let sent = MessageService::fetch_sent(&h.state, bob).await.unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, "second");
}

#[tokio::test]
async fn mark_read_is_idempotent_and_monotonic() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    for body in ["one", "two", "three"] {
        MessageService::send(&h.state, alice, bob, body, None)
            .await
            .unwrap();
    }

    let modified = MessageService::mark_read(&h.state, bob, alice).await.unwrap();
    assert_eq!(modified, 3);

    // Repeat call flips nothing but still succeeds.
    let modified = MessageService::mark_read(&h.state, bob, alice).await.unwrap();
    assert_eq!(modified, 0);

    let inbox = MessageService::fetch_inbox(&h.state, bob).await.unwrap();
    assert!(inbox.iter().all(|m| m.read));
}

#[tokio::test]
async fn mark_read_notifies_counterpart_and_viewer() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    MessageService::send(&h.state, alice, bob, "unread", None)
        .await
        .unwrap();

    let (_aid, mut alice_rx) = h.state.registry.join(alice).await;
    let (_bid, mut bob_rx) = h.state.registry.join(bob).await;

    MessageService::mark_read(&h.state, bob, alice).await.unwrap();

    let payload = alice_rx.recv().await.unwrap();
    assert_eq!(event_type(&payload), "message:read");
    let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(parsed["from"], bob.to_string());

    assert_eq!(event_type(&bob_rx.recv().await.unwrap()), "conversations:update");
}

#[tokio::test]
async fn mark_read_only_touches_one_direction() {
    let h = harness();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    MessageService::send(&h.state, alice, bob, "to bob", None)
        .await
        .unwrap();
    MessageService::send(&h.state, bob, alice, "to alice", None)
        .await
        .unwrap();

    MessageService::mark_read(&h.state, bob, alice).await.unwrap();

    // Bob's message to Alice stays unread until Alice marks it.
    let alice_inbox = MessageService::fetch_inbox(&h.state, alice).await.unwrap();
    assert!(!alice_inbox[0].read);
}
