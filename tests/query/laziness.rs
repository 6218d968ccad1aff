//! Integration tests for query laziness
//!
//! Tests that queries read nothing until resolved, pin the snapshot they
//! were built over, and can be cloned, extended, and re-resolved freely.

use warren_query::{QueryContext, resolve_all};
use warren_store::{Context, ToMany};

use crate::fixtures::{Chat, Message};

fn lounge() -> Context {
    let mut chat = Chat::new("c1", "lounge");
    chat.messages = ToMany::resolved([Message::new("m1", "hi"), Message::new("m2", "hello")]);
    Context::new().save(&chat).unwrap()
}

// =============================================================================
// Deferred Reads
// =============================================================================

#[test]
fn building_over_an_empty_context_reads_nothing() {
    let context = Context::new();
    let query = context
        .query::<Chat>("c1".to_string())
        .with_many_nested(Chat::MESSAGES, |message| message.with_one(Message::CHAT))
        .fragment(Chat::MESSAGES);
    assert_eq!(query.resolve(), None);
}

#[test]
fn resolve_is_repeatable() {
    let context = lounge();
    let query = context
        .query::<Chat>("c1".to_string())
        .with_many(Chat::MESSAGES)
        .fragment(Chat::MESSAGES);

    let first = query.resolve().unwrap();
    let second = query.resolve().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.messages.len(), 2);
}

// =============================================================================
// Snapshot Pinning
// =============================================================================

#[test]
fn query_pins_the_snapshot_it_was_built_over() {
    let context = lounge();
    let query = context.query::<Chat>("c1".to_string()).with_many(Chat::MESSAGES);

    // Later snapshots rename the chat and shrink the thread.
    let mut renamed = Chat::new("c1", "archive");
    renamed.messages = ToMany::faulted(["m1".to_string()]);
    let later = context.save(&renamed).unwrap();

    let seen = query.resolve().unwrap();
    assert_eq!(seen.topic, "lounge");
    assert_eq!(seen.messages.entities().count(), 2);

    let now = later
        .query::<Chat>("c1".to_string())
        .with_many(Chat::MESSAGES)
        .resolve()
        .unwrap();
    assert_eq!(now.topic, "archive");
    assert_eq!(now.messages.entities().count(), 1);
}

#[test]
fn query_outlives_its_source_binding() {
    let query = {
        let context = lounge();
        context.query::<Chat>("c1".to_string()).with_many(Chat::MESSAGES)
    };
    assert_eq!(query.resolve().unwrap().messages.entities().count(), 2);
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn extending_a_clone_leaves_the_original_alone() {
    let context = lounge();
    let base = context.query::<Chat>("c1".to_string());
    let extended = base.clone().with_many(Chat::MESSAGES);

    assert_eq!(base.resolve().unwrap().messages.entities().count(), 0);
    assert_eq!(extended.resolve().unwrap().messages.entities().count(), 2);
}

#[test]
fn resolve_all_preserves_order_and_drops_misses() {
    let context = lounge();
    let queries = context.query_all::<Message>([
        "m2".to_string(),
        "m9".to_string(),
        "m1".to_string(),
    ]);
    let texts: Vec<_> = resolve_all(queries)
        .iter()
        .map(|message| message.text.clone())
        .collect();
    assert_eq!(texts, vec!["hello".to_string(), "hi".to_string()]);
}
