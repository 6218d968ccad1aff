//! Integration tests for the identity map
//!
//! Tests that each (type, id) pair maps to one canonical value, that saves
//! normalize payloads, and that snapshots stay isolated.

use warren_foundation::ErrorKind;
use warren_store::{Context, ToMany, ToOne};

use crate::fixtures::{Author, Book, Review, Tag, ids};

// =============================================================================
// Canonical Values
// =============================================================================

#[test]
fn save_then_find_returns_saved_value() {
    let context = Context::new().save(&Tag::new("t1", "rust")).unwrap();
    let tag = context.find::<Tag>(&"t1".to_string()).unwrap();
    assert_eq!(tag, Tag::new("t1", "rust"));
}

#[test]
fn resave_replaces_canonical_value() {
    let context = Context::new()
        .save(&Tag::new("t1", "rust"))
        .unwrap()
        .save(&Tag::new("t1", "systems"))
        .unwrap();
    assert_eq!(context.entity_count(), 1);
    assert_eq!(context.find::<Tag>(&"t1".to_string()).unwrap().label, "systems");
}

#[test]
fn one_canonical_value_per_type_and_id() {
    let mut author = Author::new("a1", "Ursula");
    author.books = ToMany::resolved([Book::new("b1", "Draft Title")]);
    let context = Context::new().save(&author).unwrap();

    // Saving the book directly updates the single stored copy; the author's
    // link still reaches it.
    let context = context.save(&Book::new("b1", "Final Title")).unwrap();
    assert_eq!(
        context.find::<Book>(&"b1".to_string()).unwrap().title,
        "Final Title"
    );
    assert_eq!(
        context.children::<Author>(Author::BOOKS.name, &"a1".to_string()),
        ids(&["b1"])
    );
}

#[test]
fn same_raw_id_in_different_types_does_not_collide() {
    let context = Context::new()
        .save(&Tag::new("x1", "tag"))
        .unwrap()
        .save(&Author::new("x1", "Author"))
        .unwrap();
    assert_eq!(context.entity_count(), 2);
    assert_eq!(context.find::<Tag>(&"x1".to_string()).unwrap().label, "tag");
    assert_eq!(
        context.find::<Author>(&"x1".to_string()).unwrap().name,
        "Author"
    );
}

// =============================================================================
// Normalization on Save
// =============================================================================

#[test]
fn stored_values_hold_faulted_references_only() {
    let mut author = Author::new("a1", "Ursula");
    author.books = ToMany::resolved([
        Book::new("b1", "Dispossessed"),
        Book::new("b2", "Lathe"),
    ]);
    let context = Context::new().save(&author).unwrap();

    let stored = context.find::<Author>(&"a1".to_string()).unwrap();
    assert_eq!(stored.books.ids(), vec!["b1".to_string(), "b2".to_string()]);
    assert_eq!(stored.books.entities().count(), 0);

    // The nested payloads became entities of their own.
    let book = context.find::<Book>(&"b1".to_string()).unwrap();
    assert_eq!(book.title, "Dispossessed");
}

#[test]
fn nested_payload_fields_are_normalized_too() {
    let mut book = Book::new("b1", "Dispossessed");
    book.author = ToOne::resolved(Author::new("a1", "Ursula"));
    let context = Context::new().save(&book).unwrap();

    let stored = context.find::<Book>(&"b1".to_string()).unwrap();
    assert_eq!(stored.author.target_id(), Some("a1".to_string()));
    assert!(stored.author.entity().is_none());
    assert!(context.contains::<Author>(&"a1".to_string()));
}

// =============================================================================
// Batch Reads
// =============================================================================

#[test]
fn find_all_preserves_order_and_reports_misses() {
    let context = Context::new()
        .save_all(&[Tag::new("t1", "a"), Tag::new("t2", "b")])
        .unwrap();
    let found = context.find_all::<Tag>(&[
        "t2".to_string(),
        "t9".to_string(),
        "t1".to_string(),
    ]);
    assert_eq!(found.len(), 3);
    assert_eq!(found[0].as_ref().map(|tag| tag.label.clone()), Some("b".to_string()));
    assert!(found[1].is_none());
    assert_eq!(found[2].as_ref().map(|tag| tag.label.clone()), Some("a".to_string()));
}

#[test]
fn find_all_existing_drops_misses_and_keeps_order() {
    let context = Context::new()
        .save_all(&[Tag::new("t1", "a"), Tag::new("t2", "b")])
        .unwrap();
    let found = context.find_all_existing::<Tag>(&[
        "t2".to_string(),
        "t9".to_string(),
        "t1".to_string(),
    ]);
    let labels: Vec<_> = found.iter().map(|tag| tag.label.clone()).collect();
    assert_eq!(labels, vec!["b".to_string(), "a".to_string()]);
}

#[test]
fn all_returns_each_stored_entity_once() {
    let context = Context::new()
        .save_all(&[
            Tag::new("t1", "a"),
            Tag::new("t2", "b"),
            Tag::new("t3", "c"),
        ])
        .unwrap();
    let mut ids: Vec<_> = context.all::<Tag>().iter().map(|tag| tag.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec!["t1".to_string(), "t2".to_string(), "t3".to_string()]);
}

#[test]
fn empty_context_reads_as_misses() {
    let context = Context::new();
    assert_eq!(context.find::<Tag>(&"t1".to_string()), None);
    assert!(!context.contains::<Tag>(&"t1".to_string()));
    assert!(context.all::<Tag>().is_empty());
    assert!(context
        .children::<Author>(Author::BOOKS.name, &"a1".to_string())
        .is_empty());
}

// =============================================================================
// Snapshot Isolation
// =============================================================================

#[test]
fn snapshots_never_observe_later_saves() {
    let base = Context::new().save(&Tag::new("t1", "original")).unwrap();
    let derived = base.save(&Tag::new("t1", "changed")).unwrap();
    let grown = derived.save(&Tag::new("t2", "new")).unwrap();

    assert_eq!(base.find::<Tag>(&"t1".to_string()).unwrap().label, "original");
    assert_eq!(base.entity_count(), 1);
    assert_eq!(derived.entity_count(), 1);
    assert_eq!(grown.entity_count(), 2);
}

// =============================================================================
// Hook Failures
// =============================================================================

#[test]
fn rejected_save_leaves_no_new_snapshot() {
    let context = Context::new().save(&Review::new("r1", 4)).unwrap();

    let error = context.save(&Review::new("r2", 11)).unwrap_err();
    assert!(matches!(error.kind, ErrorKind::Contract(_)));
    assert_eq!(error.to_string(), "contract violation: stars must be at most 5");

    // The failed draft was discarded; the receiver is unchanged.
    assert_eq!(context.entity_count(), 1);
    assert!(!context.contains::<Review>(&"r2".to_string()));
}

#[test]
fn batch_save_fails_atomically() {
    let reviews = [Review::new("r1", 3), Review::new("r2", 9), Review::new("r3", 5)];
    let context = Context::new();
    assert!(context.save_all(&reviews).is_err());
    assert_eq!(context.entity_count(), 0);
}

#[test]
fn counts_track_entities_and_link_entries() {
    let mut author = Author::new("a1", "Ursula");
    author.books = ToMany::resolved([
        Book::new("b1", "Dispossessed"),
        Book::new("b2", "Lathe"),
    ]);
    let context = Context::new().save(&author).unwrap();

    assert_eq!(context.entity_count(), 3);
    // One forward entry plus one counterpart entry per book.
    assert_eq!(context.link_count(), 3);
}
