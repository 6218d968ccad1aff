//! Integration tests for merge strategies
//!
//! Tests the default replace-on-collision behavior and a custom strategy
//! that unions partial payloads into the stored value.

use warren_store::{Context, ToMany};

use crate::fixtures::{Anthology, Author, Book, ids};

// =============================================================================
// Default Strategy
// =============================================================================

#[test]
fn default_strategy_replaces_wholesale() {
    let mut first = Author::new("a1", "Ursula");
    first.books = ToMany::faulted(["b1".to_string()]);
    let mut second = Author::new("a1", "U. K. Le Guin");
    second.books = ToMany::faulted(["b2".to_string()]);

    let context = Context::new().save(&first).unwrap().save(&second).unwrap();

    let stored = context.find::<Author>(&"a1".to_string()).unwrap();
    assert_eq!(stored.name, "U. K. Le Guin");
    assert_eq!(stored.books.ids(), vec!["b2".to_string()]);
}

#[test]
fn strategy_is_not_consulted_on_first_save() {
    // A blank title stays blank when nothing is stored yet; the combining
    // function only runs on collision.
    let context = Context::new().save(&Anthology::new("an1", "")).unwrap();
    assert_eq!(
        context.find::<Anthology>(&"an1".to_string()).unwrap().title,
        ""
    );
}

// =============================================================================
// Custom Strategy
// =============================================================================

#[test]
fn partial_payloads_union_into_stored_stories() {
    let mut first = Anthology::new("an1", "Year's Best");
    first.stories = ToMany::fragment([Book::new("s1", "Semley"), Book::new("s2", "Winter")]);
    let mut second = Anthology::new("an1", "");
    second.stories = ToMany::fragment([Book::new("s3", "Coming of Age")]);

    let context = Context::new().save(&first).unwrap().save(&second).unwrap();

    let stored = context.find::<Anthology>(&"an1".to_string()).unwrap();
    assert_eq!(stored.title, "Year's Best");
    assert_eq!(
        stored.stories.ids(),
        vec!["s1".to_string(), "s2".to_string(), "s3".to_string()]
    );
    assert_eq!(
        context.children::<Anthology>(Anthology::STORIES.name, &"an1".to_string()),
        ids(&["s1", "s2", "s3"])
    );
}

#[test]
fn incoming_title_wins_when_present() {
    let context = Context::new()
        .save(&Anthology::new("an1", "Year's Best"))
        .unwrap()
        .save(&Anthology::new("an1", "Year's Best, Revised"))
        .unwrap();
    assert_eq!(
        context.find::<Anthology>(&"an1".to_string()).unwrap().title,
        "Year's Best, Revised"
    );
}

#[test]
fn merge_runs_on_normalized_values() {
    let mut first = Anthology::new("an1", "Year's Best");
    first.stories = ToMany::fragment([Book::new("s1", "Semley")]);
    let mut second = Anthology::new("an1", "");
    second.stories = ToMany::fragment([Book::new("s2", "Winter")]);

    let context = Context::new().save(&first).unwrap().save(&second).unwrap();

    // Both saves carried resolved payloads, but the merged stored value
    // holds ids only; the payloads live under their own keys.
    let stored = context.find::<Anthology>(&"an1".to_string()).unwrap();
    assert_eq!(stored.stories.entities().count(), 0);
    assert_eq!(stored.stories.len(), 2);
    assert!(context.contains::<Book>(&"s1".to_string()));
    assert!(context.contains::<Book>(&"s2".to_string()));
}
