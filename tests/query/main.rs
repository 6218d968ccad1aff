//! Integration tests for Layer 2: Query
//!
//! Tests eager loading, fragment merging, and the laziness guarantees of
//! composable queries.


mod laziness;
