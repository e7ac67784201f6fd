//! The primitive contract a key-value store must expose to host a graph.
//!
//! The graph layer depends on nothing else: scalars with atomic increment,
//! unique-member sets, weighted (scored) sets, and flat field maps. Every
//! method is a single round trip and is atomic on its own; sequences of
//! calls are not.

use kvgraph_core::StoreError;

/// Result type for store primitives.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store primitives.
///
/// # Contract
///
/// - Applying a primitive to a key holding another data type fails with
///   [`StoreError::WrongType`].
/// - Sets, weighted sets and field maps that become empty are removed, so
///   `exists` reports `false` for them.
/// - `incr` and `zincrby` are atomic relative to concurrent callers.
pub trait KvStore: Send + Sync {
    // ---------------------------------------------------------------------
    // Scalars
    // ---------------------------------------------------------------------

    /// Read a scalar.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a scalar, replacing whatever the key held.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Atomically add one to an integer scalar (absent counts as 0) and
    /// return the new value.
    fn incr(&self, key: &str) -> StoreResult<i64>;

    // ---------------------------------------------------------------------
    // Any key
    // ---------------------------------------------------------------------

    /// Whether the key holds any value.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Remove a key of any type. Returns whether it existed.
    fn del(&self, key: &str) -> StoreResult<bool>;

    // ---------------------------------------------------------------------
    // Unique-member sets
    // ---------------------------------------------------------------------

    /// Add a member. Returns `true` if it was not already present.
    fn sadd(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Remove a member. Returns `true` if it was present.
    fn srem(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Membership test.
    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// All members (empty when the key is absent).
    fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Number of members.
    fn scard(&self, key: &str) -> StoreResult<usize>;

    /// Intersection of the named sets. An absent key is an empty set, so
    /// the result is empty; an empty key list yields an empty result.
    fn sinter(&self, keys: &[String]) -> StoreResult<Vec<String>>;

    // ---------------------------------------------------------------------
    // Weighted sets
    // ---------------------------------------------------------------------

    /// Atomically add `delta` to a member's score, inserting the member at
    /// `delta` if absent. Returns the new score. A score reaching zero is
    /// not removed; callers decide.
    fn zincrby(&self, key: &str, member: &str, delta: i64) -> StoreResult<i64>;

    /// Remove a member. Returns `true` if it was present.
    fn zrem(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Score of a member.
    fn zscore(&self, key: &str, member: &str) -> StoreResult<Option<i64>>;

    /// All members with scores, ascending by score (ties by member).
    fn zrange(&self, key: &str) -> StoreResult<Vec<(String, i64)>>;

    // ---------------------------------------------------------------------
    // Field maps
    // ---------------------------------------------------------------------

    /// Read one field.
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Write one field. Returns `true` if the field is new.
    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<bool>;

    /// Remove one field. Returns `true` if it existed.
    fn hdel(&self, key: &str, field: &str) -> StoreResult<bool>;

    /// All fields and values (empty when the key is absent).
    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>>;
}
