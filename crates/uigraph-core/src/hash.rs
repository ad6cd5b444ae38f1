//! Content hashing and composite identities.
//!
//! Every graph entity (widget, state, action) is content-addressed: its
//! identity is a [`HashCode`] computed from the fields that make it
//! semantically unique. Two entities with the same hash code are treated as
//! the same entity, so equality and ordering are derived from the hash code
//! rather than from a structural comparison.
//!
//! # Hash As Equality
//!
//! Collisions are treated as equality. With 64-bit codes and a well mixed
//! combinator the probability is negligible for the few thousand states an
//! exploration run produces. [`ByHash`] makes this contract explicit when an
//! entity is used as a map or set key.
//!
//! # Composite Identities
//!
//! [`combine_hash`] folds many child identities into one:
//!
//! | Mode | Property |
//! |------|----------|
//! | ordered | position is part of the mix, permutations change the result |
//! | unordered | commutative wrapping sum, permutations never change the result |
//!
//! Both modes map the empty sequence to `0`.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// Identity value produced by [`HashNode::hash_code`].
pub type HashCode = u64;

/// Golden-ratio increment used to salt positions.
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Salt applied to every child in unordered mode.
const UNORDERED_SALT: u64 = 0x2545_f491_4f6c_dd1d;

/// Capability of anything with a pure, deterministic content hash.
///
/// `hash_code` must be callable any number of times without side effects and
/// must not change while the identity-relevant state of the value is fixed.
/// It must never depend on memory addresses.
pub trait HashNode {
    fn hash_code(&self) -> HashCode;
}

impl<T: HashNode + ?Sized> HashNode for &T {
    fn hash_code(&self) -> HashCode {
        (**self).hash_code()
    }
}

impl<T: HashNode + ?Sized> HashNode for Box<T> {
    fn hash_code(&self) -> HashCode {
        (**self).hash_code()
    }
}

impl<T: HashNode + ?Sized> HashNode for Rc<T> {
    fn hash_code(&self) -> HashCode {
        (**self).hash_code()
    }
}

impl<T: HashNode + ?Sized> HashNode for Arc<T> {
    fn hash_code(&self) -> HashCode {
        (**self).hash_code()
    }
}

/// SplitMix64 finaliser. Bijective, and maps `0` to `0`.
#[must_use]
pub const fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Incremental 64-bit FNV-1a hasher for entity fields.
///
/// Unlike `std::collections::hash_map::DefaultHasher`, the output is stable
/// across processes and Rust releases, which is what content addressing
/// needs. Strings are length-prefixed so adjacent fields cannot bleed into
/// each other (`"ab" + "c"` hashes differently from `"a" + "bc"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHasher {
    state: u64,
}

impl ContentHasher {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Self::OFFSET,
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
        self
    }

    pub fn write_str(&mut self, text: &str) -> &mut Self {
        self.write_u64(text.len() as u64);
        self.write_bytes(text.as_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_bytes(&[u8::from(value)])
    }

    #[must_use]
    pub fn finish(&self) -> HashCode {
        self.state
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot FNV-1a over the raw bytes of `text`.
#[must_use]
pub fn hash_str(text: &str) -> HashCode {
    ContentHasher::new().write_bytes(text.as_bytes()).finish()
}

/// Combine child identities into one composite identity.
///
/// With `ordered` set, each child's position is folded into the mix, so the
/// result changes when children are permuted (and repeating a child at two
/// positions differs from swapping two distinct children). Without it, the
/// children are combined with a commutative wrapping sum of mixed hashes:
/// any permutation yields the same result and duplicated children do not
/// cancel out.
///
/// The empty sequence maps to `0` in both modes.
#[must_use]
pub fn combine_hash<I>(children: I, ordered: bool) -> HashCode
where
    I: IntoIterator,
    I::Item: HashNode,
{
    if ordered {
        combine_ordered(children)
    } else {
        combine_unordered(children)
    }
}

fn combine_ordered<I>(children: I) -> HashCode
where
    I: IntoIterator,
    I::Item: HashNode,
{
    let mut acc: u64 = 0;
    for (position, child) in children.into_iter().enumerate() {
        let salt = GOLDEN.wrapping_mul(position as u64 + 1);
        acc = mix64(acc.rotate_left(23) ^ mix64(child.hash_code() ^ salt));
    }
    acc
}

fn combine_unordered<I>(children: I) -> HashCode
where
    I: IntoIterator,
    I::Item: HashNode,
{
    let mut sum: u64 = 0;
    let mut count: u64 = 0;
    for child in children {
        sum = sum.wrapping_add(mix64(child.hash_code() ^ UNORDERED_SALT));
        count += 1;
    }
    if count == 0 {
        return 0;
    }
    mix64(sum ^ count.wrapping_mul(GOLDEN))
}

/// Key adapter that gives a [`HashNode`] hash-derived `Eq`, `Ord` and `Hash`.
///
/// Two wrapped values are equal iff their hash codes are equal, and order by
/// the numeric value of the hash code.
#[derive(Debug, Clone, Copy)]
pub struct ByHash<T>(pub T);

impl<T: HashNode> ByHash<T> {
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: HashNode> PartialEq for ByHash<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash_code() == other.0.hash_code()
    }
}

impl<T: HashNode> Eq for ByHash<T> {}

impl<T: HashNode> PartialOrd for ByHash<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: HashNode> Ord for ByHash<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.hash_code().cmp(&other.0.hash_code())
    }
}

impl<T: HashNode> Hash for ByHash<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash_code());
    }
}

/// Deterministic ordering over optional handles, by hash code.
///
/// Absent handles sort before present ones.
pub fn compare_by_hash<T: HashNode + ?Sized>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.hash_code().cmp(&b.hash_code()),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort nodes into their canonical, reproducible order.
pub fn sort_by_hash<T: HashNode>(nodes: &mut [T]) {
    nodes.sort_by_key(|node| node.hash_code());
}
