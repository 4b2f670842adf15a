//! NFA fragments and their composition primitives.
//!
//! A fragment is a sub-graph with one designated start and one designated
//! terminating state: "the strings accepted by walking from start to
//! terminating". The compiler replays an RPN program bottom-up, so every
//! composition primitive consumes its operand fragment(s) by value - once a
//! fragment has been concatenated, united, or starred, its handle is gone
//! and it cannot be composed a second time.

use super::arena::{StateArena, StateId, EPSILON};

/// A handle to an NFA sub-graph: (start, terminating).
///
/// Deliberately neither `Clone` nor `Copy`: composition transfers ownership
/// of the operand's states into the result.
#[derive(Debug)]
pub struct Fragment {
    pub(crate) start: StateId,
    pub(crate) terminating: StateId,
}

/// A completed NFA: an arena plus the final fragment's endpoints.
///
/// Single-use: the determinizer takes it by value, rewrites the graph in
/// place, and drops it.
pub struct Nfa {
    pub(crate) arena: StateArena,
    pub(crate) start: StateId,
    pub(crate) terminating: StateId,
}

/// Builds NFA fragments in a private arena while an RPN program is replayed.
#[derive(Default)]
pub struct NfaBuilder {
    arena: StateArena,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn pair(&mut self) -> Fragment {
        let start = self.arena.alloc();
        let terminating = self.arena.alloc();
        Fragment { start, terminating }
    }

    /// Fragment accepting exactly the one-byte string `byte`.
    pub fn literal(&mut self, byte: u8) -> Fragment {
        let frag = self.pair();
        self.arena.add_edge(frag.start, byte as u16, frag.terminating);
        frag
    }

    /// Fragment accepting any single byte drawn from `bytes`.
    pub fn class(&mut self, bytes: &[u8]) -> Fragment {
        let frag = self.pair();
        for &b in bytes {
            self.arena.add_edge(frag.start, b as u16, frag.terminating);
        }
        frag
    }

    /// Fragment accepting any single byte (`.`), or additionally the empty
    /// string (`?`) when `include_empty` is set.
    pub fn any_byte(&mut self, include_empty: bool) -> Fragment {
        let frag = self.pair();
        for b in 0..=u8::MAX {
            self.arena.add_edge(frag.start, b as u16, frag.terminating);
        }
        if include_empty {
            self.arena.add_edge(frag.start, EPSILON, frag.terminating);
        }
        frag
    }

    /// `AB`: epsilon edge from `a`'s terminator to `b`'s start.
    pub fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.arena.add_edge(a.terminating, EPSILON, b.start);
        Fragment {
            start: a.start,
            terminating: b.terminating,
        }
    }

    /// `A|B`: a fresh shared start fans out to both operand starts, and both
    /// operand terminators fan in to a fresh shared terminator.
    pub fn union(&mut self, a: Fragment, b: Fragment) -> Fragment {
        let frag = self.pair();
        self.arena.add_edge(frag.start, EPSILON, a.start);
        self.arena.add_edge(frag.start, EPSILON, b.start);
        self.arena.add_edge(a.terminating, EPSILON, frag.terminating);
        self.arena.add_edge(b.terminating, EPSILON, frag.terminating);
        frag
    }

    /// `A*`: loop edge terminator -> start, plus a skip edge start ->
    /// terminator for the empty repetition.
    pub fn star(&mut self, a: Fragment) -> Fragment {
        let a = self.plus(a);
        self.arena.add_edge(a.start, EPSILON, a.terminating);
        a
    }

    /// `A+`: loop edge terminator -> start only.
    pub fn plus(&mut self, a: Fragment) -> Fragment {
        self.arena.add_edge(a.terminating, EPSILON, a.start);
        a
    }

    /// Throw away a fragment that was never composed. Its sub-graph is
    /// disjoint from every other fragment, so a hard sweep is safe.
    pub fn discard(&mut self, frag: Fragment) {
        self.arena.hard_delete(frag.start);
        // The terminator can sit on a dead-end the start never reaches
        // (e.g. a class over the empty set).
        self.arena.hard_delete(frag.terminating);
    }

    /// States currently alive in the builder's arena.
    pub fn live_count(&self) -> usize {
        self.arena.live_count()
    }

    /// Seal the final fragment into a single-use NFA.
    pub fn finish(self, frag: Fragment) -> Nfa {
        Nfa {
            arena: self.arena,
            start: frag.start,
            terminating: frag.terminating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_shape() {
        let mut builder = NfaBuilder::new();
        let frag = builder.literal(b'a');
        assert_eq!(builder.live_count(), 2);
        assert_eq!(builder.arena[frag.start].targets(b'a' as u16), &[frag.terminating]);
        assert!(builder.arena[frag.start].targets(EPSILON).is_empty());
    }

    #[test]
    fn test_concat_links_with_epsilon() {
        let mut builder = NfaBuilder::new();
        let a = builder.literal(b'a');
        let b = builder.literal(b'b');
        let (a_term, b_start) = (a.terminating, b.start);
        let ab = builder.concat(a, b);

        assert_eq!(builder.arena[a_term].targets(EPSILON), &[b_start]);
        assert_eq!(builder.live_count(), 4);
        assert_ne!(ab.start, ab.terminating);
    }

    #[test]
    fn test_union_allocates_shared_endpoints() {
        let mut builder = NfaBuilder::new();
        let a = builder.literal(b'a');
        let b = builder.literal(b'b');
        let (a_start, b_start) = (a.start, b.start);
        let u = builder.union(a, b);

        assert_eq!(builder.live_count(), 6);
        assert_eq!(builder.arena[u.start].targets(EPSILON), &[a_start, b_start]);
        assert_eq!(builder.arena[u.terminating].links, 2);
    }

    #[test]
    fn test_star_adds_loop_and_skip() {
        let mut builder = NfaBuilder::new();
        let a = builder.literal(b'a');
        let starred = builder.star(a);

        assert_eq!(
            builder.arena[starred.terminating].targets(EPSILON),
            &[starred.start]
        );
        assert_eq!(
            builder.arena[starred.start].targets(EPSILON),
            &[starred.terminating]
        );
    }

    #[test]
    fn test_plus_adds_loop_only() {
        let mut builder = NfaBuilder::new();
        let a = builder.literal(b'a');
        let plussed = builder.plus(a);

        assert_eq!(
            builder.arena[plussed.terminating].targets(EPSILON),
            &[plussed.start]
        );
        assert!(builder.arena[plussed.start].targets(EPSILON).is_empty());
    }

    #[test]
    fn test_any_byte_covers_whole_alphabet() {
        let mut builder = NfaBuilder::new();
        let frag = builder.any_byte(false);
        for b in [0u8, 1, b'a', 0xFF] {
            assert_eq!(builder.arena[frag.start].targets(b as u16), &[frag.terminating]);
        }
        assert!(builder.arena[frag.start].targets(EPSILON).is_empty());

        let opt = builder.any_byte(true);
        assert_eq!(builder.arena[opt.start].targets(EPSILON), &[opt.terminating]);
    }

    #[test]
    fn test_discard_frees_whole_subgraph() {
        let mut builder = NfaBuilder::new();
        let a = builder.literal(b'a');
        let b = builder.literal(b'b');
        let ab = builder.concat(a, b);
        let looped = builder.star(ab);
        assert_eq!(builder.live_count(), 4);

        builder.discard(looped);
        assert_eq!(builder.live_count(), 0);
    }

    #[test]
    fn test_discard_empty_class_frees_orphan_terminator() {
        let mut builder = NfaBuilder::new();
        let frag = builder.class(&[]);
        assert_eq!(builder.live_count(), 2);
        builder.discard(frag);
        assert_eq!(builder.live_count(), 0);
    }
}
