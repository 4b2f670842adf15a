//! Arena-backed storage for NFA states.
//!
//! NFA graphs are cyclic (`a+` loops its terminator back to its start), so
//! states are addressed by dense index instead of ownership pointers: a
//! `StateId` is just a `u32`, and the arena owns every state it hands out.
//! Freed slots go on a free list and are reused by later allocations.
//!
//! Deletion is two-mode, mirroring how fragments share structure during
//! compilation:
//!
//! - [`StateArena::hard_delete`] sweeps an entire reachable sub-graph
//!   unconditionally. Only safe when no edge outside the sub-graph can still
//!   reference it (a fragment that was never composed, or a whole automaton).
//! - [`StateArena::soft_delete`] decrements link counts along traversed
//!   edges and frees only states whose count reaches zero, never the
//!   protected start state. Required during epsilon elimination, where a
//!   state may still be reachable through surviving edges from elsewhere.

use std::collections::BTreeMap;

use smallvec::SmallVec;

/// The symbol alphabet is bytes `0..=255` plus this distinguished epsilon
/// symbol. Keeping epsilon outside the byte range means a literal NUL byte
/// is an ordinary matchable symbol.
pub const EPSILON: u16 = 256;

/// A state identifier: an index into a [`StateArena`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single NFA state.
///
/// `edges` maps a symbol (byte or [`EPSILON`]) to the set of target states;
/// more than one target per symbol is what makes the automaton
/// nondeterministic. `links` counts the distinct (source, symbol) edges that
/// point at this state; the terminating flag is meaningful only for the
/// state currently designated as a fragment's terminator (the determinizer
/// sets it on closure representatives).
#[derive(Clone, Default)]
pub struct NfaState {
    pub edges: BTreeMap<u16, SmallVec<[StateId; 2]>>,
    pub links: u32,
    pub terminating: bool,
    dead: bool,
}

impl NfaState {
    /// Targets reachable from this state on `symbol`, if any.
    #[inline]
    pub fn targets(&self, symbol: u16) -> &[StateId] {
        self.edges.get(&symbol).map(|t| t.as_slice()).unwrap_or(&[])
    }
}

/// Arena owning every state of one automaton under construction.
#[derive(Clone, Default)]
pub struct StateArena {
    states: Vec<NfaState>,
    free: Vec<StateId>,
}

impl std::fmt::Debug for StateArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateArena")
            .field("live", &self.live_count())
            .field("slots", &self.states.len())
            .finish()
    }
}

impl StateArena {
    /// Allocate a fresh state, reusing a swept slot when one is available.
    pub fn alloc(&mut self) -> StateId {
        if let Some(id) = self.free.pop() {
            self.states[id.index()] = NfaState::default();
            id
        } else {
            let id = StateId(self.states.len() as u32);
            self.states.push(NfaState::default());
            id
        }
    }

    /// Number of states that have been allocated and not swept.
    pub fn live_count(&self) -> usize {
        self.states.len() - self.free.len()
    }

    /// Total slots ever allocated (dense index bound, for visited sets).
    pub fn slot_count(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_dead(&self, id: StateId) -> bool {
        self.states[id.index()].dead
    }

    /// Insert the edge `from --symbol--> to`, deduplicated. A new edge
    /// increments the target's link count.
    pub fn add_edge(&mut self, from: StateId, symbol: u16, to: StateId) {
        debug_assert!(symbol <= EPSILON);
        let targets = self.states[from.index()].edges.entry(symbol).or_default();
        if targets.contains(&to) {
            return;
        }
        targets.push(to);
        self.states[to.index()].links += 1;
    }

    /// Drop one incoming link of `target`; sweep it if that was the last
    /// link and it is not the protected start state.
    pub fn unlink(&mut self, target: StateId, protect: StateId) {
        let state = &mut self.states[target.index()];
        debug_assert!(state.links > 0);
        state.links -= 1;
        if state.links == 0 && target != protect {
            self.soft_delete(target, protect);
        }
    }

    /// Unconditionally sweep every state reachable from `root`.
    pub fn hard_delete(&mut self, root: StateId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let state = &mut self.states[id.index()];
            if state.dead {
                continue;
            }
            let edges = Self::release(state);
            self.free.push(id);
            for targets in edges.values() {
                stack.extend(targets.iter().copied());
            }
        }
    }

    /// Sweep `root`, decrementing link counts along its edges and
    /// recursively sweeping states whose count reaches zero. `protect` (the
    /// automaton's current start) is never swept even at zero links.
    pub fn soft_delete(&mut self, root: StateId, protect: StateId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let state = &mut self.states[id.index()];
            if state.dead {
                continue;
            }
            let edges = Self::release(state);
            self.free.push(id);
            for targets in edges.values() {
                for &t in targets {
                    let target = &mut self.states[t.index()];
                    target.links = target.links.saturating_sub(1);
                    if target.links == 0 && t != protect && !target.dead {
                        stack.push(t);
                    }
                }
            }
        }
    }

    fn release(state: &mut NfaState) -> BTreeMap<u16, SmallVec<[StateId; 2]>> {
        state.dead = true;
        state.links = 0;
        state.terminating = false;
        std::mem::take(&mut state.edges)
    }
}

impl std::ops::Index<StateId> for StateArena {
    type Output = NfaState;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}

impl std::ops::IndexMut<StateId> for StateArena {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        &mut self.states[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_reuses_swept_slots() {
        let mut arena = StateArena::default();
        let a = arena.alloc();
        let b = arena.alloc();
        assert_eq!(arena.live_count(), 2);

        arena.hard_delete(b);
        assert_eq!(arena.live_count(), 1);

        let c = arena.alloc();
        assert_eq!(c, b);
        assert_eq!(arena.live_count(), 2);
        assert!(!arena.is_dead(a));
    }

    #[test]
    fn test_add_edge_dedup_and_links() {
        let mut arena = StateArena::default();
        let a = arena.alloc();
        let b = arena.alloc();

        arena.add_edge(a, b'x' as u16, b);
        arena.add_edge(a, b'x' as u16, b); // duplicate, no second link
        arena.add_edge(a, EPSILON, b);

        assert_eq!(arena[b].links, 2);
        assert_eq!(arena[a].targets(b'x' as u16), &[b]);
        assert_eq!(arena[a].targets(EPSILON), &[b]);
    }

    #[test]
    fn test_hard_delete_sweeps_cycles() {
        let mut arena = StateArena::default();
        let a = arena.alloc();
        let b = arena.alloc();
        arena.add_edge(a, EPSILON, b);
        arena.add_edge(b, EPSILON, a); // cycle

        arena.hard_delete(a);
        assert_eq!(arena.live_count(), 0);
        assert!(arena.is_dead(a));
        assert!(arena.is_dead(b));
    }

    #[test]
    fn test_soft_delete_spares_shared_states() {
        // a -> c and b -> c; deleting a must leave c alive (one link left).
        let mut arena = StateArena::default();
        let a = arena.alloc();
        let b = arena.alloc();
        let c = arena.alloc();
        arena.add_edge(a, b'x' as u16, c);
        arena.add_edge(b, b'x' as u16, c);

        arena.soft_delete(a, b);
        assert!(arena.is_dead(a));
        assert!(!arena.is_dead(c));
        assert_eq!(arena[c].links, 1);

        // Dropping the last link sweeps c.
        arena.unlink(c, b);
        assert!(arena.is_dead(c));
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn test_soft_delete_never_sweeps_protected_start() {
        let mut arena = StateArena::default();
        let start = arena.alloc();
        let a = arena.alloc();
        arena.add_edge(a, EPSILON, start);

        arena.soft_delete(a, start);
        assert!(!arena.is_dead(start));
        assert_eq!(arena[start].links, 0);
    }
}
