//! Determinization (subset construction) and the line scanner.
//!
//! [`determinize`] consumes an [`Nfa`] in three passes:
//!
//! 1. **Pump**: for every reachable state, compute its epsilon-closure and
//!    materialize every byte edge found anywhere in the closure directly
//!    onto the representative, so subset construction never has to chase
//!    epsilons. A representative is terminating iff its closure contains
//!    the NFA's terminator.
//! 2. **Epsilon removal**: strip the epsilon edges; states left unreachable
//!    lose their last links and are soft-swept.
//! 3. **Subset construction**: memoized on the canonical (sorted, distinct)
//!    set of NFA ids, so no subset is expanded twice and the DFA state
//!    count is bounded by the number of distinct subsets encountered.
//!
//! All traversal is worklist-based; deeply nested groups never recurse.

use log::debug;
use rustc_hash::FxHashMap;

use super::arena::{StateArena, StateId, EPSILON};
use super::nfa::Nfa;
use super::small_table::{DfaId, SmallTable, BYTE_CEILING};
use super::sparse_set::SparseSet;

/// One deterministic state: a packed byte transition table plus whether any
/// NFA state it represents was terminating.
#[derive(Debug)]
pub struct DfaState {
    pub(crate) table: SmallTable,
    pub(crate) terminating: bool,
}

/// An immutable deterministic automaton. Safe to share across threads and
/// reuse for any number of scans.
#[derive(Debug)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: DfaId,
}

/// Convert an NFA into an equivalent DFA, destroying the NFA.
pub(crate) fn determinize(nfa: Nfa) -> Dfa {
    let Nfa {
        mut arena,
        start,
        terminating,
    } = nfa;

    let nfa_states = arena.live_count();
    let reachable = pump(&mut arena, start, terminating);
    remove_epsilons(&mut arena, start, &reachable);
    let dfa = subset_construct(&arena, start);
    debug!(
        "determinized {} NFA states into {} DFA states",
        nfa_states,
        dfa.states.len()
    );
    dfa
}

/// Pass 1: flatten epsilon closures onto their representatives.
///
/// Returns every state reachable from the start, in visit order, for the
/// epsilon-removal pass.
fn pump(arena: &mut StateArena, start: StateId, terminating: StateId) -> Vec<StateId> {
    let slots = arena.slot_count();
    let mut visited = SparseSet::new(slots);
    let mut closure_seen = SparseSet::new(slots);
    let mut closure: Vec<StateId> = Vec::new();
    let mut closure_stack: Vec<StateId> = Vec::new();
    let mut order: Vec<StateId> = Vec::new();
    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        if !visited.insert(id.index()) {
            continue;
        }
        order.push(id);

        // Epsilon-closure of id: reflexive, transitive, epsilon edges only.
        closure_seen.clear();
        closure.clear();
        closure_seen.insert(id.index());
        closure.push(id);
        closure_stack.push(id);
        while let Some(c) = closure_stack.pop() {
            for &t in arena[c].targets(EPSILON) {
                if closure_seen.insert(t.index()) {
                    closure.push(t);
                    closure_stack.push(t);
                }
            }
        }

        let is_terminating = closure_seen.contains(terminating.index());

        // Copy every byte edge found in the closure onto the representative.
        for &member in &closure {
            if member == id {
                continue;
            }
            let edges: Vec<(u16, Vec<StateId>)> = arena[member]
                .edges
                .iter()
                .filter(|(&sym, _)| sym != EPSILON)
                .map(|(&sym, targets)| (sym, targets.to_vec()))
                .collect();
            for (sym, targets) in edges {
                for t in targets {
                    arena.add_edge(id, sym, t);
                }
            }
        }
        arena[id].terminating = is_terminating;

        for targets in arena[id].edges.values() {
            stack.extend(targets.iter().copied());
        }
    }

    order
}

/// Pass 2: strip epsilon edges, soft-sweeping states they kept alive.
fn remove_epsilons(arena: &mut StateArena, start: StateId, reachable: &[StateId]) {
    for &id in reachable {
        if arena.is_dead(id) {
            // Already swept as a byproduct of an earlier strip.
            continue;
        }
        if let Some(targets) = arena[id].edges.remove(&EPSILON) {
            for &t in &targets {
                debug_assert!(!arena.is_dead(t));
                arena.unlink(t, start);
            }
        }
    }
}

/// Pass 3: memoized subset construction over the epsilon-free graph.
fn subset_construct(arena: &StateArena, start: StateId) -> Dfa {
    let mut memo: FxHashMap<Box<[StateId]>, DfaId> = FxHashMap::default();
    let mut states: Vec<DfaState> = Vec::new();
    let mut worklist: Vec<(Box<[StateId]>, DfaId)> = Vec::new();

    let dfa_start = intern(
        vec![start].into_boxed_slice(),
        arena,
        &mut memo,
        &mut states,
        &mut worklist,
    );

    while let Some((set, id)) = worklist.pop() {
        let mut successors: FxHashMap<u16, Vec<StateId>> = FxHashMap::default();
        for &member in set.iter() {
            for (&sym, targets) in &arena[member].edges {
                debug_assert_ne!(sym, EPSILON);
                successors
                    .entry(sym)
                    .or_default()
                    .extend(targets.iter().copied());
            }
        }

        let mut unpacked = [DfaId::NONE; BYTE_CEILING];
        for (sym, mut targets) in successors {
            targets.sort_unstable();
            targets.dedup();
            let next = intern(
                targets.into_boxed_slice(),
                arena,
                &mut memo,
                &mut states,
                &mut worklist,
            );
            unpacked[sym as usize] = next;
        }
        states[id.index()].table = SmallTable::pack(&unpacked);
    }

    Dfa {
        states,
        start: dfa_start,
    }
}

/// Look up a canonical NFA-state set, creating its DFA state on first sight.
fn intern(
    key: Box<[StateId]>,
    arena: &StateArena,
    memo: &mut FxHashMap<Box<[StateId]>, DfaId>,
    states: &mut Vec<DfaState>,
    worklist: &mut Vec<(Box<[StateId]>, DfaId)>,
) -> DfaId {
    debug_assert!(key.windows(2).all(|w| w[0] < w[1]));
    if let Some(&id) = memo.get(&key) {
        return id;
    }
    let id = DfaId::from_index(states.len());
    let terminating = key.iter().any(|&s| arena[s].terminating);
    states.push(DfaState {
        table: SmallTable::new(),
        terminating,
    });
    worklist.push((key.clone(), id));
    memo.insert(key, id);
    id
}

impl Dfa {
    /// Number of DFA states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whole-input acceptance: does the DFA accept exactly `text`?
    pub fn accepts(&self, text: &[u8]) -> bool {
        let mut current = self.start;
        for &byte in text {
            current = self.states[current.index()].table.dstep(byte);
            if current.is_none() {
                return false;
            }
        }
        self.states[current.index()].terminating
    }

    /// Report every (possibly overlapping) matching substring of `line`.
    ///
    /// The result is indexed by start offset; each entry is the ascending
    /// list of end offsets `e` such that `line[start..e]` is accepted. One
    /// cursor is kept per live start offset; a cursor with no transition
    /// for the current byte dies silently. A zero-length match `(i, i)` is
    /// recorded at every seeding position when the start state is
    /// terminating.
    pub fn scan(&self, line: &[u8]) -> Vec<Vec<usize>> {
        let mut entries: Vec<Vec<usize>> = vec![Vec::new(); line.len()];
        let mut cursors: Vec<DfaId> = Vec::with_capacity(line.len());
        let start_terminates = self.states[self.start.index()].terminating;

        for (i, &byte) in line.iter().enumerate() {
            if start_terminates {
                entries[i].push(i);
            }
            cursors.push(self.start);

            for (origin, cursor) in cursors.iter_mut().enumerate() {
                if cursor.is_none() {
                    continue;
                }
                *cursor = self.states[cursor.index()].table.dstep(byte);
                if !cursor.is_none() && self.states[cursor.index()].terminating {
                    entries[origin].push(i + 1);
                }
            }
        }

        entries
    }
}
