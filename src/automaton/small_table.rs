//! Compact byte-indexed transition tables for the DFA.

/// Number of distinct byte values a DFA state can transition on.
pub const BYTE_CEILING: usize = 256;

/// A DFA state identifier - an index into the [`crate::automaton::Dfa`]
/// state vector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DfaId(u32);

impl DfaId {
    /// Sentinel for "no transition".
    pub const NONE: DfaId = DfaId(u32::MAX);

    #[inline]
    pub fn from_index(index: usize) -> Self {
        DfaId(index as u32)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A compact lookup table encoding byte-value ranges to state transitions.
///
/// The table uses a ceilings/steps representation where each ceiling marks
/// the upper bound (exclusive) of a byte range mapping to the corresponding
/// step. Runs of identical targets are common (character classes, `.`), so
/// this is far smaller than a 256-entry array in practice.
///
/// Example, mapping bytes 3-4 to S1 and byte 0x34 to S2:
/// ```text
/// ceilings: [3, 5, 0x34, 0x35, 256]
/// steps:    [NONE, S1, NONE, S2, NONE]
/// ```
#[derive(Clone, Debug)]
pub struct SmallTable {
    /// Upper bounds (exclusive) for each byte range.
    ceilings: Vec<u16>,
    /// Target for each range; `DfaId::NONE` means the cursor dies.
    steps: Vec<DfaId>,
}

impl Default for SmallTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SmallTable {
    /// An empty table: every byte falls in one `NONE` run.
    pub fn new() -> Self {
        Self {
            ceilings: vec![BYTE_CEILING as u16],
            steps: vec![DfaId::NONE],
        }
    }

    /// Pack an unpacked 256-entry table into the compressed format.
    pub fn pack(unpacked: &[DfaId; BYTE_CEILING]) -> Self {
        let mut ceilings = Vec::new();
        let mut steps = Vec::new();

        let mut current = unpacked[0];
        for (i, &id) in unpacked.iter().enumerate() {
            if id != current {
                ceilings.push(i as u16);
                steps.push(current);
                current = id;
            }
        }
        ceilings.push(BYTE_CEILING as u16);
        steps.push(current);

        Self { ceilings, steps }
    }

    /// The deterministic step for a byte: the next state or `NONE`.
    #[inline]
    pub fn dstep(&self, byte: u8) -> DfaId {
        for (i, &ceiling) in self.ceilings.iter().enumerate() {
            if (byte as u16) < ceiling {
                return self.steps[i];
            }
        }
        DfaId::NONE
    }
}
