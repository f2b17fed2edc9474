//! Candidate indexing: deduplication, conflict components and bitsets

use std::collections::{HashMap, HashSet};

use tally_core::{OutputId, Transaction};

/// Drop repeated transactions, keeping the first occurrence of each hash
pub(crate) fn dedupe(candidates: &[Transaction]) -> Vec<&Transaction> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .filter(|tx| seen.insert(tx.hash()))
        .collect()
}

/// Identifiers a transaction reads or writes
pub(crate) fn touched_ids(tx: &Transaction) -> impl Iterator<Item = OutputId> + '_ {
    tx.spent_ids().chain(tx.minted().map(|(id, _)| id))
}

/// Split candidates into groups that share no output identifier
///
/// Whether a transaction validates depends only on the snapshot entries it
/// touches, so transactions in different groups never affect each other.
/// Groups come back ordered by their smallest member, members ascending.
pub(crate) fn components(txs: &[&Transaction]) -> Vec<Vec<usize>> {
    let mut sets = DisjointSets::new(txs.len());
    let mut first_toucher: HashMap<OutputId, usize> = HashMap::new();
    for (i, tx) in txs.iter().enumerate() {
        for id in touched_ids(tx) {
            match first_toucher.get(&id) {
                Some(&j) => sets.union(i, j),
                None => {
                    first_toucher.insert(id, i);
                }
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in 0..txs.len() {
        let root = sets.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }
    groups
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller root wins so the representative is the earliest member.
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge] = keep;
        }
    }
}

/// Set of positions within one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct TxSet {
    words: Vec<u64>,
}

impl TxSet {
    /// Empty set able to hold positions below `n`
    pub(crate) fn empty(n: usize) -> Self {
        Self {
            words: vec![0; n.div_ceil(64)],
        }
    }

    pub(crate) fn contains(&self, i: usize) -> bool {
        self.words
            .get(i / 64)
            .is_some_and(|word| word & (1u64 << (i % 64)) != 0)
    }

    /// Copy of this set with `i` added
    pub(crate) fn with(&self, i: usize) -> Self {
        let mut next = self.clone();
        if let Some(word) = next.words.get_mut(i / 64) {
            *word |= 1u64 << (i % 64);
        }
        next
    }
}
