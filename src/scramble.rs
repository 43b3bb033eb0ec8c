//! Scrambling by permuting solved poses within groups.
//!
//! Pieces only ever move to a slot pose that belongs to their own group, so
//! every scrambled state stays reachable by legal turns.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pieces::Piece;

/// Contiguous index ranges of mutually interchangeable pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scrambler {
    group_sizes: Vec<usize>,
}

impl Scrambler {
    /// Declares groups by size; group `k` covers the indices following group `k - 1`.
    pub fn new(group_sizes: impl Into<Vec<usize>>) -> Self {
        Self {
            group_sizes: group_sizes.into(),
        }
    }

    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    /// Total number of pieces covered by the groups.
    pub fn piece_count(&self) -> usize {
        self.group_sizes.iter().sum()
    }

    /// Checks that the groups tile exactly `piece_count` pieces.
    pub fn validate(&self, piece_count: usize) -> Result<()> {
        if self.group_sizes.contains(&0) {
            return Err(Error::InvalidLevel("scramble group of size 0".into()));
        }
        let covered = self.piece_count();
        if covered != piece_count {
            return Err(Error::InvalidLevel(format!(
                "scramble groups cover {covered} pieces, level has {piece_count}"
            )));
        }
        Ok(())
    }

    /// Index range of each group, in order.
    pub fn ranges(&self) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
        self.group_sizes.iter().scan(0, |start, &size| {
            let range = *start..*start + size;
            *start += size;
            Some(range)
        })
    }

    /// Draws a permutation that only exchanges indices within a group.
    ///
    /// `SliceRandom::shuffle` is an unbiased Fisher-Yates shuffle.
    pub fn mapping<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut mapping = Vec::with_capacity(self.piece_count());
        for range in self.ranges() {
            let start = mapping.len();
            mapping.extend(range);
            mapping[start..].shuffle(rng);
        }
        mapping
    }

    /// Moves every piece to the solved pose of another piece from its group.
    pub fn scramble<R: Rng + ?Sized>(&self, pieces: &mut [Piece], rng: &mut R) {
        let mapping = self.mapping(rng);
        apply_mapping(pieces, &mapping);
        debug!(pieces = pieces.len(), groups = self.group_sizes.len(), "scrambled");
    }
}

/// Sets piece `i` to the solved pose of piece `mapping[i]`.
pub fn apply_mapping(pieces: &mut [Piece], mapping: &[usize]) {
    let solved: Vec<_> = mapping.iter().map(|&src| pieces[src].solved_pose()).collect();
    for (piece, pose) in pieces.iter_mut().zip(solved) {
        piece.set_pose(pose);
    }
}
