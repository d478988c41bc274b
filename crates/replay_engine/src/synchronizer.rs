//! Stream synchronizer
//!
//! Walks the fix and reference cursors forward against the inertial clock.
//! Cursors never regress and never leave their sequence.

use contracts::{FixSample, ReferenceAdvance, ReferenceSample};

/// Fix and reference cursors of one run
#[derive(Debug, Clone)]
pub struct StreamSynchronizer<'a> {
    fixes: &'a [FixSample],
    references: &'a [ReferenceSample],
    policy: ReferenceAdvance,
    fix_cursor: usize,
    reference_cursor: usize,
}

impl<'a> StreamSynchronizer<'a> {
    pub fn new(
        fixes: &'a [FixSample],
        references: &'a [ReferenceSample],
        policy: ReferenceAdvance,
    ) -> Self {
        Self {
            fixes,
            references,
            policy,
            fix_cursor: 0,
            reference_cursor: 0,
        }
    }

    /// Advance the fix cursor to the last fix at or before `t`
    ///
    /// Returns a copy of the current fix with `is_new` set when the cursor
    /// moved during this call. Once the sequence is exhausted the last fix is
    /// returned with `is_new = false`. `None` only for an empty sequence.
    pub fn advance_fix(&mut self, t: f64) -> Option<FixSample> {
        let mut moved = false;
        while self.fix_cursor + 1 < self.fixes.len()
            && self.fixes[self.fix_cursor + 1].timestamp <= t
        {
            self.fix_cursor += 1;
            moved = true;
        }

        self.fixes.get(self.fix_cursor).map(|fix| FixSample {
            is_new: moved,
            ..*fix
        })
    }

    /// Advance the reference cursor according to the configured policy
    ///
    /// `None` only for an empty sequence.
    pub fn advance_reference(&mut self, t: f64) -> Option<&'a ReferenceSample> {
        let last = self.references.len().checked_sub(1)?;

        match self.policy {
            ReferenceAdvance::SingleStep => {
                if self.references[self.reference_cursor].timestamp < t {
                    self.reference_cursor = (self.reference_cursor + 1).min(last);
                }
            }
            ReferenceAdvance::CatchUp => {
                while self.reference_cursor < last
                    && self.references[self.reference_cursor].timestamp < t
                {
                    self.reference_cursor += 1;
                }
            }
        }

        self.references.get(self.reference_cursor)
    }

    /// Whether the reference cursor is still behind `t` while later samples exist
    pub fn is_reference_lagging(&self, t: f64) -> bool {
        self.reference_cursor + 1 < self.references.len()
            && self.references[self.reference_cursor].timestamp < t
    }

    pub fn fix_index(&self) -> usize {
        self.fix_cursor
    }

    pub fn reference_index(&self) -> usize {
        self.reference_cursor
    }

    pub fn policy(&self) -> ReferenceAdvance {
        self.policy
    }
}
