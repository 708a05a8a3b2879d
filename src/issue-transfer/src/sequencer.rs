//! Merges issues and pull requests into one gap-free numbering sequence.
//!
//! GitHub hands out issue and pull request numbers from a single counter and
//! never lets a client choose one. To land every record at its original
//! number the destination must receive exactly one creation per number, in
//! ascending order, with a placeholder for every number that has no record.

use crate::records::{Record, RecordKind};
use thiserror::Error;
use tracing::debug;

/// Errors raised when the source numbering breaks the sequencing invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// Two records claim the same number.
    #[error("number #{number} is used by both a {first} and a {second}")]
    NumberCollision {
        number: u64,
        first: RecordKind,
        second: RecordKind,
    },

    /// A record has number zero.
    #[error("{kind} has invalid number 0")]
    ZeroNumber { kind: RecordKind },
}

/// One position in the destination numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A real issue or pull request.
    Record(Record),

    /// A synthetic record that only consumes a number.
    Placeholder {
        /// Number this placeholder occupies.
        number: u64,
    },
}

impl Slot {
    /// Returns the destination number of this slot.
    #[must_use]
    pub fn number(&self) -> u64 {
        match self {
            Self::Record(record) => record.number,
            Self::Placeholder { number } => *number,
        }
    }

    /// Returns true for placeholder slots.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    /// Returns a short description of the slot kind for logging.
    #[must_use]
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Record(record) => record.kind.as_str(),
            Self::Placeholder { .. } => "placeholder",
        }
    }
}

/// Lazy iterator over every slot from `1` to the highest record number.
#[derive(Debug)]
pub struct Sequencer {
    /// Records sorted by number; consumed from the front.
    records: std::vec::IntoIter<Record>,
    /// Record waiting for the cursor to catch up with it.
    next: Option<Record>,
    /// Number of the next slot to yield.
    expected: u64,
    len: u64,
    placeholders: u64,
}

impl Sequencer {
    /// Merges both collections and validates their numbering.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] if a number is zero or shared by two records.
    pub fn new(issues: Vec<Record>, pulls: Vec<Record>) -> Result<Self, SequenceError> {
        let mut records = issues;
        records.extend(pulls);
        // Stable, so issues stay ahead of pulls on equal numbers.
        records.sort_by_key(|record| record.number);

        if let Some(record) = records.iter().find(|record| record.number == 0) {
            return Err(SequenceError::ZeroNumber { kind: record.kind });
        }

        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[0].number == pair[1].number)
        {
            return Err(SequenceError::NumberCollision {
                number: pair[0].number,
                first: pair[0].kind,
                second: pair[1].kind,
            });
        }

        let len = records.last().map_or(0, |record| record.number);
        let placeholders = len - records.len() as u64;
        debug!(slots = len, placeholders, "Built slot sequence");

        let mut records = records.into_iter();
        let next = records.next();
        Ok(Self {
            records,
            next,
            expected: 1,
            len,
            placeholders,
        })
    }

    /// Total number of slots, i.e. the highest record number.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true when there are no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of placeholders needed to close the gaps.
    #[must_use]
    pub fn placeholder_count(&self) -> u64 {
        self.placeholders
    }
}

impl Iterator for Sequencer {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        let record = self.next.take()?;

        if self.expected < record.number {
            let number = self.expected;
            self.expected += 1;
            self.next = Some(record);
            return Some(Slot::Placeholder { number });
        }

        self.expected = record.number + 1;
        self.next = self.records.next();
        Some(Slot::Record(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.next {
            Some(_) => (self.len + 1 - self.expected) as usize,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::records::Author;
    use chrono::{TimeZone, Utc};

    pub(crate) fn record(kind: RecordKind, number: u64) -> Record {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Record {
            kind,
            number,
            title: format!("{kind} {number}"),
            body: String::new(),
            created_at: at,
            updated_at: at,
            closed_at: None,
            closed: false,
            labels: Vec::new(),
            milestone_number: None,
            assignee_login: None,
            author: Author::ghost(),
            comments: Vec::new(),
        }
    }

    fn issues(numbers: &[u64]) -> Vec<Record> {
        numbers
            .iter()
            .map(|n| record(RecordKind::Issue, *n))
            .collect()
    }

    fn pulls(numbers: &[u64]) -> Vec<Record> {
        numbers
            .iter()
            .map(|n| record(RecordKind::PullRequest, *n))
            .collect()
    }

    fn describe(slots: Vec<Slot>) -> Vec<(u64, &'static str)> {
        slots
            .iter()
            .map(|slot| (slot.number(), slot.kind_str()))
            .collect()
    }

    #[test]
    fn interleaves_issues_and_pulls_with_placeholders() {
        let sequencer = Sequencer::new(issues(&[1, 3]), pulls(&[2, 5])).unwrap();
        assert_eq!(sequencer.len(), 5);
        assert_eq!(sequencer.placeholder_count(), 1);

        assert_eq!(
            describe(sequencer.collect()),
            vec![
                (1, "issue"),
                (2, "pull_request"),
                (3, "issue"),
                (4, "placeholder"),
                (5, "pull_request"),
            ]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        let sequencer = Sequencer::new(Vec::new(), Vec::new()).unwrap();
        assert!(sequencer.is_empty());
        assert_eq!(sequencer.count(), 0);
    }

    #[test]
    fn only_pulls() {
        let slots: Vec<Slot> = Sequencer::new(Vec::new(), pulls(&[1, 2])).unwrap().collect();
        assert_eq!(describe(slots), vec![(1, "pull_request"), (2, "pull_request")]);
    }

    #[test]
    fn fills_from_one_when_numbers_start_late() {
        let slots: Vec<Slot> = Sequencer::new(issues(&[3]), Vec::new()).unwrap().collect();
        assert_eq!(
            describe(slots),
            vec![(1, "placeholder"), (2, "placeholder"), (3, "issue")]
        );
    }

    #[test]
    fn sorts_unordered_input() {
        let slots: Vec<Slot> = Sequencer::new(issues(&[4, 1]), pulls(&[2])).unwrap().collect();
        assert_eq!(
            describe(slots),
            vec![
                (1, "issue"),
                (2, "pull_request"),
                (3, "placeholder"),
                (4, "issue")
            ]
        );
    }

    #[test]
    fn slot_numbers_are_contiguous_for_many_layouts() {
        let layouts: [(&[u64], &[u64]); 5] = [
            (&[2, 7, 9], &[1, 4]),
            (&[10], &[]),
            (&[], &[6, 3]),
            (&[1, 2, 3], &[4, 5, 6]),
            (&[100], &[50]),
        ];

        for (issue_numbers, pull_numbers) in layouts {
            let expected_len = issue_numbers
                .iter()
                .chain(pull_numbers)
                .copied()
                .max()
                .unwrap_or(0);
            let sequencer =
                Sequencer::new(issues(issue_numbers), pulls(pull_numbers)).unwrap();
            assert_eq!(sequencer.size_hint().0 as u64, expected_len);

            let slots: Vec<Slot> = sequencer.collect();
            assert_eq!(slots.len() as u64, expected_len);
            for (index, slot) in slots.iter().enumerate() {
                assert_eq!(slot.number(), index as u64 + 1);
                let is_real = issue_numbers.contains(&slot.number())
                    || pull_numbers.contains(&slot.number());
                assert_eq!(slot.is_placeholder(), !is_real);
            }
        }
    }

    #[test]
    fn rejects_collisions_between_issues_and_pulls() {
        let result = Sequencer::new(issues(&[1, 2]), pulls(&[2]));
        assert_eq!(
            result.unwrap_err(),
            SequenceError::NumberCollision {
                number: 2,
                first: RecordKind::Issue,
                second: RecordKind::PullRequest,
            }
        );
    }

    #[test]
    fn rejects_zero_numbers() {
        let result = Sequencer::new(Vec::new(), pulls(&[0, 1]));
        assert_eq!(
            result.unwrap_err(),
            SequenceError::ZeroNumber {
                kind: RecordKind::PullRequest
            }
        );
    }
}
