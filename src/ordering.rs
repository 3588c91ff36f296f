//! Manual ordering of sibling groups.
//!
//! Categories, the links of one category and hero slides each carry a
//! zero-based `sort_order`. New members are appended after the current
//! maximum, deletions leave gaps, and an explicit reorder renumbers the whole
//! group to `0..n-1` from the list the admin console sends.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// A set of rows that share one ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiblingGroup {
    Categories,
    Links { category_id: i32 },
    HeroSlides,
}

impl fmt::Display for SiblingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiblingGroup::Categories => write!(f, "categories"),
            SiblingGroup::Links { category_id } => write!(f, "links of category {}", category_id),
            SiblingGroup::HeroSlides => write!(f, "hero slides"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("reorder of {group} lists {given} ids but the group has {expected} members")]
    CardinalityMismatch {
        group: SiblingGroup,
        expected: usize,
        given: usize,
    },
    #[error("id {id} is not a member of {group}")]
    UnknownId { group: SiblingGroup, id: i32 },
    #[error("id {id} is listed more than once in the reorder of {group}")]
    DuplicateId { group: SiblingGroup, id: i32 },
}

/// New position for one row of a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: i32,
    pub sort_order: i32,
}

/// Sort order for a row appended to a group: one past the current maximum,
/// or `0` for an empty group.
pub fn next_sort_order<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing.into_iter().max().map_or(0, |max| max + 1)
}

/// Validate `ordered_ids` against the group's current members and compute the
/// dense renumbering.
///
/// The list must be an exact permutation of `current_ids`. A stale client that
/// misses a sibling, repeats one or sends an id from elsewhere is rejected so
/// the write never drops rows out of the ordering.
pub fn plan_reorder(
    group: SiblingGroup,
    current_ids: &[i32],
    ordered_ids: &[i32],
) -> Result<Vec<Placement>, OrderingError> {
    if current_ids.len() != ordered_ids.len() {
        return Err(OrderingError::CardinalityMismatch {
            group,
            expected: current_ids.len(),
            given: ordered_ids.len(),
        });
    }

    let members: HashSet<i32> = current_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(ordered_ids.len());

    for &id in ordered_ids {
        if !members.contains(&id) {
            return Err(OrderingError::UnknownId { group, id });
        }
        if !seen.insert(id) {
            return Err(OrderingError::DuplicateId { group, id });
        }
    }

    Ok(ordered_ids
        .iter()
        .enumerate()
        .map(|(index, &id)| Placement {
            id,
            sort_order: index as i32,
        })
        .collect())
}
