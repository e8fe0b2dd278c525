//! Single-neighbour collaborative filtering over the like relation.

use std::collections::{BTreeMap, BTreeSet};

use filmorate_core::ids::{FilmId, UserId};

/// The user whose likes overlap the most with the target's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarUser {
    /// The neighbour.
    pub user_id: UserId,
    /// Number of films both users like.
    pub overlap: usize,
}

/// Counts, per other user, how many of the target's films they also like.
/// Each item of `co_likers` is the set of users who liked one of the
/// target's films; the target never counts.
#[must_use]
pub fn overlap_counts<'a, I>(target: UserId, co_likers: I) -> BTreeMap<UserId, usize>
where
    I: IntoIterator<Item = &'a BTreeSet<UserId>>,
{
    let mut overlap: BTreeMap<UserId, usize> = BTreeMap::new();
    for likers in co_likers {
        for &user_id in likers.iter().filter(|u| **u != target) {
            *overlap.entry(user_id).or_default() += 1;
        }
    }
    overlap
}

/// Picks the user with the largest overlap. Ties go to the lowest user id;
/// zero counts never qualify.
#[must_use]
pub fn most_similar_user(overlap: &BTreeMap<UserId, usize>) -> Option<SimilarUser> {
    // BTreeMap iterates in ascending id order, so keeping the first maximum
    // resolves ties towards the lowest id.
    overlap
        .iter()
        .filter(|(_, count)| **count > 0)
        .fold(None, |best: Option<SimilarUser>, (&user_id, &count)| match best {
            Some(current) if current.overlap >= count => Some(current),
            _ => Some(SimilarUser {
                user_id,
                overlap: count,
            }),
        })
}

/// Films the neighbour likes that the target does not, ascending by id.
#[must_use]
pub fn unseen_films(
    target_likes: &BTreeSet<FilmId>,
    neighbour_likes: &BTreeSet<FilmId>,
) -> Vec<FilmId> {
    neighbour_likes.difference(target_likes).copied().collect()
}
