//! Lock striping for the in-memory stores.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

use filmorate_core::error::DomainError;

/// Number of stripes per store.
pub(crate) const SHARD_COUNT: usize = 16;

/// A value split into independently locked stripes. Keys hashing to
/// different stripes never contend.
#[derive(Debug)]
pub(crate) struct Sharded<T> {
    name: &'static str,
    shards: Box<[Mutex<T>]>,
}

impl<T: Default> Sharded<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(T::default())).collect(),
        }
    }
}

impl<T> Sharded<T> {
    /// Locks the stripe owning `key`.
    pub(crate) fn lock<K: Hash + ?Sized>(
        &self,
        key: &K,
    ) -> Result<MutexGuard<'_, T>, DomainError> {
        self.lock_index(self.index_of(key))
    }

    /// Locks every stripe owning one of `keys`, in ascending stripe order.
    /// Either all stripes are held or none is.
    pub(crate) fn lock_many<'k, K, I>(&self, keys: I) -> Result<Stripes<'_, T>, DomainError>
    where
        K: Hash + ?Sized + 'k,
        I: IntoIterator<Item = &'k K>,
    {
        let indices: BTreeSet<usize> = keys.into_iter().map(|k| self.index_of(k)).collect();
        let mut guards = BTreeMap::new();
        for index in indices {
            guards.insert(index, self.lock_index(index)?);
        }
        Ok(Stripes {
            owner: self,
            guards,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn index_of<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Visits every stripe, locking one at a time.
    pub(crate) fn scan(&self, mut visit: impl FnMut(&T)) -> Result<(), DomainError> {
        for index in 0..self.shards.len() {
            visit(&*self.lock_index(index)?);
        }
        Ok(())
    }

    fn lock_index(&self, index: usize) -> Result<MutexGuard<'_, T>, DomainError> {
        self.shards[index]
            .lock()
            .map_err(|_| DomainError::Internal(format!("{} lock poisoned", self.name)))
    }
}

/// Stripes held together by [`Sharded::lock_many`].
pub(crate) struct Stripes<'a, T> {
    owner: &'a Sharded<T>,
    guards: BTreeMap<usize, MutexGuard<'a, T>>,
}

impl<T> Stripes<'_, T> {
    /// The locked stripe owning `key`, if it was part of the request.
    pub(crate) fn get_mut<K: Hash + ?Sized>(&mut self, key: &K) -> Option<&mut T> {
        let index = self.owner.index_of(key);
        self.guards.get_mut(&index).map(|guard| &mut **guard)
    }
}
