use std::sync::RwLockWriteGuard;

use armetix_core::{DomainError, DomainResult};
use armetix_invoicing::PaymentSequence;

use super::error::StoreResult;
use super::tables::{Table, Tables};

type Undo = Box<dyn FnOnce(&mut Tables) + Send>;
type Check = Box<dyn Fn(&Tables) -> DomainResult<()> + Send>;

/// Unit of work holding the store's write lock.
///
/// Every mutation pushes a compensating action. Dropping the transaction
/// without [`Transaction::commit`] replays them newest first, so a failed
/// operation leaves the tables exactly as it found them.
pub struct Transaction<'a> {
    tables: RwLockWriteGuard<'a, Tables>,
    undo: Vec<Undo>,
    checks: Vec<Check>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(tables: RwLockWriteGuard<'a, Tables>) -> Self {
        Self {
            tables,
            undo: Vec::new(),
            checks: Vec::new(),
            committed: false,
        }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn get<T: Table>(&self, id: &T::Id) -> Option<&T> {
        T::rows(&self.tables).get(id)
    }

    pub fn require<T: Table>(&self, id: &T::Id) -> DomainResult<&T> {
        self.get::<T>(id).ok_or_else(|| not_found::<T>(id))
    }

    /// Insert or replace a row.
    pub fn insert<T: Table>(&mut self, row: T) {
        let id = *row.id();
        let previous = T::rows_mut(&mut self.tables).insert(id, row);
        self.undo.push(Box::new(move |tables: &mut Tables| {
            let rows = T::rows_mut(tables);
            match previous {
                Some(previous) => {
                    rows.insert(id, previous);
                }
                None => {
                    rows.remove(&id);
                }
            }
        }));
        self.watch::<T>(id);
    }

    pub fn remove<T: Table>(&mut self, id: &T::Id) -> DomainResult<T> {
        let row = T::rows_mut(&mut self.tables)
            .remove(id)
            .ok_or_else(|| not_found::<T>(id))?;
        let restored = row.clone();
        let id = *id;
        self.undo.push(Box::new(move |tables: &mut Tables| {
            T::rows_mut(tables).insert(id, restored);
        }));
        Ok(row)
    }

    /// Mutate a row in place.
    ///
    /// If `f` fails the row is restored before the error is returned.
    pub fn modify<T, R>(
        &mut self,
        id: &T::Id,
        f: impl FnOnce(&mut T) -> DomainResult<R>,
    ) -> DomainResult<R>
    where
        T: Table,
    {
        let row = T::rows_mut(&mut self.tables)
            .get_mut(id)
            .ok_or_else(|| not_found::<T>(id))?;
        let snapshot = row.clone();

        match f(row) {
            Ok(out) => {
                let id = *id;
                self.undo.push(Box::new(move |tables: &mut Tables| {
                    T::rows_mut(tables).insert(id, snapshot);
                }));
                self.watch::<T>(id);
                Ok(out)
            }
            Err(err) => {
                *row = snapshot;
                Err(err)
            }
        }
    }

    pub fn set_payment_sequence(&mut self, sequence: PaymentSequence) {
        let previous = std::mem::replace(&mut self.tables.payment_sequence, sequence);
        self.undo.push(Box::new(move |tables: &mut Tables| {
            tables.payment_sequence = previous;
        }));
    }

    /// Re-check every touched row, then make the changes permanent.
    pub fn commit(mut self) -> StoreResult<()> {
        for check in &self.checks {
            check(&*self.tables)?;
        }
        self.committed = true;
        self.undo.clear();
        Ok(())
    }

    fn watch<T: Table>(&mut self, id: T::Id) {
        self.checks.push(Box::new(move |tables: &Tables| {
            T::rows(tables).get(&id).map_or(Ok(()), T::verify)
        }));
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        while let Some(undo) = self.undo.pop() {
            undo(&mut *self.tables);
        }
    }
}

fn not_found<T: Table>(id: &T::Id) -> DomainError {
    DomainError::not_found(format!("{} {}", T::NAME, id))
}
