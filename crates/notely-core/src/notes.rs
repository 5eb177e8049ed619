use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::live::{Change, ChangeKind, LiveHub, LiveQuery};
use crate::store::SqliteStore;
use crate::{
    normalize_content, normalize_group, now_ms, Note, NoteError, NoteId, NoteQuery, Operation,
    OwnerId, Session, StoreError,
};

/// Owner-scoped note operations over the store.
///
/// Reads by an anonymous session return nothing; writes are rejected. The
/// ownership check and the write it guards run under one store lock.
pub struct Notes {
    store: Mutex<SqliteStore>,
    live: LiveHub,
}

impl Notes {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Mutex::new(store),
            live: LiveHub::new(),
        }
    }

    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(SqliteStore::open(data_dir)?))
    }

    pub fn live(&self) -> &LiveHub {
        &self.live
    }

    fn store(&self) -> MutexGuard<'_, SqliteStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, owner: &OwnerId, kind: ChangeKind) {
        self.live.publish(Change {
            owner: owner.clone(),
            kind,
        });
    }

    pub fn list(&self, session: &Session, query: &NoteQuery) -> Result<Vec<Note>, NoteError> {
        let Some(owner) = session.user() else {
            return Ok(Vec::new());
        };
        Ok(self.store().query(owner, query)?)
    }

    pub fn create(
        &self,
        session: &Session,
        content: &str,
        group: Option<&str>,
    ) -> Result<NoteId, NoteError> {
        let owner = session.require(Operation::CreateNote)?;
        let content = normalize_content(content).ok_or(NoteError::EmptyContent)?;
        let group = normalize_group(group);

        let id = self
            .store()
            .insert(owner, &content, group.as_deref(), now_ms())?;
        info!(note = %id, owner = %owner, "note created");
        self.publish(owner, ChangeKind::Created(id));
        Ok(id)
    }

    /// `group: None` keeps the stored group; `Some("")` clears it.
    pub fn update(
        &self,
        session: &Session,
        id: NoteId,
        content: &str,
        group: Option<&str>,
    ) -> Result<(), NoteError> {
        let owner = session.require(Operation::UpdateNote)?;
        {
            let mut store = self.store();
            owned_note(&store, owner, id, Operation::UpdateNote)?;
            let content = normalize_content(content).ok_or(NoteError::EmptyContent)?;
            let group = group.map(|g| normalize_group(Some(g)));
            store.update_content(id, &content, group.as_ref().map(Option::as_deref))?;
        }
        info!(note = %id, owner = %owner, "note updated");
        self.publish(owner, ChangeKind::Updated(id));
        Ok(())
    }

    pub fn remove(&self, session: &Session, id: NoteId) -> Result<(), NoteError> {
        let owner = session.require(Operation::DeleteNote)?;
        {
            let mut store = self.store();
            owned_note(&store, owner, id, Operation::DeleteNote)?;
            store.delete(id)?;
        }
        info!(note = %id, owner = %owner, "note deleted");
        self.publish(owner, ChangeKind::Removed(id));
        Ok(())
    }

    /// Flip the completion flag and return the new value.
    pub fn toggle_completed(&self, session: &Session, id: NoteId) -> Result<bool, NoteError> {
        let owner = session.require(Operation::UpdateNote)?;
        let completed = {
            let mut store = self.store();
            let note = owned_note(&store, owner, id, Operation::UpdateNote)?;
            let completed = !note.completed;
            store.set_completed(id, completed)?;
            completed
        };
        info!(note = %id, owner = %owner, completed, "note completion toggled");
        self.publish(owner, ChangeKind::Completed { id, completed });
        Ok(completed)
    }

    pub fn list_groups(&self, session: &Session) -> Result<Vec<String>, NoteError> {
        let Some(owner) = session.user() else {
            return Ok(Vec::new());
        };
        Ok(self.store().distinct_groups(owner)?)
    }

    /// Relabel every caller-owned note in `old_name` to the trimmed `new_name`.
    pub fn rename_group(
        &self,
        session: &Session,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize, NoteError> {
        let owner = session.require(Operation::RenameGroup)?;
        let new_name = normalize_group(Some(new_name)).ok_or(NoteError::EmptyGroupName)?;

        let count = self.store().rename_group(owner, old_name, &new_name)?;
        info!(owner = %owner, from = old_name, to = %new_name, count, "group renamed");
        if count > 0 {
            self.publish(
                owner,
                ChangeKind::GroupRenamed {
                    from: old_name.to_string(),
                    to: new_name,
                    count,
                },
            );
        }
        Ok(count)
    }

    /// Register a live query for the session's owner.
    pub fn watch(&self, session: &Session, query: NoteQuery) -> LiveQuery {
        self.live.subscribe(session.user().cloned(), query)
    }

    /// Wait for the next change in the live query's scope and return the
    /// refreshed result set.
    pub async fn next_snapshot(&self, live: &mut LiveQuery) -> Result<Vec<Note>, NoteError> {
        live.changed().await?;
        let Some(owner) = live.owner() else {
            return Ok(Vec::new());
        };
        Ok(self.store().query(owner, live.query())?)
    }
}

fn owned_note(
    store: &SqliteStore,
    owner: &OwnerId,
    id: NoteId,
    operation: Operation,
) -> Result<Note, NoteError> {
    let note = store.get(id)?.ok_or(NoteError::NotFound)?;
    if &note.author_id != owner {
        return Err(NoteError::NotOwner(operation));
    }
    Ok(note)
}
