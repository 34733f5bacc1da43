use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock,
};

use futures::future::join_all;
use tracing::info;

use iasc_slo::{errors, Result};

use crate::{Interface, Record};

/// Client-side cache over one remote collection. The remote service is
/// the source of truth; every operation patches the cache only after
/// the request settles, except where the contract says otherwise.
pub struct EntityStore<I: Interface> {
    api: I,
    cache: RwLock<Vec<I::T>>,
    loading: AtomicBool,
    error: RwLock<Option<String>>,
}

impl<I> EntityStore<I>
where
    I: Interface,
    I::T: Record + Clone + Default,
{
    pub fn new(api: I) -> Self {
        Self {
            api,
            cache: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            error: RwLock::new(None),
        }
    }

    /// Fetches the whole collection and replaces the cache. On failure
    /// the cache keeps its last known value and the error flag is set.
    pub async fn list(&self) -> Result<Vec<I::T>> {
        self.loading.store(true, Ordering::SeqCst);
        {
            let mut error = self.error.write().map_err(errors::any)?;
            *error = None;
        }

        let mut fresh = Vec::new();
        let result = self.api.list(&mut fresh).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                let mut cache = self.cache.write().map_err(errors::any)?;
                *cache = fresh.clone();
                Ok(fresh)
            }
            Err(err) => {
                self.flag(&err)?;
                Err(errors::fetch(I::T::KIND, &err))
            }
        }
    }

    /// Creates a record without an identifier; the server-populated
    /// record from the response is appended to the cache.
    pub async fn create(&self, input: &I::C) -> Result<I::T> {
        let mut created = I::T::default();
        if let Err(err) = self.api.create(input, &mut created).await {
            self.flag(&err)?;
            return Err(errors::create(I::T::KIND, &err));
        }
        let mut cache = self.cache.write().map_err(errors::any)?;
        cache.push(created.clone());
        Ok(created)
    }

    /// Full-record update keyed by identifier; the cached record is
    /// swapped in place. On failure the cache stays stale but intact.
    pub async fn update(&self, input: &I::T) -> Result<()> {
        if let Err(err) = self.api.put(input).await {
            self.flag(&err)?;
            return Err(errors::update(I::T::KIND, input.id(), &err));
        }
        let mut cache = self.cache.write().map_err(errors::any)?;
        for record in cache.iter_mut() {
            if record.id() == input.id() {
                *record = input.clone();
            }
        }
        Ok(())
    }

    /// One concurrent delete per identifier, duplicates collapsed. The
    /// local removal is all or nothing: if any request fails the cache
    /// is left untouched and the next `list` reconciles whatever the
    /// server already deleted.
    pub async fn delete_many(&self, ids: &[String]) -> Result<()> {
        let mut unique: Vec<&String> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Ok(());
        }

        let results =
            join_all(unique.iter().map(|id| self.api.delete(id.as_str())))
                .await;

        let mut failed = Vec::new();
        let mut details = Vec::new();
        for (id, result) in unique.iter().zip(results) {
            if let Err(err) = result {
                failed.push((*id).clone());
                details.push(err.to_string());
            }
        }
        if !failed.is_empty() {
            let err =
                errors::delete(I::T::KIND, failed, &details.join("; "));
            self.flag(&err)?;
            return Err(err);
        }

        let mut cache = self.cache.write().map_err(errors::any)?;
        cache.retain(|record| {
            !unique.iter().any(|id| id.as_str() == record.id())
        });
        info!("removed {} {} record(s)", unique.len(), I::T::KIND);
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<I::T>> {
        let cache = self.cache.read().map_err(errors::any)?;
        Ok(cache.clone())
    }

    pub fn get(&self, id: &str) -> Result<Option<I::T>> {
        let cache = self.cache.read().map_err(errors::any)?;
        Ok(cache.iter().find(|record| record.id() == id).cloned())
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn error(&self) -> Result<Option<String>> {
        let error = self.error.read().map_err(errors::any)?;
        Ok(error.clone())
    }

    fn flag(&self, err: &impl ToString) -> Result<()> {
        let mut error = self.error.write().map_err(errors::any)?;
        *error = Some(err.to_string());
        Ok(())
    }
}
