//! `CorpusStore` (C2): the mutable surface over immutable `Corpus`
//! snapshots, plus the tree of parent/child edges.
//!
//! Mutation serialization per corpus id is grounded in the teacher's
//! `DocState` (`src/worker.rs`): an outer `RwLock` over the map of current
//! snapshots, and a per-key `tokio::sync::Mutex` so only one mutator runs
//! against a given corpus at a time while unrelated corpora proceed
//! concurrently.

use super::{Corpus, CorpusId, CorpusType, Language};
use crate::error::{CoreError, Result};
use crate::error::{ConflictError, NotFoundError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Default)]
pub struct CorpusStore {
    corpora: RwLock<HashMap<CorpusId, Arc<Corpus>>>,
    names: RwLock<HashMap<String, CorpusId>>,
    mutation_locks: Mutex<HashMap<CorpusId, Arc<Mutex<()>>>>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, id: CorpusId) -> Arc<Mutex<()>> {
        let mut locks = self.mutation_locks.lock().await;
        locks.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub async fn create(
        &self,
        name: impl Into<String>,
        vocabulary: impl IntoIterator<Item = String>,
        language: Language,
        corpus_type: CorpusType,
    ) -> Result<Arc<Corpus>> {
        let name = name.into();
        super::validate_corpus_name(&name)?;

        let mut names = self.names.write().await;
        if names.contains_key(&name) {
            return Err(CoreError::from(ConflictError::DuplicateCorpus(name)));
        }

        let corpus = Arc::new(Corpus::new(name.clone(), vocabulary, language, corpus_type));
        names.insert(name, corpus.corpus_id);
        self.corpora.write().await.insert(corpus.corpus_id, corpus.clone());
        Ok(corpus)
    }

    pub async fn get_by_id(&self, id: CorpusId) -> Result<Arc<Corpus>> {
        self.corpora
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::from(NotFoundError::Corpus(id.to_string())))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Arc<Corpus>> {
        let id = *self
            .names
            .read()
            .await
            .get(name)
            .ok_or_else(|| CoreError::from(NotFoundError::Corpus(name.to_string())))?;
        self.get_by_id(id).await
    }

    /// Apply a rebuild to the corpus identified by `id`, serialized against
    /// any other mutator of the same corpus. `f` receives a fresh clone of
    /// the current snapshot and mutates it in place.
    async fn mutate(
        &self,
        id: CorpusId,
        f: impl FnOnce(&mut Corpus),
    ) -> Result<Arc<Corpus>> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let current = self.get_by_id(id).await?;
        let mut next = (*current).clone();
        f(&mut next);
        let next = Arc::new(next);
        self.corpora.write().await.insert(id, next.clone());
        Ok(next)
    }

    /// Mark (or unmark) a corpus as a master. A master's vocabulary is owned
    /// by `aggregate_master`, not by direct mutation; callers still reach it
    /// through `add_words`/`remove_words` on its *children*, which
    /// re-aggregate the parent automatically when it is a master.
    pub async fn set_master(&self, id: CorpusId, is_master: bool) -> Result<Arc<Corpus>> {
        self.mutate(id, |corpus| corpus.is_master = is_master).await
    }

    /// If `child_id` has a parent and that parent is a master, recompute the
    /// parent's vocabulary as the union of its children. A no-op otherwise.
    async fn reaggregate_parent_if_master(&self, child_id: CorpusId) -> Result<()> {
        let Some(parent_id) = self.get_by_id(child_id).await?.parent_id else {
            return Ok(());
        };
        if self.get_by_id(parent_id).await?.is_master {
            self.aggregate_master(parent_id).await?;
        }
        Ok(())
    }

    /// Returns the number of distinct normalized forms newly added.
    pub async fn add_words(
        &self,
        id: CorpusId,
        words: impl IntoIterator<Item = String>,
    ) -> Result<usize> {
        let words: Vec<String> = words.into_iter().collect();
        let mut added = 0usize;

        let current = self.get_by_id(id).await?;
        let mut seen: std::collections::HashSet<String> =
            current.vocabulary.iter().cloned().collect();
        let mut originals = current.original_vocabulary.clone();

        for original in words {
            let normalized = crate::normalize::normalize(&original);
            if seen.insert(normalized) {
                originals.push(original);
                added += 1;
            }
        }

        self.mutate(id, |corpus| corpus.rebuild_from_originals(originals))
            .await?;
        self.reaggregate_parent_if_master(id).await?;
        Ok(added)
    }

    /// Returns the number of distinct normalized forms removed.
    pub async fn remove_words(
        &self,
        id: CorpusId,
        words: impl IntoIterator<Item = String>,
    ) -> Result<usize> {
        let to_remove: std::collections::HashSet<String> = words
            .into_iter()
            .map(|w| crate::normalize::normalize(&w))
            .collect();

        let current = self.get_by_id(id).await?;
        let before = current.vocabulary.len();

        // An original surface is retained iff its own normalized form is
        // still present after removal, independent of whether other
        // originals shared that normalized form.
        let originals: Vec<String> = current
            .original_vocabulary
            .iter()
            .filter(|o| !to_remove.contains(&crate::normalize::normalize(o)))
            .cloned()
            .collect();

        let updated = self
            .mutate(id, |corpus| corpus.rebuild_from_originals(originals))
            .await?;
        let removed = before.saturating_sub(updated.vocabulary.len());
        self.reaggregate_parent_if_master(id).await?;
        Ok(removed)
    }

    pub async fn attach_child(&self, parent_id: CorpusId, child_id: CorpusId) -> Result<()> {
        if parent_id == child_id {
            return Err(CoreError::from(ConflictError::Cycle {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            }));
        }

        let child = self.get_by_id(child_id).await?;
        if child.parent_id.is_some() {
            return Err(CoreError::from(ConflictError::AlreadyHasParent(
                child_id.to_string(),
            )));
        }

        if self.is_ancestor(child_id, parent_id).await? {
            return Err(CoreError::from(ConflictError::Cycle {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            }));
        }

        self.mutate(child_id, |corpus| corpus.parent_id = Some(parent_id))
            .await?;
        self.mutate(parent_id, |corpus| {
            if !corpus.child_ids.contains(&child_id) {
                corpus.child_ids.push(child_id);
            }
        })
        .await?;
        self.reaggregate_parent_if_master(child_id).await?;
        Ok(())
    }

    pub async fn detach_child(
        &self,
        parent_id: CorpusId,
        child_id: CorpusId,
        delete: bool,
    ) -> Result<()> {
        self.mutate(parent_id, |corpus| corpus.child_ids.retain(|c| *c != child_id))
            .await?;
        if delete {
            Box::pin(self.delete(child_id, false)).await?;
        } else {
            self.mutate(child_id, |corpus| corpus.parent_id = None).await?;
        }
        if self.get_by_id(parent_id).await?.is_master {
            self.aggregate_master(parent_id).await?;
        }
        Ok(())
    }

    /// Whether `ancestor` appears anywhere in `descendant`'s parent chain.
    async fn is_ancestor(&self, ancestor: CorpusId, descendant: CorpusId) -> Result<bool> {
        let mut cursor = Some(descendant);
        while let Some(id) = cursor {
            if id == ancestor {
                return Ok(true);
            }
            cursor = self.get_by_id(id).await?.parent_id;
        }
        Ok(false)
    }

    pub async fn delete(&self, id: CorpusId, cascade: bool) -> Result<()> {
        let corpus = self.get_by_id(id).await?;

        if !corpus.child_ids.is_empty() {
            if !cascade {
                return Err(CoreError::from(ConflictError::HasChildren(id.to_string())));
            }
            for child in corpus.child_ids.clone() {
                Box::pin(self.delete(child, true)).await?;
            }
        }

        if let Some(parent_id) = corpus.parent_id {
            self.mutate(parent_id, |p| p.child_ids.retain(|c| *c != id))
                .await
                .ok();
            if let Ok(parent) = self.get_by_id(parent_id).await {
                if parent.is_master {
                    self.aggregate_master(parent_id).await.ok();
                }
            }
        }

        self.corpora.write().await.remove(&id);
        self.names.write().await.retain(|_, v| *v != id);
        Ok(())
    }

    /// Recompute a master corpus's vocabulary as the sorted union of its
    /// direct children's vocabularies (one level, not flattened deeper).
    /// Idempotent.
    pub async fn aggregate_master(&self, master_id: CorpusId) -> Result<Arc<Corpus>> {
        let master = self.get_by_id(master_id).await?;
        let mut union = std::collections::HashSet::new();
        let mut originals = Vec::new();

        for child_id in &master.child_ids {
            let child = self.get_by_id(*child_id).await?;
            for original in &child.original_vocabulary {
                let normalized = crate::normalize::normalize(original);
                if union.insert(normalized) {
                    originals.push(original.clone());
                }
            }
        }

        self.mutate(master_id, |corpus| corpus.rebuild_from_originals(originals))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let store = CorpusStore::new();
        store
            .create("en", s(&["apple"]), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        let err = store
            .create("en", s(&["banana"]), Language::English, CorpusType::Custom)
            .await
            .unwrap_err();
        check!(err.kind() == "conflict");
    }

    #[tokio::test]
    async fn add_then_remove_words_restores_hash() {
        let store = CorpusStore::new();
        let corpus = store
            .create("t", s(&["apple", "banana"]), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        let original_hash = corpus.vocabulary_hash;

        let added = store
            .add_words(corpus.corpus_id, s(&["cherry", "date"]))
            .await
            .unwrap();
        check!(added == 2);

        let removed = store
            .remove_words(corpus.corpus_id, s(&["cherry", "date"]))
            .await
            .unwrap();
        check!(removed == 2);

        let restored = store.get_by_id(corpus.corpus_id).await.unwrap();
        check!(restored.vocabulary_hash == original_hash);
    }

    #[tokio::test]
    async fn aggregate_master_unions_direct_children() {
        let store = CorpusStore::new();
        let master = store
            .create("m", Vec::new(), Language::English, CorpusType::Language)
            .await
            .unwrap();
        let c1 = store
            .create("c1", s(&["a", "b"]), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        let c2 = store
            .create("c2", s(&["b", "c"]), Language::English, CorpusType::Custom)
            .await
            .unwrap();

        store.attach_child(master.corpus_id, c1.corpus_id).await.unwrap();
        store.attach_child(master.corpus_id, c2.corpus_id).await.unwrap();

        let aggregated = store.aggregate_master(master.corpus_id).await.unwrap();
        check!(aggregated.vocabulary == vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        let fresh = Corpus::new("fresh", s(&["a", "b", "c"]), Language::English, CorpusType::Custom);
        check!(aggregated.vocabulary_hash == fresh.vocabulary_hash);
    }

    #[tokio::test]
    async fn mutating_a_masters_child_reaggregates_automatically() {
        let store = CorpusStore::new();
        let master = store
            .create("m", Vec::new(), Language::English, CorpusType::Language)
            .await
            .unwrap();
        store.set_master(master.corpus_id, true).await.unwrap();
        let c1 = store
            .create("c1", s(&["a", "b"]), Language::English, CorpusType::Custom)
            .await
            .unwrap();

        store.attach_child(master.corpus_id, c1.corpus_id).await.unwrap();
        let after_attach = store.get_by_id(master.corpus_id).await.unwrap();
        check!(after_attach.vocabulary == vec!["a".to_string(), "b".to_string()]);

        store.add_words(c1.corpus_id, s(&["c"])).await.unwrap();
        let after_add = store.get_by_id(master.corpus_id).await.unwrap();
        check!(after_add.vocabulary == vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        store.remove_words(c1.corpus_id, s(&["a"])).await.unwrap();
        let after_remove = store.get_by_id(master.corpus_id).await.unwrap();
        check!(after_remove.vocabulary == vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn attach_child_rejects_cycles() {
        let store = CorpusStore::new();
        let a = store
            .create("a", Vec::new(), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        let b = store
            .create("b", Vec::new(), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        store.attach_child(a.corpus_id, b.corpus_id).await.unwrap();
        let err = store.attach_child(b.corpus_id, a.corpus_id).await.unwrap_err();
        check!(err.kind() == "conflict");
    }

    #[tokio::test]
    async fn delete_without_cascade_refuses_when_children_present() {
        let store = CorpusStore::new();
        let parent = store
            .create("p", Vec::new(), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        let child = store
            .create("c", Vec::new(), Language::English, CorpusType::Custom)
            .await
            .unwrap();
        store.attach_child(parent.corpus_id, child.corpus_id).await.unwrap();

        let err = store.delete(parent.corpus_id, false).await.unwrap_err();
        check!(err.kind() == "conflict");

        store.delete(parent.corpus_id, true).await.unwrap();
        check!(store.get_by_id(child.corpus_id).await.is_err());
    }
}
