//! In-memory task storage.

use std::sync::Mutex;

use tracing::{debug, warn};

/// Process-wide ordered list of task names.
///
/// Insertion order is preserved and duplicates are permitted; a task's
/// identity is its string value. The list lives for the duration of the
/// process and is never persisted.
///
/// Appends are mutex-guarded so the per-connection concurrency mode cannot
/// lose updates or corrupt ordering.
pub struct TaskStore {
    tasks: Mutex<Vec<String>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Append a task to the end of the list.
    ///
    /// Empty names are rejected and `false` is returned; the list is left
    /// untouched.
    pub fn append(&self, name: &str) -> bool {
        if name.is_empty() {
            warn!("rejected empty task name");
            return false;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(name.to_string());
        debug!(task = %name, total = tasks.len(), "task appended");
        true
    }

    /// Remove the first task whose name matches exactly.
    ///
    /// Returns `true` if a task was removed. No HTTP route invokes this;
    /// the task list page renders removal links for a route that the server
    /// deliberately does not implement.
    pub fn remove(&self, name: &str) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        match tasks.iter().position(|t| t == name) {
            Some(idx) => {
                tasks.remove(idx);
                debug!(task = %name, total = tasks.len(), "task removed");
                true
            }
            None => false,
        }
    }

    /// Copy of the current task list, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn append_preserves_insertion_order() {
        let store = TaskStore::new();
        assert!(store.append("buy milk"));
        assert!(store.append("walk dog"));
        assert!(store.append("buy milk"));
        assert_eq!(store.snapshot(), vec!["buy milk", "walk dog", "buy milk"]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let store = TaskStore::new();
        assert!(!store.append(""));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_takes_first_match_only() {
        let store = TaskStore::new();
        store.append("a");
        store.append("b");
        store.append("a");
        assert!(store.remove("a"));
        assert_eq!(store.snapshot(), vec!["b", "a"]);
        assert!(!store.remove("missing"));
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        let store = Arc::new(TaskStore::new());
        let n = 32;
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    assert!(store.append(&format!("task-{i}")));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let tasks = store.snapshot();
        assert_eq!(tasks.len(), n);
        for i in 0..n {
            assert!(tasks.contains(&format!("task-{i}")));
        }
    }
}
