//! Process-local directory store for development and tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use mathquest_core::error::AppError;
use mathquest_core::result::AppResult;
use mathquest_core::types::{MessageId, UserId};
use mathquest_entity::{Message, NewMessage, User, UserRole};

use crate::store::DirectoryStore;

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    /// `(teacher, student)` pairs.
    assignments: HashSet<(UserId, UserId)>,
    /// Insertion order; history sorting is stable over it.
    messages: Vec<Message>,
}

/// [`DirectoryStore`] kept entirely in memory.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectoryStore {
    state: Arc<RwLock<State>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryDirectoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub async fn add_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Assign a student to a teacher.
    pub async fn assign(&self, teacher_id: UserId, student_id: UserId) {
        self.state
            .write()
            .await
            .assignments
            .insert((teacher_id, student_id));
    }

    /// Snapshot of every stored message in insertion order.
    pub async fn all_messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    /// Make every subsequent call fail as if the backend were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::service_unavailable("Directory store unavailable"))
        } else {
            Ok(())
        }
    }

    async fn counterparts(&self, id: UserId, role: UserRole) -> Vec<User> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .assignments
            .iter()
            .filter_map(|(teacher, student)| match role {
                UserRole::Teacher if *teacher == id => Some(*student),
                UserRole::Student if *student == id => Some(*teacher),
                _ => None,
            })
            .filter_map(|other| state.users.get(&other).cloned())
            .collect();
        users.sort_by(|a, b| a.display_name().cmp(&b.display_name()));
        users
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn students_of(&self, teacher_id: UserId) -> AppResult<Vec<User>> {
        self.ensure_available()?;
        Ok(self.counterparts(teacher_id, UserRole::Teacher).await)
    }

    async fn teachers_of(&self, student_id: UserId) -> AppResult<Vec<User>> {
        self.ensure_available()?;
        Ok(self.counterparts(student_id, UserRole::Student).await)
    }

    async fn messages_between(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        self.ensure_available()?;
        let mut history: Vec<Message> = self
            .state
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect();
        history.sort_by_key(|m| m.created_at);
        Ok(history)
    }

    async fn create_message(&self, new: NewMessage) -> AppResult<Message> {
        self.ensure_available()?;
        let message = Message {
            id: MessageId::new(),
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            content: new.content,
            created_at: Utc::now(),
            read: false,
            read_at: None,
        };
        self.state.write().await.messages.push(message.clone());
        debug!(message_id = %message.id, "Stored message in memory");
        Ok(message)
    }

    async fn mark_read(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        up_to: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.ensure_available()?;
        let now = Utc::now();
        let mut state = self.state.write().await;
        let mut changed = 0;
        for message in state.messages.iter_mut().filter(|m| {
            m.sender_id == sender_id
                && m.recipient_id == recipient_id
                && !m.read
                && m.created_at <= up_to
        }) {
            message.read = true;
            message.read_at = Some(now);
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_counts(&self, recipient_id: UserId) -> AppResult<HashMap<UserId, u64>> {
        self.ensure_available()?;
        let mut counts = HashMap::new();
        for message in self
            .state
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.recipient_id == recipient_id && !m.read)
        {
            *counts.entry(message.sender_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathquest_core::error::ErrorKind;

    fn user(first: &str, role: UserRole) -> User {
        User {
            id: UserId::new(),
            email: format!("{}@example.com", first.to_lowercase()),
            first_name: Some(first.to_string()),
            last_name: None,
            role,
            last_active: None,
        }
    }

    fn new_message(from: UserId, to: UserId, content: &str) -> NewMessage {
        NewMessage {
            sender_id: from,
            recipient_id: to,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_roster_both_directions() {
        let store = MemoryDirectoryStore::new();
        let teacher = user("Tess", UserRole::Teacher);
        let alice = user("Alice", UserRole::Student);
        let bob = user("Bob", UserRole::Student);
        for u in [&teacher, &alice, &bob] {
            store.add_user(u.clone()).await;
        }
        store.assign(teacher.id, bob.id).await;
        store.assign(teacher.id, alice.id).await;

        let students = store.students_of(teacher.id).await.unwrap();
        let names: Vec<_> = students.iter().map(|u| u.display_name()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        let teachers = store.teachers_of(alice.id).await.unwrap();
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].id, teacher.id);

        assert!(store.teachers_of(teacher.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_ordered_and_scoped() {
        let store = MemoryDirectoryStore::new();
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());

        store.create_message(new_message(a, b, "one")).await.unwrap();
        store.create_message(new_message(c, a, "elsewhere")).await.unwrap();
        store.create_message(new_message(b, a, "two")).await.unwrap();
        store.create_message(new_message(a, b, "three")).await.unwrap();

        let history = store.messages_between(b, a).await.unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn test_mark_read_is_directional_and_idempotent() {
        let store = MemoryDirectoryStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        store.create_message(new_message(a, b, "to b")).await.unwrap();
        store.create_message(new_message(a, b, "to b again")).await.unwrap();
        store.create_message(new_message(b, a, "to a")).await.unwrap();

        assert_eq!(store.mark_read(a, b, Utc::now()).await.unwrap(), 2);
        assert_eq!(store.mark_read(a, b, Utc::now()).await.unwrap(), 0);

        let messages = store.all_messages().await;
        for m in &messages {
            if m.sender_id == a {
                assert!(m.read);
                assert!(m.read_at.is_some());
            } else {
                assert!(!m.read);
                assert!(m.read_at.is_none());
            }
        }
    }

    #[tokio::test]
    async fn test_mark_read_stops_at_bound() {
        let store = MemoryDirectoryStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        let seen = store.create_message(new_message(a, b, "seen")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let later = store.create_message(new_message(a, b, "later")).await.unwrap();
        assert!(later.created_at > seen.created_at);

        assert_eq!(store.mark_read(a, b, seen.created_at).await.unwrap(), 1);

        let messages = store.all_messages().await;
        let read: Vec<_> = messages.iter().filter(|m| m.read).map(|m| m.id).collect();
        assert_eq!(read, vec![seen.id]);
    }

    #[tokio::test]
    async fn test_unread_counts_grouped_by_sender() {
        let store = MemoryDirectoryStore::new();
        let (me, x, y) = (UserId::new(), UserId::new(), UserId::new());
        store.create_message(new_message(x, me, "1")).await.unwrap();
        store.create_message(new_message(x, me, "2")).await.unwrap();
        store.create_message(new_message(y, me, "3")).await.unwrap();
        store.create_message(new_message(me, x, "mine")).await.unwrap();
        store.mark_read(y, me, Utc::now()).await.unwrap();

        let counts = store.unread_counts(me).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&x), Some(&2));
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = MemoryDirectoryStore::new();
        store.set_unavailable(true);

        let err = store
            .create_message(new_message(UserId::new(), UserId::new(), "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
        assert!(store.all_messages().await.is_empty());
        assert!(!store.health_check().await.unwrap());

        store.set_unavailable(false);
        assert!(store.find_user(UserId::new()).await.unwrap().is_none());
    }
}
