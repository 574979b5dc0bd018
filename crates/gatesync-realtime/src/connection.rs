//! Socket connection handles and the live connection pool.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A live, authenticated guardian socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection identifier.
    pub id: Uuid,
    /// Guardian who authenticated this socket.
    pub guardian_id: Uuid,
    /// Outbound message channel feeding the socket writer task.
    sender: mpsc::Sender<String>,
    /// Registration order, used to find the oldest connection.
    pub opened_at: chrono::DateTime<chrono::Utc>,
}

impl ConnectionHandle {
    /// Creates a new handle.
    pub fn new(guardian_id: Uuid, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            guardian_id,
            sender,
            opened_at: chrono::Utc::now(),
        }
    }

    /// Queue a message for this socket; a full or closed buffer drops it.
    pub fn send(&self, message: String) -> bool {
        self.sender.try_send(message).is_ok()
    }
}

/// Pool of live connections indexed by connection id and by guardian.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<Uuid, Arc<ConnectionHandle>>,
    by_guardian: DashMap<Uuid, Vec<Uuid>>,
}

impl ConnectionPool {
    /// Creates a new empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to both indexes.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_guardian
            .entry(handle.guardian_id)
            .or_default()
            .push(handle.id);
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection, returning its handle.
    pub fn remove(&self, conn_id: Uuid) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(&conn_id)?;
        if let Some(mut conns) = self.by_guardian.get_mut(&handle.guardian_id) {
            conns.retain(|id| *id != conn_id);
            if conns.is_empty() {
                drop(conns);
                self.by_guardian.remove(&handle.guardian_id);
            }
        }
        Some(handle)
    }

    /// Looks up a connection by id.
    pub fn get(&self, conn_id: Uuid) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(&conn_id).map(|h| h.clone())
    }

    /// All connection ids for a guardian, oldest first.
    pub fn guardian_connections(&self, guardian_id: Uuid) -> Vec<Uuid> {
        self.by_guardian
            .get(&guardian_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Whether a guardian has at least one live socket.
    pub fn is_online(&self, guardian_id: Uuid) -> bool {
        self.by_guardian
            .get(&guardian_id)
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_indexes_stay_consistent() {
        let pool = ConnectionPool::new();
        let guardian = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(4);
        let handle = Arc::new(ConnectionHandle::new(guardian, tx));
        let conn_id = handle.id;

        pool.add(handle);
        assert!(pool.is_online(guardian));
        assert_eq!(pool.guardian_connections(guardian), vec![conn_id]);

        pool.remove(conn_id);
        assert!(!pool.is_online(guardian));
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_send_delivers_to_receiver() {
        let guardian = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(guardian, tx);

        assert!(handle.send("hello".to_string()));
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }
}
