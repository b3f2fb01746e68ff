use std::fmt;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use game_types::{LobbyId, PlayerId, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open socket. A connection follows at most one lobby at a time;
/// re-subscribing moves it.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub lobby_id: Option<LobbyId>,
    pub player_id: Option<PlayerId>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();

        let connection = Self {
            id,
            lobby_id: None,
            player_id: None,
            connected_at: now,
            last_activity: now,
            sender,
        };

        (connection, receiver)
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn subscribe(&mut self, lobby_id: LobbyId, player_id: PlayerId) {
        self.lobby_id = Some(lobby_id);
        self.player_id = Some(player_id);
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_inactive(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// Registry of open sockets and their lobby subscriptions. All methods are
/// synchronous; senders are unbounded so fan-out never blocks a mutation.
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, Connection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn create_connection(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (connection, receiver) = Connection::new(id);
        self.connections.insert(id, connection);
        receiver
    }

    pub fn remove_connection(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    pub fn update_activity(&self, id: ConnectionId) {
        if let Some(mut connection) = self.connections.get_mut(&id) {
            connection.update_activity();
        }
    }

    pub fn subscribe(
        &self,
        id: ConnectionId,
        lobby_id: LobbyId,
        player_id: PlayerId,
    ) -> Result<(), String> {
        match self.connections.get_mut(&id) {
            Some(mut connection) => {
                connection.subscribe(lobby_id, player_id);
                Ok(())
            }
            None => Err("Connection not found".to_string()),
        }
    }

    pub fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        match self.connections.get(&id) {
            Some(connection) => connection.send_message(message),
            None => Err("Connection not found".to_string()),
        }
    }

    /// Closed receivers are skipped here and reaped by the cleanup sweep.
    pub fn broadcast_to_lobby(&self, lobby_id: LobbyId, message: ServerMessage) {
        for connection in self.connections.iter() {
            if connection.lobby_id == Some(lobby_id) {
                let _ = connection.send_message(message.clone());
            }
        }
    }

    pub fn cleanup_inactive_connections(&self, timeout: Duration) {
        // Collect first; removing while iterating would hold shard locks
        let stale: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|connection| connection.is_inactive(timeout))
            .map(|connection| connection.id)
            .collect();

        for id in stale {
            tracing::info!("Removing inactive connection: {}", id);
            self.connections.remove(&id);
        }
    }

    // Test helper methods
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn lobby_subscriber_count(&self, lobby_id: LobbyId) -> usize {
        self.connections
            .iter()
            .filter(|connection| connection.lobby_id == Some(lobby_id))
            .count()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nudge(lobby_id: LobbyId) -> ServerMessage {
        ServerMessage::LobbyChanged { lobby_id }
    }

    #[tokio::test]
    async fn test_connection_creation_and_removal() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();

        let _receiver = manager.create_connection(conn_id);
        assert_eq!(manager.connection_count(), 1);

        manager.remove_connection(conn_id);
        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_subscription_routes_broadcasts() {
        let manager = ConnectionManager::new();
        let lobby_a = Uuid::new_v4();
        let lobby_b = Uuid::new_v4();

        let conn_a = ConnectionId::new();
        let conn_b = ConnectionId::new();
        let mut receiver_a = manager.create_connection(conn_a);
        let mut receiver_b = manager.create_connection(conn_b);

        manager.subscribe(conn_a, lobby_a, Uuid::new_v4()).unwrap();
        manager.subscribe(conn_b, lobby_b, Uuid::new_v4()).unwrap();

        manager.broadcast_to_lobby(lobby_a, nudge(lobby_a));

        assert!(receiver_a.try_recv().is_ok());
        assert!(receiver_b.try_recv().is_err());
        assert_eq!(manager.lobby_subscriber_count(lobby_a), 1);
    }

    #[tokio::test]
    async fn test_resubscribing_moves_the_connection() {
        let manager = ConnectionManager::new();
        let lobby_a = Uuid::new_v4();
        let lobby_b = Uuid::new_v4();
        let conn_id = ConnectionId::new();
        let mut receiver = manager.create_connection(conn_id);

        manager.subscribe(conn_id, lobby_a, Uuid::new_v4()).unwrap();
        manager.subscribe(conn_id, lobby_b, Uuid::new_v4()).unwrap();

        manager.broadcast_to_lobby(lobby_a, nudge(lobby_a));
        assert!(receiver.try_recv().is_err());

        manager.broadcast_to_lobby(lobby_b, nudge(lobby_b));
        assert!(receiver.try_recv().is_ok());
        assert_eq!(manager.lobby_subscriber_count(lobby_a), 0);
    }

    #[tokio::test]
    async fn test_subscribe_unknown_connection() {
        let manager = ConnectionManager::new();
        let result = manager.subscribe(ConnectionId::new(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(result.unwrap_err(), "Connection not found");
    }

    #[tokio::test]
    async fn test_message_sending_after_connection_close() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();

        let receiver = manager.create_connection(conn_id);
        drop(receiver);

        let result = manager.send_to_connection(conn_id, nudge(Uuid::new_v4()));
        assert_eq!(result.unwrap_err(), "Connection closed");
    }

    #[tokio::test]
    async fn test_activity_tracking_and_timeout() {
        let manager = ConnectionManager::new();
        let conn_id = ConnectionId::new();
        let _receiver = manager.create_connection(conn_id);

        let short_timeout = Duration::from_millis(10);
        manager.cleanup_inactive_connections(short_timeout);
        assert_eq!(manager.connection_count(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.cleanup_inactive_connections(short_timeout);
        assert_eq!(manager.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_connection_operations() {
        let manager = std::sync::Arc::new(ConnectionManager::new());
        let lobby_id = Uuid::new_v4();
        let mut handles = Vec::new();

        for _ in 0..50 {
            let manager_clone = manager.clone();
            let handle = tokio::spawn(async move {
                let conn_id = ConnectionId::new();
                let _receiver = manager_clone.create_connection(conn_id);
                manager_clone
                    .subscribe(conn_id, lobby_id, Uuid::new_v4())
                    .unwrap();
                tokio::time::sleep(Duration::from_millis(1)).await;
                manager_clone.remove_connection(conn_id);
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.lobby_subscriber_count(lobby_id), 0);
    }
}
