use std::sync::Arc;

use game_types::LobbyId;

/// Change notifications emitted after every successful mutation. Observers
/// refetch; events carry ids only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The round, seats, or score situation changed.
    GameStateChanged { lobby_id: LobbyId },
    /// Lobby membership or settings changed.
    LobbyChanged { lobby_id: LobbyId },
}

impl GameEvent {
    pub fn lobby_id(&self) -> LobbyId {
        match self {
            GameEvent::GameStateChanged { lobby_id } => *lobby_id,
            GameEvent::LobbyChanged { lobby_id } => *lobby_id,
        }
    }
}

/// Event handler trait for processing game events
pub trait GameEventHandler: Send + Sync {
    fn handle_event(&self, event: GameEvent);
}

/// Simple event bus for distributing game events
pub struct GameEventBus {
    handlers: Vec<Arc<dyn GameEventHandler>>,
}

impl GameEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn GameEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn publish(&self, event: GameEvent) {
        for handler in &self.handlers {
            handler.handle_event(event);
        }
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct TestHandler {
        events: Mutex<Vec<GameEvent>>,
    }

    impl TestHandler {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }
    }

    impl GameEventHandler for TestHandler {
        fn handle_event(&self, event: GameEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_event_bus_fans_out_to_every_handler() {
        let mut bus = GameEventBus::new();
        let first = Arc::new(TestHandler::new());
        let second = Arc::new(TestHandler::new());
        bus.add_handler(first.clone());
        bus.add_handler(second.clone());

        let lobby_id = Uuid::new_v4();
        bus.publish(GameEvent::GameStateChanged { lobby_id });
        bus.publish(GameEvent::LobbyChanged { lobby_id });

        for handler in [&first, &second] {
            let seen = handler.events.lock().unwrap();
            assert_eq!(
                *seen,
                vec![
                    GameEvent::GameStateChanged { lobby_id },
                    GameEvent::LobbyChanged { lobby_id },
                ]
            );
        }
    }

    #[test]
    fn test_events_expose_their_lobby() {
        let lobby_id = Uuid::new_v4();
        assert_eq!(GameEvent::GameStateChanged { lobby_id }.lobby_id(), lobby_id);
        assert_eq!(GameEvent::LobbyChanged { lobby_id }.lobby_id(), lobby_id);
    }
}
