//! Connection state record

use serde::{Deserialize, Serialize};

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Open,
    Connecting,
    Close,
}

/// Why and when the connection last closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastDisconnect {
    pub error: String,
    pub date: u64,
}

/// Latest connection status. The same type carries partial updates: only
/// fields that are `Some` overwrite on [`ConnectionState::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_disconnect: Option<LastDisconnect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new_login: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_pending_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

impl ConnectionState {
    /// State of a store that has not seen any connection event yet
    pub fn closed() -> Self {
        Self {
            connection: Some(ConnectionStatus::Close),
            ..Default::default()
        }
    }

    /// Update carrying only a status
    pub fn status(status: ConnectionStatus) -> Self {
        Self {
            connection: Some(status),
            ..Default::default()
        }
    }

    /// Shallow merge: present fields overwrite
    pub fn merge(&mut self, update: &ConnectionState) {
        if update.connection.is_some() {
            self.connection = update.connection;
        }
        if update.last_disconnect.is_some() {
            self.last_disconnect = update.last_disconnect.clone();
        }
        if update.qr.is_some() {
            self.qr = update.qr.clone();
        }
        if update.is_new_login.is_some() {
            self.is_new_login = update.is_new_login;
        }
        if update.received_pending_notifications.is_some() {
            self.received_pending_notifications = update.received_pending_notifications;
        }
        if update.is_online.is_some() {
            self.is_online = update.is_online;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_merge() {
        let mut state = ConnectionState::closed();
        state.merge(&ConnectionState {
            qr: Some("qr-data".to_string()),
            ..Default::default()
        });
        assert_eq!(state.connection, Some(ConnectionStatus::Close));
        assert_eq!(state.qr.as_deref(), Some("qr-data"));

        state.merge(&ConnectionState::status(ConnectionStatus::Open));
        assert_eq!(state.connection, Some(ConnectionStatus::Open));
        assert_eq!(state.qr.as_deref(), Some("qr-data"));
    }
}
