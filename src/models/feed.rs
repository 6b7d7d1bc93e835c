use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::UserId;
use crate::error::AppError;

pub type EventId = i64;

/// Kind of entity a feed event is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Like,
    Friend,
    Review,
}

/// What happened to the entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Like => write!(f, "LIKE"),
            EventType::Friend => write!(f, "FRIEND"),
            EventType::Review => write!(f, "REVIEW"),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Add => write!(f, "ADD"),
            Operation::Remove => write!(f, "REMOVE"),
            Operation::Update => write!(f, "UPDATE"),
        }
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIKE" => Ok(EventType::Like),
            "FRIEND" => Ok(EventType::Friend),
            "REVIEW" => Ok(EventType::Review),
            other => Err(AppError::Internal(format!("Unknown event type: {}", other))),
        }
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Operation::Add),
            "REMOVE" => Ok(Operation::Remove),
            "UPDATE" => Ok(Operation::Update),
            other => Err(AppError::Internal(format!("Unknown operation: {}", other))),
        }
    }
}

/// Immutable record of a user-initiated action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub event_type: EventType,
    pub operation: Operation,
    pub entity_id: i64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// A feed event before the store assigns its id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewFeedEvent {
    pub user_id: UserId,
    pub event_type: EventType,
    pub operation: Operation,
    pub entity_id: i64,
    pub timestamp: i64,
}

impl NewFeedEvent {
    pub fn with_id(self, event_id: EventId) -> FeedEvent {
        FeedEvent {
            event_id,
            user_id: self.user_id,
            event_type: self.event_type,
            operation: self.operation,
            entity_id: self.entity_id,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trips_through_text() {
        for kind in [EventType::Like, EventType::Friend, EventType::Review] {
            assert_eq!(kind.to_string().parse::<EventType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_operation_rejected() {
        assert!("DELETE".parse::<Operation>().is_err());
    }

    #[test]
    fn test_feed_event_json_shape() {
        let event = NewFeedEvent {
            user_id: 1,
            event_type: EventType::Friend,
            operation: Operation::Add,
            entity_id: 2,
            timestamp: 1_700_000_000_000,
        }
        .with_id(9);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "FRIEND");
        assert_eq!(json["operation"], "ADD");
        assert_eq!(json["eventId"], 9);
    }
}
