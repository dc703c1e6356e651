// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

#[cfg(test)]
mod tests;

use serde::Serialize;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change. The
/// identifier is opaque to the core; the transport layer decides what it
/// means (an operator login, "system", a scheduler name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "operator", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates an operator actor from an opaque identifier.
    #[must_use]
    pub fn operator(id: &str) -> Self {
        Self::new(id.to_string(), String::from("operator"))
    }

    /// Creates the system actor for automated mutations.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., upload batch ID, review item ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`MergePersons`", "`ToggleAttendance`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A JSON snapshot of an entity at a point in time.
///
/// Snapshots are opaque to the audit layer; mutation sites serialize the
/// relevant entity state before and after the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A JSON representation of the entity state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot` from a pre-serialized JSON string.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Serializes a value into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized to JSON.
    pub fn of<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_string(value)?,
        })
    }

    /// An empty snapshot, used for creations (no before state) and
    /// deletions (no after state).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: String::from("null"),
        }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful mutation of canonical state must produce exactly one
/// audit event. Events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The entity kind and id the event is scoped to
/// - The entity state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Optional event ID assigned when persisted.
    /// None when created in-memory, Some(id) after persistence.
    pub event_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The kind of entity this event is scoped to (e.g., "person").
    pub entity: String,
    /// The identifier of the affected entity.
    pub entity_id: i64,
    /// The entity state before the transition.
    pub before: StateSnapshot,
    /// The entity state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent` without a persisted event ID.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `entity` - The kind of entity affected
    /// * `entity_id` - The identifier of the affected entity
    /// * `before` - The entity state before the transition
    /// * `after` - The entity state after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        entity: String,
        entity_id: i64,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            entity,
            entity_id,
            before,
            after,
        }
    }

    /// Creates a new `AuditEvent` with a persisted event ID.
    ///
    /// This is typically used when reconstructing events from storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn with_id(
        event_id: i64,
        actor: Actor,
        cause: Cause,
        action: Action,
        entity: String,
        entity_id: i64,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: Some(event_id),
            actor,
            cause,
            action,
            entity,
            entity_id,
            before,
            after,
        }
    }
}
