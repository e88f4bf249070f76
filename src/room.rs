//! Room struct definition
//!
//! The membership table: every admitted participant, in admission order.
//! Enforces unique non-empty names and the room capacity. Only the
//! `ChatServer` actor touches a `Room`, one command at a time.

use crate::error::AppError;
use crate::participant::{Participant, Recipient};
use crate::types::ClientId;

/// Default maximum number of simultaneous participants
pub const MAX_CAPACITY: usize = 10;

/// Normalize a raw name line: drop embedded newlines, trim whitespace
pub fn normalize_name(raw: &str) -> String {
    raw.replace('\n', "").trim().to_string()
}

/// Shared chat room
#[derive(Debug)]
pub struct Room {
    /// Admitted participants, in admission order
    members: Vec<Participant>,
    /// Maximum number of participants
    capacity: usize,
}

impl Room {
    /// Create an empty room holding at most `capacity` participants
    pub fn new(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if no more participants can be admitted
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if a client is in this room
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.iter().any(|m| m.id == client_id)
    }

    /// Current display name of a member
    pub fn name_of(&self, client_id: ClientId) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.id == client_id)
            .map(|m| m.name.as_str())
    }

    /// Validate a candidate name against the current members
    ///
    /// Emptiness is checked before uniqueness. Comparison is exact and
    /// case-sensitive.
    pub fn validate_name(&self, name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::EmptyName);
        }
        if self.members.iter().any(|m| m.name == name) {
            return Err(AppError::NameTaken);
        }
        Ok(())
    }

    /// Whether a participant with this name could be inserted right now
    pub fn check_admission(&self, name: &str) -> Result<(), AppError> {
        self.validate_name(name)?;
        if self.is_full() {
            return Err(AppError::RoomFull);
        }
        Ok(())
    }

    /// Admit a participant
    ///
    /// Name and capacity are checked and the participant inserted in one
    /// step. The room is left unchanged on error.
    pub fn insert(&mut self, participant: Participant) -> Result<(), AppError> {
        self.check_admission(&participant.name)?;
        self.members.push(participant);
        Ok(())
    }

    /// Remove a participant by id
    ///
    /// Returns the removed participant, or None if it was not present.
    pub fn remove(&mut self, client_id: ClientId) -> Option<Participant> {
        let index = self.members.iter().position(|m| m.id == client_id)?;
        Some(self.members.remove(index))
    }

    /// Change a member's display name, returning the previous one
    pub fn rename(&mut self, client_id: ClientId, new_name: &str) -> Result<String, AppError> {
        if !self.contains(client_id) {
            return Err(AppError::NotMember);
        }
        self.validate_name(new_name)?;

        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == client_id)
            .ok_or(AppError::NotMember)?;
        Ok(std::mem::replace(&mut member.name, new_name.to_string()))
    }

    /// Copy of all members in admission order
    pub fn snapshot(&self) -> Vec<Recipient> {
        self.members.iter().map(Participant::recipient).collect()
    }
}
