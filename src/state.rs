//! Client-visible protocol state and tag allocation.

use std::fmt;

/// The protocol state a session is in. Governs which commands `Client`
/// will dispatch versus hold (see [`crate::command::Command::can_execute_in`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,
    Connecting,
    NotAuthenticated,
    Authenticated,
    Selected,
    Logout,
}

impl ClientState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientState::Disconnected)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientState::Disconnected => "disconnected",
            ClientState::Connecting => "connecting",
            ClientState::NotAuthenticated => "not-authenticated",
            ClientState::Authenticated => "authenticated",
            ClientState::Selected => "selected",
            ClientState::Logout => "logout",
        };
        write!(f, "{s}")
    }
}

/// A per-session unique command tag, e.g. `A00001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// Wraps an already-formatted tag string, e.g. one read back off the wire.
    pub fn from_raw(raw: String) -> Self {
        Tag(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic tag allocator: `A00001`, `A00002`, ... Wrapping past `999999`
/// is a fatal protocol error rather than silently reusing a tag.
#[derive(Debug, Default)]
pub struct TagAllocator {
    next: u32,
}

/// Ceiling named in the tag-allocation invariant: wrap at 10^6 - 1.
const TAG_LIMIT: u32 = 999_999;

impl TagAllocator {
    pub fn new() -> Self {
        TagAllocator { next: 1 }
    }

    pub fn allocate(&mut self) -> crate::error::Result<Tag> {
        if self.next > TAG_LIMIT {
            return Err(crate::error::Error::protocol("tag counter exhausted"));
        }
        let tag = Tag(format!("A{:05}", self.next));
        self.next += 1;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_monotonic_zero_padded_tags() {
        let mut a = TagAllocator::new();
        assert_eq!(a.allocate().unwrap().as_str(), "A00001");
        assert_eq!(a.allocate().unwrap().as_str(), "A00002");
    }

    #[test]
    fn rejects_allocation_past_limit() {
        let mut a = TagAllocator { next: TAG_LIMIT + 1 };
        assert!(a.allocate().is_err());
    }
}
