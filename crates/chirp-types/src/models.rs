use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed roles. The numeric ids are what the `roles` table stores and what
/// session tokens carry in `role_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    pub fn id(self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Editor => 2,
            Role::Viewer => 3,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Editor),
            3 => Some(Role::Viewer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Editor => "Editor",
            Role::Viewer => "Viewer",
        }
    }

    /// Role assigned through public registration. Only Editor and Viewer may
    /// be self-selected; anything else falls back to Viewer.
    pub fn for_registration(requested: Option<i64>) -> Self {
        match requested.and_then(Role::from_id) {
            Some(Role::Editor) => Role::Editor,
            _ => Role::Viewer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed set of sentiments a user can attach to a tweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionKind {
    Like,
    Love,
    Funny,
}

impl ReactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "LIKE",
            ReactionKind::Love => "LOVE",
            ReactionKind::Funny => "FUNNY",
        }
    }

    /// Exact, case-sensitive match against the stored spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LIKE" => Some(ReactionKind::Like),
            "LOVE" => Some(ReactionKind::Love),
            "FUNNY" => Some(ReactionKind::Funny),
            _ => None,
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
