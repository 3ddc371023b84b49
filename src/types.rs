//! Core types for wikiclient

use serde::{Deserialize, Serialize};

/// Action API module selector.
///
/// The lowercase form of a variant is both the `action=` value on the wire
/// and the name of the result node the server answers with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Authenticate a session
    Login,
    /// End a session
    Logout,
    /// Create or modify page content
    Edit,
    /// Rename a page
    Move,
    /// Read page data and lists (the only paginated action)
    Query,
    /// Flag a revision as reviewed
    Review,
    /// Delete a page
    Delete,
    /// Change page protection levels
    Protect,
    /// Purge the server-side cache for a page
    Purge,
    /// Roll back the latest edits to a page
    Rollback,
    /// Restore deleted revisions
    Undelete,
    /// Block a user
    Block,
    /// Unblock a user
    Unblock,
    /// Add a page to the watchlist
    Watch,
    /// Send an email to a user
    EmailUser,
}

impl Action {
    /// Wire name of the action (`action=<name>`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::Logout => "logout",
            Action::Edit => "edit",
            Action::Move => "move",
            Action::Query => "query",
            Action::Review => "review",
            Action::Delete => "delete",
            Action::Protect => "protect",
            Action::Purge => "purge",
            Action::Rollback => "rollback",
            Action::Undelete => "undelete",
            Action::Block => "block",
            Action::Unblock => "unblock",
            Action::Watch => "watch",
            Action::EmailUser => "emailuser",
        }
    }

    /// Which pacing lane this action is throttled on.
    ///
    /// State-mutating actions share the edit lane, everything else the read
    /// lane; the two lanes track their cadence independently.
    pub fn pace_kind(&self) -> PaceKind {
        match self {
            Action::Edit
            | Action::Move
            | Action::Delete
            | Action::Protect
            | Action::Review
            | Action::Rollback
            | Action::Undelete
            | Action::Block
            | Action::Unblock => PaceKind::Edit,
            Action::Login
            | Action::Logout
            | Action::Query
            | Action::Purge
            | Action::Watch
            | Action::EmailUser => PaceKind::Read,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pacing lane for the minimum-interval gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaceKind {
    /// Queries, logins and other non-mutating calls
    Read,
    /// Edits and other state-mutating calls
    Edit,
}

/// How a batched query identifies the pages it asks about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryBy {
    /// Page titles (`titles=`)
    Titles,
    /// Revision ids (`revids=`)
    Revisions,
    /// Page ids (`pageids=`)
    Ids,
}

impl QueryBy {
    /// The request parameter carrying the pipe-joined identifier chunk
    pub fn keyword(&self) -> &'static str {
        match self {
            QueryBy::Titles => "titles",
            QueryBy::Revisions => "revids",
            QueryBy::Ids => "pageids",
        }
    }
}

/// A session cookie as persisted by the cache codec
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Path attribute (defaults to "/")
    pub path: String,
    /// Domain attribute (defaults to the response host, may be empty)
    pub domain: String,
}

/// Minor-edit marker for save operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinorFlags {
    /// Let the server apply the account default
    #[default]
    None,
    /// Explicitly mark the edit as not minor
    NotMinor,
    /// Mark the edit as minor
    Minor,
}

/// Page-creation constraint for save operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CreateFlags {
    /// No constraint
    #[default]
    None,
    /// Fail if the page does not exist yet
    NoCreate,
    /// Fail if the page already exists
    CreateOnly,
    /// Recreate the page even if it was deleted meanwhile
    Recreate,
}

/// Watchlist behavior for save operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WatchFlags {
    /// Do not touch the watchlist
    #[default]
    None,
    /// Add the page to the watchlist
    Watch,
    /// Remove the page from the watchlist
    Unwatch,
    /// Keep the current watchlist state
    NoChange,
}

/// How the new text relates to the existing page text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveFlags {
    /// Replace the page (or section) text
    #[default]
    Replace,
    /// Append the text to the page
    Append,
    /// Prepend the text to the page
    Prepend,
}

/// Protection level applied to one action on a page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Protection {
    /// The action being restricted ("edit", "move")
    pub action: Action,
    /// The group allowed to perform it
    pub group: UserGroup,
    /// Expiry timestamp, or empty for the server default
    pub expiry: String,
}

impl Protection {
    /// Protection with the server-default expiry
    pub fn new(action: Action, group: UserGroup) -> Self {
        Self {
            action,
            group,
            expiry: String::new(),
        }
    }
}

impl std::fmt::Display for Protection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.action, self.group)
    }
}

/// User group used as a protection level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserGroup {
    /// No restriction
    None,
    /// Autoconfirmed accounts only
    Autoconfirmed,
    /// Administrators only
    Sysop,
}

impl std::fmt::Display for UserGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserGroup::None => "none",
            UserGroup::Autoconfirmed => "autoconfirmed",
            UserGroup::Sysop => "sysop",
        };
        f.write_str(s)
    }
}
