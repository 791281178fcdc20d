//! The host's normalized entities.
//!
//! Every remote, regardless of platform, produces these types. Nothing in
//! here knows about a particular platform's wire format.

use chrono::{DateTime, Utc};
use sec::Secret;
use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};
use std::io::Read;

/// A user known to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
}

/// The username and password a user typed into the host's login form.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new<U, P>(username: U, password: P) -> Credentials
    where
        U: Into<String>,
        P: Into<String>,
    {
        Credentials {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }
}

/// The identity a remote reports back after a successful login.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Login {
    pub login: String,
    pub name: String,
    pub email: String,
}

/// The version control system a repository uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scm {
    Git,
    Mercurial,
}

/// What a user is allowed to do with a repository.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perm {
    pub admin: bool,
    pub write: bool,
    pub read: bool,
}

impl Perm {
    /// Admin, write and read access.
    pub fn full() -> Perm {
        Perm {
            admin: true,
            write: true,
            read: true,
        }
    }
}

/// A repository as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repo {
    pub user_id: i64,
    pub remote: String,
    pub host: String,
    pub owner: String,
    pub name: String,
    pub scm: Scm,
    pub private: bool,
    pub clone_url: String,
    pub git_url: String,
    pub ssh_url: String,
    pub url: String,
    pub role: Perm,
}

/// A push or commit event, normalized from a webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hook {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub branch: String,
    pub author: String,
    /// When the hook was parsed, not when the commit was made.
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// A standing API token issued by a remote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry: Option<DateTime<Utc>>,
}

/// An inbound webhook request.
///
/// The body can only be taken once. Handing the request to a remote gives up
/// ownership, so the body is released as soon as the remote is done with it.
pub struct HookRequest<'a> {
    body: Box<dyn Read + 'a>,
}

impl<'a> HookRequest<'a> {
    pub fn new<R: Read + 'a>(body: R) -> HookRequest<'a> {
        HookRequest {
            body: Box::new(body),
        }
    }

    pub fn into_body(self) -> Box<dyn Read + 'a> {
        self.body
    }
}

impl From<Vec<u8>> for HookRequest<'static> {
    fn from(body: Vec<u8>) -> HookRequest<'static> {
        HookRequest::new(std::io::Cursor::new(body))
    }
}

impl<'a> From<&'a [u8]> for HookRequest<'a> {
    fn from(body: &'a [u8]) -> HookRequest<'a> {
        HookRequest::new(body)
    }
}

impl<'a> Debug for HookRequest<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("HookRequest").finish()
    }
}
