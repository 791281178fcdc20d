//! Conversion from Trypod's wire types to the host's entities.

use chrono::{DateTime, Utc};

use crate::model::{Hook, Login, Perm, Repo, Scm};
use crate::trypod::types::{RawCommit, RawRepo, RawUser};

/// The values every converted repository is stamped with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RepoStamp<'a> {
    pub user_id: i64,
    pub remote: &'a str,
    pub host: &'a str,
    pub owner: &'a str,
    pub role: Perm,
}

pub fn to_login(raw: RawUser) -> Login {
    Login {
        login: raw.username,
        name: raw.real_name,
        email: raw.address,
    }
}

/// Convert a Trypod repository to a host repository.
///
/// Trypod only hands out a single URL per repository, so it's used for
/// cloning, fetching, SSH and browsing alike. Repositories are never private.
pub fn to_repo(raw: RawRepo, stamp: &RepoStamp<'_>) -> Repo {
    Repo {
        user_id: stamp.user_id,
        remote: stamp.remote.to_string(),
        host: stamp.host.to_string(),
        owner: stamp.owner.to_string(),
        name: raw.name,
        scm: Scm::Mercurial,
        private: false,
        clone_url: raw.url.clone(),
        git_url: raw.url.clone(),
        ssh_url: raw.url.clone(),
        url: raw.url,
        role: stamp.role,
    }
}

/// Convert a commit webhook to a hook, timestamped with `received`.
pub fn to_hook(raw: RawCommit, owner: &str, received: DateTime<Utc>) -> Hook {
    Hook {
        owner: owner.to_string(),
        repo: raw.name,
        sha: raw.rev,
        branch: raw.branch,
        author: raw.author,
        timestamp: received,
        message: raw.description,
    }
}
