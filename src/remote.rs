use failure::Error;
use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt::{self, Debug, Formatter};

use crate::model::{Credentials, Hook, HookRequest, Login, Repo, Token, User};

/// Everything the host needs from a source-hosting platform.
pub trait Remote: Send + Sync {
    /// Check a user's credentials with the platform and find out who they
    /// are.
    fn authorize(&self, credentials: &Credentials) -> Result<Login, Error>;

    /// A constant tag identifying the platform.
    fn kind(&self) -> &str;

    /// The network host (and port, if any) the platform lives on.
    ///
    /// Implementations may normalise it (e.g. lowercase the name or drop a
    /// default port), so it isn't always a substring of the configured URL.
    fn host(&self) -> String;

    /// All the repositories `user` can build.
    fn repositories(&self, user: &User) -> Result<Vec<Repo>, Error>;

    /// Fetch the raw build script for the revision a hook points at.
    fn build_script(&self, user: &User, repo: &Repo, hook: &Hook) -> Result<Vec<u8>, Error>;

    /// Ask the platform to send hooks for `repo` to `link`.
    fn activate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), Error>;

    /// Turn an inbound webhook into a [`Hook`].
    fn parse_hook(&self, request: HookRequest<'_>) -> Result<Hook, Error>;

    /// Can anyone with a platform account sign up to the host?
    fn open_registration(&self) -> bool;

    /// Issue a standing API token for `user`, if the platform supports it.
    fn token(&self, user: &User) -> Result<Option<Token>, Error>;
}

/// The remotes the host knows about, keyed by [`Remote::kind()`].
#[derive(Default)]
pub struct Registry {
    remotes: BTreeMap<String, Box<dyn Remote>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Add a remote, replacing any previously registered remote of the same
    /// kind.
    pub fn register<R: Remote + 'static>(&mut self, remote: R) {
        let kind = remote.kind().to_string();
        info!("Registering the {} remote ({})", kind, remote.host());

        match self.remotes.entry(kind) {
            Entry::Occupied(mut entry) => {
                warn!("Replacing the existing {} remote", entry.key());
                entry.insert(Box::new(remote));
            }
            Entry::Vacant(entry) => {
                entry.insert(Box::new(remote));
            }
        }
    }

    pub fn lookup(&self, kind: &str) -> Option<&dyn Remote> {
        self.remotes.get(kind).map(|r| &**r)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Remote> {
        self.remotes.values().map(|r| &**r)
    }

    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Registry")
            .field("remotes", &self.remotes.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        kind: &'static str,
        host: &'static str,
    }

    impl Remote for Dummy {
        fn authorize(&self, _: &Credentials) -> Result<Login, Error> {
            Ok(Login::default())
        }

        fn kind(&self) -> &str {
            self.kind
        }

        fn host(&self) -> String {
            self.host.to_string()
        }

        fn repositories(&self, _: &User) -> Result<Vec<Repo>, Error> {
            Ok(Vec::new())
        }

        fn build_script(&self, _: &User, _: &Repo, _: &Hook) -> Result<Vec<u8>, Error> {
            Ok(Vec::new())
        }

        fn activate(&self, _: &User, _: &Repo, _: &str) -> Result<(), Error> {
            Ok(())
        }

        fn parse_hook(&self, _: HookRequest<'_>) -> Result<Hook, Error> {
            Err(failure::err_msg("unsupported"))
        }

        fn open_registration(&self) -> bool {
            false
        }

        fn token(&self, _: &User) -> Result<Option<Token>, Error> {
            Ok(None)
        }
    }

    #[test]
    fn look_up_a_remote_by_kind() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.register(Dummy {
            kind: "first",
            host: "a.example.com",
        });
        registry.register(Dummy {
            kind: "second",
            host: "b.example.com",
        });

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("second").unwrap().host(), "b.example.com");
        assert!(registry.lookup("third").is_none());
    }

    #[test]
    fn registering_the_same_kind_twice_replaces_it() {
        let mut registry = Registry::new();

        registry.register(Dummy {
            kind: "first",
            host: "old.example.com",
        });
        registry.register(Dummy {
            kind: "first",
            host: "new.example.com",
        });

        assert_eq!(registry.len(), 1);
        let hosts: Vec<String> = registry.iter().map(|r| r.host()).collect();
        assert_eq!(hosts, vec![String::from("new.example.com")]);
    }
}
