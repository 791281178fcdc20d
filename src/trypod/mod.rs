//! The Trypod remote.

mod convert;
mod types;

pub use self::convert::{to_hook, to_login, to_repo, RepoStamp};
pub use self::types::{RawCommit, RawRepo, RawUser};

use chrono::Utc;
use failure::{Error, ResultExt};
use reqwest::Url;
use sec::Secret;
use std::fmt::{self, Debug, Formatter};
use std::io::Read;

use crate::config::{General, TrypodConfig};
use crate::errors::DecodeError;
use crate::http::{HttpTransport, Transport};
use crate::model::{Credentials, Hook, HookRequest, Login, Perm, Repo, Token, User};
use crate::Remote;

/// The tag identifying Trypod remotes.
pub const KIND: &str = "trypod";

/// The file a build script is read from, relative to the repository root.
pub const BUILD_SCRIPT: &str = ".drone.yml";

/// A [`Remote`] which talks to a Trypod server.
///
/// Trypod has no notion of per-repository access control. Every user gets
/// the same (configurable, full by default) permissions on every repository.
pub struct Trypod<T = HttpTransport> {
    url: String,
    owner: String,
    open: bool,
    token: Option<Secret<String>>,
    permissions: Perm,
    transport: T,
}

impl Trypod<HttpTransport> {
    /// Create a `Trypod` which uses a real HTTP client.
    pub fn with_config(cfg: TrypodConfig, general: &General) -> Result<Trypod, Error> {
        let transport = HttpTransport::with_timeout(general.timeout())
            .context("Unable to create the HTTP client")?;

        Ok(Trypod::new(cfg, transport))
    }
}

impl<T: Transport> Trypod<T> {
    pub fn new(cfg: TrypodConfig, transport: T) -> Trypod<T> {
        let TrypodConfig {
            url,
            owner,
            open,
            token,
            permissions,
        } = cfg;

        if token.is_some() {
            debug!("A static token is configured, but Trypod never issues standing tokens");
        }

        Trypod {
            url: url.trim_end_matches('/').to_string(),
            owner,
            open,
            token,
            permissions,
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn static_token(&self) -> Option<&Secret<String>> {
        self.token.as_ref()
    }
}

impl<T: Transport> Remote for Trypod<T> {
    fn authorize(&self, credentials: &Credentials) -> Result<Login, Error> {
        debug!("Logging in as {}", credentials.username);

        let body = self.transport.post_form(
            &format!("{}/login", self.url),
            &[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.reveal_str()),
            ],
        )?;

        // An empty user decodes just fine, so a rejected login isn't an
        // error here.
        let raw: RawUser = serde_json::from_slice(&body)
            .map_err(|e| DecodeError::new("login response", e))?;

        Ok(to_login(raw))
    }

    fn kind(&self) -> &str {
        KIND
    }

    /// The host is lowercased and a port matching the scheme's default is
    /// dropped, so `http://SCM.example.com:80` becomes `scm.example.com`.
    fn host(&self) -> String {
        match Url::parse(&self.url) {
            Ok(url) => match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{}:{}", host, port),
                (Some(host), None) => host.to_string(),
                (None, _) => String::new(),
            },
            Err(e) => {
                warn!("Unable to parse the Trypod URL {:?}, {}", self.url, e);
                String::new()
            }
        }
    }

    fn repositories(&self, user: &User) -> Result<Vec<Repo>, Error> {
        debug!("Fetching repositories for {}", user.login);

        let body = self.transport.get(&format!("{}/repos", self.url))?;

        let raw: Option<Vec<RawRepo>> = serde_json::from_slice(&body)
            .map_err(|e| DecodeError::new("repository list", e))?;

        let remote = self.kind();
        let host = self.host();
        let stamp = RepoStamp {
            user_id: user.id,
            remote,
            host: &host,
            owner: &self.owner,
            role: self.permissions,
        };

        let repos: Vec<Repo> = raw
            .unwrap_or_default()
            .into_iter()
            .map(|r| to_repo(r, &stamp))
            .collect();

        debug!("Found {} repositories", repos.len());
        Ok(repos)
    }

    fn build_script(&self, _user: &User, repo: &Repo, hook: &Hook) -> Result<Vec<u8>, Error> {
        let url = format!("{}/raw-file/{}/{}", repo.url, hook.sha, BUILD_SCRIPT);
        debug!("Fetching the build script for {}@{}", repo.name, hook.sha);

        self.transport.get(&url)
    }

    fn activate(&self, _user: &User, repo: &Repo, link: &str) -> Result<(), Error> {
        // Trypod has no hook API, hooks must be set up on the server.
        debug!(
            "Not activating {}, hooks should already point at {}",
            repo.name, link
        );
        Ok(())
    }

    fn parse_hook(&self, request: HookRequest<'_>) -> Result<Hook, Error> {
        let mut payload = Vec::new();
        request
            .into_body()
            .read_to_end(&mut payload)
            .context("Unable to read the hook body")?;

        let raw: RawCommit = serde_json::from_slice(&payload)
            .map_err(|e| DecodeError::new("hook payload", e))?;
        trace!("Received a hook for {}@{}", raw.name, raw.rev);

        Ok(to_hook(raw, &self.owner, Utc::now()))
    }

    fn open_registration(&self) -> bool {
        self.open
    }

    fn token(&self, _user: &User) -> Result<Option<Token>, Error> {
        Ok(None)
    }
}

impl<T> Debug for Trypod<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Trypod")
            .field("url", &self.url)
            .field("owner", &self.owner)
            .field("open", &self.open)
            .finish()
    }
}
