use failure::{Error, ResultExt};
use sec::Secret;
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::http::DEFAULT_TIMEOUT;
use crate::model::Perm;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    /// Connection details for a Trypod server. No remote is registered when
    /// this is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trypod: Option<TrypodConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    /// How many seconds to wait on a request before giving up.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl General {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for General {
    fn default() -> General {
        General {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrypodConfig {
    /// The server's base URL. An empty URL disables the remote.
    #[serde(default)]
    pub url: String,
    /// Who every repository and hook is attributed to.
    #[serde(default)]
    pub owner: String,
    /// Let anyone with a Trypod account register with the host.
    #[serde(default)]
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Secret<String>>,
    /// The access every user is granted on every repository.
    #[serde(default = "Perm::full")]
    pub permissions: Perm,
}

impl Default for TrypodConfig {
    fn default() -> TrypodConfig {
        TrypodConfig {
            url: String::new(),
            owner: String::new(),
            open: false,
            token: None,
            permissions: Perm::full(),
        }
    }
}

impl Config {
    pub const URL_VAR: &'static str = "TRYPOD_URL";
    pub const OWNER_VAR: &'static str = "TRYPOD_OWNER";
    pub const OPEN_VAR: &'static str = "TRYPOD_OPEN";
    pub const TOKEN_VAR: &'static str = "TRYPOD_TOKEN";

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());

        let contents = fs::read_to_string(path)
            .with_context(|_| format!("Unable to read {}", path.display()))?;

        Config::from_toml(&contents)
    }

    pub fn from_toml(src: &str) -> Result<Config, Error> {
        let cfg = toml::from_str(src).context("Unable to parse the config")?;
        Ok(cfg)
    }

    /// An example config with every option filled in.
    pub fn example() -> Config {
        Config {
            general: General::default(),
            trypod: Some(TrypodConfig {
                url: String::from("http://scm.example.com:8000/root"),
                owner: String::from("root"),
                open: false,
                token: Some(Secret::new(String::from("your-token-here"))),
                permissions: Perm::full(),
            }),
        }
    }

    pub fn as_toml(&self) -> Result<String, Error> {
        let src = toml::to_string_pretty(self).context("Unable to serialize the config")?;
        Ok(src)
    }

    /// Let `TRYPOD_*` variables (as returned by `lookup`) override whatever
    /// was in the config file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(Config::URL_VAR);
        let owner = lookup(Config::OWNER_VAR);
        let open = lookup(Config::OPEN_VAR);
        let token = lookup(Config::TOKEN_VAR);

        if url.is_none() && owner.is_none() && open.is_none() && token.is_none() {
            return Ok(());
        }

        let trypod = self.trypod.get_or_insert_with(TrypodConfig::default);

        if let Some(url) = url {
            trace!("Overriding the Trypod URL from ${}", Config::URL_VAR);
            trypod.url = url;
        }
        if let Some(owner) = owner {
            trypod.owner = owner;
        }
        if let Some(open) = open {
            trypod.open = open
                .trim()
                .parse::<bool>()
                .with_context(|_| format!("${} must be \"true\" or \"false\"", Config::OPEN_VAR))?;
        }
        if let Some(token) = token {
            trypod.token = Some(Secret::new(token));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn load_a_minimal_config() {
        let src = r#"
            [trypod]
            url = "http://localhost:8000"
        "#;

        let got = Config::from_toml(src).unwrap();

        assert_eq!(got.general, General::default());
        let trypod = got.trypod.unwrap();
        assert_eq!(trypod.url, "http://localhost:8000");
        assert_eq!(trypod.owner, "");
        assert!(!trypod.open);
        assert!(trypod.token.is_none());
        assert_eq!(trypod.permissions, Perm::full());
    }

    #[test]
    fn an_empty_file_has_no_remote() {
        let got = Config::from_toml("").unwrap();

        assert!(got.trypod.is_none());
        assert_eq!(got.general.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn permissions_can_be_restricted() {
        let src = r#"
            [trypod]
            url = "http://localhost:8000"

            [trypod.permissions]
            admin = false
            write = false
            read = true
        "#;

        let got = Config::from_toml(src).unwrap();

        let should_be = Perm {
            admin: false,
            write: false,
            read: true,
        };
        assert_eq!(got.trypod.unwrap().permissions, should_be);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let src = r#"
            [trypod]
            uri = "http://localhost:8000"
        "#;

        assert!(Config::from_toml(src).is_err());
    }

    #[test]
    fn the_example_round_trips_through_a_file() {
        let example = Config::example();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(example.as_toml().unwrap().as_bytes())
            .unwrap();

        let got = Config::from_file(file.path()).unwrap();

        let trypod = got.trypod.unwrap();
        assert_eq!(trypod.url, "http://scm.example.com:8000/root");
        assert_eq!(trypod.owner, "root");
        assert_eq!(trypod.token.unwrap().reveal_str(), "your-token-here");
    }

    #[test]
    fn missing_files_are_reported() {
        let temp = tempfile::tempdir().unwrap();

        let err = Config::from_file(temp.path().join("nope.toml")).unwrap_err();

        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut cfg = Config::from_toml(
            r#"
            [trypod]
            url = "http://old"
            owner = "old-owner"
        "#,
        )
        .unwrap();
        let env = vars(&[
            ("TRYPOD_URL", "http://new"),
            ("TRYPOD_OPEN", "true"),
            ("TRYPOD_TOKEN", "s3cr3t"),
        ]);

        cfg.apply_overrides(|key| env.get(key).cloned()).unwrap();

        let trypod = cfg.trypod.unwrap();
        assert_eq!(trypod.url, "http://new");
        assert_eq!(trypod.owner, "old-owner");
        assert!(trypod.open);
        assert_eq!(trypod.token.unwrap().reveal_str(), "s3cr3t");
    }

    #[test]
    fn no_overrides_leaves_the_remote_unconfigured() {
        let mut cfg = Config::default();

        cfg.apply_overrides(|_| None).unwrap();

        assert!(cfg.trypod.is_none());
    }

    #[test]
    fn open_must_be_a_bool() {
        let mut cfg = Config::default();
        let env = vars(&[("TRYPOD_OPEN", "maybe")]);

        assert!(cfg.apply_overrides(|key| env.get(key).cloned()).is_err());
    }
}
