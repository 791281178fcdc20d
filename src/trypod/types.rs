//! The JSON a Trypod server speaks.
//!
//! Missing fields are left empty rather than rejected, and so are `null`s.
//! Each field is also accepted under its capitalised spelling.

use serde::de::{Deserialize, Deserializer};
use serde_derive::Deserialize;

fn nullable<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Option::unwrap_or_default)
}

/// The reply to `POST /login`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawUser {
    #[serde(alias = "Id", alias = "ID", deserialize_with = "nullable")]
    pub id: i64,
    #[serde(alias = "UserName", alias = "Username", deserialize_with = "nullable")]
    pub username: String,
    #[serde(
        rename = "realname",
        alias = "RealName",
        alias = "realName",
        alias = "Realname",
        deserialize_with = "nullable"
    )]
    pub real_name: String,
    #[serde(alias = "Address", deserialize_with = "nullable")]
    pub address: String,
}

/// One element of the `GET /repos` array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRepo {
    #[serde(alias = "Name", deserialize_with = "nullable")]
    pub name: String,
    #[serde(alias = "URL", alias = "Url", deserialize_with = "nullable")]
    pub url: String,
}

/// The body of a commit webhook.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawCommit {
    #[serde(alias = "Author", deserialize_with = "nullable")]
    pub author: String,
    #[serde(alias = "Name", deserialize_with = "nullable")]
    pub name: String,
    #[serde(alias = "Repository", deserialize_with = "nullable")]
    pub repository: String,
    #[serde(alias = "Rev", deserialize_with = "nullable")]
    pub rev: String,
    #[serde(alias = "Branch", deserialize_with = "nullable")]
    pub branch: String,
    #[serde(alias = "Description", deserialize_with = "nullable")]
    pub description: String,
}
