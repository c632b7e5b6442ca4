use crate::error::StarCountError;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Owner and name of a repository, used verbatim as URL path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepositoryId {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = StarCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(RepositoryId::new(*owner, *name))
            }
            _ => Err(StarCountError::InvalidRepository(format!(
                "expected owner/name, got: {}",
                s
            ))),
        }
    }
}

/// Outcome of a star count lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarCount {
    Found(u64),
    NotFound,
}

impl StarCount {
    pub fn is_found(&self) -> bool {
        matches!(self, StarCount::Found(_))
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            StarCount::Found(count) => Some(*count),
            StarCount::NotFound => None,
        }
    }

    /// Flattens into a `(success, count)` pair; `NotFound` is always `(false, 0)`.
    pub fn into_pair(self) -> (bool, u64) {
        match self {
            StarCount::Found(count) => (true, count),
            StarCount::NotFound => (false, 0),
        }
    }
}

const STARGAZERS_COUNT: &str = "stargazers_count";

/// The part of the `GET /repos/{owner}/{name}` response we care about.
///
/// Keys are compared to `stargazers_count` ignoring ASCII case, so
/// `STARGAZERS_COUNT` binds but `StargazersCount` does not. When the key
/// appears more than once the last value wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPayload {
    pub stargazers_count: u64,
}

impl<'de> Deserialize<'de> for RepositoryPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = RepositoryPayload;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a repository object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut stargazers_count = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case(STARGAZERS_COUNT) {
                        stargazers_count = Some(map.next_value::<u64>()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                let stargazers_count =
                    stargazers_count.ok_or_else(|| de::Error::missing_field(STARGAZERS_COUNT))?;
                Ok(RepositoryPayload { stargazers_count })
            }
        }

        deserializer.deserialize_map(PayloadVisitor)
    }
}
