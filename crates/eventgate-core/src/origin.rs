//! Browser origins and the cross-origin policy.
//!
//! An [`Origin`] is the `scheme://host[:port]` triple a browser sends in the
//! `Origin` header. Origins are normalized on parse so that configuration
//! entries and request headers compare equal regardless of case or an
//! explicit default port.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// URL scheme of an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Scheme {
    Http,
    Https,
}

impl Scheme {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

/// A normalized web origin (`scheme://host[:port]`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Origin {
    scheme: Scheme,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Parse and normalize an origin.
    ///
    /// The scheme and host are lower-cased, a single trailing `/` is
    /// tolerated, and the scheme's default port is dropped.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidOrigin` if the input is not an `http` or
    /// `https` origin, or if it carries a path, query, or credentials.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason| CoreError::InvalidOrigin {
            origin: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let (scheme, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;

        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            _ => return Err(invalid("scheme must be http or https")),
        };

        if rest.is_empty() {
            return Err(invalid("missing host"));
        }
        if rest.contains(['/', '?', '#', '@']) {
            return Err(invalid("origin must not carry a path or query"));
        }

        let (host, port) = split_host_port(rest).map_err(invalid)?;

        if !is_valid_host(host) {
            return Err(invalid("invalid host"));
        }

        let port = match port {
            None => None,
            Some(p) => {
                let port: u16 = p.parse().map_err(|_| invalid("invalid port"))?;
                (port != scheme.default_port()).then_some(port)
            }
        };

        Ok(Self {
            scheme,
            host: host.to_ascii_lowercase(),
            port,
        })
    }

}

/// Split `host[:port]`, keeping bracketed IPv6 literals intact.
fn split_host_port(rest: &str) -> std::result::Result<(&str, Option<&str>), &'static str> {
    if let Some(after) = rest.strip_prefix('[') {
        let (inner, tail) = after
            .split_once(']')
            .ok_or("unterminated IPv6 literal")?;
        if inner.is_empty() {
            return Err("missing host");
        }
        let host = &rest[..inner.len() + 2];
        if tail.is_empty() {
            return Ok((host, None));
        }
        tail.strip_prefix(':')
            .map(|port| (host, Some(port)))
            .ok_or("unexpected characters after IPv6 literal")
    } else {
        Ok(match rest.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (rest, None),
        })
    }
}

fn is_valid_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.');
    }
    !host.is_empty()
        && !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

impl FromStr for Origin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Origin({self})")
    }
}

impl TryFrom<String> for Origin {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.to_string()
    }
}

/// Which browser origins may call the API.
///
/// The default is a restricted policy with an empty allow-list: no
/// cross-origin request is approved until origins are configured.
/// `Permissive` approves every origin and is only selected by an explicit
/// `*` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Every origin is approved.
    Permissive,
    /// Only the listed origins are approved.
    Restricted(BTreeSet<Origin>),
}

impl OriginPolicy {
    /// The configuration entry that switches the policy to permissive.
    pub const WILDCARD: &'static str = "*";

    /// Build a policy from configuration entries.
    ///
    /// Blank entries are ignored. A `*` entry selects [`OriginPolicy::Permissive`];
    /// every other entry must still be a valid origin.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidOrigin` for the first entry that does not parse.
    pub fn from_list<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut origins = BTreeSet::new();
        let mut wildcard = false;

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            if entry == Self::WILDCARD {
                wildcard = true;
                continue;
            }
            origins.insert(Origin::parse(entry)?);
        }

        if wildcard {
            Ok(Self::Permissive)
        } else {
            Ok(Self::Restricted(origins))
        }
    }

    /// Returns `true` if a request carrying this `Origin` header is approved.
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            Self::Permissive => true,
            Self::Restricted(allowed) => origin
                .parse::<Origin>()
                .is_ok_and(|origin| allowed.contains(&origin)),
        }
    }

    /// Returns `true` if every origin is approved.
    #[must_use]
    pub const fn is_permissive(&self) -> bool {
        matches!(self, Self::Permissive)
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::Restricted(BTreeSet::new())
    }
}

impl fmt::Display for OriginPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => f.write_str(Self::WILDCARD),
            Self::Restricted(allowed) if allowed.is_empty() => f.write_str("<none>"),
            Self::Restricted(allowed) => {
                let list: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                f.write_str(&list.join(","))
            }
        }
    }
}
