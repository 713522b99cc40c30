//! Catalog URI parsing (spec §6): `[sqlite:]<path>`,
//! `mariadb:<server>:<user>[:<password>]`, `postgresql:<server>:<user>[:<password>]`.

use crate::error::{Error, Result};

/// A parsed database URI, one variant per supported backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogUri {
    Sqlite { path: String },
    MariaDb {
        server: String,
        user: String,
        password: Option<String>,
    },
    Postgres {
        server: String,
        user: String,
        password: Option<String>,
    },
}

impl CatalogUri {
    /// Parse a command-line URI argument.
    ///
    /// A bare path with no recognized `<scheme>:` prefix is treated as
    /// `sqlite:<path>`, matching the optional-scheme grammar in spec §6.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(rest) = raw.strip_prefix("sqlite:") {
            return Ok(Self::Sqlite { path: rest.to_string() });
        }
        if let Some(rest) = raw.strip_prefix("mariadb:") {
            let (server, user, password) = split_server_user_password(rest, "mariadb")?;
            return Ok(Self::MariaDb { server, user, password });
        }
        if let Some(rest) = raw.strip_prefix("postgresql:") {
            let (server, user, password) = split_server_user_password(rest, "postgresql")?;
            return Ok(Self::Postgres { server, user, password });
        }
        if raw.contains(':') && looks_like_scheme(raw) {
            let scheme = raw.split(':').next().unwrap_or(raw);
            return Err(Error::UriParse {
                uri: raw.to_string(),
                reason: format!("unrecognized scheme '{scheme}'"),
            });
        }
        Ok(Self::Sqlite { path: raw.to_string() })
    }

    /// Fill in an interactively-prompted password for client/server backends.
    pub fn with_password(self, password: String) -> Self {
        match self {
            Self::MariaDb { server, user, .. } => Self::MariaDb {
                server,
                user,
                password: Some(password),
            },
            Self::Postgres { server, user, .. } => Self::Postgres {
                server,
                user,
                password: Some(password),
            },
            sqlite => sqlite,
        }
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self, Self::Sqlite { .. })
    }
}

/// A small, closed set of scheme names we recognize before deciding a bare
/// argument is a filesystem path rather than a typo'd URI.
fn looks_like_scheme(raw: &str) -> bool {
    let scheme = raw.split(':').next().unwrap_or_default();
    matches!(scheme, "sqlite" | "mariadb" | "mysql" | "postgresql" | "postgres")
}

fn split_server_user_password(rest: &str, scheme: &str) -> Result<(String, String, Option<String>)> {
    let mut parts = rest.splitn(3, ':');
    let server = parts.next().unwrap_or_default();
    let user = parts.next().unwrap_or_default();
    let password = parts.next();

    if server.is_empty() || user.is_empty() {
        return Err(Error::UriParse {
            uri: format!("{scheme}:{rest}"),
            reason: format!("expected '{scheme}:<server>:<user>[:<password>]'"),
        });
    }
    Ok((
        server.to_string(),
        user.to_string(),
        password.map(ToString::to_string),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_path_is_sqlite() {
        assert_eq!(
            CatalogUri::parse("/var/lib/bar/index.db").unwrap(),
            CatalogUri::Sqlite { path: "/var/lib/bar/index.db".to_string() }
        );
    }

    #[test]
    fn explicit_sqlite_scheme() {
        assert_eq!(
            CatalogUri::parse("sqlite:/tmp/index.db").unwrap(),
            CatalogUri::Sqlite { path: "/tmp/index.db".to_string() }
        );
    }

    #[test]
    fn mariadb_without_password() {
        let uri = CatalogUri::parse("mariadb:db.example.com:backup").unwrap();
        assert_eq!(
            uri,
            CatalogUri::MariaDb {
                server: "db.example.com".to_string(),
                user: "backup".to_string(),
                password: None,
            }
        );
    }

    #[test]
    fn postgres_with_password() {
        let uri = CatalogUri::parse("postgresql:db.example.com:backup:hunter2").unwrap();
        assert_eq!(
            uri,
            CatalogUri::Postgres {
                server: "db.example.com".to_string(),
                user: "backup".to_string(),
                password: Some("hunter2".to_string()),
            }
        );
    }

    #[test]
    fn mariadb_missing_user_is_rejected() {
        assert!(CatalogUri::parse("mariadb:db.example.com").is_err());
    }

    #[test]
    fn with_password_fills_in_prompted_secret() {
        let uri = CatalogUri::parse("mariadb:db.example.com:backup")
            .unwrap()
            .with_password("s3cret".to_string());
        match uri {
            CatalogUri::MariaDb { password, .. } => assert_eq!(password.as_deref(), Some("s3cret")),
            _ => panic!("expected MariaDb"),
        }
    }
}
