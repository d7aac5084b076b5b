//! Connection wrapper that identifies this library to Cloud Spanner.
//!
//! The client token is appended to the connection URL exactly once, and
//! only for drivers new enough to understand it. When the host hands over
//! a connection it opened itself, [`replace_connection`] re-opens it with
//! the token and keeps the original around so both are closed together.

use tracing::{debug, warn};

use crate::core::statement::Sql;
use crate::error::Result;

/// URL prefix of Cloud Spanner JDBC-style connection URLs.
pub const URL_PREFIX: &str = "jdbc:cloudspanner";

/// Client token appended to connection URLs.
pub const USER_AGENT: &str = "sp-liq";

/// Oldest driver major version accepting the `userAgent` property.
pub const MIN_USER_AGENT_DRIVER_VERSION: u32 = 2;

/// Priority of [`SpannerConnection`] among connection implementations.
/// Above every generic implementation the host ships with.
pub const CONNECTION_PRIORITY: i32 = i32::MAX;

const USER_AGENT_PROPERTY: &str = "userAgent=";

const START_BATCH_DDL: &str = "START BATCH DDL";
const RUN_BATCH: &str = "RUN BATCH";

/// Append `;userAgent=sp-liq` to a Cloud Spanner URL.
///
/// URLs for other databases, URLs already carrying a user agent and old
/// drivers are returned unchanged.
pub fn with_user_agent(url: &str, driver_major_version: u32) -> String {
    if url.starts_with(URL_PREFIX)
        && !url.contains(USER_AGENT_PROPERTY)
        && driver_major_version >= MIN_USER_AGENT_DRIVER_VERSION
    {
        format!("{};{}{}", url, USER_AGENT_PROPERTY, USER_AGENT)
    } else {
        url.to_string()
    }
}

/// A live database connection as far as this library cares.
pub trait DatabaseConnection {
    /// Connection URL the connection was opened with.
    fn url(&self) -> &str;

    fn is_closed(&self) -> bool;

    fn close(&mut self) -> Result<()>;

    /// Whether the driver underneath talks to Cloud Spanner.
    fn is_spanner(&self) -> bool;

    /// Whether this connection already went through [`replace_connection`].
    fn is_replacement(&self) -> bool {
        false
    }
}

/// Opens new connections for a URL.
pub trait ConnectionOpener {
    fn open(&self, url: &str) -> Result<Box<dyn DatabaseConnection>>;

    /// Major version of the driver behind this opener.
    fn driver_major_version(&self) -> u32;
}

/// Cloud Spanner connection, optionally owning the connection it replaced.
pub struct SpannerConnection {
    inner: Box<dyn DatabaseConnection>,
    original: Option<Box<dyn DatabaseConnection>>,
}

impl SpannerConnection {
    /// Open a connection, adding the client token to the URL when possible.
    pub fn open(url: &str, opener: &dyn ConnectionOpener) -> Result<Self> {
        let url = with_user_agent(url, opener.driver_major_version());
        debug!("Opening Cloud Spanner connection");
        Ok(Self {
            inner: opener.open(&url)?,
            original: None,
        })
    }

    /// Wrap an already opened connection.
    pub fn wrap(inner: Box<dyn DatabaseConnection>) -> Self {
        Self {
            inner,
            original: None,
        }
    }

    fn replacing(
        inner: Box<dyn DatabaseConnection>,
        original: Box<dyn DatabaseConnection>,
    ) -> Self {
        Self {
            inner,
            original: Some(original),
        }
    }

    pub fn priority(&self) -> i32 {
        CONNECTION_PRIORITY
    }
}

impl DatabaseConnection for SpannerConnection {
    fn url(&self) -> &str {
        self.inner.url()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Close both connections. The first failure is reported.
    fn close(&mut self) -> Result<()> {
        let original = match self.original.as_mut() {
            Some(original) if !original.is_closed() => original.close(),
            _ => Ok(()),
        };
        let inner = self.inner.close();
        original.and(inner)
    }

    fn is_spanner(&self) -> bool {
        true
    }

    fn is_replacement(&self) -> bool {
        true
    }
}

/// Swap a caller-supplied Cloud Spanner connection for one carrying the
/// client token.
///
/// The original stays open for the caller and is closed with the
/// replacement. Connections to other databases, connections that already
/// carry a user agent and failed re-opens all yield the original.
pub fn replace_connection(
    conn: Box<dyn DatabaseConnection>,
    opener: &dyn ConnectionOpener,
) -> Box<dyn DatabaseConnection> {
    if conn.is_replacement() || !conn.is_spanner() || conn.url().contains(USER_AGENT_PROPERTY) {
        return conn;
    }

    let url = format!("{};{}{}", conn.url(), USER_AGENT_PROPERTY, USER_AGENT);
    match opener.open(&url) {
        Ok(replacement) => Box::new(SpannerConnection::replacing(replacement, conn)),
        Err(e) => {
            warn!("Keeping the supplied connection, re-opening with a user agent failed: {}", e);
            conn
        }
    }
}

fn is_ddl(sql: &Sql) -> bool {
    let first = sql
        .text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(first.as_str(), "CREATE" | "ALTER" | "DROP")
}

/// Group runs of two or more DDL statements into `START BATCH DDL` /
/// `RUN BATCH` blocks.
///
/// Cloud Spanner runs DDL outside transactions and applies a batch as one
/// schema change, which is much faster than one change per statement.
pub fn batch_statements(statements: Vec<Sql>) -> Vec<Sql> {
    let mut out = Vec::with_capacity(statements.len());
    let mut run: Vec<Sql> = Vec::new();

    let flush = |run: &mut Vec<Sql>, out: &mut Vec<Sql>| {
        if run.len() > 1 {
            out.push(Sql::new(START_BATCH_DDL));
            out.append(run);
            out.push(Sql::new(RUN_BATCH));
        } else {
            out.append(run);
        }
    };

    for sql in statements {
        if is_ddl(&sql) {
            run.push(sql);
        } else {
            flush(&mut run, &mut out);
            out.push(sql);
        }
    }
    flush(&mut run, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::error::MigrateError;

    struct FakeConnection {
        url: String,
        spanner: bool,
        closed: Rc<Cell<bool>>,
        fail_close: bool,
    }

    impl FakeConnection {
        fn boxed(url: &str, spanner: bool) -> (Box<dyn DatabaseConnection>, Rc<Cell<bool>>) {
            let closed = Rc::new(Cell::new(false));
            let conn = Self {
                url: url.to_string(),
                spanner,
                closed: Rc::clone(&closed),
                fail_close: false,
            };
            (Box::new(conn), closed)
        }

        fn failing_close(url: &str) -> Box<dyn DatabaseConnection> {
            Box::new(Self {
                url: url.to_string(),
                spanner: true,
                closed: Rc::new(Cell::new(false)),
                fail_close: true,
            })
        }
    }

    impl DatabaseConnection for FakeConnection {
        fn url(&self) -> &str {
            &self.url
        }

        fn is_closed(&self) -> bool {
            self.closed.get()
        }

        fn close(&mut self) -> Result<()> {
            if self.fail_close {
                return Err(MigrateError::Connection("session already gone".into()));
            }
            self.closed.set(true);
            Ok(())
        }

        fn is_spanner(&self) -> bool {
            self.spanner
        }
    }

    #[derive(Default)]
    struct FakeOpener {
        version: u32,
        fail: bool,
        opened: RefCell<Vec<String>>,
    }

    impl ConnectionOpener for FakeOpener {
        fn open(&self, url: &str) -> Result<Box<dyn DatabaseConnection>> {
            self.opened.borrow_mut().push(url.to_string());
            if self.fail {
                return Err(MigrateError::Connection("permission denied".into()));
            }
            Ok(FakeConnection::boxed(url, true).0)
        }

        fn driver_major_version(&self) -> u32 {
            self.version
        }
    }

    const URL: &str = "jdbc:cloudspanner:/projects/p/instances/i/databases/d";

    // =========================================================================
    // User agent
    // =========================================================================

    #[test]
    fn test_user_agent_appended_once() {
        let url = with_user_agent(URL, 2);
        assert_eq!(url, format!("{};userAgent=sp-liq", URL));
        assert_eq!(with_user_agent(&url, 2), url);
    }

    #[test]
    fn test_user_agent_needs_new_driver() {
        assert_eq!(with_user_agent(URL, 1), URL);
    }

    #[test]
    fn test_user_agent_only_for_spanner_urls() {
        let pg = "jdbc:postgresql://localhost:5432/db";
        assert_eq!(with_user_agent(pg, 3), pg);
    }

    #[test]
    fn test_open_uses_user_agent() {
        let opener = FakeOpener {
            version: 2,
            ..Default::default()
        };
        let conn = SpannerConnection::open(URL, &opener).unwrap();
        assert!(conn.url().ends_with(";userAgent=sp-liq"));
        assert_eq!(conn.priority(), i32::MAX);
    }

    // =========================================================================
    // Replacement
    // =========================================================================

    #[test]
    fn test_replacement_closes_original() {
        let opener = FakeOpener::default();
        let (original, original_closed) = FakeConnection::boxed(URL, true);

        let mut conn = replace_connection(original, &opener);
        assert!(conn.is_replacement());
        assert_eq!(conn.url(), format!("{};userAgent=sp-liq", URL));
        assert!(!original_closed.get());

        conn.close().unwrap();
        assert!(original_closed.get());
        assert!(conn.is_closed());
    }

    #[test]
    fn test_close_reaches_inner_when_original_fails() {
        let (inner, inner_closed) = FakeConnection::boxed(URL, true);
        let mut conn = SpannerConnection::replacing(inner, FakeConnection::failing_close(URL));

        let err = conn.close().unwrap_err();
        assert!(matches!(err, MigrateError::Connection(_)));
        assert!(inner_closed.get());
    }

    #[test]
    fn test_close_reports_inner_failure() {
        let (original, original_closed) = FakeConnection::boxed(URL, true);
        let mut conn = SpannerConnection::replacing(FakeConnection::failing_close(URL), original);

        assert!(conn.close().is_err());
        assert!(original_closed.get());
    }

    #[test]
    fn test_replacement_skipped_when_user_agent_present() {
        let opener = FakeOpener::default();
        let url = format!("{};userAgent=other", URL);
        let (original, _) = FakeConnection::boxed(&url, true);
        let conn = replace_connection(original, &opener);
        assert!(!conn.is_replacement());
        assert!(opener.opened.borrow().is_empty());
    }

    #[test]
    fn test_replacement_skipped_for_other_databases() {
        let opener = FakeOpener::default();
        let (original, _) = FakeConnection::boxed("jdbc:postgresql://localhost/db", false);
        let conn = replace_connection(original, &opener);
        assert!(!conn.is_replacement());
    }

    #[test]
    fn test_failed_reopen_keeps_original() {
        let opener = FakeOpener {
            fail: true,
            ..Default::default()
        };
        let (original, closed) = FakeConnection::boxed(URL, true);
        let conn = replace_connection(original, &opener);
        assert_eq!(conn.url(), URL);
        assert!(!conn.is_replacement());
        assert!(!closed.get());
        assert_eq!(opener.opened.borrow().len(), 1);
    }

    // =========================================================================
    // DDL batching
    // =========================================================================

    fn texts(sql: &[Sql]) -> Vec<&str> {
        sql.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_batch_groups_consecutive_ddl() {
        let batched = batch_statements(vec![
            Sql::new("CREATE TABLE A (Id INT64) PRIMARY KEY (Id)"),
            Sql::new("create index IdxA ON A (Id)"),
            Sql::new("INSERT INTO A (Id) VALUES (1)"),
            Sql::new("DROP TABLE B"),
        ]);
        assert_eq!(
            texts(&batched),
            vec![
                "START BATCH DDL",
                "CREATE TABLE A (Id INT64) PRIMARY KEY (Id)",
                "create index IdxA ON A (Id)",
                "RUN BATCH",
                "INSERT INTO A (Id) VALUES (1)",
                "DROP TABLE B",
            ]
        );
    }

    #[test]
    fn test_batch_leaves_dml_alone() {
        let batched = batch_statements(vec![
            Sql::new("UPDATE A SET X = 1 WHERE true"),
            Sql::new("DELETE FROM A WHERE true"),
        ]);
        assert_eq!(batched.len(), 2);
    }
}
