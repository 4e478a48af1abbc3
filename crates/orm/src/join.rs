use sea_query::JoinType;

/// A join added to SELECT statements.
///
/// The `ON` condition is raw SQL, written against table names:
///
/// ```ignore
/// Join::left("departments", "employees.department_id = departments.id")
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join {
    table: &'static str,
    alias: Option<&'static str>,
    on: &'static str,
    kind: JoinKind,
}

/// Join types supported by the ORM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT JOIN`.
    Left,
    /// `RIGHT JOIN`.
    Right,
    /// `FULL OUTER JOIN`.
    Full,
}

impl Join {
    /// Creates a JOIN (defaults to INNER JOIN).
    #[must_use]
    pub const fn new(table: &'static str, on: &'static str) -> Self {
        Self::with_kind(JoinKind::Inner, table, on)
    }

    /// Creates an INNER JOIN (alias for `new`).
    #[must_use]
    pub const fn inner(table: &'static str, on: &'static str) -> Self {
        Self::new(table, on)
    }

    /// Creates a LEFT JOIN.
    #[must_use]
    pub const fn left(table: &'static str, on: &'static str) -> Self {
        Self::with_kind(JoinKind::Left, table, on)
    }

    /// Creates a RIGHT JOIN.
    #[must_use]
    pub const fn right(table: &'static str, on: &'static str) -> Self {
        Self::with_kind(JoinKind::Right, table, on)
    }

    /// Creates a FULL OUTER JOIN.
    #[must_use]
    pub const fn full(table: &'static str, on: &'static str) -> Self {
        Self::with_kind(JoinKind::Full, table, on)
    }

    const fn with_kind(kind: JoinKind, table: &'static str, on: &'static str) -> Self {
        Self {
            table,
            alias: None,
            on,
            kind,
        }
    }

    /// Sets an alias for the joined table.
    #[must_use]
    pub const fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub(crate) const fn table(&self) -> &'static str {
        self.table
    }

    pub(crate) const fn alias_name(&self) -> Option<&'static str> {
        self.alias
    }

    pub(crate) const fn on(&self) -> &'static str {
        self.on
    }

    pub(crate) const fn join_type(&self) -> JoinType {
        self.kind.into_join_type()
    }
}

impl JoinKind {
    const fn into_join_type(self) -> JoinType {
        match self {
            Self::Inner => JoinType::InnerJoin,
            Self::Left => JoinType::LeftJoin,
            Self::Right => JoinType::RightJoin,
            Self::Full => JoinType::FullOuterJoin,
        }
    }
}
