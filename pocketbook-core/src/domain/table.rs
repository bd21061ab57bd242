//! Persisted table names

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;

/// One table per entity kind, shared by the local store and the remote mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Expenses,
    Income,
    Sales,
    Categories,
    Savings,
    Recurring,
    Budgets,
}

impl Table {
    /// Every table the store knows about
    pub const ALL: [Table; 7] = [
        Table::Expenses,
        Table::Income,
        Table::Sales,
        Table::Categories,
        Table::Savings,
        Table::Recurring,
        Table::Budgets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Expenses => "expenses",
            Table::Income => "income",
            Table::Sales => "sales",
            Table::Categories => "categories",
            Table::Savings => "savings",
            Table::Recurring => "recurring",
            Table::Budgets => "budgets",
        }
    }

    /// Whether rows in this table carry a calendar date
    pub fn is_dated(&self) -> bool {
        matches!(self, Table::Expenses | Table::Income | Table::Sales)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::not_found(format!("table '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), table);
        }
        assert!("accounts".parse::<Table>().is_err());
    }

    #[test]
    fn test_only_ledger_tables_are_dated() {
        assert!(Table::Expenses.is_dated());
        assert!(Table::Sales.is_dated());
        assert!(!Table::Categories.is_dated());
        assert!(!Table::Budgets.is_dated());
    }
}
