//! The data types shared by every transaction provider.
//!
//! Providers (HTTP, fixture) decode their payloads into these types so the
//! cache layer and the coordinator never see a wire format.  Field names are
//! serialised in `camelCase` to match the JSON the transaction API speaks.
//!
//! ## For contributors
//!
//! The coordinator treats [`Transaction`] as an opaque payload; only
//! [`Transaction::id`] (approval patching) and [`Transaction::employee`]
//! (rendering) are read outside of the providers.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A member of the employee directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Directory id.  Empty only for the [`Employee::all`] sentinel.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// The "no filter" entry shown at the top of the employee picker.
    pub fn all() -> Self {
        Self {
            id: String::new(),
            first_name: "All".to_string(),
            last_name: "Employees".to_string(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.id.is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A non-empty employee id.
///
/// The only way to ask for one employee's transactions.  Because the sentinel
/// id cannot be turned into an `EmployeeId`, a filtered fetch for "all
/// employees" is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidSelection);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One card transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub employee: Employee,
    pub merchant: String,
    pub date: NaiveDate,
    pub approved: bool,
}

/// Identifies one page of the paginated feed.  Page 0 is the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(pub u32);

impl PageToken {
    pub const FIRST: PageToken = PageToken(0);

    pub fn next(self) -> Self {
        PageToken(self.0 + 1)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A slice of the paginated feed.
///
/// When held by the paginated cache, `data` is the accumulated sequence of
/// every page fetched since the last restart and `next_page` is the token
/// reported by the most recent page.  `None` means the feed is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_page: Option<PageToken>,
}

impl<T> Page<T> {
    pub fn is_exhausted(&self) -> bool {
        self.next_page.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_recognised() {
        assert!(Employee::all().is_all());
        assert_eq!(Employee::all().full_name(), "All Employees");
    }

    #[test]
    fn empty_employee_id_is_rejected() {
        assert!(matches!(EmployeeId::new(""), Err(CoreError::InvalidSelection)));
        assert_eq!(EmployeeId::new("e7").unwrap().as_str(), "e7");
    }

    #[test]
    fn page_decodes_null_next_page_as_exhausted() {
        let page: Page<u32> = serde_json::from_str(r#"{"data":[1,2],"nextPage":null}"#).unwrap();
        assert!(page.is_exhausted());
        assert_eq!(page.data, vec![1, 2]);

        let page: Page<u32> = serde_json::from_str(r#"{"data":[],"nextPage":3}"#).unwrap();
        assert_eq!(page.next_page, Some(PageToken(3)));
    }

    #[test]
    fn transaction_decodes_from_api_json() {
        let json = r#"{
            "id": "t1",
            "amount": 12.5,
            "employee": {"id": "e1", "firstName": "Ada", "lastName": "Lovelace"},
            "merchant": "Coffee Bar",
            "date": "2024-03-02",
            "approved": false
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.employee.full_name(), "Ada Lovelace");
        assert_eq!(txn.amount, Decimal::new(125, 1));
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }
}
