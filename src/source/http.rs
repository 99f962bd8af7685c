//! HTTP transaction provider.
//!
//! Talks JSON to a transaction API over [`reqwest`].  The endpoint layout is:
//!
//! | Call | Request |
//! |---|---|
//! | employees | `GET {base}/employees` |
//! | paginated feed | `GET {base}/paginatedTransactions?page=N` |
//! | one employee | `GET {base}/transactionsByEmployee?employeeId=ID` |
//! | approval | `POST {base}/setTransactionApproval` `{ transactionId, value }` |

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Employee, EmployeeId, Page, PageToken, Transaction, TransactionApi};
use crate::error::FetchFailure;

const NO_QUERY: &[(&str, &str)] = &[];

/// A transaction API reachable over HTTP.
pub struct HttpApi {
    /// Base URL, without a trailing slash.
    pub base_url: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApprovalBody<'a> {
    transaction_id: &'a str,
    value: bool,
}

impl HttpApi {
    /// Create a provider rooted at `base_url` (e.g. `http://localhost:3000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Full URL of an endpoint.  Pure so tests can check routing offline.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, FetchFailure>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        debug!("GET {url}");
        let response = self.client.get(&url).query(query).send().await?;
        let body = check_status(&url, response)?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, FetchFailure> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchFailure::Status {
            endpoint: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl TransactionApi for HttpApi {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn employees(&self) -> Result<Vec<Employee>, FetchFailure> {
        self.get_json("employees", NO_QUERY).await
    }

    async fn paginated_transactions(
        &self,
        page: PageToken,
    ) -> Result<Page<Transaction>, FetchFailure> {
        self.get_json("paginatedTransactions", &[("page", page.0)]).await
    }

    async fn transactions_by_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<Transaction>, FetchFailure> {
        self.get_json("transactionsByEmployee", &[("employeeId", employee_id.as_str())])
            .await
    }

    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), FetchFailure> {
        let url = self.endpoint("setTransactionApproval");
        debug!("POST {url} {transaction_id}={approved}");
        let response = self
            .client
            .post(&url)
            .json(&ApprovalBody {
                transaction_id,
                value: approved,
            })
            .send()
            .await?;
        check_status(&url, response)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        let api = HttpApi::new("http://localhost:3000/api");
        assert_eq!(
            api.endpoint("employees"),
            "http://localhost:3000/api/employees"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://localhost:3000/api/");
        assert_eq!(
            api.endpoint("paginatedTransactions"),
            "http://localhost:3000/api/paginatedTransactions"
        );
    }

    #[test]
    fn name_returns_base_url() {
        let api = HttpApi::new("http://example.com");
        assert_eq!(api.name(), "http://example.com");
    }

    #[test]
    fn approval_body_uses_api_field_names() {
        let body = ApprovalBody {
            transaction_id: "t1",
            value: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"transactionId": "t1", "value": true}));
    }
}
