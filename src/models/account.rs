use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role, derived from which table an email lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    #[serde(rename = "HR")]
    Hr,
    Employee,
}

/// An HR account. Role is positional — every row in `hr_accounts` is HR.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HrAccount {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// An employee account. `hr_email` points at the sponsoring HR account once
/// the employee has joined a team; until then `employee_status` is false.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeAccount {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub hr_email: Option<String>,
    pub employee_status: bool,
    pub created_at: DateTime<Utc>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateHrAccount {
    pub email: String,
    pub full_name: String,
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeAccount {
    pub email: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Allow-listed partial update for an employee record. Fields absent from
/// the payload keep their stored value; anything else the client sends is
/// rejected by deserialization rather than merged blindly.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEmployee {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub hr_email: Option<String>,
    pub employee_status: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_employee_rejects_unknown_fields() {
        let err = serde_json::from_str::<UpdateEmployee>(
            r#"{ "full_name": "Jo", "salary": 90000 }"#,
        );
        assert!(err.is_err(), "unknown fields must not pass the allow-list");
    }

    #[test]
    fn update_employee_all_fields_optional() {
        let upd: UpdateEmployee = serde_json::from_str("{}").unwrap();
        assert!(upd.full_name.is_none());
        assert!(upd.hr_email.is_none());
        assert!(upd.employee_status.is_none());
    }
}
