use chrono::{DateTime, Datelike, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::*;

// ── HR accounts ───────────────────────────────────────────────────────────────

pub async fn fetch_hr_by_email(pool: &PgPool, email: &str) -> AppResult<HrAccount> {
    sqlx::query_as::<_, HrAccount>(
        "SELECT id, email, full_name, company_name, company_logo, date_of_birth, created_at
         FROM hr_accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("HR account {} not found", email)))
}

pub async fn hr_account_exists(pool: &PgPool, email: &str) -> AppResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM hr_accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn insert_hr_account(pool: &PgPool, payload: &CreateHrAccount) -> AppResult<HrAccount> {
    let account = sqlx::query_as::<_, HrAccount>(
        r#"
        INSERT INTO hr_accounts (email, full_name, company_name, company_logo, date_of_birth)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, full_name, company_name, company_logo, date_of_birth, created_at
        "#,
    )
    .bind(&payload.email)
    .bind(&payload.full_name)
    .bind(&payload.company_name)
    .bind(&payload.company_logo)
    .bind(payload.date_of_birth)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

pub async fn fetch_all_hr_accounts(pool: &PgPool) -> AppResult<Vec<HrAccount>> {
    let accounts = sqlx::query_as::<_, HrAccount>(
        "SELECT id, email, full_name, company_name, company_logo, date_of_birth, created_at
         FROM hr_accounts ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(accounts)
}

// ── Employee accounts ─────────────────────────────────────────────────────────

pub async fn fetch_employee_by_email(pool: &PgPool, email: &str) -> AppResult<EmployeeAccount> {
    sqlx::query_as::<_, EmployeeAccount>(
        "SELECT id, email, full_name, date_of_birth, hr_email, employee_status, created_at
         FROM employee_accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("employee account {} not found", email)))
}

pub async fn fetch_employee_by_id(pool: &PgPool, id: Uuid) -> AppResult<EmployeeAccount> {
    sqlx::query_as::<_, EmployeeAccount>(
        "SELECT id, email, full_name, date_of_birth, hr_email, employee_status, created_at
         FROM employee_accounts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("employee account {} not found", id)))
}

pub async fn employee_account_exists(pool: &PgPool, email: &str) -> AppResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM employee_accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn insert_employee_account(
    pool: &PgPool,
    payload: &CreateEmployeeAccount,
) -> AppResult<EmployeeAccount> {
    let account = sqlx::query_as::<_, EmployeeAccount>(
        r#"
        INSERT INTO employee_accounts (email, full_name, date_of_birth)
        VALUES ($1, $2, $3)
        RETURNING id, email, full_name, date_of_birth, hr_email, employee_status, created_at
        "#,
    )
    .bind(&payload.email)
    .bind(&payload.full_name)
    .bind(payload.date_of_birth)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

pub async fn fetch_all_employee_accounts(pool: &PgPool) -> AppResult<Vec<EmployeeAccount>> {
    let accounts = sqlx::query_as::<_, EmployeeAccount>(
        "SELECT id, email, full_name, date_of_birth, hr_email, employee_status, created_at
         FROM employee_accounts ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(accounts)
}

/// Employees not yet affiliated with any HR team.
pub async fn fetch_unaffiliated_employees(pool: &PgPool) -> AppResult<Vec<EmployeeAccount>> {
    let accounts = sqlx::query_as::<_, EmployeeAccount>(
        "SELECT id, email, full_name, date_of_birth, hr_email, employee_status, created_at
         FROM employee_accounts WHERE employee_status = false ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(accounts)
}

pub async fn fetch_employees_for_sponsor(
    pool: &PgPool,
    hr_email: &str,
) -> AppResult<Vec<EmployeeAccount>> {
    let accounts = sqlx::query_as::<_, EmployeeAccount>(
        "SELECT id, email, full_name, date_of_birth, hr_email, employee_status, created_at
         FROM employee_accounts WHERE hr_email = $1 ORDER BY created_at ASC",
    )
    .bind(hr_email)
    .fetch_all(pool)
    .await?;
    Ok(accounts)
}

pub async fn update_employee(
    pool: &PgPool,
    id: Uuid,
    payload: &UpdateEmployee,
) -> AppResult<EmployeeAccount> {
    // Fetch existing to merge optional fields
    let existing = fetch_employee_by_id(pool, id).await?;

    let account = sqlx::query_as::<_, EmployeeAccount>(
        r#"
        UPDATE employee_accounts
        SET full_name       = $1,
            date_of_birth   = $2,
            hr_email        = $3,
            employee_status = $4
        WHERE id = $5
        RETURNING id, email, full_name, date_of_birth, hr_email, employee_status, created_at
        "#,
    )
    .bind(payload.full_name.as_deref().unwrap_or(&existing.full_name))
    .bind(payload.date_of_birth.or(existing.date_of_birth))
    .bind(payload.hr_email.as_deref().or(existing.hr_email.as_deref()))
    .bind(payload.employee_status.unwrap_or(existing.employee_status))
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Role lookup across both account tables; HR wins when an email somehow
/// exists in both.
pub async fn lookup_role(pool: &PgPool, email: &str) -> AppResult<Option<Role>> {
    if hr_account_exists(pool, email).await? {
        return Ok(Some(Role::Hr));
    }
    if employee_account_exists(pool, email).await? {
        return Ok(Some(Role::Employee));
    }
    Ok(None)
}

// ── Assets ────────────────────────────────────────────────────────────────────

const ASSET_COLUMNS: &str =
    "id, product_name, product_type, product_quantity, request_count, created_at, updated_at";

pub async fn fetch_assets(pool: &PgPool, filters: &AssetFilters) -> AppResult<Vec<Asset>> {
    // Sort direction cannot be bound, but it comes from a typed enum.
    let order_by = match filters.sort {
        Some(SortOrder::Asc) => "product_quantity ASC NULLS LAST",
        Some(SortOrder::Desc) => "product_quantity DESC NULLS LAST",
        None => "created_at ASC",
    };

    let sql = format!(
        r#"
        SELECT {ASSET_COLUMNS}
        FROM assets
        WHERE ($1::text IS NULL OR product_name ILIKE '%' || $1 || '%')
          AND ($2::asset_type IS NULL OR product_type = $2)
        ORDER BY {order_by}
        "#,
    );

    let assets = sqlx::query_as::<_, Asset>(&sql)
        .bind(filters.search.as_deref())
        .bind(filters.product_type)
        .fetch_all(pool)
        .await?;

    Ok(assets)
}

pub async fn fetch_asset_by_id(pool: &PgPool, id: Uuid) -> AppResult<Asset> {
    sqlx::query_as::<_, Asset>(&format!(
        "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("asset {} not found", id)))
}

pub async fn insert_asset(pool: &PgPool, payload: &CreateAsset) -> AppResult<Asset> {
    let asset = sqlx::query_as::<_, Asset>(&format!(
        r#"
        INSERT INTO assets (product_name, product_type, product_quantity)
        VALUES ($1, $2, $3)
        RETURNING {ASSET_COLUMNS}
        "#
    ))
    .bind(&payload.product_name)
    .bind(payload.product_type)
    .bind(payload.product_quantity)
    .fetch_one(pool)
    .await?;

    Ok(asset)
}

pub async fn update_asset(pool: &PgPool, id: Uuid, payload: &UpdateAsset) -> AppResult<Asset> {
    // Fetch existing to merge optional fields
    let existing = fetch_asset_by_id(pool, id).await?;

    let asset = sqlx::query_as::<_, Asset>(&format!(
        r#"
        UPDATE assets
        SET product_name     = $1,
            product_type     = $2,
            product_quantity = $3,
            updated_at       = $4
        WHERE id = $5
        RETURNING {ASSET_COLUMNS}
        "#
    ))
    .bind(payload.product_name.as_deref().unwrap_or(&existing.product_name))
    .bind(payload.product_type.unwrap_or(existing.product_type))
    .bind(payload.product_quantity.or(existing.product_quantity))
    .bind(Utc::now())
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(asset)
}

/// Unconditional delete — outstanding requests keep their advisory asset_id.
pub async fn delete_asset(pool: &PgPool, id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM assets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("asset {} not found", id)));
    }
    Ok(())
}

pub async fn top_requested(pool: &PgPool, limit: i64, order: SortOrder) -> AppResult<Vec<Asset>> {
    let order_by = match order {
        SortOrder::Asc => "request_count ASC",
        SortOrder::Desc => "request_count DESC",
    };

    let assets = sqlx::query_as::<_, Asset>(&format!(
        "SELECT {ASSET_COLUMNS} FROM assets ORDER BY {order_by} LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(assets)
}

/// Bump request_count and take one unit of stock in a single conditional
/// UPDATE, so two concurrent requests can never read the same quantity.
/// Untracked stock (NULL) is left untouched and quantity never drops below 0.
pub async fn reserve_for_request(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> AppResult<Asset> {
    sqlx::query_as::<_, Asset>(&format!(
        r#"
        UPDATE assets
        SET request_count    = request_count + 1,
            product_quantity = CASE
                WHEN product_quantity IS NOT NULL AND product_quantity > 0
                THEN product_quantity - 1
                ELSE product_quantity
            END,
            updated_at       = now()
        WHERE id = $1
        RETURNING {ASSET_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("asset {} not found", id)))
}

// ── Asset requests ────────────────────────────────────────────────────────────

const ENRICHED_COLUMNS: &str = "r.id, r.asset_id, a.product_name AS asset_name, \
     a.product_type AS asset_type, r.requester_email, r.requester_name, r.hr_email, \
     r.status, r.note, r.request_date";

/// Insert the request and reserve inventory inside one transaction: either
/// both land or neither does.
pub async fn create_request(
    pool: &PgPool,
    employee: &EmployeeAccount,
    hr_email: &str,
    payload: &CreateRequest,
) -> AppResult<(AssetRequest, Asset)> {
    let mut tx = pool.begin().await?;

    let request = sqlx::query_as::<_, AssetRequest>(
        r#"
        INSERT INTO asset_requests (asset_id, requester_email, requester_name, hr_email, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, asset_id, requester_email, requester_name, hr_email, status, note, request_date
        "#,
    )
    .bind(payload.asset_id)
    .bind(&employee.email)
    .bind(&employee.full_name)
    .bind(hr_email)
    .bind(&payload.note)
    .fetch_one(&mut *tx)
    .await?;

    let asset = reserve_for_request(&mut *tx, payload.asset_id).await?;

    tx.commit().await?;
    Ok((request, asset))
}

pub async fn fetch_request_by_id(pool: &PgPool, id: Uuid) -> AppResult<AssetRequest> {
    sqlx::query_as::<_, AssetRequest>(
        "SELECT id, asset_id, requester_email, requester_name, hr_email, status, note, request_date
         FROM asset_requests WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("request {} not found", id)))
}

/// An employee's requests joined with their assets. All filters are applied
/// in the query: substring on the joined name, case-insensitive equality on
/// status and asset type.
pub async fn fetch_requests_for_employee(
    pool: &PgPool,
    email: &str,
    filters: &EmployeeRequestFilters,
) -> AppResult<Vec<RequestWithAsset>> {
    let requests = sqlx::query_as::<_, RequestWithAsset>(&format!(
        r#"
        SELECT {ENRICHED_COLUMNS}
        FROM asset_requests r
        JOIN assets a ON a.id = r.asset_id
        WHERE r.requester_email = $1
          AND ($2::text IS NULL OR a.product_name ILIKE '%' || $2 || '%')
          AND ($3::text IS NULL OR lower(r.status::text) = lower($3))
          AND ($4::text IS NULL OR lower(a.product_type::text) = lower($4))
        ORDER BY r.request_date DESC
        "#
    ))
    .bind(email)
    .bind(filters.search.as_deref())
    .bind(filters.status.as_deref())
    .bind(filters.product_type.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

pub async fn fetch_requests_for_sponsor(
    pool: &PgPool,
    hr_email: &str,
    filters: &SponsorRequestFilters,
) -> AppResult<Vec<RequestWithAsset>> {
    let requests = sqlx::query_as::<_, RequestWithAsset>(&format!(
        r#"
        SELECT {ENRICHED_COLUMNS}
        FROM asset_requests r
        JOIN assets a ON a.id = r.asset_id
        WHERE r.hr_email = $1
          AND ($2::text IS NULL OR r.requester_email ILIKE '%' || $2 || '%')
          AND ($3::text IS NULL OR r.requester_name ILIKE '%' || $3 || '%')
        ORDER BY r.request_date DESC
        "#
    ))
    .bind(hr_email)
    .bind(filters.requester_email.as_deref())
    .bind(filters.requester_name.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

pub async fn fetch_pending_for_sponsor(
    pool: &PgPool,
    hr_email: &str,
    limit: i64,
) -> AppResult<Vec<RequestWithAsset>> {
    let requests = sqlx::query_as::<_, RequestWithAsset>(&format!(
        r#"
        SELECT {ENRICHED_COLUMNS}
        FROM asset_requests r
        JOIN assets a ON a.id = r.asset_id
        WHERE r.hr_email = $1 AND r.status = 'Pending'
        ORDER BY r.request_date DESC
        LIMIT $2
        "#
    ))
    .bind(hr_email)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Requests dated within the current calendar month, newest first.
pub async fn fetch_monthly_for_employee(
    pool: &PgPool,
    email: &str,
) -> AppResult<Vec<MonthlyRequest>> {
    let (start, end) = month_window(Utc::now());

    let requests = sqlx::query_as::<_, MonthlyRequest>(
        r#"
        SELECT r.id, r.asset_id, a.product_name AS asset_name, r.status, r.request_date
        FROM asset_requests r
        JOIN assets a ON a.id = r.asset_id
        WHERE r.requester_email = $1 AND r.request_date >= $2 AND r.request_date < $3
        ORDER BY r.request_date DESC
        "#,
    )
    .bind(email)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

pub async fn update_request(
    pool: &PgPool,
    id: Uuid,
    payload: &UpdateRequest,
) -> AppResult<AssetRequest> {
    // Fetch existing to merge optional fields
    let existing = fetch_request_by_id(pool, id).await?;

    let request = sqlx::query_as::<_, AssetRequest>(
        r#"
        UPDATE asset_requests
        SET status = $1,
            note   = $2
        WHERE id = $3
        RETURNING id, asset_id, requester_email, requester_name, hr_email, status, note, request_date
        "#,
    )
    .bind(payload.status.unwrap_or(existing.status))
    .bind(payload.note.as_deref().or(existing.note.as_deref()))
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(request)
}

/// Half-open window [first instant of `now`'s month, first instant of the
/// next month).
fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (now.year(), now.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    // First-of-month midnights always exist in UTC.
    let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).unwrap();
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn month_window_mid_month() {
        let (start, end) = month_window(utc(2024, 7, 19, 15));
        assert_eq!(start, utc(2024, 7, 1, 0));
        assert_eq!(end, utc(2024, 8, 1, 0));
    }

    #[test]
    fn month_window_includes_first_excludes_prior_day() {
        let (start, end) = month_window(utc(2024, 7, 19, 15));
        let on_the_first = utc(2024, 7, 1, 0);
        let day_before = utc(2024, 6, 30, 23);
        assert!(on_the_first >= start && on_the_first < end);
        assert!(day_before < start);
    }

    #[test]
    fn month_window_december_rolls_into_january() {
        let (start, end) = month_window(utc(2024, 12, 31, 23));
        assert_eq!(start, utc(2024, 12, 1, 0));
        assert_eq!(end, utc(2025, 1, 1, 0));
    }
}
