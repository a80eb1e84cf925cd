//! PostgreSQL-backed store implementation.
//!
//! All queries are runtime-checked `sqlx::query` calls; every conditional
//! state transition is a single `UPDATE ... WHERE current-state = expected`
//! whose `rows_affected` count tells the caller whether anything happened.

use async_trait::async_trait;
use common::{OrderId, PaymentId, RequestId, UserId};
use domain::{
    ChefId, FraudStatus, FulfillmentStatus, Order, Payment, PaymentStatus, ProfileUpdate,
    RequestStatus, RequestType, Role, RoleRequest, User,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{OrderStore, PaymentStore, RoleRequestStore, UserStore};

/// PostgreSQL document store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn parse_role(s: &str) -> Result<Role> {
    match s {
        "user" => Ok(Role::User),
        "chef" => Ok(Role::Chef),
        "admin" => Ok(Role::Admin),
        other => Err(StoreError::Decode(format!("unknown role {other:?}"))),
    }
}

fn parse_fraud_status(s: &str) -> Result<FraudStatus> {
    match s {
        "active" => Ok(FraudStatus::Active),
        "fraud" => Ok(FraudStatus::Fraud),
        other => Err(StoreError::Decode(format!("unknown fraud status {other:?}"))),
    }
}

fn parse_fulfillment(s: &str) -> Result<FulfillmentStatus> {
    match s {
        "pending" => Ok(FulfillmentStatus::Pending),
        "accepted" => Ok(FulfillmentStatus::Accepted),
        "cancelled" => Ok(FulfillmentStatus::Cancelled),
        "delivered" => Ok(FulfillmentStatus::Delivered),
        other => Err(StoreError::Decode(format!(
            "unknown fulfillment status {other:?}"
        ))),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
    match s {
        "Pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        other => Err(StoreError::Decode(format!(
            "unknown payment status {other:?}"
        ))),
    }
}

fn parse_request_type(s: &str) -> Result<RequestType> {
    match s {
        "chef" => Ok(RequestType::Chef),
        "admin" => Ok(RequestType::Admin),
        other => Err(StoreError::Decode(format!("unknown request type {other:?}"))),
    }
}

fn parse_request_status(s: &str) -> Result<RequestStatus> {
    match s {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(StoreError::Decode(format!(
            "unknown request status {other:?}"
        ))),
    }
}

fn parse_chef_id(s: String) -> Result<ChefId> {
    ChefId::new(s).map_err(|e| StoreError::Decode(e.to_string()))
}

fn row_to_user(row: PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;
    let chef_id: Option<String> = row.try_get("chef_id")?;

    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: parse_role(&role)?,
        status: parse_fraud_status(&status)?,
        chef_id: chef_id.map(parse_chef_id).transpose()?,
        photo_url: row.try_get("photo_url")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    let fulfillment: String = row.try_get("fulfillment")?;
    let payment: String = row.try_get("payment")?;
    let chef_id: String = row.try_get("chef_id")?;
    let quantity: i64 = row.try_get("quantity")?;

    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        food_id: row.try_get("food_id")?,
        food_name: row.try_get("food_name")?,
        customer_email: row.try_get("customer_email")?,
        chef_id: parse_chef_id(chef_id)?,
        quantity: u32::try_from(quantity)
            .map_err(|_| StoreError::Decode(format!("quantity {quantity} out of range")))?,
        amount_cents: row.try_get("amount_cents")?,
        ordered_at: row.try_get("ordered_at")?,
        fulfillment: parse_fulfillment(&fulfillment)?,
        payment: parse_payment_status(&payment)?,
    })
}

fn row_to_payment(row: PgRow) -> Result<Payment> {
    Ok(Payment {
        id: PaymentId::from_uuid(row.try_get::<Uuid, _>("id")?),
        order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
        amount_cents: row.try_get("amount_cents")?,
        paid_at: row.try_get("paid_at")?,
    })
}

fn row_to_request(row: PgRow) -> Result<RoleRequest> {
    let request_type: String = row.try_get("request_type")?;
    let status: String = row.try_get("status")?;

    Ok(RoleRequest {
        id: RequestId::from_uuid(row.try_get::<Uuid, _>("id")?),
        requester_email: row.try_get("requester_email")?,
        request_type: parse_request_type(&request_type)?,
        status: parse_request_status(&status)?,
        requested_at: row.try_get("requested_at")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user_if_absent(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, status, chef_id, photo_url, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.chef_id.as_ref().map(ChefId::as_str))
        .bind(&user.photo_url)
        .bind(&user.address)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_user).transpose()
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                photo_url = COALESCE($3, photo_url),
                address = COALESCE($4, address)
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(&update.name)
        .bind(&update.photo_url)
        .bind(&update.address)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_fraud(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET status = 'fraud' WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_role(&self, email: &str, role: Role, chef_id: Option<&ChefId>) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = $2, chef_id = $3 WHERE email = $1")
            .bind(email)
            .bind(role.as_str())
            .bind(chef_id.map(ChefId::as_str))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, food_id, food_name, customer_email, chef_id,
                                quantity, amount_cents, ordered_at, fulfillment, payment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.food_id)
        .bind(&order.food_name)
        .bind(&order.customer_email)
        .bind(order.chef_id.as_str())
        .bind(i64::from(order.quantity))
        .bind(order.amount_cents)
        .bind(order.ordered_at)
        .bind(order.fulfillment.as_str())
        .bind(order.payment.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_order).transpose()
    }

    async fn find_duplicate_order(
        &self,
        food_id: &str,
        customer_email: &str,
        quantity: u32,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE food_id = $1 AND customer_email = $2 AND quantity = $3
            LIMIT 1
            "#,
        )
        .bind(food_id)
        .bind(customer_email)
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_order).transpose()
    }

    async fn orders_for_customer(&self, email: &str) -> Result<Vec<Order>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE customer_email = $1 ORDER BY ordered_at DESC")
                .bind(email)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn orders_for_chef(&self, chef_id: &ChefId) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders WHERE chef_id = $1 ORDER BY ordered_at DESC")
            .bind(chef_id.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn transition_fulfillment(
        &self,
        id: OrderId,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE orders SET fulfillment = $3 WHERE id = $1 AND fulfillment = $2")
                .bind(id.as_uuid())
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(&self.pool)
                .await?;
        let updated = result.rows_affected() == 1;
        tracing::debug!(%id, %from, %to, updated, "conditional fulfillment update");
        Ok(updated)
    }

    async fn deliver_if_paid(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET fulfillment = 'delivered' WHERE id = $1 AND payment = 'paid'",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        let updated = result.rows_affected() == 1;
        tracing::debug!(%id, updated, "conditional deliver update");
        Ok(updated)
    }

    async fn mark_paid(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET payment = 'paid' WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, amount_cents, paid_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.as_uuid())
        .bind(payment.amount_cents)
        .bind(payment.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let rows = sqlx::query("SELECT * FROM payments WHERE order_id = $1 ORDER BY paid_at")
            .bind(order_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_payment).collect()
    }
}

#[async_trait]
impl RoleRequestStore for PgStore {
    async fn insert_request_if_no_pending(&self, request: &RoleRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_requests (id, requester_email, request_type, status, requested_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(&request.requester_email)
        .bind(request.request_type.as_str())
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            // The partial unique index enforces single-pending-per-(user, type).
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some("pending_role_request") =>
            {
                tracing::debug!(
                    requester = %request.requester_email,
                    request_type = %request.request_type,
                    "pending request already exists"
                );
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<RoleRequest>> {
        let row = sqlx::query("SELECT * FROM role_requests WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_request).transpose()
    }

    async fn list_requests(&self) -> Result<Vec<RoleRequest>> {
        let rows = sqlx::query("SELECT * FROM role_requests ORDER BY requested_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_request).collect()
    }

    async fn set_request_status(&self, id: RequestId, status: RequestStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE role_requests SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
