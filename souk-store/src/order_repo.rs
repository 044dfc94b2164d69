use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use souk_core::DomainError;
use souk_order::repository::{NewOrder, OrderStore};
use souk_order::{Order, OrderItem, OrderStatus, PaymentStatus};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    buyer_id: Uuid,
    seller_id: Uuid,
    total_cents: i64,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    price_cents: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, DomainError> {
        Ok(Order {
            id: self.id,
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            total_cents: self.total_cents,
            status: OrderStatus::from_str(&self.status).map_err(DomainError::storage)?,
            payment_status: PaymentStatus::from_str(&self.payment_status)
                .map_err(DomainError::storage)?,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price_cents: row.price_cents,
        }
    }
}

impl PgOrderStore {
    async fn fetch_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, price_cents \
             FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn list_orders(&self, column: &str, id: Uuid) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT id, buyer_id, seller_id, total_cents, status, payment_status, \
             created_at, updated_at FROM orders WHERE {column} = $1 ORDER BY created_at DESC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.fetch_items(row.id).await?;
            orders.push(row.into_order(items)?);
        }
        Ok(orders)
    }
}

/// Floor-guarded decrement: the UPDATE only matches while enough stock
/// remains, so two racing carts can never both take the last units. A miss
/// aborts the surrounding transaction.
async fn reserve_line(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i64,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        "UPDATE products SET quantity = quantity - $2, updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL AND quantity >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await
    .map_err(DomainError::storage)?;

    if result.rows_affected() == 0 {
        let available = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM products WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DomainError::storage)?;

        return match available {
            Some(available) => Err(DomainError::InsufficientStock {
                product_id,
                requested: quantity,
                available,
            }),
            None => Err(DomainError::not_found("one or more products not found")),
        };
    }
    Ok(())
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn place_orders(&self, orders: &[NewOrder]) -> Result<Vec<Order>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(DomainError::storage)?;
        let now = Utc::now();
        let mut placed = Vec::with_capacity(orders.len());

        for new_order in orders {
            for line in &new_order.lines {
                reserve_line(&mut tx, line.product_id, line.quantity).await?;
            }

            let order_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO orders (id, buyer_id, seller_id, total_cents, status, \
                 payment_status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(order_id)
            .bind(new_order.buyer_id)
            .bind(new_order.seller_id)
            .bind(new_order.total_cents)
            .bind(OrderStatus::New.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DomainError::storage)?;

            let mut items = Vec::with_capacity(new_order.lines.len());
            for line in &new_order.lines {
                let item = OrderItem {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price_cents: line.price_cents,
                };
                sqlx::query(
                    "INSERT INTO order_items (id, order_id, product_id, quantity, price_cents) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(item.id)
                .bind(item.order_id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.price_cents)
                .execute(&mut *tx)
                .await
                .map_err(DomainError::storage)?;
                items.push(item);
            }

            placed.push(Order {
                id: order_id,
                buyer_id: new_order.buyer_id,
                seller_id: new_order.seller_id,
                total_cents: new_order.total_cents,
                status: OrderStatus::New,
                payment_status: PaymentStatus::Pending,
                items,
                created_at: now,
                updated_at: now,
            });
        }

        tx.commit().await.map_err(DomainError::storage)?;
        Ok(placed)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, buyer_id, seller_id, total_cents, status, payment_status, \
             created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        match row {
            Some(row) => {
                let items = self.fetch_items(row.id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let result =
            sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .bind(Utc::now())
                .execute(&self.pool)
                .await
                .map_err(DomainError::storage)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("order not found"));
        }

        self.get_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("order not found"))
    }

    async fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.list_orders("buyer_id", buyer_id).await
    }

    async fn list_orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError> {
        self.list_orders("seller_id", seller_id).await
    }
}
