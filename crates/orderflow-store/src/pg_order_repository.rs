//! `PostgreSQL` implementation of the `OrderRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateError;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::debug;

use orderflow_core::error::DomainError;
use orderflow_core::order::{Delivery, Item, Order, Payment};
use orderflow_core::repository::OrderRepository;

/// Writes a whole aggregate in one statement: the parent rows are upserted,
/// items are upserted by position from parallel arrays, and item rows past the
/// new item count are removed. The sub-statements touch disjoint rows.
const SAVE_ORDER: &str = r"
WITH upsert_order AS (
    INSERT INTO orders (
        order_uid, track_number, entry, locale, internal_signature, customer_id,
        delivery_service, shardkey, sm_id, date_created, oof_shard
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (order_uid) DO UPDATE SET
        track_number       = EXCLUDED.track_number,
        entry              = EXCLUDED.entry,
        locale             = EXCLUDED.locale,
        internal_signature = EXCLUDED.internal_signature,
        customer_id        = EXCLUDED.customer_id,
        delivery_service   = EXCLUDED.delivery_service,
        shardkey           = EXCLUDED.shardkey,
        sm_id              = EXCLUDED.sm_id,
        date_created       = EXCLUDED.date_created,
        oof_shard          = EXCLUDED.oof_shard
),
upsert_delivery AS (
    INSERT INTO delivery (order_uid, name, phone, zip, city, address, region, email)
    VALUES ($1, $12, $13, $14, $15, $16, $17, $18)
    ON CONFLICT (order_uid) DO UPDATE SET
        name    = EXCLUDED.name,
        phone   = EXCLUDED.phone,
        zip     = EXCLUDED.zip,
        city    = EXCLUDED.city,
        address = EXCLUDED.address,
        region  = EXCLUDED.region,
        email   = EXCLUDED.email
),
upsert_payment AS (
    INSERT INTO payment (
        order_uid, transaction, request_id, currency, provider, amount,
        payment_dt, bank, delivery_cost, goods_total, custom_fee
    ) VALUES ($1, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
    ON CONFLICT (order_uid) DO UPDATE SET
        transaction   = EXCLUDED.transaction,
        request_id    = EXCLUDED.request_id,
        currency      = EXCLUDED.currency,
        provider      = EXCLUDED.provider,
        amount        = EXCLUDED.amount,
        payment_dt    = EXCLUDED.payment_dt,
        bank          = EXCLUDED.bank,
        delivery_cost = EXCLUDED.delivery_cost,
        goods_total   = EXCLUDED.goods_total,
        custom_fee    = EXCLUDED.custom_fee
),
trim_items AS (
    DELETE FROM item
    WHERE order_uid = $1 AND position >= cardinality($29::bigint[])
)
INSERT INTO item (
    order_uid, position, chrt_id, track_number, price, rid, name, sale, size,
    total_price, nm_id, brand, status
)
SELECT
    $1, (i.ordinality - 1)::integer, i.chrt_id, i.track_number, i.price, i.rid,
    i.name, i.sale, i.size, i.total_price, i.nm_id, i.brand, i.status
FROM UNNEST(
    $29::bigint[], $30::text[], $31::bigint[], $32::text[], $33::text[],
    $34::integer[], $35::text[], $36::bigint[], $37::bigint[], $38::text[],
    $39::bigint[]
) WITH ORDINALITY AS i (
    chrt_id, track_number, price, rid, name, sale, size, total_price, nm_id,
    brand, status, ordinality
)
ON CONFLICT (order_uid, position) DO UPDATE SET
    chrt_id      = EXCLUDED.chrt_id,
    track_number = EXCLUDED.track_number,
    price        = EXCLUDED.price,
    rid          = EXCLUDED.rid,
    name         = EXCLUDED.name,
    sale         = EXCLUDED.sale,
    size         = EXCLUDED.size,
    total_price  = EXCLUDED.total_price,
    nm_id        = EXCLUDED.nm_id,
    brand        = EXCLUDED.brand,
    status       = EXCLUDED.status
";

const SELECT_ORDERS: &str = r"
SELECT
    o.order_uid, o.track_number, o.entry, o.locale, o.internal_signature,
    o.customer_id, o.delivery_service, o.shardkey, o.sm_id, o.date_created,
    o.oof_shard,
    d.name AS delivery_name, d.phone, d.zip, d.city, d.address, d.region, d.email,
    p.transaction, p.request_id, p.currency, p.provider, p.amount, p.payment_dt,
    p.bank, p.delivery_cost, p.goods_total, p.custom_fee
FROM orders o
JOIN delivery d ON d.order_uid = o.order_uid
JOIN payment p ON p.order_uid = o.order_uid
ORDER BY o.order_uid
";

const SELECT_ITEMS: &str = r"
SELECT chrt_id, track_number, price, rid, name, sale, size, total_price, nm_id, brand, status
FROM item
WHERE order_uid = $1
ORDER BY position
";

/// One row of the orders/delivery/payment join.
#[derive(Debug, FromRow)]
struct OrderRow {
    order_uid: String,
    track_number: String,
    entry: String,
    locale: String,
    internal_signature: String,
    customer_id: String,
    delivery_service: String,
    shardkey: String,
    sm_id: i64,
    date_created: DateTime<Utc>,
    oof_shard: String,
    delivery_name: String,
    phone: String,
    zip: String,
    city: String,
    address: String,
    region: String,
    email: String,
    transaction: String,
    request_id: String,
    currency: String,
    provider: String,
    amount: i64,
    payment_dt: i64,
    bank: String,
    delivery_cost: i64,
    goods_total: i64,
    custom_fee: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<Item>) -> Order {
        Order {
            order_uid: self.order_uid,
            track_number: self.track_number,
            entry: self.entry,
            delivery: Delivery {
                name: self.delivery_name,
                phone: self.phone,
                zip: self.zip,
                city: self.city,
                address: self.address,
                region: self.region,
                email: self.email,
            },
            payment: Payment {
                transaction: self.transaction,
                request_id: self.request_id,
                currency: self.currency,
                provider: self.provider,
                amount: self.amount,
                payment_dt: self.payment_dt,
                bank: self.bank,
                delivery_cost: self.delivery_cost,
                goods_total: self.goods_total,
                custom_fee: self.custom_fee,
            },
            items,
            locale: self.locale,
            internal_signature: self.internal_signature,
            customer_id: self.customer_id,
            delivery_service: self.delivery_service,
            shardkey: self.shardkey,
            sm_id: self.sm_id,
            date_created: self.date_created,
            oof_shard: self.oof_shard,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    chrt_id: i64,
    track_number: String,
    price: i64,
    rid: String,
    name: String,
    sale: i32,
    size: String,
    total_price: i64,
    nm_id: i64,
    brand: String,
    status: i64,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            chrt_id: row.chrt_id,
            track_number: row.track_number,
            price: row.price,
            rid: row.rid,
            name: row.name,
            sale: row.sale,
            size: row.size,
            total_price: row.total_price,
            nm_id: row.nm_id,
            brand: row.brand,
            status: row.status,
        }
    }
}

/// Item fields as parallel arrays, bound as one array parameter per column.
#[derive(Default)]
struct ItemColumns<'a> {
    chrt_id: Vec<i64>,
    track_number: Vec<&'a str>,
    price: Vec<i64>,
    rid: Vec<&'a str>,
    name: Vec<&'a str>,
    sale: Vec<i32>,
    size: Vec<&'a str>,
    total_price: Vec<i64>,
    nm_id: Vec<i64>,
    brand: Vec<&'a str>,
    status: Vec<i64>,
}

impl<'a> FromIterator<&'a Item> for ItemColumns<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Item>>(items: I) -> Self {
        let mut columns = Self::default();
        for item in items {
            columns.chrt_id.push(item.chrt_id);
            columns.track_number.push(&item.track_number);
            columns.price.push(item.price);
            columns.rid.push(&item.rid);
            columns.name.push(&item.name);
            columns.sale.push(item.sale);
            columns.size.push(&item.size);
            columns.total_price.push(item.total_price);
            columns.nm_id.push(item.nm_id);
            columns.brand.push(&item.brand);
            columns.status.push(item.status);
        }
        columns
    }
}

fn infrastructure(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::Infrastructure(format!("{context}: {e}"))
}

/// PostgreSQL-backed order repository.
///
/// A save is a single statement, so the whole aggregate commits or nothing
/// does. Item count does not change the number of bind parameters.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Creates a new `PgOrderRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError` if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn load_items(conn: &mut PgConnection, order_uid: &str) -> Result<Vec<Item>, DomainError> {
        let rows = sqlx::query_as::<_, ItemRow>(SELECT_ITEMS)
            .bind(order_uid)
            .fetch_all(&mut *conn)
            .await
            .map_err(infrastructure("item load failed"))?;
        Ok(rows.into_iter().map(Item::from).collect())
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn save_order(&self, order: &Order) -> Result<(), DomainError> {
        let delivery = &order.delivery;
        let payment = &order.payment;
        let items: ItemColumns<'_> = order.items.iter().collect();

        sqlx::query(SAVE_ORDER)
            .bind(&order.order_uid)
            .bind(&order.track_number)
            .bind(&order.entry)
            .bind(&order.locale)
            .bind(&order.internal_signature)
            .bind(&order.customer_id)
            .bind(&order.delivery_service)
            .bind(&order.shardkey)
            .bind(order.sm_id)
            .bind(order.date_created)
            .bind(&order.oof_shard)
            .bind(&delivery.name)
            .bind(&delivery.phone)
            .bind(&delivery.zip)
            .bind(&delivery.city)
            .bind(&delivery.address)
            .bind(&delivery.region)
            .bind(&delivery.email)
            .bind(&payment.transaction)
            .bind(&payment.request_id)
            .bind(&payment.currency)
            .bind(&payment.provider)
            .bind(payment.amount)
            .bind(payment.payment_dt)
            .bind(&payment.bank)
            .bind(payment.delivery_cost)
            .bind(payment.goods_total)
            .bind(payment.custom_fee)
            .bind(items.chrt_id)
            .bind(items.track_number)
            .bind(items.price)
            .bind(items.rid)
            .bind(items.name)
            .bind(items.sale)
            .bind(items.size)
            .bind(items.total_price)
            .bind(items.nm_id)
            .bind(items.brand)
            .bind(items.status)
            .execute(&self.pool)
            .await
            .map_err(infrastructure("order write failed"))?;

        debug!(order_uid = %order.order_uid, items = order.items.len(), "order committed");
        Ok(())
    }

    async fn load_orders(&self) -> Result<Vec<Order>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(infrastructure("transaction start failed"))?;

        // One snapshot for the join and every item query.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(infrastructure("snapshot setup failed"))?;

        let rows = sqlx::query_as::<_, OrderRow>(SELECT_ORDERS)
            .fetch_all(&mut *tx)
            .await
            .map_err(infrastructure("order load failed"))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = Self::load_items(&mut tx, &row.order_uid).await?;
            orders.push(row.into_order(items));
        }

        tx.commit()
            .await
            .map_err(infrastructure("transaction commit failed"))?;

        Ok(orders)
    }
}
