//! Server copy of each account's cart.
//!
//! A cart is stored as one row per line with a `position` column so the
//! client's ordering survives the round trip. Writes always replace the
//! whole cart.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use sparklab_core::{Cart, CartItem, ProductId, Quantity, UserId};

use super::{RepositoryError, position};

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: String,
    name: String,
    slug: String,
    price: Decimal,
    discount_price: Option<Decimal>,
    image: String,
    quantity: i64,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .and_then(|n| Quantity::new(n).ok())
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "invalid quantity {} for product {}",
                    row.quantity, row.product_id
                ))
            })?;

        Ok(Self {
            id: ProductId::new(row.product_id),
            name: row.name,
            slug: row.slug,
            price: row.price,
            discount_price: row.discount_price,
            image: row.image,
            quantity,
        })
    }
}

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's cart in stored order. Users without a cart get an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored quantity is invalid.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            r"
            SELECT product_id, name, slug, price, discount_price, image, quantity
            FROM storefront.cart_item
            WHERE user_id = $1
            ORDER BY position
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }

    /// Replace a user's cart with `cart` in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn replace(&self, user_id: UserId, cart: &Cart) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM storefront.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (index, item) in cart.items().iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO storefront.cart_item
                    (user_id, product_id, position, name, slug, price, discount_price, image, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(user_id)
            .bind(&item.id)
            .bind(position(index)?)
            .bind(&item.name)
            .bind(&item.slug)
            .bind(item.price)
            .bind(item.discount_price)
            .bind(&item.image)
            .bind(i64::from(item.quantity.get()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
