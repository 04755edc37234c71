//! Server copy of each account's wishlist.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use sparklab_core::{ProductId, UserId, Wishlist, WishlistItem};

use super::{RepositoryError, position};

#[derive(sqlx::FromRow)]
struct WishlistItemRow {
    product_id: String,
    name: String,
    slug: String,
    price: Decimal,
    discount_price: Option<Decimal>,
    image: String,
    category: String,
}

impl From<WishlistItemRow> for WishlistItem {
    fn from(row: WishlistItemRow) -> Self {
        Self {
            id: ProductId::new(row.product_id),
            name: row.name,
            slug: row.slug,
            price: row.price,
            discount_price: row.discount_price,
            image: row.image,
            category: row.category,
        }
    }
}

pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's wishlist in the order items were saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows: Vec<WishlistItemRow> = sqlx::query_as(
            r"
            SELECT product_id, name, slug, price, discount_price, image, category
            FROM storefront.wishlist_item
            WHERE user_id = $1
            ORDER BY position
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WishlistItem::from).collect())
    }

    /// Replace a user's wishlist in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    #[instrument(skip(self, wishlist), fields(items = wishlist.len()))]
    pub async fn replace(
        &self,
        user_id: UserId,
        wishlist: &Wishlist,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM storefront.wishlist_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (index, item) in wishlist.items().iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO storefront.wishlist_item
                    (user_id, product_id, position, name, slug, price, discount_price, image, category)
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
            .bind(&item.category)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
