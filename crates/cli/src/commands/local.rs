//! Cart and wishlist commands against the file-backed local stores.
//!
//! # Usage
//!
//! ```bash
//! sl-cli cart add --id p-1 --name "Crystal Growing Kit" --price 24.00 -q 2
//! sl-cli cart update p-1 3
//! sl-cli cart show
//!
//! sl-cli wishlist toggle --id p-2 --name "Solar Robot Kit" --price 31.50 --category chemistry
//! sl-cli wishlist show
//! ```
//!
//! Nothing here talks to the server. Changes are picked up by the next
//! `sl-cli sync`.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use sparklab_client::{CartStore, FileStorage, LocalStorage, StorageError, WishlistStore};
use sparklab_core::{CurrencyCode, Price, Product, ProductId, Quantity};

/// Product snapshot given on the command line.
#[derive(Debug, Clone, Args)]
pub struct ProductArgs {
    /// Product ID
    #[arg(long)]
    pub id: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Unit price
    #[arg(long)]
    pub price: Decimal,

    /// Sale price, if discounted
    #[arg(long)]
    pub discount_price: Option<Decimal>,

    /// URL slug (defaults to the ID)
    #[arg(long)]
    pub slug: Option<String>,

    /// Image URL
    #[arg(long, default_value = "")]
    pub image: String,

    /// Category
    #[arg(long, default_value = "")]
    pub category: String,
}

impl From<ProductArgs> for Product {
    fn from(args: ProductArgs) -> Self {
        Self {
            slug: args.slug.unwrap_or_else(|| args.id.clone()),
            id: ProductId::new(args.id),
            name: args.name,
            price: args.price,
            discount_price: args.discount_price,
            image: args.image,
            category: args.category,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Add units of a product (merges into an existing line)
    Add {
        #[command(flatten)]
        product: ProductArgs,

        /// Units to add
        #[arg(short, long, default_value = "1")]
        quantity: Quantity,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: String,
    },
    /// Set the quantity of an existing line
    Update {
        /// Product ID
        id: String,

        /// New quantity (at least 1)
        quantity: Quantity,
    },
    /// Empty the cart
    Clear,
    /// Print the cart
    Show {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum WishlistAction {
    /// Save a product
    Add {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        id: String,
    },
    /// Save the product if absent, otherwise remove it
    Toggle {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Empty the wishlist
    Clear,
    /// Print the wishlist
    Show {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

/// How amounts are printed by `show`.
#[derive(Debug, Clone, Copy, Args)]
pub struct DisplayArgs {
    /// Store currency (INR, USD, EUR or GBP)
    #[arg(long, env = "SPARKLAB_CURRENCY", default_value = "INR")]
    pub currency: CurrencyCode,
}

impl DisplayArgs {
    fn price(self, amount: Decimal) -> Price {
        Price::new(amount, self.currency)
    }
}

/// Open the local storage directory shared by both stores.
///
/// # Errors
///
/// Returns `StorageError::Io` if the directory cannot be created.
pub fn open_storage(data_dir: &Path) -> Result<Arc<dyn LocalStorage>, StorageError> {
    tracing::debug!(data_dir = %data_dir.display(), "Opening local storage");
    Ok(Arc::new(FileStorage::open(data_dir)?))
}

/// Apply a cart action and describe the result.
pub fn cart(store: &CartStore, action: CartAction) -> String {
    match action {
        CartAction::Add { product, quantity } => {
            let product = Product::from(product);
            store.add_item(&product, quantity);
            let now = store.get(&product.id).map_or(0, |item| item.quantity.get());
            format!("Added {quantity} x {} ({now} in cart)", product.name)
        }
        CartAction::Remove { id } => {
            let id = ProductId::new(id);
            if store.get(&id).is_none() {
                return format!("{id} is not in the cart");
            }
            store.remove_item(&id);
            format!("Removed {id}")
        }
        CartAction::Update { id, quantity } => {
            let id = ProductId::new(id);
            if store.get(&id).is_none() {
                return format!("{id} is not in the cart");
            }
            store.update_quantity(&id, quantity);
            format!("Set {id} to {quantity}")
        }
        CartAction::Clear => {
            store.clear_cart();
            "Cart cleared".to_string()
        }
        CartAction::Show { display } => render_cart(store, display),
    }
}

/// Apply a wishlist action and describe the result.
pub fn wishlist(store: &WishlistStore, action: WishlistAction) -> String {
    match action {
        WishlistAction::Add { product } => {
            let product = Product::from(product);
            if store.is_in_wishlist(&product.id) {
                return format!("{} is already saved", product.name);
            }
            store.add_item(&product);
            format!("Saved {}", product.name)
        }
        WishlistAction::Remove { id } => {
            let id = ProductId::new(id);
            if !store.is_in_wishlist(&id) {
                return format!("{id} is not in the wishlist");
            }
            store.remove_item(&id);
            format!("Removed {id}")
        }
        WishlistAction::Toggle { product } => {
            let product = Product::from(product);
            if store.toggle(&product) {
                format!("Saved {}", product.name)
            } else {
                format!("Removed {}", product.name)
            }
        }
        WishlistAction::Clear => {
            store.clear_wishlist();
            "Wishlist cleared".to_string()
        }
        WishlistAction::Show { display } => render_wishlist(store, display),
    }
}

fn render_cart(store: &CartStore, display: DisplayArgs) -> String {
    let items = store.items();
    if items.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for item in &items {
        let _ = writeln!(
            out,
            "{:>4} x {} ({})  {} each  {}",
            item.quantity,
            item.name,
            item.id,
            display.price(item.unit_price()),
            display.price(item.line_total())
        );
    }
    let _ = write!(
        out,
        "{} items, total {}",
        store.total_items(),
        display.price(store.total_price())
    );
    out
}

fn render_wishlist(store: &WishlistStore, display: DisplayArgs) -> String {
    let items = store.items();
    if items.is_empty() {
        return "Wishlist is empty".to_string();
    }

    items
        .iter()
        .map(|item| {
            let price = display.price(item.discount_price.unwrap_or(item.price));
            if item.category.is_empty() {
                format!("{} ({})  {price}", item.name, item.id)
            } else {
                format!("{} ({}) [{}]  {price}", item.name, item.id, item.category)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
