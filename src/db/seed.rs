//! Demo database seeding.
//!
//! Drops and recreates the two-table sales schema, then loads a fixed
//! product catalog and a deterministic batch of sales rows so repeated runs
//! produce the same data set.

use crate::types::error::Result;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};
use std::path::Path;

/// Fixed product catalog: (name, category, price).
pub const PRODUCTS: &[(&str, &str, f64)] = &[
    ("Gaming Laptop", "Electronics", 1499.99),
    ("Mechanical Keyboard", "Electronics", 129.99),
    ("Wireless Mouse", "Electronics", 39.99),
    ("27-inch 4K Monitor", "Electronics", 329.99),
    ("Noise-Cancelling Headphones", "Electronics", 199.99),
    ("USB-C Docking Station", "Electronics", 119.99),
    ("Portable SSD 1TB", "Electronics", 99.99),
    ("Smartphone", "Electronics", 899.00),
    ("Fitness Smartwatch", "Electronics", 249.99),
    ("Wi-Fi Router", "Electronics", 89.99),
    ("Ergonomic Office Chair", "Furniture", 279.99),
    ("Standing Desk", "Furniture", 499.99),
    ("LED Desk Lamp", "Furniture", 34.99),
    ("Bookshelf", "Furniture", 159.99),
    ("Coffee Table", "Furniture", 129.99),
    ("Stainless Steel Water Bottle", "Accessories", 24.99),
    ("Backpack", "Accessories", 59.99),
    ("Phone Case", "Accessories", 19.99),
    ("Running Shoes", "Apparel", 89.99),
    ("Hoodie", "Apparel", 54.99),
];

const REGIONS: &[&str] = &["North", "South", "East", "West", "Central"];

const SALES_ROWS: usize = 50;
const SALES_WINDOW_DAYS: i64 = 120;
const RNG_SEED: u64 = 42;

const SCHEMA_SQL: &str = "
    PRAGMA foreign_keys = ON;

    DROP TABLE IF EXISTS sales;
    DROP TABLE IF EXISTS products;

    CREATE TABLE products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        price REAL NOT NULL CHECK(price >= 0)
    );

    CREATE TABLE sales (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK(quantity > 0),
        sale_date TEXT NOT NULL,
        region TEXT NOT NULL,
        FOREIGN KEY (product_id) REFERENCES products(id)
    );

    CREATE INDEX idx_sales_product_id ON sales(product_id);
    CREATE INDEX idx_sales_sale_date ON sales(sale_date);
    CREATE INDEX idx_sales_region ON sales(region);
";

/// Create and populate the demo database at `path`.
///
/// Returns (product count, sales count).
pub fn seed(path: &Path) -> Result<(usize, usize)> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA_SQL)?;

    let mut insert =
        conn.prepare("INSERT INTO products (name, category, price) VALUES (?1, ?2, ?3)")?;
    for (name, category, price) in PRODUCTS {
        insert.execute(params![name, category, price])?;
    }
    drop(insert);

    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let start_date = Utc::now().date_naive() - Duration::days(SALES_WINDOW_DAYS);

    let mut insert = conn.prepare(
        "INSERT INTO sales (product_id, quantity, sale_date, region) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for _ in 0..SALES_ROWS {
        let product_id = rng.gen_range(1..=PRODUCTS.len() as i64);
        let quantity: i64 = rng.gen_range(1..=8);
        let sale_date = start_date + Duration::days(rng.gen_range(0..=SALES_WINDOW_DAYS));
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];

        insert.execute(params![
            product_id,
            quantity,
            sale_date.format("%Y-%m-%d").to_string(),
            region
        ])?;
    }
    drop(insert);

    let product_count: usize =
        conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    let sales_count: usize = conn.query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))?;

    tracing::info!(product_count, sales_count, "seeded demo database");

    Ok((product_count, sales_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::tempdir;

    #[test]
    fn test_seed_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.db");

        let (products, sales) = seed(&path).unwrap();
        assert_eq!(products, 20);
        assert_eq!(sales, 50);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.db");
        let second = dir.path().join("b.db");

        seed(&first).unwrap();
        seed(&second).unwrap();

        let sql = "SELECT product_id, quantity, sale_date, region FROM sales ORDER BY id";
        let rows_first = db::execute(&first, sql).unwrap();
        let rows_second = db::execute(&second, sql).unwrap();
        assert_eq!(rows_first, rows_second);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.db");

        seed(&path).unwrap();
        let (products, sales) = seed(&path).unwrap();
        assert_eq!(products, 20);
        assert_eq!(sales, 50);
    }

    #[test]
    fn test_schema_text_after_seed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.db");
        seed(&path).unwrap();

        let schema = db::schema_text(&path).unwrap();
        assert!(schema.contains("CREATE TABLE products"));
        assert!(schema.contains("CREATE TABLE sales"));
        assert!(schema.contains("FOREIGN KEY (product_id) REFERENCES products(id)"));
    }
}
