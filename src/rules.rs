//! Rule-based SQL generation for common question patterns.
//!
//! An ordered decision table evaluated top to bottom; the first rule that
//! produces SQL wins and later rules are never consulted. Questions are
//! lowercased and trimmed before matching.

type RuleFn = fn(&str) -> Option<String>;

/// Ordered rule table. Order is load-bearing: several later patterns are
/// reachable only when every earlier one fails.
const RULES: &[(&str, RuleFn)] = &[
    ("product-count", product_count),
    ("sales-count", sales_count),
    ("list-products", list_products),
    ("list-sales", list_sales),
    ("price", price),
    ("category", category),
    ("region", region),
    ("total-sales", total_sales),
    ("top-products", top_products),
    ("revenue", revenue),
    ("average-price", average_price),
    ("average-sales", average_sales),
];

/// Product vocabulary for price questions, matched by substring containment.
const PRODUCT_VOCABULARY: &[&str] = &[
    "gaming laptop",
    "mechanical keyboard",
    "wireless mouse",
    "monitor",
    "headphones",
    "smartphone",
    "smartwatch",
    "router",
    "chair",
    "desk",
    "lamp",
    "bookshelf",
    "coffee table",
    "water bottle",
    "backpack",
    "phone case",
    "running shoes",
    "hoodie",
    "ssd",
    "docking station",
];

/// Generate SQL for common question patterns.
///
/// Returns `None` when no rule matches (the model handles the question
/// instead).
pub fn rule_based_sql(question: &str) -> Option<String> {
    let lowered = question.to_lowercase();
    let q = lowered.trim();

    for (name, rule) in RULES {
        if let Some(sql) = rule(q) {
            tracing::debug!(rule = name, "rule matched");
            return Some(sql);
        }
    }

    None
}

fn product_count(q: &str) -> Option<String> {
    if q.contains("how many products") || (q.contains("count") && q.contains("product")) {
        return Some("SELECT COUNT(*) as product_count FROM products".to_string());
    }
    None
}

fn sales_count(q: &str) -> Option<String> {
    if q.contains("how many sales") || (q.contains("count") && q.contains("sales")) {
        return Some("SELECT COUNT(*) as sales_count FROM sales".to_string());
    }
    None
}

fn list_products(q: &str) -> Option<String> {
    if q.contains("show all products") || q.contains("list all products") || q.contains("all products")
    {
        return Some("SELECT * FROM products".to_string());
    }
    None
}

fn list_sales(q: &str) -> Option<String> {
    if q.contains("show all sales") || q.contains("list all sales") || q.contains("all sales") {
        return Some("SELECT * FROM sales LIMIT 20".to_string());
    }
    None
}

fn price(q: &str) -> Option<String> {
    if !q.contains("price") {
        return None;
    }

    // Filter by product name when one is mentioned
    for product in PRODUCT_VOCABULARY {
        if q.contains(product) {
            return Some(format!(
                "SELECT name, price FROM products WHERE LOWER(name) LIKE '%{product}%'"
            ));
        }
    }

    if q.contains("highest") || q.contains("most expensive") {
        return Some("SELECT name, price FROM products ORDER BY price DESC LIMIT 5".to_string());
    }
    if q.contains("lowest") || q.contains("cheapest") {
        return Some("SELECT name, price FROM products ORDER BY price ASC LIMIT 5".to_string());
    }

    // No specific product: unfiltered price listing
    Some("SELECT name, price FROM products ORDER BY price DESC".to_string())
}

fn category(q: &str) -> Option<String> {
    if !q.contains("category") && !q.contains("categories") {
        return None;
    }
    if q.contains("how many") || q.contains("count") {
        return Some(
            "SELECT category, COUNT(*) as count FROM products GROUP BY category".to_string(),
        );
    }
    Some("SELECT DISTINCT category FROM products".to_string())
}

fn region(q: &str) -> Option<String> {
    if !q.contains("region") {
        return None;
    }
    if q.contains("sales") || q.contains("most") || q.contains("highest") {
        return Some(
            "SELECT region, SUM(quantity) as total_sales FROM sales GROUP BY region ORDER BY total_sales DESC"
                .to_string(),
        );
    }
    Some("SELECT DISTINCT region FROM sales".to_string())
}

fn total_sales(q: &str) -> Option<String> {
    if q.contains("total sales") || q.contains("total quantity") {
        return Some("SELECT SUM(quantity) as total_quantity FROM sales".to_string());
    }
    None
}

fn top_products(q: &str) -> Option<String> {
    if q.contains("top") && q.contains("product") {
        return Some(
            "SELECT p.name, SUM(s.quantity) as total_sold FROM products p JOIN sales s ON p.id = s.product_id GROUP BY p.id ORDER BY total_sold DESC LIMIT 5"
                .to_string(),
        );
    }
    None
}

fn revenue(q: &str) -> Option<String> {
    if q.contains("revenue") || q.contains("money") || q.contains("earned") {
        return Some(
            "SELECT SUM(p.price * s.quantity) as total_revenue FROM products p JOIN sales s ON p.id = s.product_id"
                .to_string(),
        );
    }
    None
}

fn average_price(q: &str) -> Option<String> {
    if q.contains("average price") {
        return Some("SELECT AVG(price) as average_price FROM products".to_string());
    }
    None
}

fn average_sales(q: &str) -> Option<String> {
    if q.contains("average") && q.contains("sales") {
        return Some("SELECT AVG(quantity) as average_quantity FROM sales".to_string());
    }
    None
}
