//! Product catalog.

use serde::{Deserialize, Serialize};

/// A product the store sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub available: bool,
    /// Price in rupees.
    pub price: f64,
    /// Delivery charge in rupees.
    pub delivery_charge: f64,
}

impl Product {
    #[must_use]
    pub fn new(name: &str, available: bool, price: f64, delivery_charge: f64) -> Self {
        Self {
            name: name.to_string(),
            available,
            price,
            delivery_charge,
        }
    }

    /// Detail card shown when a customer mentions the product.
    #[must_use]
    pub fn card(&self) -> String {
        let status = if self.available {
            "🟢 Available"
        } else {
            "🔴 Out of Stock"
        };
        format!(
            "📦 Product: {}\nPrice: Rs {:.2}\nDelivery Charge: Rs {:.2}\nStatus: {status}",
            self.name, self.price, self.delivery_charge
        )
    }

    /// One-line listing entry.
    #[must_use]
    pub fn listing(&self) -> String {
        format!(
            "- {} (Rs {:.2}, Delivery: Rs {:.2})",
            self.name, self.price, self.delivery_charge
        )
    }
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The store's launch catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(vec![
            Product::new("Smart Watch 110", true, 1999.99, 150.0),
            Product::new("Premium Watch Series X", true, 3499.99, 250.0),
            Product::new("Fitness Tracker Pro", true, 2799.99, 180.0),
            Product::new("Classic Analog Watch", true, 1299.99, 120.0),
            Product::new("Digital Smart Band", true, 899.99, 100.0),
        ])
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products currently in stock.
    pub fn available(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.available)
    }

    /// First product whose name appears in `text`, ignoring case.
    #[must_use]
    pub fn find_mentioned(&self, text: &str) -> Option<&Product> {
        let lower = text.to_lowercase();
        self.products
            .iter()
            .find(|p| lower.contains(&p.name.to_lowercase()))
    }

    /// Listing of every available product, one per line.
    #[must_use]
    pub fn available_listing(&self) -> String {
        self.available()
            .map(Product::listing)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
