//! Catalog records parsed from gateway responses.
//!
//! Each record is an immutable snapshot built through the ordered-fallback
//! accessors in [`crate::gateway::response`].

use crate::gateway::response::{amount, text};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category used when a product carries none.
pub const DEFAULT_CATEGORY: &str = "LAINNYA";

/// Price list kind requested from the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    /// Prepaid goods (pulsa, data, game top-ups, ...)
    Prepaid,
    /// Postpaid bills
    Postpaid,
}

impl ProductType {
    /// Gateway value of the `type` field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepaid => "prabayar",
            Self::Postpaid => "pascabayar",
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product code, the identity of the entry
    pub code: String,
    /// Display name
    pub name: String,
    /// Price, when the gateway reported one
    pub price: Option<f64>,
    /// Grouping category
    pub category: String,
    /// Long description
    pub description: Option<String>,
    /// Extra note
    pub note: Option<String>,
    /// Product image
    pub image_url: Option<String>,
}

impl Product {
    /// Parse a price-list row; rows without a code are skipped.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let code = text(value, &["code", "kode"])?;
        Some(Self {
            name: text(value, &["product_name", "nama", "name"]).unwrap_or_else(|| code.clone()),
            price: amount(value, &["price", "harga"]),
            category: text(value, &["kategori", "category", "type"])
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: text(value, &["desc"]),
            note: text(value, &["note"]),
            image_url: text(value, &["img_url"]),
            code,
        })
    }

    /// Case-insensitive code comparison
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}

/// Parse a whole price list.
#[must_use]
pub fn parse_products(rows: &[Value]) -> Vec<Product> {
    rows.iter().filter_map(Product::from_value).collect()
}

/// Find a product by code, ignoring case.
#[must_use]
pub fn pick_product<'a>(products: &'a [Product], code: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.has_code(code))
}

/// Group products by category, keeping first-seen category order.
///
/// Categories differing only in case share one group named by the first seen.
#[must_use]
pub fn group_categories(products: &[Product]) -> Vec<(String, Vec<Product>)> {
    let mut groups: Vec<(String, Vec<Product>)> = Vec::new();
    for product in products {
        let key = product.category.to_lowercase();
        match groups.iter_mut().find(|(cat, _)| cat.to_lowercase() == key) {
            Some((_, items)) => items.push(product.clone()),
            None => groups.push((product.category.clone(), vec![product.clone()])),
        }
    }
    groups
}

/// Deposit method offered by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositMethod {
    /// Method identifier (e.g. `QRIS`, `BCA`)
    pub method: String,
    /// Method kind (e.g. `ewallet`, `va`)
    pub kind: Option<String>,
}

impl DepositMethod {
    /// Parse a deposit-method row; rows without a method are skipped.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            method: text(value, &["metode", "method", "metode_deposit"])?,
            kind: text(value, &["type", "tipe", "type_deposit"]),
        })
    }

    /// Placeholder for a method id that is not in the latest snapshot
    #[must_use]
    pub fn unlisted(method: &str) -> Self {
        Self {
            method: method.to_string(),
            kind: None,
        }
    }
}

/// Transfer destination bank or e-wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Bank code used by the transfer API
    pub code: String,
    /// Display name
    pub name: Option<String>,
}

impl Bank {
    /// Parse a bank-list row; rows without a code are skipped.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            code: text(value, &["bank_code", "code"])?,
            name: text(value, &["bank_name", "name"]),
        })
    }

    /// Placeholder for a bank code that is not in the latest snapshot
    #[must_use]
    pub fn unlisted(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: None,
        }
    }

    /// Name when known, otherwise the code
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

/// Result of a postpaid bill inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBill {
    /// Reference id sent with the inquiry; reused for payment
    pub reference_id: String,
    /// Customer number the bill belongs to
    pub customer_no: String,
    /// Billed customer name
    pub customer_name: Option<String>,
    /// Bill amount
    pub amount: Option<f64>,
    /// Admin fee
    pub admin_fee: Option<f64>,
}

impl PendingBill {
    /// Build from an inquiry payload.
    #[must_use]
    pub fn from_value(value: &Value, reference_id: String, customer_no: String) -> Self {
        Self {
            reference_id,
            customer_no,
            customer_name: text(value, &["customer_name", "name"]),
            amount: amount(value, &["price", "amount"]),
            admin_fee: amount(value, &["admin", "fee"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_aliases() {
        let row = json!({ "kode": "TSEL5", "nama": "Telkomsel 5K", "harga": "5200", "kategori": "PULSA" });
        let product = Product::from_value(&row).expect("row has a code");
        assert_eq!(product.code, "TSEL5");
        assert_eq!(product.name, "Telkomsel 5K");
        assert_eq!(product.price, Some(5200.0));
        assert_eq!(product.category, "PULSA");

        let bare = Product::from_value(&json!({ "code": "X1" })).expect("row has a code");
        assert_eq!(bare.name, "X1");
        assert_eq!(bare.category, DEFAULT_CATEGORY);

        assert!(Product::from_value(&json!({ "name": "no code" })).is_none());
    }

    #[test]
    fn test_pick_product_ignores_case() {
        let products = parse_products(&[json!({ "code": "ML86" }), json!({ "code": "FF100" })]);
        assert_eq!(pick_product(&products, "ml86").map(|p| p.code.as_str()), Some("ML86"));
        assert!(pick_product(&products, "nope").is_none());
    }

    #[test]
    fn test_group_categories_keeps_order() {
        let products = parse_products(&[
            json!({ "code": "A", "category": "GAME" }),
            json!({ "code": "B", "category": "PULSA" }),
            json!({ "code": "C", "category": "GAME" }),
        ]);
        let groups = group_categories(&products);
        let names: Vec<_> = groups.iter().map(|(c, items)| (c.as_str(), items.len())).collect();
        assert_eq!(names, vec![("GAME", 2), ("PULSA", 1)]);
    }

    #[test]
    fn test_group_categories_merges_case_variants() {
        let products = parse_products(&[
            json!({ "code": "A", "category": "Pulsa" }),
            json!({ "code": "B", "category": "PULSA" }),
            json!({ "code": "C", "category": "pulsa" }),
        ]);
        let groups = group_categories(&products);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Pulsa");
        let codes: Vec<_> = groups[0].1.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_bank_and_method_aliases() {
        let bank = Bank::from_value(&json!({ "code": "bca", "name": "Bank BCA" })).expect("code");
        assert_eq!(bank.label(), "Bank BCA");
        assert_eq!(Bank::unlisted("dana").label(), "dana");

        let method = DepositMethod::from_value(&json!({ "method": "QRIS", "tipe": "ewallet" }))
            .expect("method");
        assert_eq!(method.kind.as_deref(), Some("ewallet"));
    }
}
