//! # Receipt Data Model
//!
//! Immutable value types describing one completed transaction, plus the fee
//! normalization pass that turns the loose upstream payload into canonical
//! numbers before any formatting happens.
//!
//! ## Fee aliases
//!
//! Order payloads from different app versions carry the admin and service
//! fees under different keys (`admin_fee`, `adminFee`, `biaya_admin`, ...),
//! sometimes nested inside a generic metadata object. Every undeclared field
//! lands in [`ReceiptData::extra`]; [`ReceiptData::fees`] sums all admin-like
//! and service-like aliases into exactly two totals. When no explicit total
//! is present the receipt total falls back to `subtotal + admin + service`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{PrintError, PrintResult};
use crate::layout::format_rupiah;

// ============================================================================
// VALUE TYPES
// ============================================================================

/// One completed transaction, as handed over by the ordering layer.
///
/// Amounts are whole Rupiah (`i64`), no minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptData {
    #[serde(alias = "storeName")]
    pub store_name: String,
    #[serde(alias = "storeAddress")]
    pub store_address: String,
    pub invoice: String,
    pub date: String,
    #[serde(alias = "paymentMethod")]
    pub payment_method: String,
    pub subtotal: i64,
    /// Explicit total, if the upstream payload carries a usable one.
    /// Non-finite JSON numbers deserialize to `None` (see [`Self::total`]).
    #[serde(default, deserialize_with = "de_opt_money")]
    pub total: Option<i64>,
    #[serde(default, alias = "amountReceived")]
    pub amount_received: i64,
    #[serde(default)]
    pub change: i64,
    pub items: Vec<ReceiptItem>,
    /// Logo reference: URL, `data:image/...` URI, or bare base64.
    #[serde(default, alias = "storeLogoUrl", alias = "store_logo_url")]
    pub logo: Option<String>,
    /// Everything the payload carries beyond the declared fields.
    /// Fee aliases are recovered from here.
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// A single purchased line item.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub qty: u32,
    pub price: i64,
    /// Free-text detail printed wrapped under the item line.
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub note: Option<ItemNote>,
}

/// Structured customization attached to an item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemNote {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub sugar: Option<String>,
    #[serde(default)]
    pub toppings: Vec<Topping>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub takeaway: bool,
}

/// A topping: either a bare label or a label with a surcharge.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Topping {
    Plain(String),
    Priced { label: String, price: i64 },
}

/// Dine-in / takeaway marker, inferred per receipt and carried per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    DineIn,
    TakeAway,
}

impl OrderType {
    pub fn label(self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine In",
            OrderType::TakeAway => "Take Away",
        }
    }
}

/// Canonical fee totals after alias normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fees {
    pub admin: i64,
    pub service: i64,
}

// ============================================================================
// FEE NORMALIZATION
// ============================================================================

// Alias tables are matched against keys lowercased with separators stripped,
// so `admin_fee`, `adminFee` and `Admin Fee` all hit `adminfee`.
const ADMIN_ALIASES: &[&str] = &["adminfee", "admin", "biayaadmin", "feeadmin"];
const SERVICE_ALIASES: &[&str] = &[
    "service",
    "servicefee",
    "biayalayanan",
    "servicecharge",
    "feeservice",
];

fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Interpret a JSON value as a whole-Rupiah amount.
///
/// Accepts integers, finite floats (rounded), and numeric strings.
fn value_as_money(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.round() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn collect_fees(map: &Map<String, Value>, fees: &mut Fees, depth: u8) {
    for (key, value) in map {
        if let Value::Object(nested) = value {
            // One level of nesting covers the "metadata bag" payloads.
            if depth == 0 {
                collect_fees(nested, fees, 1);
            }
            continue;
        }
        let canon = canonical_key(key);
        if ADMIN_ALIASES.contains(&canon.as_str()) {
            if let Some(n) = value_as_money(value) {
                fees.admin += n;
            }
        } else if SERVICE_ALIASES.contains(&canon.as_str()) {
            if let Some(n) = value_as_money(value) {
                fees.service += n;
            }
        }
    }
}

// ============================================================================
// IMPLS
// ============================================================================

impl ReceiptData {
    /// Sum all fee aliases in the payload into canonical `{admin, service}`.
    pub fn fees(&self) -> Fees {
        let mut fees = Fees::default();
        collect_fees(&self.extra, &mut fees, 0);
        fees
    }

    /// The total to print: the explicit total when present, otherwise
    /// `subtotal + admin + service`.
    pub fn effective_total(&self, fees: &Fees) -> i64 {
        self.total
            .unwrap_or(self.subtotal + fees.admin + fees.service)
    }

    /// Takeaway if any item's note flags it, else dine-in.
    pub fn order_type(&self) -> OrderType {
        let takeaway = self
            .items
            .iter()
            .any(|item| item.note.as_ref().is_some_and(|n| n.takeaway));
        if takeaway {
            OrderType::TakeAway
        } else {
            OrderType::DineIn
        }
    }

    /// Check receipt invariants: at least qty 1 per item, no negative prices.
    pub fn validate(&self) -> PrintResult<()> {
        for item in &self.items {
            if item.qty == 0 {
                return Err(PrintError::InvalidReceipt(format!(
                    "item '{}' has zero quantity",
                    item.name
                )));
            }
            if item.price < 0 {
                return Err(PrintError::InvalidReceipt(format!(
                    "item '{}' has negative price",
                    item.name
                )));
            }
        }
        if self.subtotal < 0 {
            return Err(PrintError::InvalidReceipt("negative subtotal".into()));
        }
        Ok(())
    }
}

impl Topping {
    pub fn label(&self) -> &str {
        match self {
            Topping::Plain(label) => label,
            Topping::Priced { label, .. } => label,
        }
    }

    pub fn price(&self) -> Option<i64> {
        match self {
            Topping::Plain(_) => None,
            Topping::Priced { price, .. } => Some(*price),
        }
    }
}

impl ItemNote {
    /// Render the note as receipt bullet text, one entry per populated field.
    ///
    /// The order-type bullet is always present so kitchen staff see it on
    /// every customized item.
    pub fn bullets(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(size) = &self.size {
            out.push(format!("Ukuran Cup: {size}"));
        }
        if let Some(sugar) = &self.sugar {
            out.push(format!("Takaran Gula: {sugar}"));
        }
        if !self.toppings.is_empty() {
            let listed: Vec<String> = self
                .toppings
                .iter()
                .map(|t| match t.price() {
                    Some(p) => format!("{} (+{})", t.label(), format_rupiah(p)),
                    None => t.label().to_string(),
                })
                .collect();
            out.push(format!("Topping: {}", listed.join(", ")));
        }
        if let Some(message) = &self.message {
            out.push(format!("Pesan: {message}"));
        }
        out.push(
            if self.takeaway {
                OrderType::TakeAway
            } else {
                OrderType::DineIn
            }
            .label()
            .to_string(),
        );
        out
    }
}

/// Lenient money deserializer: integers pass through, finite floats round,
/// numeric strings parse, everything else (including NaN/Infinity encodings)
/// becomes `None` so the fallback total applies.
fn de_opt_money<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_money))
}

// ============================================================================
// TESTS
// ============================================================================
