//! Typed records for each collection served by the remote API
//!
//! Field names follow the remote payloads. Every field except `id` is
//! optional: the back end omits or nulls columns freely, and a missing
//! value must never reject the whole record. Dates stay as the raw strings
//! received and are parsed on demand.

use chrono::NaiveDateTime;
use foodbooks_parser::{classify_optional, lenient_amount, parse_optional, AccountCodeDetails};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::{saturating_sum, sum_where, Measurable};
use crate::filter::Filterable;
use crate::types::PaymentBucket;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Flag(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

/// Ids arrive as either JSON numbers or strings
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(Scalar::into_string)
}

/// Optional text column that may arrive as a number; blank strings become `None`
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Scalar>::deserialize(deserializer).unwrap_or(None);
    Ok(value
        .map(Scalar::into_string)
        .filter(|s| !s.trim().is_empty()))
}

fn push_opt<'a>(fields: &mut Vec<&'a str>, value: &'a Option<String>) {
    if let Some(v) = value {
        fields.push(v);
    }
}

// ==================== Ledger accounts ====================

/// Customer/dealer/retailer ledger account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAccount {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_name: Option<String>,
    /// Free-text code such as `B1-EX-F/DLR`
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub balance: Option<Decimal>,
}

impl LedgerAccount {
    /// Price level and zone decoded from the account code
    pub fn code_details(&self) -> AccountCodeDetails {
        classify_optional(self.account_code.as_deref())
    }
}

impl Filterable for LedgerAccount {
    fn date(&self) -> Option<NaiveDateTime> {
        None
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.account_name);
        push_opt(&mut fields, &self.account_code);
        push_opt(&mut fields, &self.city);
        push_opt(&mut fields, &self.phone);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "zone" => Some(self.code_details().zone.to_string()),
            "price_level" => Some(self.code_details().price_level),
            "account_type" => self.account_type.clone(),
            "city" => self.city.clone(),
            _ => None,
        }
    }
}

impl Measurable for LedgerAccount {
    fn amount(&self) -> Option<Decimal> {
        self.balance
    }
}

/// Ledger account with its decoded code, as list pages display it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedAccount {
    #[serde(flatten)]
    pub account: LedgerAccount,
    pub price_level: String,
    pub zone: String,
}

impl From<LedgerAccount> for ClassifiedAccount {
    fn from(account: LedgerAccount) -> Self {
        let details = account.code_details();
        Self {
            account,
            price_level: details.price_level,
            zone: details.zone.to_string(),
        }
    }
}

// ==================== Receipts ====================

/// Payment received against a ledger account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub receipt_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub receipt_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

impl Receipt {
    pub fn payment_bucket(&self) -> PaymentBucket {
        PaymentBucket::from_method(self.payment_method.as_deref().unwrap_or_default())
    }
}

impl Filterable for Receipt {
    fn date(&self) -> Option<NaiveDateTime> {
        parse_optional(self.receipt_date.as_deref())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.receipt_number);
        push_opt(&mut fields, &self.account_name);
        push_opt(&mut fields, &self.reference);
        push_opt(&mut fields, &self.notes);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "payment_method" => Some(self.payment_bucket().to_string()),
            "account_id" => self.account_id.clone(),
            _ => None,
        }
    }
}

impl Measurable for Receipt {
    fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    fn extra_totals(records: &[Self]) -> BTreeMap<String, Decimal> {
        let mut extras = BTreeMap::new();
        extras.insert(
            "cash".to_string(),
            sum_where(records, |r| r.payment_bucket() == PaymentBucket::Cash),
        );
        extras.insert(
            "non_cash".to_string(),
            sum_where(records, |r| r.payment_bucket() != PaymentBucket::Cash),
        );
        extras
    }
}

// ==================== Credit notes ====================

/// Credit issued to an account, e.g. for returns or damaged goods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditNote {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub credit_note_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub credit_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

impl Filterable for CreditNote {
    fn date(&self) -> Option<NaiveDateTime> {
        parse_optional(self.credit_date.as_deref())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.credit_note_number);
        push_opt(&mut fields, &self.account_name);
        push_opt(&mut fields, &self.reason);
        push_opt(&mut fields, &self.notes);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "reason" => self.reason.clone(),
            "status" => self.status.clone(),
            _ => None,
        }
    }
}

impl Measurable for CreditNote {
    fn amount(&self) -> Option<Decimal> {
        self.amount
    }
}

// ==================== Sales ====================

/// Sales invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sale_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub paid_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

impl Sale {
    /// Unpaid remainder, never negative
    pub fn balance_due(&self) -> Decimal {
        let total = self.total_amount.unwrap_or_default();
        let paid = self.paid_amount.unwrap_or_default();
        total.saturating_sub(paid).max(Decimal::ZERO)
    }
}

impl Filterable for Sale {
    fn date(&self) -> Option<NaiveDateTime> {
        parse_optional(self.sale_date.as_deref())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.invoice_number);
        push_opt(&mut fields, &self.account_name);
        push_opt(&mut fields, &self.notes);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "status" => self.status.clone(),
            _ => None,
        }
    }
}

impl Measurable for Sale {
    fn amount(&self) -> Option<Decimal> {
        self.total_amount
    }

    fn extra_totals(records: &[Self]) -> BTreeMap<String, Decimal> {
        let mut extras = BTreeMap::new();
        extras.insert(
            "paid".to_string(),
            saturating_sum(records.iter().filter_map(|s| s.paid_amount)),
        );
        extras.insert(
            "balance_due".to_string(),
            saturating_sum(records.iter().map(Sale::balance_due)),
        );
        extras
    }
}

// ==================== Purchase orders ====================

/// Order placed with a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub po_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub order_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

impl Filterable for PurchaseOrder {
    fn date(&self) -> Option<NaiveDateTime> {
        parse_optional(self.order_date.as_deref())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.po_number);
        push_opt(&mut fields, &self.supplier_name);
        push_opt(&mut fields, &self.notes);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "status" => self.status.clone(),
            _ => None,
        }
    }
}

impl Measurable for PurchaseOrder {
    fn amount(&self) -> Option<Decimal> {
        self.total_amount
    }

    fn extra_totals(records: &[Self]) -> BTreeMap<String, Decimal> {
        let mut extras = BTreeMap::new();
        extras.insert(
            "pending".to_string(),
            sum_where(records, |po| {
                po.status
                    .as_deref()
                    .map(|s| s.eq_ignore_ascii_case("pending"))
                    .unwrap_or(false)
            }),
        );
        extras
    }
}

// ==================== Raw-material usage ====================

/// One withdrawal of raw material by a department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub material_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub material_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub usage_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub purpose: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
}

impl Filterable for UsageLog {
    fn date(&self) -> Option<NaiveDateTime> {
        parse_optional(self.usage_date.as_deref())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.material_name);
        push_opt(&mut fields, &self.department);
        push_opt(&mut fields, &self.purpose);
        push_opt(&mut fields, &self.notes);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "department" => self.department.clone(),
            "material_id" => self.material_id.clone(),
            _ => None,
        }
    }
}

impl Measurable for UsageLog {
    fn amount(&self) -> Option<Decimal> {
        self.quantity
    }
}

// ==================== Products ====================

/// Finished product in the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub stock_quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

impl Filterable for Product {
    fn date(&self) -> Option<NaiveDateTime> {
        parse_optional(self.created_at.as_deref())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        push_opt(&mut fields, &self.product_code);
        push_opt(&mut fields, &self.product_name);
        push_opt(&mut fields, &self.category);
        fields
    }

    fn category(&self, field: &str) -> Option<String> {
        match field {
            "category" => self.category.clone(),
            _ => None,
        }
    }
}

impl Measurable for Product {
    fn amount(&self) -> Option<Decimal> {
        self.unit_price
    }

    fn extra_totals(records: &[Self]) -> BTreeMap<String, Decimal> {
        let mut extras = BTreeMap::new();
        extras.insert(
            "stock_value".to_string(),
            saturating_sum(
                records
                    .iter()
                    .filter_map(|p| Some(p.unit_price?.saturating_mul(p.stock_quantity?))),
            ),
        );
        extras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ListFilter;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_receipt_from_loose_payload() {
        let receipt: Receipt = serde_json::from_value(json!({
            "id": 17,
            "receipt_number": "RC-0017",
            "receipt_date": "2024-02-05 10:15:00",
            "account_id": 42,
            "account_name": "Sharma Stores",
            "amount": "1,250.00",
            "payment_method": "Cash",
            "reference": "",
            "unexpected_column": true
        }))
        .unwrap();

        assert_eq!(receipt.id, "17");
        assert_eq!(receipt.account_id.as_deref(), Some("42"));
        assert_eq!(receipt.amount, Some(dec("1250")));
        assert_eq!(receipt.reference, None);
        assert_eq!(receipt.payment_bucket(), PaymentBucket::Cash);
        assert_eq!(receipt.date().unwrap().date(), NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
    }

    #[test]
    fn test_malformed_fields_become_absent() {
        let sale: Sale = serde_json::from_value(json!({
            "id": "S-1",
            "sale_date": "0000-00-00",
            "total_amount": "lots",
            "status": null
        }))
        .unwrap();

        assert_eq!(sale.date(), None);
        assert_eq!(sale.total_amount, None);
        assert_eq!(sale.status, None);
        assert_eq!(sale.balance_due(), Decimal::ZERO);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result: Result<Product, _> = serde_json::from_value(json!({ "product_name": "Rusk" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_account_classification_and_categories() {
        let account: LedgerAccount = serde_json::from_value(json!({
            "id": 3,
            "account_name": "Gupta Distributors",
            "account_code": "R-RETAILER-Z1/RTL",
            "city": "Indore"
        }))
        .unwrap();

        assert_eq!(account.category("zone").as_deref(), Some("Z1"));
        assert_eq!(account.category("price_level").as_deref(), Some("R-RETAILER-Z1/RTL"));

        let classified = ClassifiedAccount::from(account);
        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["zone"], "Z1");
        assert_eq!(json["account_name"], "Gupta Distributors");
    }

    #[test]
    fn test_account_without_code() {
        let account: LedgerAccount = serde_json::from_value(json!({ "id": 4 })).unwrap();
        assert_eq!(account.category("zone").as_deref(), Some("N/A"));
        assert_eq!(account.category("price_level").as_deref(), Some("N/A"));
    }

    #[test]
    fn test_usage_log_filters_by_department_and_material() {
        let logs: Vec<UsageLog> = serde_json::from_value(json!([
            { "id": 1, "material_id": 5, "material_name": "Maida", "usage_date": "2024-03-02", "quantity": 25, "department": "Bakery" },
            { "id": 2, "material_id": 6, "material_name": "Sugar", "usage_date": "2024-03-03", "quantity": "10.5", "department": "Sweets" },
            { "id": 3, "material_id": 5, "material_name": "Maida", "usage_date": "2024-03-04", "quantity": 5, "department": "Sweets" }
        ]))
        .unwrap();

        let filter = ListFilter::new()
            .with_category("material_id", "5")
            .with_category("department", "Sweets");
        let out = filter.apply(&logs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "3");
    }

    #[test]
    fn test_extra_totals() {
        let sales = vec![
            Sale {
                id: "1".into(),
                invoice_number: None,
                sale_date: None,
                account_name: None,
                total_amount: Some(dec("500")),
                paid_amount: Some(dec("200")),
                status: None,
                notes: None,
            },
            Sale {
                id: "2".into(),
                invoice_number: None,
                sale_date: None,
                account_name: None,
                total_amount: Some(dec("100")),
                paid_amount: Some(dec("150")),
                status: None,
                notes: None,
            },
        ];
        let extras = Sale::extra_totals(&sales);
        assert_eq!(extras["paid"], dec("350"));
        assert_eq!(extras["balance_due"], dec("300"));

        let products: Vec<Product> = serde_json::from_value(json!([
            { "id": 1, "unit_price": "12.5", "stock_quantity": 4 },
            { "id": 2, "unit_price": 3 }
        ]))
        .unwrap();
        assert_eq!(Product::extra_totals(&products)["stock_value"], dec("50"));
    }

    #[test]
    fn test_extra_totals_clamp_huge_amounts() {
        let max = "79228162514264337593543950335";
        let sales: Vec<Sale> = serde_json::from_value(json!([
            { "id": 1, "total_amount": max, "paid_amount": max },
            { "id": 2, "total_amount": max, "paid_amount": "1" },
            { "id": 3, "total_amount": "-1", "paid_amount": max }
        ]))
        .unwrap();
        assert_eq!(sales[2].balance_due(), Decimal::ZERO);
        let extras = Sale::extra_totals(&sales);
        assert_eq!(extras["paid"], Decimal::MAX);
        assert_eq!(extras["balance_due"], dec(max) - dec("1"));

        let products: Vec<Product> = serde_json::from_value(json!([
            { "id": 1, "unit_price": max, "stock_quantity": 2 },
            { "id": 2, "unit_price": "5", "stock_quantity": 1 }
        ]))
        .unwrap();
        assert_eq!(Product::extra_totals(&products)["stock_value"], Decimal::MAX);
    }
}
