//! Basic types shared by the record collections

use serde::{Deserialize, Serialize};

/// Record collections served by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Ledger accounts (customers, dealers, retailers)
    Accounts,
    /// Money received against accounts
    Receipts,
    /// Credit notes issued to accounts
    CreditNotes,
    /// Sales invoices
    Sales,
    /// Purchase orders to suppliers
    PurchaseOrders,
    /// Raw-material usage log entries
    UsageLogs,
    /// Finished products
    Products,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Accounts,
        ResourceKind::Receipts,
        ResourceKind::CreditNotes,
        ResourceKind::Sales,
        ResourceKind::PurchaseOrders,
        ResourceKind::UsageLogs,
        ResourceKind::Products,
    ];

    /// Slug used in URLs and config keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Accounts => "accounts",
            ResourceKind::Receipts => "receipts",
            ResourceKind::CreditNotes => "credit-notes",
            ResourceKind::Sales => "sales",
            ResourceKind::PurchaseOrders => "purchase-orders",
            ResourceKind::UsageLogs => "usage-logs",
            ResourceKind::Products => "products",
        }
    }

    /// Remote endpoint path when the config does not override it
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Accounts => "ledger_accounts",
            ResourceKind::Receipts => "receipts",
            ResourceKind::CreditNotes => "credit_notes",
            ResourceKind::Sales => "sales",
            ResourceKind::PurchaseOrders => "purchase_orders",
            ResourceKind::UsageLogs => "raw_material_usage",
            ResourceKind::Products => "products",
        }
    }

    /// Human-readable singular label
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Accounts => "ledger account",
            ResourceKind::Receipts => "receipt",
            ResourceKind::CreditNotes => "credit note",
            ResourceKind::Sales => "sale",
            ResourceKind::PurchaseOrders => "purchase order",
            ResourceKind::UsageLogs => "usage log",
            ResourceKind::Products => "product",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "accounts" | "ledger-accounts" => Ok(ResourceKind::Accounts),
            "receipts" => Ok(ResourceKind::Receipts),
            "credit-notes" => Ok(ResourceKind::CreditNotes),
            "sales" => Ok(ResourceKind::Sales),
            "purchase-orders" => Ok(ResourceKind::PurchaseOrders),
            "usage-logs" | "raw-material-usage" => Ok(ResourceKind::UsageLogs),
            "products" => Ok(ResourceKind::Products),
            _ => Err(format!("Unknown resource: {}", s)),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse payment-method grouping used by the receipts page filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentBucket {
    Cash,
    Bank,
    Cheque,
    Online,
    Other,
}

impl PaymentBucket {
    /// Map the free-text payment method typed on a receipt to its bucket
    pub fn from_method(method: &str) -> PaymentBucket {
        let m = method.trim().to_lowercase();
        if m.is_empty() {
            PaymentBucket::Other
        } else if m.contains("cash") {
            PaymentBucket::Cash
        } else if m.contains("cheque") || m.contains("check") || m == "dd" || m.contains("demand draft") {
            PaymentBucket::Cheque
        } else if ["upi", "online", "card", "gpay", "paytm", "phonepe"]
            .iter()
            .any(|k| m.contains(k))
        {
            PaymentBucket::Online
        } else if ["bank", "neft", "rtgs", "imps", "transfer"]
            .iter()
            .any(|k| m.contains(k))
        {
            PaymentBucket::Bank
        } else {
            PaymentBucket::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentBucket::Cash => "Cash",
            PaymentBucket::Bank => "Bank",
            PaymentBucket::Cheque => "Cheque",
            PaymentBucket::Online => "Online",
            PaymentBucket::Other => "Other",
        }
    }
}

impl std::fmt::Display for PaymentBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
