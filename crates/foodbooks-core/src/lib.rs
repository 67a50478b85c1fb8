//! Core record handling for foodbooks
//!
//! - types: resource kinds and payment buckets
//! - models: the typed records served by the remote API
//! - filter / aggregate: list filtering, sorting and totals
//! - time: date-range presets
//! - remote / memory: the remote API seam and its implementations
//! - books: in-memory collections mirrored from the remote
//! - session: the signed-in user

pub mod aggregate;
pub mod books;
pub mod error;
pub mod filter;
pub mod memory;
pub mod models;
pub mod remote;
pub mod session;
pub mod time;
pub mod types;

pub use aggregate::{breakdown, saturating_sum, sum_amounts, sum_where, CategoryTotal, FilteredView, Measurable, Summary};
pub use books::{Books, BooksData, CollectionStats, RefreshReport, Resource};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use filter::{Filterable, ListFilter, ALL};
pub use memory::MemoryRemote;
pub use models::{ClassifiedAccount, CreditNote, LedgerAccount, Product, PurchaseOrder, Receipt, Sale, UsageLog};
pub use remote::{ApiEnvelope, HttpRemote, RemoteApi, RemoteRef};
pub use session::{Session, SessionContext};
pub use time::TimeContext;
pub use types::{PaymentBucket, ResourceKind};
