//! Accounting read side: partner statements, monthly reports, treasury and
//! expenses.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod expense;
pub mod report;
pub mod statement;
pub mod treasury;

pub use expense::{CreateExpense, Expense, ExpenseCategory, ExpensePaymentMethod, UpdateExpense};
pub use report::{MonthlyReport, build_report, month_bounds};
pub use statement::{PartnerStatement, PartnerStats, StatementLine, build_statement, partner_stats};
pub use treasury::TreasurySummary;
