//! Monthly activity report.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::money::{add, sub};
use armetix_core::{DomainError, DomainResult};
use armetix_invoicing::{Invoice, InvoiceType};
use armetix_products::{Product, stock_value};

use crate::expense::Expense;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: u32,
    pub year: i32,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub sales_total: Decimal,
    pub purchase_total: Decimal,
    pub sales_tva: Decimal,
    pub purchase_tva: Decimal,
    /// TVA collected minus TVA recoverable.
    pub tva_balance: Decimal,
    pub expense_total: Decimal,
    pub net_profit: Decimal,
    /// Whole catalog at report time, not restricted to the month.
    pub stock_value: Decimal,
    pub invoice_count: usize,
    pub expense_count: usize,
}

/// First instant and last second (23:59:59) of the month, UTC, both inclusive.
pub fn month_bounds(month: u32, year: i32) -> DomainResult<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    let out_of_range = || DomainError::validation(format!("year {year} is out of range"));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(out_of_range)?;

    let start = first.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?.and_utc();
    let end = next.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?.and_utc() - Duration::seconds(1);
    Ok((start, end))
}

/// Roll up the month. Totals that leave the `Decimal` range fail with a
/// Validation error.
pub fn build_report<'a>(
    month: u32,
    year: i32,
    invoices: impl IntoIterator<Item = &'a Invoice>,
    expenses: impl IntoIterator<Item = &'a Expense>,
    products: impl IntoIterator<Item = &'a Product>,
) -> DomainResult<MonthlyReport> {
    let (start, end) = month_bounds(month, year)?;
    let in_period = |date: DateTime<Utc>| date >= start && date <= end;

    let mut sales_total = Decimal::ZERO;
    let mut purchase_total = Decimal::ZERO;
    let mut sales_tva = Decimal::ZERO;
    let mut purchase_tva = Decimal::ZERO;
    let mut invoice_count = 0;
    for invoice in invoices.into_iter().filter(|inv| in_period(inv.date())) {
        invoice_count += 1;
        match invoice.invoice_type() {
            InvoiceType::Sale => {
                sales_total = add(sales_total, invoice.total_ttc())?;
                sales_tva = add(sales_tva, invoice.total_tva())?;
            }
            InvoiceType::Purchase => {
                purchase_total = add(purchase_total, invoice.total_ttc())?;
                purchase_tva = add(purchase_tva, invoice.total_tva())?;
            }
        }
    }

    let (expense_count, expense_total) = expenses
        .into_iter()
        .filter(|e| in_period(e.date()))
        .try_fold((0, Decimal::ZERO), |(n, total), e| {
            Ok::<_, DomainError>((n + 1, add(total, e.amount())?))
        })?;

    Ok(MonthlyReport {
        month,
        year,
        period_start: start,
        period_end: end,
        sales_total,
        purchase_total,
        sales_tva,
        purchase_tva,
        tva_balance: sub(sales_tva, purchase_tva)?,
        expense_total,
        net_profit: sub(sub(sales_total, purchase_total)?, expense_total)?,
        stock_value: stock_value(products)?,
        invoice_count,
        expense_count,
    })
}
