use tracing::debug;

use armetix_accounting::{MonthlyReport, build_report};

use crate::db::StoreResult;
use crate::engine::Engine;

impl Engine {
    pub fn monthly_report(&self, month: u32, year: i32) -> StoreResult<MonthlyReport> {
        let tables = self.db.read()?;
        let report = build_report(
            month,
            year,
            tables.invoices.values(),
            tables.expenses.values(),
            tables.products.values(),
        )?;
        debug!(
            month,
            year,
            invoice_count = report.invoice_count,
            net_profit = %report.net_profit,
            "monthly report built"
        );
        Ok(report)
    }
}
