use tracing::info;

use armetix_accounting::{CreateExpense, Expense, UpdateExpense};
use armetix_core::{DomainError, ExpenseId};

use crate::db::StoreResult;
use crate::engine::Engine;

impl Engine {
    pub fn create_expense(&self, cmd: CreateExpense) -> StoreResult<Expense> {
        let expense = Expense::create(cmd)?;

        let mut tx = self.db.begin()?;
        tx.insert(expense.clone());
        tx.commit()?;

        info!(
            expense_id = %expense.id_typed(),
            category = ?expense.category(),
            amount = %expense.amount(),
            "expense recorded"
        );
        Ok(expense)
    }

    /// Newest first.
    pub fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        let tables = self.db.read()?;
        let mut expenses: Vec<Expense> = tables.expenses.values().cloned().collect();
        expenses.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| b.id_typed().cmp(&a.id_typed())));
        Ok(expenses)
    }

    pub fn get_expense(&self, expense_id: ExpenseId) -> StoreResult<Expense> {
        let tables = self.db.read()?;
        tables
            .expenses
            .get(&expense_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("expense {expense_id}")).into())
    }

    pub fn update_expense(&self, expense_id: ExpenseId, cmd: UpdateExpense) -> StoreResult<Expense> {
        let mut tx = self.db.begin()?;
        tx.modify::<Expense, _>(&expense_id, |e| e.update(cmd))?;
        let expense = tx.require::<Expense>(&expense_id)?.clone();
        tx.commit()?;

        info!(expense_id = %expense_id, amount = %expense.amount(), "expense updated");
        Ok(expense)
    }

    pub fn delete_expense(&self, expense_id: ExpenseId) -> StoreResult<Expense> {
        let mut tx = self.db.begin()?;
        let expense = tx.remove::<Expense>(&expense_id)?;
        tx.commit()?;

        info!(expense_id = %expense_id, "expense deleted");
        Ok(expense)
    }
}
