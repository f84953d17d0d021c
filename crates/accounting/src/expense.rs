use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use armetix_core::{DomainError, DomainResult, Entity, ExpenseId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Loyer")]
    Rent,
    #[serde(rename = "Electricité")]
    Electricity,
    #[serde(rename = "Transport")]
    Transport,
    #[serde(rename = "Salaire")]
    Salary,
    #[serde(rename = "Marketing")]
    Marketing,
    #[default]
    #[serde(rename = "Autre")]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpensePaymentMethod {
    #[default]
    #[serde(rename = "Espèces")]
    Cash,
    #[serde(rename = "Virement")]
    Transfer,
    #[serde(rename = "Chèque")]
    Cheque,
}

/// Operating expense. Not tied to invoices or partners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    id: ExpenseId,
    description: String,
    category: ExpenseCategory,
    amount: Decimal,
    date: DateTime<Utc>,
    payment_method: ExpensePaymentMethod,
}

/// Command: CreateExpense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExpense {
    pub expense_id: ExpenseId,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub payment_method: ExpensePaymentMethod,
}

/// Command: UpdateExpense. Replaces every editable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateExpense {
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub payment_method: ExpensePaymentMethod,
}

fn validated(description: &str, amount: Decimal) -> DomainResult<String> {
    let description = description.trim().to_string();
    if description.is_empty() {
        return Err(DomainError::validation("description cannot be empty"));
    }
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("expense amount must be positive"));
    }
    Ok(description)
}

impl Expense {
    pub fn create(cmd: CreateExpense) -> DomainResult<Self> {
        let description = validated(&cmd.description, cmd.amount)?;
        Ok(Self {
            id: cmd.expense_id,
            description,
            category: cmd.category,
            amount: cmd.amount,
            date: cmd.date,
            payment_method: cmd.payment_method,
        })
    }

    /// All-or-nothing: on a validation error the expense is untouched.
    pub fn update(&mut self, cmd: UpdateExpense) -> DomainResult<()> {
        let description = validated(&cmd.description, cmd.amount)?;
        self.description = description;
        self.category = cmd.category;
        self.amount = cmd.amount;
        self.date = cmd.date;
        self.payment_method = cmd.payment_method;
        Ok(())
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn payment_method(&self) -> ExpensePaymentMethod {
        self.payment_method
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
