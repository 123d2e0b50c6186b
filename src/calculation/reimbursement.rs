//! Reimbursement collection.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payroll::{checked_total, round_money};
use crate::error::EngineResult;
use crate::models::{ReimbursementEntry, ReimbursementFact};

/// The result of collecting an employee's reimbursements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementPayResult {
    /// One entry per fact in range, in input order.
    pub entries: Vec<ReimbursementEntry>,
    /// Sum of the entry amounts.
    pub amount: Decimal,
}

/// Collects every reimbursement dated within `[start, end]` at face value.
///
/// Fails with `CalculationError` if the total overflows.
pub fn calculate_reimbursements(
    facts: &[ReimbursementFact],
    start: NaiveDate,
    end: NaiveDate,
    money_scale: u32,
) -> EngineResult<ReimbursementPayResult> {
    let entries: Vec<ReimbursementEntry> = facts
        .iter()
        .filter(|fact| fact.date >= start && fact.date <= end)
        .map(|fact| ReimbursementEntry {
            id: fact.id,
            title: fact.title.clone(),
            date: fact.date,
            amount: round_money(fact.amount, money_scale),
        })
        .collect();

    let amount = checked_total(entries.iter().map(|entry| entry.amount), "reimbursement total")?;

    Ok(ReimbursementPayResult { entries, amount })
}
