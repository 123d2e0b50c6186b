//! Employee model and related types.
//!
//! This module defines the Employee struct and Role enum for representing
//! users whose pay is computed by a payroll run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The role a user holds in the surrounding HR application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrators run payroll but are not paid through it.
    Admin,
    /// Regular employees, the population a run pays.
    Employee,
}

/// Represents a user subject to payroll computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: u64,
    /// Login name, used for reporting.
    pub username: String,
    /// Base compensation for one full period, independent of its length.
    pub salary: Decimal,
    /// The user's role.
    pub role: Role,
}

impl Employee {
    /// Returns true if payroll runs should include this user.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, Role};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: 7,
    ///     username: "dewi".to_string(),
    ///     salary: Decimal::from(2_200_000),
    ///     role: Role::Employee,
    /// };
    /// assert!(employee.is_payroll_eligible());
    /// ```
    pub fn is_payroll_eligible(&self) -> bool {
        self.role == Role::Employee
    }
}
