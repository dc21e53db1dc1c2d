use crate::error::{Result, TransferError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Minor units per major currency unit (cents per whole unit).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Opaque account identifier.
///
/// `Ord` matters here: stores acquire account locks in ascending id order,
/// so two transfers touching the same pair of accounts can never deadlock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A monetary balance in integer minor units.
///
/// Committed balances are never negative; the store rejects any commit that
/// would leave one below zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Balance(i64);

/// A positive transfer amount in integer minor units.
///
/// Only constructible through validation, so every `Amount` held by the
/// engine is already known to be positive and whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn from_minor_units(value: i64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(TransferError::InvalidAmount)
        }
    }

    /// Converts a decimal value in major units ("12.34") to minor units
    /// exactly. Values with sub-minor-unit fractions, non-positive values,
    /// and values too large for `i64` minor units all fail with
    /// `InvalidAmount`; nothing ever round-trips through a float.
    pub fn from_decimal(major: Decimal) -> Result<Self> {
        let minor = major
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or(TransferError::InvalidAmount)?;
        if !minor.is_integer() {
            return Err(TransferError::InvalidAmount);
        }
        let minor = minor.to_i64().ok_or(TransferError::InvalidAmount)?;
        Self::from_minor_units(minor)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = TransferError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::from_decimal(value)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(0);

    pub fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered party holding a balance.
///
/// Created once at registration and never deleted. Outside registration the
/// balance changes only through a committed unit of work in the ledger
/// store, each change backed by exactly one ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Balance,
}

impl Account {
    pub fn new(id: AccountId, balance: Balance) -> Self {
        Self { id, balance }
    }

    /// Removes `amount` from the balance if covered.
    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        let delta = Balance::from(amount);
        if self.balance >= delta {
            self.balance -= delta;
            Ok(())
        } else {
            Err(TransferError::InsufficientBalance)
        }
    }

    /// Adds `amount` to the balance; overflow is a constraint violation.
    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount.into())
            .ok_or_else(|| TransferError::TransferFailed("balance overflow".to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_rejects_non_positive() {
        assert!(Amount::from_minor_units(1).is_ok());
        assert!(matches!(
            Amount::from_minor_units(0),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            Amount::from_minor_units(-5),
            Err(TransferError::InvalidAmount)
        ));
    }

    #[test]
    fn test_amount_from_decimal_exact() {
        assert_eq!(Amount::from_decimal(dec!(12.34)).unwrap().minor_units(), 1234);
        assert_eq!(Amount::from_decimal(dec!(5)).unwrap().minor_units(), 500);
        assert_eq!(Amount::from_decimal(dec!(0.01)).unwrap().minor_units(), 1);
    }

    #[test]
    fn test_amount_from_decimal_rejects_fractional_minor_units() {
        assert!(matches!(
            Amount::from_decimal(dec!(0.001)),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            Amount::from_decimal(dec!(10.005)),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            Amount::from_decimal(dec!(0.0)),
            Err(TransferError::InvalidAmount)
        ));
        assert!(matches!(
            Amount::from_decimal(dec!(-3.50)),
            Err(TransferError::InvalidAmount)
        ));
    }

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(1000);
        let b2 = Balance::new(250);
        assert_eq!(b1 + b2, Balance::new(1250));
        assert_eq!(b1 - b2, Balance::new(750));
    }

    #[test]
    fn test_debit_sufficient() {
        let mut account = Account::new(AccountId(1), Balance::new(1000));
        account.debit(Amount::from_minor_units(400).unwrap()).unwrap();
        assert_eq!(account.balance, Balance::new(600));
    }

    #[test]
    fn test_debit_insufficient_leaves_balance_untouched() {
        let mut account = Account::new(AccountId(1), Balance::new(100));
        let result = account.debit(Amount::from_minor_units(101).unwrap());
        assert!(matches!(result, Err(TransferError::InsufficientBalance)));
        assert_eq!(account.balance, Balance::new(100));
    }

    #[test]
    fn test_credit_overflow_is_a_constraint_violation() {
        let mut account = Account::new(AccountId(1), Balance::new(i64::MAX - 1));
        let result = account.credit(Amount::from_minor_units(10).unwrap());
        assert!(matches!(result, Err(TransferError::TransferFailed(_))));
    }
}
