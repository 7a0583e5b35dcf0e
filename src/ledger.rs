//! In-memory account ledger.
//!
//! Maps account names to balances. Every operation is total: domain failures
//! such as an unknown account are reported through [`Outcome`], never as errors.

use crate::money::Money;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result of a single ledger operation.
///
/// The `Display` form is the exact text sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All accounts were removed.
    Reset,

    /// A new account was opened at zero.
    Created(String),

    /// `create` was called for a name already in the ledger.
    AlreadyExists(String),

    /// A credit or debit was applied.
    BalanceUpdated,

    /// Current balance of an account.
    Balance { account: String, balance: Money },

    /// The referenced account does not exist.
    NotFound,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reset => f.write_str("All accounts reset"),
            Outcome::Created(account) => write!(f, "Account {} created", account),
            Outcome::AlreadyExists(account) => write!(f, "Account {} already exists", account),
            Outcome::BalanceUpdated => f.write_str("Account balance updated"),
            Outcome::Balance { account, balance } => {
                write!(f, "Account {}: ${}", account, balance)
            }
            Outcome::NotFound => f.write_str("Account not found"),
        }
    }
}

/// Account balances keyed by case-sensitive account name.
///
/// # Negative Balances
///
/// Debits are never checked against the current balance, so a balance may go
/// below zero. Callers that need an overdraft policy must enforce it before
/// calling [`Ledger::debit`].
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<String, Money>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger {
            accounts: HashMap::new(),
        }
    }

    /// Removes every account.
    pub fn reset(&mut self) -> Outcome {
        debug!("Resetting {} accounts", self.len());
        self.accounts.clear();
        Outcome::Reset
    }

    /// Opens `account` with a zero balance unless it already exists.
    pub fn create(&mut self, account: &str) -> Outcome {
        if self.accounts.contains_key(account) {
            return Outcome::AlreadyExists(account.to_string());
        }

        self.accounts.insert(account.to_string(), Money::ZERO);
        Outcome::Created(account.to_string())
    }

    /// Adds `amount` to the balance of `account`.
    pub fn credit(&mut self, account: &str, amount: Money) -> Outcome {
        match self.accounts.get_mut(account) {
            Some(balance) => {
                *balance += amount;
                Outcome::BalanceUpdated
            }
            None => Outcome::NotFound,
        }
    }

    /// Subtracts `amount` from the balance of `account`. The balance may go negative.
    pub fn debit(&mut self, account: &str, amount: Money) -> Outcome {
        match self.accounts.get_mut(account) {
            Some(balance) => {
                *balance -= amount;
                Outcome::BalanceUpdated
            }
            None => Outcome::NotFound,
        }
    }

    /// Reports the balance of `account`.
    pub fn status(&self, account: &str) -> Outcome {
        match self.accounts.get(account) {
            Some(balance) => Outcome::Balance {
                account: account.to_string(),
                balance: *balance,
            },
            None => Outcome::NotFound,
        }
    }

    pub fn balance(&self, account: &str) -> Option<Money> {
        self.accounts.get(account).copied()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// A ledger shared between connection workers.
///
/// There is a single lock and it is held only for the duration of one closure
/// passed to [`SharedLedger::with`], so ledger effects of concurrent requests
/// never interleave.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to the ledger.
    ///
    /// The guard is released when `f` returns or unwinds.
    pub fn with<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut ledger = self.inner.lock();
        f(&mut ledger)
    }

    /// Current balance of `account`, if it exists.
    pub fn balance(&self, account: &str) -> Option<Money> {
        self.with(|ledger| ledger.balance(account))
    }
}
