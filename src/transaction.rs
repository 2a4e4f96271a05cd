// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Ledger transaction records.
//!
//! A [`Transaction`] is written once and never changed. The direction of the
//! balance movement lives in [`TransactionKind`]; the amount is always positive.

use crate::base::{AccountId, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category recorded for the vendor's share of a settlement.
pub const VENDOR_PAYMENT: &str = "vendor payment";
/// Category recorded for the rider's share of a settlement.
pub const RIDER_PAYMENT: &str = "rider payment";
/// Category recorded for the platform's share of a settlement.
pub const PLATFORM_COMMISSION: &str = "platform commission + notifications";
/// Category recorded for wallet top-ups and withdrawals.
pub const MANUAL: &str = "manual";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Applies the kind's sign to a positive amount.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Splits a signed delta into a kind and a positive amount.
    ///
    /// Returns `None` for a zero delta.
    pub fn from_delta(delta: Decimal) -> Option<(TransactionKind, Decimal)> {
        if delta > Decimal::ZERO {
            Some((Self::Credit, delta))
        } else if delta < Decimal::ZERO {
            Some((Self::Debit, -delta))
        } else {
            None
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => f.write_str("credit"),
            Self::Debit => f.write_str("debit"),
        }
    }
}

/// An immutable balance movement on one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// The amount with the sign implied by its kind.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}
