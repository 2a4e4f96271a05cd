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

//! Order records.
//!
//! Orders move through a one-way state machine:
//!
//! ```text
//! Pending ──settle──► Paid ──confirm delivery──► Delivered
//! ```

use crate::LedgerError;
use crate::base::{AccountId, OrderId};
use crate::settlement::SettlementSplit;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Delivered,
}

impl OrderStatus {
    /// The only status this one may move to, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::Paid),
            Self::Paid => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Paid => f.write_str("paid"),
            Self::Delivered => f.write_str("delivered"),
        }
    }
}

/// A purchase between a customer, a vendor and a rider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: AccountId,
    pub vendor_id: AccountId,
    pub rider_id: AccountId,
    pub product_amount: Decimal,
    pub delivery_fee: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if either amount is negative.
    /// - [`LedgerError::AmountOverflow`] if the amounts are too large to split.
    pub fn new(
        id: OrderId,
        customer_id: AccountId,
        vendor_id: AccountId,
        rider_id: AccountId,
        product_amount: Decimal,
        delivery_fee: Decimal,
    ) -> Result<Self, LedgerError> {
        if product_amount < Decimal::ZERO || delivery_fee < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        SettlementSplit::compute(product_amount, delivery_fee)?;
        Ok(Self {
            id,
            customer_id,
            vendor_id,
            rider_id,
            product_amount,
            delivery_fee,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        })
    }

    /// Total money moved by the order.
    pub fn total(&self) -> Result<Decimal, LedgerError> {
        self.product_amount
            .checked_add(self.delivery_fee)
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Moves the order one step forward to `to`.
    pub(crate) fn advance(&mut self, to: OrderStatus) -> Result<(), LedgerError> {
        if self.status.next() != Some(to) {
            return Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order() -> Order {
        Order::new(
            OrderId(1),
            AccountId(1),
            AccountId(2),
            AccountId(3),
            dec!(1000),
            dec!(200),
        )
        .unwrap()
    }

    #[test]
    fn new_order_is_pending() {
        let order = order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total(), Ok(dec!(1200)));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let result = Order::new(
            OrderId(1),
            AccountId(1),
            AccountId(2),
            AccountId(3),
            dec!(-1),
            dec!(0),
        );
        assert_eq!(result, Err(LedgerError::InvalidAmount));

        let result = Order::new(
            OrderId(1),
            AccountId(1),
            AccountId(2),
            AccountId(3),
            dec!(0),
            dec!(-0.01),
        );
        assert_eq!(result, Err(LedgerError::InvalidAmount));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let result = Order::new(
            OrderId(1),
            AccountId(1),
            AccountId(2),
            AccountId(3),
            Decimal::MAX,
            Decimal::MAX,
        );
        assert_eq!(result, Err(LedgerError::AmountOverflow));

        let mut order = order();
        order.product_amount = Decimal::MAX;
        assert_eq!(order.total(), Err(LedgerError::AmountOverflow));
    }

    #[test]
    fn status_only_moves_forward() {
        let mut order = order();
        order.advance(OrderStatus::Paid).unwrap();
        order.advance(OrderStatus::Delivered).unwrap();

        assert_eq!(
            order.advance(OrderStatus::Paid),
            Err(LedgerError::InvalidStatusTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Paid,
            })
        );
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn pending_cannot_skip_to_delivered() {
        let mut order = order();
        assert!(order.advance(OrderStatus::Delivered).is_err());
        assert_eq!(order.status, OrderStatus::Pending);
    }
}
