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

//! Order settlement split.
//!
//! The split is a fixed business rule:
//!
//! | Party | Share | Notification fee |
//! |-------|-------|------------------|
//! | Vendor | 95% of the product amount | 50 |
//! | Rider | 5% of the delivery fee | 20 |
//! | Platform | everything else | receives both fees |
//!
//! The three nets always add up to the order total because the fees only move
//! between parties.

use crate::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Fraction of the product amount paid to the vendor.
pub const VENDOR_RATE: Decimal = dec!(0.95);
/// Fraction of the delivery fee paid to the rider.
pub const RIDER_RATE: Decimal = dec!(0.05);
/// Flat notification fee deducted from the vendor's share.
pub const VENDOR_FEE: Decimal = dec!(50);
/// Flat notification fee deducted from the rider's share.
pub const RIDER_FEE: Decimal = dec!(20);

/// How one order's money is distributed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SettlementSplit {
    pub vendor_share: Decimal,
    pub rider_share: Decimal,
    pub platform_share: Decimal,
    pub vendor_fee: Decimal,
    pub rider_fee: Decimal,
    pub vendor_net: Decimal,
    pub rider_net: Decimal,
    pub platform_net: Decimal,
}

impl SettlementSplit {
    /// Splits an order's product amount and delivery fee.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AmountOverflow`] if any share or net is out of the
    /// representable decimal range.
    pub fn compute(product_amount: Decimal, delivery_fee: Decimal) -> Result<Self, LedgerError> {
        let vendor_share = checked(product_amount.checked_mul(VENDOR_RATE))?;
        let rider_share = checked(delivery_fee.checked_mul(RIDER_RATE))?;
        let total = checked(product_amount.checked_add(delivery_fee))?;
        let paid_out = checked(vendor_share.checked_add(rider_share))?;
        let platform_share = checked(total.checked_sub(paid_out))?;

        Ok(Self {
            vendor_share,
            rider_share,
            platform_share,
            vendor_fee: VENDOR_FEE,
            rider_fee: RIDER_FEE,
            vendor_net: checked(vendor_share.checked_sub(VENDOR_FEE))?,
            rider_net: checked(rider_share.checked_sub(RIDER_FEE))?,
            platform_net: checked(
                platform_share
                    .checked_add(VENDOR_FEE)
                    .and_then(|net| net.checked_add(RIDER_FEE)),
            )?,
        })
    }

    /// Sum of the three nets.
    pub fn total(&self) -> Decimal {
        self.vendor_net + self.rider_net + self.platform_net
    }
}

fn checked(value: Option<Decimal>) -> Result<Decimal, LedgerError> {
    value.ok_or(LedgerError::AmountOverflow)
}
