//! Token catalog for the mirrored ledger
//!
//! Three denominations flow through this layer: the network's native coin
//! (MOVE), the platform token (PULSE), and the stable side of the AMM pool
//! (USDC). Decimal counts must match the on-chain metadata exactly or every
//! derived display value is wrong by orders of magnitude.

use crate::fixed_point::to_display;
use serde::{Deserialize, Serialize};

/// Fractional digits shown by default at the display boundary.
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 4;

/// Token denominations known to the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coin {
    /// Native network coin, 8 decimals (smallest unit: octas)
    Move,
    /// Platform token, 8 decimals
    Pulse,
    /// Bridged stablecoin, 6 decimals (smallest unit: micro-USDC)
    Usdc,
}

impl Coin {
    /// On-chain decimal count for this denomination.
    pub const fn decimals(self) -> u32 {
        match self {
            Coin::Move | Coin::Pulse => 8,
            Coin::Usdc => 6,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Coin::Move => "MOVE",
            Coin::Pulse => "PULSE",
            Coin::Usdc => "USDC",
        }
    }

    /// Render a smallest-unit amount of this coin at the default display
    /// precision.
    pub fn format(self, smallest_unit: u64) -> String {
        to_display(smallest_unit, self.decimals(), DEFAULT_DISPLAY_DECIMALS)
    }

    /// Render with the symbol appended, e.g. `"1.2346 PULSE"`.
    pub fn format_with_symbol(self, smallest_unit: u64) -> String {
        format!("{} {}", self.format(smallest_unit), self.symbol())
    }
}
