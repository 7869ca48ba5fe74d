use std::collections::BTreeMap;

use crate::models::holding::{Holding, PortfolioSummary};
use crate::models::trade::{AssetType, Trade, TradeSide};

/// Positions below this quantity are treated as closed.
const DUST_QUANTITY: f64 = 1e-9;

/// Derives holdings and portfolio totals from the trade history using the
/// average-cost method. Pure business logic — no prices, no I/O.
pub struct HoldingsService;

/// Running per-symbol accumulator while folding trades.
struct Position {
    asset_type: AssetType,
    quantity: f64,
    cost_basis: f64,
    realized_gain: f64,
    fees_paid: f64,
}

impl HoldingsService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Open positions (quantity above dust), sorted by symbol, with
    /// allocation percentages by cost basis.
    #[must_use]
    pub fn get_holdings(&self, trades: &[Trade]) -> Vec<Holding> {
        let positions = Self::build_positions(trades);

        let mut holdings: Vec<Holding> = positions
            .into_iter()
            .filter(|(_, p)| p.quantity > DUST_QUANTITY)
            .map(|(symbol, p)| Holding {
                symbol,
                asset_type: p.asset_type,
                quantity: p.quantity,
                avg_cost: p.cost_basis / p.quantity,
                cost_basis: p.cost_basis,
                realized_gain: p.realized_gain,
                fees_paid: p.fees_paid,
                allocation_pct: 0.0,
            })
            .collect();

        let total_basis: f64 = holdings.iter().map(|h| h.cost_basis).sum();
        if total_basis > 0.0 {
            for holding in &mut holdings {
                holding.allocation_pct = holding.cost_basis / total_basis * 100.0;
            }
        }
        holdings
    }

    /// Portfolio-wide totals plus the per-symbol breakdown. Realized gains
    /// include fully-closed positions, which `get_holdings` omits.
    #[must_use]
    pub fn get_summary(&self, trades: &[Trade]) -> PortfolioSummary {
        let positions = Self::build_positions(trades);
        let realized_gain: f64 = positions.values().map(|p| p.realized_gain).sum();

        let mut total_invested = 0.0;
        let mut total_proceeds = 0.0;
        let mut total_fees = 0.0;
        for trade in trades {
            match trade.side {
                TradeSide::Buy => total_invested += trade.notional(),
                TradeSide::Sell => total_proceeds += trade.notional(),
            }
            total_fees += trade.fee;
        }

        let holdings = self.get_holdings(trades);
        let open_cost_basis: f64 = holdings.iter().map(|h| h.cost_basis).sum();

        PortfolioSummary {
            total_trades: trades.len(),
            first_trade_date: trades.iter().map(|t| t.date).min(),
            total_invested,
            total_proceeds,
            total_fees,
            realized_gain,
            open_cost_basis,
            holdings,
        }
    }

    /// Fold trades in chronological order into per-symbol positions.
    ///
    /// Average-cost method: buys add quantity and cost; a sell realizes
    /// (sell price − average cost) × matched quantity and reduces the basis
    /// at average cost. Sells beyond the held quantity (partial history)
    /// only realize the matched portion; the position floors at zero.
    fn build_positions(trades: &[Trade]) -> BTreeMap<String, Position> {
        let mut sorted: Vec<&Trade> = trades.iter().collect();
        sorted.sort_by_key(|t| t.date);

        let mut positions: BTreeMap<String, Position> = BTreeMap::new();
        for trade in sorted {
            let position = positions
                .entry(trade.symbol.clone())
                .or_insert_with(|| Position {
                    asset_type: trade.asset_type,
                    quantity: 0.0,
                    cost_basis: 0.0,
                    realized_gain: 0.0,
                    fees_paid: 0.0,
                });
            position.fees_paid += trade.fee;

            match trade.side {
                TradeSide::Buy => {
                    position.cost_basis += trade.notional();
                    position.quantity += trade.quantity;
                }
                TradeSide::Sell => {
                    let avg_cost = if position.quantity > DUST_QUANTITY {
                        position.cost_basis / position.quantity
                    } else {
                        0.0
                    };
                    let matched = trade.quantity.min(position.quantity);
                    position.realized_gain += (trade.price - avg_cost) * matched;
                    position.cost_basis = (position.cost_basis - avg_cost * matched).max(0.0);
                    position.quantity = (position.quantity - trade.quantity).max(0.0);
                }
            }
        }
        positions
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
