use common::Side;

/// Sizing, commission and protective-exit thresholds. Pure functions.
pub struct RiskManager;

impl RiskManager {
    /// Currency amount to commit: a share of equity, capped by cash on hand
    pub fn position_size(equity: f64, position_size_pct: f64, available_cash: f64) -> f64 {
        (equity * position_size_pct / 100.0).min(available_cash).max(0.0)
    }

    pub fn commission(trade_value: f64, fixed: f64, pct: f64) -> f64 {
        fixed + trade_value * pct / 100.0
    }

    /// Whole units `amount` buys at `price`. Commission is paid on top.
    pub fn quantity(amount: f64, price: f64) -> f64 {
        if !(price > 0.0) {
            return 0.0;
        }
        (amount / price).floor().max(0.0)
    }

    pub fn stop_loss_price(entry_price: f64, pct: Option<f64>, side: Side) -> Option<f64> {
        let pct = pct?;
        Some(match side {
            Side::Long => entry_price * (1.0 - pct / 100.0),
            Side::Short => entry_price * (1.0 + pct / 100.0),
        })
    }

    pub fn take_profit_price(entry_price: f64, pct: Option<f64>, side: Side) -> Option<f64> {
        let pct = pct?;
        Some(match side {
            Side::Long => entry_price * (1.0 + pct / 100.0),
            Side::Short => entry_price * (1.0 - pct / 100.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_position_size_capped_by_cash() {
        assert_eq!(RiskManager::position_size(10_000.0, 10.0, 5_000.0), 1_000.0);
        assert_eq!(RiskManager::position_size(10_000.0, 90.0, 5_000.0), 5_000.0);
    }

    #[test]
    fn test_commission() {
        assert_relative_eq!(RiskManager::commission(1000.0, 1.0, 0.1), 2.0, epsilon = 1e-12);
        assert_eq!(RiskManager::commission(1000.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_quantity_floors_amount_over_price() {
        assert_eq!(RiskManager::quantity(1000.0, 100.0), 10.0);
        assert_eq!(RiskManager::quantity(1099.0, 100.0), 10.0);
        // sizing below one unit
        assert_eq!(RiskManager::quantity(50.0, 100.0), 0.0);
        assert_eq!(RiskManager::quantity(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_commission_does_not_shrink_quantity() {
        let quantity = RiskManager::quantity(1000.0, 100.0);
        assert_eq!(quantity, 10.0);
        assert_relative_eq!(
            RiskManager::commission(quantity * 100.0, 1.0, 0.1),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_long_thresholds() {
        assert_relative_eq!(
            RiskManager::stop_loss_price(100.0, Some(5.0), Side::Long).unwrap(),
            95.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            RiskManager::take_profit_price(100.0, Some(10.0), Side::Long).unwrap(),
            110.0,
            epsilon = 1e-9
        );
        assert_eq!(RiskManager::stop_loss_price(100.0, None, Side::Long), None);
        assert_eq!(RiskManager::take_profit_price(100.0, None, Side::Long), None);
    }

    #[test]
    fn test_short_thresholds_mirror_long() {
        assert_relative_eq!(
            RiskManager::stop_loss_price(100.0, Some(5.0), Side::Short).unwrap(),
            105.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            RiskManager::take_profit_price(100.0, Some(10.0), Side::Short).unwrap(),
            90.0,
            epsilon = 1e-9
        );
    }
}
