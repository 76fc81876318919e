//! Position sizing for spread entries
//!
//! The engine asks a sizer for the asset-A quantity of each new spread;
//! the asset-B leg is that quantity scaled by the current ratio so both
//! legs carry comparable notional.

/// Quantity of asset A to trade when opening a spread
pub trait PositionSizer: Send {
    fn leg_a_quantity(&self, z_score: f64, ratio: f64) -> f64;
}

/// Same fixed quantity for every entry, whatever the account or signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFractionSizer {
    fraction: f64,
}

impl FixedFractionSizer {
    pub fn new(fraction: f64) -> Self {
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

impl PositionSizer for FixedFractionSizer {
    fn leg_a_quantity(&self, _z_score: f64, _ratio: f64) -> f64 {
        self.fraction
    }
}

/// Asset-B quantity matching `leg_a` at the current ratio
pub fn hedge_quantity(leg_a: f64, ratio: f64) -> f64 {
    leg_a * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_fraction_ignores_signal() {
        let sizer = FixedFractionSizer::new(0.1);
        assert_eq!(sizer.leg_a_quantity(3.5, 0.06), 0.1);
        assert_eq!(sizer.leg_a_quantity(-9.0, 1.2), 0.1);
    }

    #[test]
    fn test_hedge_quantity_scales_by_ratio() {
        assert!((hedge_quantity(0.1, 0.06) - 0.006).abs() < 1e-15);
    }
}
