/// Mean-reverting model of a scalar series, as consumed by the signal engine
pub trait SpreadModel: Send {
    /// Feed the next observation
    fn update(&mut self, value: f64);

    /// Standardized deviation of `value`; 0.0 means "no signal" when the
    /// model is not ready
    fn zscore(&self, value: f64) -> f64;

    /// True iff the last calibration attempt succeeded
    fn is_ready(&self) -> bool;

    /// Equilibrium level of the last good fit
    fn mu(&self) -> f64;

    /// Reversion speed of the last good fit
    fn theta(&self) -> f64;
}
