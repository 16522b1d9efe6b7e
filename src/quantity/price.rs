quantity!(
    /// Vietnamese dong per kilowatt-hour.
    KilowattHourPrice,
    "VND/kWh"
);

impl KilowattHourPrice {
    pub fn is_positive(self) -> bool {
        self.is_finite() && self > Self::ZERO
    }
}
