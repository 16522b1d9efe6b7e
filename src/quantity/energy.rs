use std::ops::Mul;

use crate::quantity::{cost::Cost, price::KilowattHourPrice};

quantity!(KilowattHours, "kWh");

impl Mul<KilowattHourPrice> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourPrice) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}
