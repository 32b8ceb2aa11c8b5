//! Balance output models

use serde::ser::{Serialize, SerializeTuple, Serializer};

/// Largest magnitude written as a JSON integer; every whole f64 below it is exact
const MAX_INTEGRAL: f64 = 1e15;

/// A balance reduced to `[currency, value]`, the `/raw` wire shape.
///
/// Whole values are written without a fraction (`100`, not `100.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePair<'a>(pub &'a str, pub f64);

impl Serialize for BalancePair<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.0)?;
        if self.1.fract() == 0.0 && self.1.abs() < MAX_INTEGRAL {
            tuple.serialize_element(&(self.1 as i64))?;
        } else {
            tuple.serialize_element(&self.1)?;
        }
        tuple.end()
    }
}
