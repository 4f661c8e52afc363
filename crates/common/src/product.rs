use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Number of decimal places carried by unit prices.
pub const PRICE_SCALE: u32 = 2;

/// A single catalog item.
///
/// Field names on the wire are camelCase (`productId`, `pricePerUnit`, ...).
/// A missing `productId` deserializes as [`ProductId::UNASSIGNED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub product_id: ProductId,
    pub manufacturer: String,
    pub sku: String,
    pub upc: String,
    #[serde(with = "price")]
    pub price_per_unit: Decimal,
    pub quantity_on_hand: i32,
    pub product_name: String,
}

impl Product {
    /// Returns a copy of this product carrying the given id.
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.product_id = id;
        self
    }

    /// Unit price rounded to the fixed storage scale.
    pub fn price(&self) -> Decimal {
        round_price(self.price_per_unit)
    }
}

/// Rounds to [`PRICE_SCALE`] places with halves going away from zero, the
/// same rule a `NUMERIC(13,2)` column applies.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Wire codec for prices: a JSON number with two decimal places.
///
/// Values go through `f64` only at the JSON edge and are rounded back to
/// [`PRICE_SCALE`] places, so `9.99` never comes back as `9.9900000001`.
pub mod price {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    use super::round_price;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let float = round_price(*value)
            .to_f64()
            .ok_or_else(|| ser::Error::custom(format!("price {value} is not representable")))?;
        serializer.serialize_f64(float)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let float = f64::deserialize(deserializer)?;
        Decimal::from_f64(float)
            .map(round_price)
            .ok_or_else(|| de::Error::custom(format!("price {float} is not a finite decimal")))
    }
}
