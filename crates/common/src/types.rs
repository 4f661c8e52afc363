use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a catalog product.
///
/// Wraps the integer key to keep product ids from being mixed up with
/// quantities or other integers. The value `0` means "not yet assigned" and
/// is what a create payload carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i32);

impl ProductId {
    /// The placeholder id carried by products that have not been inserted.
    pub const UNASSIGNED: ProductId = ProductId(0);

    /// Creates a product id from a raw key.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw key.
    pub fn as_i32(&self) -> i32 {
        self.0
    }

    /// Returns true if the store has assigned this id.
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i32 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}
