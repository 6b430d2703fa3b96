use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Separator between the hierarchy segments of a location path, e.g. `"Stanton>Crusader>Port Olisar"`.
pub const PATH_SEPARATOR: char = '>';

/// Label of the synthetic node every route begins at.
pub const ROUTE_START: &str = "start";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct LocationPath(pub String);

impl LocationPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn route_start() -> Self {
        Self(ROUTE_START.to_string())
    }

    /// Hierarchy segments, outermost first, with surrounding whitespace removed.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR).map(str::trim)
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct CommodityName(pub String);

impl CommodityName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for CommodityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a trade from the trader's point of view.
/// `Buy` looks at what a shop sells, `Sell` at what a shop buys.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// One offer of a shop. Persisted as `[name, price, stock, refresh]`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(from = "CommodityRecord", into = "CommodityRecord")]
pub struct Commodity {
    pub name: CommodityName,
    pub price: f64,
    pub stock: f64,
    pub refresh: f64,
}

#[derive(Deserialize, Serialize)]
struct CommodityRecord(CommodityName, f64, f64, f64);

impl From<CommodityRecord> for Commodity {
    fn from(CommodityRecord(name, price, stock, refresh): CommodityRecord) -> Self {
        Self { name, price, stock, refresh }
    }
}

impl From<Commodity> for CommodityRecord {
    fn from(c: Commodity) -> Self {
        CommodityRecord(c.name, c.price, c.stock, c.refresh)
    }
}

/// A location with independent offers.
/// `buys` are the commodities the shop purchases from the trader, `sells` the ones it offers to the trader.
/// Persisted as `[path, buys, sells]`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(from = "ShopRecord", into = "ShopRecord")]
pub struct Shop {
    pub path: LocationPath,
    pub buys: Vec<Commodity>,
    pub sells: Vec<Commodity>,
}

#[derive(Deserialize, Serialize)]
struct ShopRecord(LocationPath, Vec<Commodity>, Vec<Commodity>);

impl From<ShopRecord> for Shop {
    fn from(ShopRecord(path, buys, sells): ShopRecord) -> Self {
        Self { path, buys, sells }
    }
}

impl From<Shop> for ShopRecord {
    fn from(s: Shop) -> Self {
        ShopRecord(s.path, s.buys, s.sells)
    }
}

impl Shop {
    /// The offers a trader moving in `direction` interacts with.
    pub fn offers(&self, direction: TradeDirection) -> &[Commodity] {
        match direction {
            TradeDirection::Buy => &self.sells,
            TradeDirection::Sell => &self.buys,
        }
    }

    pub fn all_commodity_names(&self) -> impl Iterator<Item = &CommodityName> {
        self.buys.iter().chain(self.sells.iter()).map(|c| &c.name)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub location: LocationPath,
    pub commodity: CommodityName,
    pub amount: f64,
}

/// Unordered result of the location & trade selection stage.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HighLevelPlan {
    pub cost: f64,
    pub revenue: f64,
    pub buy: Vec<Transaction>,
    pub sell: Vec<Transaction>,
}

impl HighLevelPlan {
    pub fn empty() -> Self {
        Self {
            cost: 0.0,
            revenue: 0.0,
            buy: Vec::new(),
            sell: Vec::new(),
        }
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.cost
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.buy.iter().chain(self.sell.iter())
    }
}

/// One leg of a sequenced route, grouped by its destination.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub start: LocationPath,
    pub end: LocationPath,
    pub buy: Vec<Transaction>,
    pub sell: Vec<Transaction>,
}
