use crate::error::CatalogError;
use crate::market_matrices::MarketMatrices;
use crate::matrix::Matrix;
use crate::symbol_index::SymbolIndex;
use itertools::Itertools;
use std::collections::HashMap;
use tp_domain::{CommodityName, LocationPath};

pub const DEFAULT_MAX_PERCENT: f64 = 0.2;
pub const DEFAULT_MAX_LEVEL: f64 = 2.0;
pub const DEFAULT_STOP_COUNT: usize = 3;
pub const DEFAULT_TRAVEL_WEIGHT: f64 = 1e-3;

/// Trading limits of a single request, shared by both stages.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLimits {
    pub cargo: f64,
    /// Fraction of a cell's supply or demand that may be traded, unless overridden below.
    pub max_percent: f64,
    pub max_commodity: HashMap<CommodityName, f64>,
    pub max_commodity_location: HashMap<CommodityName, HashMap<LocationPath, f64>>,
    pub blacklist: Vec<LocationPath>,
}

impl TradeLimits {
    pub fn new(cargo: f64) -> Self {
        Self {
            cargo,
            max_percent: DEFAULT_MAX_PERCENT,
            max_commodity: HashMap::new(),
            max_commodity_location: HashMap::new(),
            blacklist: Vec::new(),
        }
    }

    pub fn with_max_percent(mut self, max_percent: f64) -> Self {
        self.max_percent = max_percent;
        self
    }

    pub fn with_max_commodity(mut self, max_commodity: HashMap<CommodityName, f64>) -> Self {
        self.max_commodity = max_commodity;
        self
    }

    pub fn with_max_commodity_location(mut self, max_commodity_location: HashMap<CommodityName, HashMap<LocationPath, f64>>) -> Self {
        self.max_commodity_location = max_commodity_location;
        self
    }

    pub fn with_blacklist(mut self, blacklist: Vec<LocationPath>) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// The `Q` matrix: global cap, then per-commodity rows, then per-commodity-per-location cells.
    /// Names outside the given indices are ignored.
    pub fn cap_matrix(&self, commodities: &SymbolIndex<CommodityName>, locations: &SymbolIndex<LocationPath>) -> Matrix<f64> {
        let mut cap = Matrix::filled(commodities.len(), locations.len(), self.max_percent);
        for (commodity, percent) in self.max_commodity.iter() {
            if let Some(row) = commodities.position(commodity) {
                cap.set_row(row, *percent);
            }
        }
        for (commodity, per_location) in self.max_commodity_location.iter() {
            let Some(row) = commodities.position(commodity) else {
                continue;
            };
            for (location, percent) in per_location.iter() {
                if let Some(col) = locations.position(location) {
                    cap[(row, col)] = *percent;
                }
            }
        }
        cap
    }
}

/// Market data and limits of one formulation, restricted to the commodities and locations it covers.
#[derive(Debug, Clone)]
pub struct TradeParameters {
    pub commodities: SymbolIndex<CommodityName>,
    pub locations: SymbolIndex<LocationPath>,
    pub buy_price: Matrix<f64>,
    pub sell_price: Matrix<f64>,
    pub supply: Matrix<f64>,
    pub demand: Matrix<f64>,
    pub buy_weight: Matrix<f64>,
    pub sell_weight: Matrix<f64>,
    pub cap: Matrix<f64>,
    pub cargo: f64,
}

impl TradeParameters {
    pub fn for_market(market: &MarketMatrices, limits: &TradeLimits) -> Result<Self, CatalogError> {
        Self::for_subset(market, limits, market.commodities.clone(), market.locations.clone())
    }

    /// Parameters over a subset of the market, with rows and columns ordered like the given indices.
    pub fn for_subset(
        market: &MarketMatrices,
        limits: &TradeLimits,
        commodities: SymbolIndex<CommodityName>,
        locations: SymbolIndex<LocationPath>,
    ) -> Result<Self, CatalogError> {
        let rows = commodities
            .symbols()
            .iter()
            .map(|c| market.commodities.position(c).ok_or_else(|| CatalogError::UnknownCommodity(c.0.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let cols = locations
            .symbols()
            .iter()
            .map(|l| market.locations.position(l).ok_or_else(|| CatalogError::UnknownLocation(l.0.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let (buy_weight, sell_weight) = market.weights();
        let mut supply = market.supply.select(&rows, &cols);
        let mut demand = market.demand.select(&rows, &cols);

        // blacklisted locations can neither sell to nor buy from the trader
        for col in limits.blacklist.iter().filter_map(|l| locations.position(l)).unique() {
            supply.set_column(col, 0.0);
            demand.set_column(col, 0.0);
        }

        Ok(Self {
            buy_price: market.buy_price.select(&rows, &cols),
            sell_price: market.sell_price.select(&rows, &cols),
            buy_weight: buy_weight.select(&rows, &cols),
            sell_weight: sell_weight.select(&rows, &cols),
            cap: limits.cap_matrix(&commodities, &locations),
            cargo: limits.cargo,
            supply,
            demand,
            commodities,
            locations,
        })
    }

    pub fn n_commodities(&self) -> usize {
        self.commodities.len()
    }

    pub fn n_locations(&self) -> usize {
        self.locations.len()
    }
}

/// Inputs of the location & trade selection model.
#[derive(Debug, Clone)]
pub struct StageOneParameters {
    pub trade: TradeParameters,
    pub travel_cost: Matrix<f64>,
    /// Maximum travel cost between any two visited locations.
    pub max_level: f64,
    pub stop_count: usize,
}

/// Inputs of the sequencing model.
#[derive(Debug, Clone)]
pub struct StageTwoParameters {
    pub trade: TradeParameters,
    pub travel_cost: Matrix<f64>,
    /// Weight of the travel cost penalty in the objective.
    pub travel_weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::shop;

    fn market() -> MarketMatrices {
        MarketMatrices::from_shops(&[
            shop("A", &[], &[("X", 10.0, 50.0), ("Y", 3.0, 10.0)]),
            shop("B", &[("X", 15.0, 50.0), ("Y", 5.0, 10.0)], &[]),
            shop("C", &[("X", 14.0, 20.0)], &[("Y", 2.0, 30.0)]),
        ])
    }

    #[test]
    fn cap_overrides_apply_from_coarse_to_fine() {
        let m = market();
        let limits = TradeLimits::new(10.0)
            .with_max_percent(0.5)
            .with_max_commodity(HashMap::from([(CommodityName::new("Y"), 0.3), (CommodityName::new("Unknown"), 0.9)]))
            .with_max_commodity_location(HashMap::from([(
                CommodityName::new("Y"),
                HashMap::from([(LocationPath::new("C"), 0.1), (LocationPath::new("Nowhere"), 0.9)]),
            )]));

        let cap = limits.cap_matrix(&m.commodities, &m.locations);
        let (x, y) = (0, 1);

        assert_eq!(cap[(x, 0)], 0.5);
        assert_eq!(cap[(y, 0)], 0.3);
        assert_eq!(cap[(y, 1)], 0.3);
        assert_eq!(cap[(y, 2)], 0.1);
    }

    #[test]
    fn blacklist_zeroes_supply_and_demand_columns() {
        let m = market();
        let limits = TradeLimits::new(10.0).with_blacklist(vec![LocationPath::new("C"), LocationPath::new("Nowhere")]);
        let params = TradeParameters::for_market(&m, &limits).unwrap();

        assert!(params.supply.column(2).all(|v| *v == 0.0));
        assert!(params.demand.column(2).all(|v| *v == 0.0));
        assert_eq!(params.supply[(0, 0)], 50.0);
        // prices are untouched
        assert_eq!(params.sell_price[(0, 2)], 14.0);
    }

    #[test]
    fn subset_follows_the_order_of_the_given_indices() {
        let m = market();
        let commodities: SymbolIndex<CommodityName> = [CommodityName::new("Y")].iter().collect();
        let locations: SymbolIndex<LocationPath> = [LocationPath::new("C"), LocationPath::new("A")].iter().collect();

        let params = TradeParameters::for_subset(&m, &TradeLimits::new(10.0), commodities, locations).unwrap();

        assert_eq!((params.n_commodities(), params.n_locations()), (1, 2));
        assert_eq!(params.supply[(0, 0)], 30.0);
        assert_eq!(params.supply[(0, 1)], 10.0);
        assert_eq!(params.buy_weight[(0, 0)], 1.0 / 30.0);
    }

    #[test]
    fn whole_market_parameters_keep_the_market_order() {
        let m = market();
        let params = TradeParameters::for_market(&m, &TradeLimits::new(10.0)).unwrap();

        assert_eq!(params.commodities.symbols(), m.commodities.symbols());
        assert_eq!(params.locations.symbols(), m.locations.symbols());
        assert_eq!(params.supply, m.supply);
        assert_eq!(params.demand, m.demand);
    }

    #[test]
    fn empty_market_yields_empty_parameters() {
        let params = TradeParameters::for_market(&MarketMatrices::from_shops(&[]), &TradeLimits::new(10.0)).unwrap();
        assert_eq!((params.n_commodities(), params.n_locations()), (0, 0));
    }

    #[test]
    fn subset_with_unknown_location_fails() {
        let m = market();
        let locations: SymbolIndex<LocationPath> = [LocationPath::new("Z")].iter().collect();
        let result = TradeParameters::for_subset(&m, &TradeLimits::new(10.0), m.commodities.clone(), locations);
        assert!(matches!(result, Err(CatalogError::UnknownLocation(_))));
    }
}
