use crate::error::CatalogError;
use crate::matrix::Matrix;
use crate::symbol_index::SymbolIndex;
use tp_domain::{CommodityName, LocationPath, Shop};

/// Supply, demand and prices of a set of shops in `[commodity, location]` matrix form.
#[derive(Debug, Clone)]
pub struct MarketMatrices {
    pub locations: SymbolIndex<LocationPath>,
    pub commodities: SymbolIndex<CommodityName>,
    /// Units a shop will sell to the trader.
    pub supply: Matrix<f64>,
    /// Units a shop will buy from the trader.
    pub demand: Matrix<f64>,
    /// Price the trader pays.
    pub buy_price: Matrix<f64>,
    /// Price the trader receives.
    pub sell_price: Matrix<f64>,
}

impl MarketMatrices {
    pub fn from_shops(shops: &[Shop]) -> Self {
        let locations: SymbolIndex<LocationPath> = shops.iter().map(|s| &s.path).collect();
        let commodities: SymbolIndex<CommodityName> = shops.iter().flat_map(|s| s.all_commodity_names()).collect();

        let (n_commodities, n_locations) = (commodities.len(), locations.len());
        let mut supply = Matrix::zeros(n_commodities, n_locations);
        let mut demand = Matrix::zeros(n_commodities, n_locations);
        let mut buy_price = Matrix::zeros(n_commodities, n_locations);
        let mut sell_price = Matrix::zeros(n_commodities, n_locations);

        for shop in shops {
            let Some(loc) = locations.position(&shop.path) else {
                continue;
            };
            for offer in shop.buys.iter() {
                let Some(com) = commodities.position(&offer.name) else {
                    continue;
                };
                demand[(com, loc)] = offer.stock;
                sell_price[(com, loc)] = offer.price;
            }
            for offer in shop.sells.iter() {
                let Some(com) = commodities.position(&offer.name) else {
                    continue;
                };
                supply[(com, loc)] = offer.stock;
                buy_price[(com, loc)] = offer.price;
            }
        }

        Self {
            locations,
            commodities,
            supply,
            demand,
            buy_price,
            sell_price,
        }
    }

    /// Inverse supply and inverse demand, used to turn fractional caps into unit caps.
    /// Cells without supply (or demand) get weight zero.
    pub fn weights(&self) -> (Matrix<f64>, Matrix<f64>) {
        (inverse_or_zero(&self.supply), inverse_or_zero(&self.demand))
    }

    pub fn update_supply(&mut self, good: &CommodityName, location: &LocationPath, amount: f64) -> Result<(), CatalogError> {
        let cell = self.cell(good, location, amount)?;
        self.supply[cell] = amount;
        Ok(())
    }

    pub fn update_demand(&mut self, good: &CommodityName, location: &LocationPath, amount: f64) -> Result<(), CatalogError> {
        let cell = self.cell(good, location, amount)?;
        self.demand[cell] = amount;
        Ok(())
    }

    fn cell(&self, good: &CommodityName, location: &LocationPath, amount: f64) -> Result<(usize, usize), CatalogError> {
        let com = self
            .commodities
            .position(good)
            .ok_or_else(|| CatalogError::UnknownCommodity(good.0.clone()))?;
        let loc = self
            .locations
            .position(location)
            .ok_or_else(|| CatalogError::UnknownLocation(location.0.clone()))?;
        if amount.is_nan() || amount < 0.0 {
            return Err(CatalogError::NegativeAmount(amount));
        }
        Ok((com, loc))
    }
}

fn inverse_or_zero(m: &Matrix<f64>) -> Matrix<f64> {
    m.map(|&v| if v != 0.0 { 1.0 / v } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::shop;

    fn matrices() -> MarketMatrices {
        MarketMatrices::from_shops(&[
            shop("A", &[("Y", 4.0, 20.0)], &[("X", 10.0, 50.0)]),
            shop("B", &[("X", 15.0, 40.0)], &[]),
        ])
    }

    #[test]
    fn indices_follow_insertion_order() {
        let m = matrices();
        assert_eq!(m.locations.symbols(), &[LocationPath::new("A"), LocationPath::new("B")]);
        // buys are indexed before sells within a shop
        assert_eq!(m.commodities.symbols(), &[CommodityName::new("Y"), CommodityName::new("X")]);
    }

    #[test]
    fn offers_populate_the_matching_matrices() {
        let m = matrices();
        let (x, y) = (1, 0);
        let (a, b) = (0, 1);

        assert_eq!(m.supply[(x, a)], 50.0);
        assert_eq!(m.buy_price[(x, a)], 10.0);
        assert_eq!(m.demand[(y, a)], 20.0);
        assert_eq!(m.sell_price[(y, a)], 4.0);
        assert_eq!(m.demand[(x, b)], 40.0);
        assert_eq!(m.sell_price[(x, b)], 15.0);

        // not offered
        assert_eq!(m.supply[(x, b)], 0.0);
        assert_eq!(m.demand[(x, a)], 0.0);
    }

    #[test]
    fn weights_are_inverse_with_zero_where_nothing_is_offered() {
        let m = matrices();
        let (buy_weight, sell_weight) = m.weights();

        assert_eq!(buy_weight[(1, 0)], 1.0 / 50.0);
        assert_eq!(buy_weight[(1, 1)], 0.0);
        assert_eq!(sell_weight[(1, 1)], 1.0 / 40.0);
        assert_eq!(sell_weight[(0, 1)], 0.0);
        assert!(buy_weight.cells().all(|(_, _, w)| w.is_finite()));
    }

    #[test]
    fn updates_mutate_a_single_cell() {
        let mut m = matrices();
        m.update_supply(&CommodityName::new("X"), &LocationPath::new("A"), 5.0).unwrap();
        m.update_demand(&CommodityName::new("X"), &LocationPath::new("B"), 0.0).unwrap();

        assert_eq!(m.supply[(1, 0)], 5.0);
        assert_eq!(m.demand[(1, 1)], 0.0);
        assert_eq!(m.weights().1[(1, 1)], 0.0);
    }

    #[test]
    fn updates_reject_unknown_keys_and_negative_amounts() {
        let mut m = matrices();
        assert!(matches!(
            m.update_supply(&CommodityName::new("Z"), &LocationPath::new("A"), 1.0),
            Err(CatalogError::UnknownCommodity(_))
        ));
        assert!(matches!(
            m.update_demand(&CommodityName::new("X"), &LocationPath::new("C"), 1.0),
            Err(CatalogError::UnknownLocation(_))
        ));
        assert!(matches!(
            m.update_supply(&CommodityName::new("X"), &LocationPath::new("A"), -1.0),
            Err(CatalogError::NegativeAmount(_))
        ));
        assert!(matches!(
            m.update_demand(&CommodityName::new("X"), &LocationPath::new("B"), f64::NAN),
            Err(CatalogError::NegativeAmount(_))
        ));
        // rejected updates leave the cell untouched
        assert_eq!(m.demand[(1, 1)], 40.0);
    }
}
