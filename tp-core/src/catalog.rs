use crate::error::CatalogError;
use crate::location_filter::LocationFilter;
use itertools::Itertools;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tp_domain::{CommodityName, LocationPath, Shop, StockQuery, StockResponse, TradeDirection};
use tracing::{event, Level};

type OfferPosition = (usize, usize);

/// The shop snapshot loaded at startup. Read-only once built; planners copy what they need out of it.
#[derive(Debug, Clone)]
pub struct Catalog {
    shops: Vec<Shop>,
    buy_offers: HashMap<LocationPath, HashMap<CommodityName, OfferPosition>>,
    sell_offers: HashMap<LocationPath, HashMap<CommodityName, OfferPosition>>,
}

impl Catalog {
    pub fn new(shops: Vec<Shop>) -> Self {
        let buy_offers = Self::index_offers(&shops, TradeDirection::Buy);
        let sell_offers = Self::index_offers(&shops, TradeDirection::Sell);
        Self {
            shops,
            buy_offers,
            sell_offers,
        }
    }

    /// First offer of every commodity name per location, for the given trade direction.
    fn index_offers(shops: &[Shop], direction: TradeDirection) -> HashMap<LocationPath, HashMap<CommodityName, OfferPosition>> {
        let mut index: HashMap<LocationPath, HashMap<CommodityName, OfferPosition>> = HashMap::new();
        for (shop_idx, shop) in shops.iter().enumerate() {
            let offers = index.entry(shop.path.clone()).or_default();
            for (offer_idx, offer) in shop.offers(direction).iter().enumerate() {
                offers.entry(offer.name.clone()).or_insert((shop_idx, offer_idx));
            }
        }
        index
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let shops: Vec<Shop> = serde_json::from_str(json)?;
        Ok(Self::new(shops))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref())?;
        let shops: Vec<Shop> = serde_json::from_reader(BufReader::new(file))?;
        let catalog = Self::new(shops);
        event!(
            Level::INFO,
            "Loaded catalog from {} with {} shops and {} commodities",
            path.as_ref().display(),
            catalog.shops.len(),
            catalog.commodity_names(&LocationFilter::everything()).len()
        );
        Ok(catalog)
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn filtered_shops(&self, filter: &LocationFilter) -> Vec<Shop> {
        self.shops.iter().filter(|s| filter.matches(&s.path)).cloned().collect_vec()
    }

    pub fn location_paths(&self, filter: &LocationFilter) -> Vec<LocationPath> {
        self.shops
            .iter()
            .filter(|s| filter.matches(&s.path))
            .map(|s| s.path.clone())
            .unique()
            .collect_vec()
    }

    pub fn commodity_names(&self, filter: &LocationFilter) -> Vec<CommodityName> {
        self.shops
            .iter()
            .filter(|s| filter.matches(&s.path))
            .flat_map(|s| s.all_commodity_names().cloned())
            .unique()
            .collect_vec()
    }

    /// Distinct location paths matching `pattern`; an invalid pattern yields no locations.
    pub fn matching_locations(&self, pattern: &str) -> Vec<LocationPath> {
        match LocationFilter::compile(pattern) {
            Ok(filter) => self.location_paths(&filter),
            Err(e) => {
                event!(Level::WARN, "Ignoring location listing for invalid filter: {}", e);
                Vec::new()
            }
        }
    }

    /// Distinct commodity names traded at locations matching `pattern`; an invalid pattern yields none.
    pub fn matching_commodities(&self, pattern: &str) -> Vec<CommodityName> {
        match LocationFilter::compile(pattern) {
            Ok(filter) => self.commodity_names(&filter),
            Err(e) => {
                event!(Level::WARN, "Ignoring commodity listing for invalid filter: {}", e);
                Vec::new()
            }
        }
    }

    /// Current stock of the offer a trader moving in `direction` would use.
    pub fn stock(&self, direction: TradeDirection, location: &LocationPath, commodity: &CommodityName) -> Result<f64, CatalogError> {
        let offers = match direction {
            TradeDirection::Buy => &self.buy_offers,
            TradeDirection::Sell => &self.sell_offers,
        };
        let (shop_idx, offer_idx) = offers
            .get(location)
            .ok_or_else(|| CatalogError::UnknownLocation(location.0.clone()))?
            .get(commodity)
            .ok_or_else(|| CatalogError::UnknownCommodity(commodity.0.clone()))?;
        Ok(self.shops[*shop_idx].offers(direction)[*offer_idx].stock)
    }

    pub fn stock_report(&self, direction: TradeDirection, query: &StockQuery) -> Result<StockResponse, CatalogError> {
        let mut report = StockResponse::new();
        for (location, commodities) in query {
            let entry = report.entry(location.clone()).or_default();
            for commodity in commodities.keys() {
                entry.insert(commodity.clone(), self.stock(direction, location, commodity)?);
            }
        }
        Ok(report)
    }
}
