use crate::error::{CatalogError, PlannerError};
use crate::market_matrices::MarketMatrices;
use crate::matrix::Matrix;
use crate::optimizer::extraction::{extract_plan, extract_route, tour_order};
use crate::optimizer::parameters::{DEFAULT_MAX_LEVEL, DEFAULT_STOP_COUNT};
use crate::optimizer::{solve_stage_one, solve_stage_two, SolveOutcome, StageOneParameters, StageTwoParameters, TradeLimits, TradeParameters};
use crate::symbol_index::SymbolIndex;
use crate::travel_cost::{cherry_pick_travel_cost, compute_travel_cost};
use itertools::Itertools;
use tp_domain::{CommodityName, HighLevelPlan, LocationPath, RoutePath, Shop};
use tracing::{event, Level};

/// How far and how often the trader is willing to travel in a single plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteConstraints {
    /// Maximum travel cost between any two visited locations.
    pub max_level: f64,
    /// Exact number of distinct locations to visit.
    pub stop_count: usize,
}

impl Default for RouteConstraints {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            stop_count: DEFAULT_STOP_COUNT,
        }
    }
}

/// Market matrices and travel costs of a catalog slice, solved in two stages:
/// first where to trade, then in which order to visit those places.
#[derive(Debug, Clone)]
pub struct TwoStagePlanner {
    market: MarketMatrices,
    travel_cost: Matrix<f64>,
}

impl TwoStagePlanner {
    pub fn new(shops: &[Shop]) -> Self {
        let market = MarketMatrices::from_shops(shops);
        let paths = shops.iter().map(|s| s.path.clone()).collect_vec();
        let travel_cost = compute_travel_cost(&paths, &market.locations);
        event!(
            Level::DEBUG,
            "Planner built for {} commodities at {} locations",
            market.commodities.len(),
            market.locations.len()
        );
        Self { market, travel_cost }
    }

    pub fn market(&self) -> &MarketMatrices {
        &self.market
    }

    pub fn travel_cost(&self) -> &Matrix<f64> {
        &self.travel_cost
    }

    pub fn update_supply(&mut self, good: &CommodityName, location: &LocationPath, amount: f64) -> Result<(), CatalogError> {
        self.market.update_supply(good, location, amount)
    }

    pub fn update_demand(&mut self, good: &CommodityName, location: &LocationPath, amount: f64) -> Result<(), CatalogError> {
        self.market.update_demand(good, location, amount)
    }

    /// Stage one over the whole market: which trades to make, ignoring the order of the stops.
    pub fn plan_stage_one(&self, limits: &TradeLimits, route: &RouteConstraints) -> Result<SolveOutcome<HighLevelPlan>, PlannerError> {
        let params = StageOneParameters {
            trade: TradeParameters::for_market(&self.market, limits)?,
            travel_cost: self.travel_cost.clone(),
            max_level: route.max_level,
            stop_count: route.stop_count,
        };
        let trade = &params.trade;
        Ok(solve_stage_one(&params).map(|solution| {
            extract_plan(
                &solution.buy,
                &solution.sell,
                &trade.buy_price,
                &trade.sell_price,
                &trade.commodities,
                &trade.locations,
            )
        }))
    }

    /// Stage two over the locations and commodities the plan trades in.
    ///
    /// The subset is ordered by first appearance in the plan's buy transactions, then its sell
    /// transactions. The sequencing model re-decides the trade amounts under the same limits.
    pub fn plan_refinement(
        &self,
        plan: &HighLevelPlan,
        limits: &TradeLimits,
        travel_weight: f64,
    ) -> Result<SolveOutcome<Vec<RoutePath>>, PlannerError> {
        let locations: SymbolIndex<LocationPath> = plan.transactions().map(|t| &t.location).collect();
        let commodities: SymbolIndex<CommodityName> = plan.transactions().map(|t| &t.commodity).collect();

        let params = StageTwoParameters {
            travel_cost: cherry_pick_travel_cost(&self.travel_cost, &self.market.locations, &locations),
            trade: TradeParameters::for_subset(&self.market, limits, commodities, locations)?,
            travel_weight,
        };

        match solve_stage_two(&params) {
            SolveOutcome::Optimal { objective, value } => {
                let order = tour_order(&value.tour)?;
                event!(
                    Level::DEBUG,
                    "Stage two visits {} locations with travel cost {}",
                    order.len(),
                    value.travel_cost
                );
                let routes = extract_route(&order, &value.buy, &value.sell, &params.trade.commodities, &params.trade.locations);
                Ok(SolveOutcome::Optimal { objective, value: routes })
            }
            SolveOutcome::NoSolution { reason } => Ok(SolveOutcome::NoSolution { reason }),
        }
    }
}
