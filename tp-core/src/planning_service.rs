use crate::catalog::Catalog;
use crate::configuration::PlannerConfiguration;
use crate::location_filter::LocationFilter;
use crate::optimizer::{SolveOutcome, TradeLimits};
use crate::planner::{RouteConstraints, TwoStagePlanner};
use anyhow::{anyhow, Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tp_domain::{HighLevelPlan, OptimizeRequest, OptimizeResponse, RoutePath};
use tracing::{event, Level};

/// A plan together with the route that executes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRoute {
    pub plan: HighLevelPlan,
    pub routes: Vec<RoutePath>,
}

impl TradeRoute {
    /// The result reported whenever no profitable route exists.
    pub fn null() -> Self {
        Self {
            plan: HighLevelPlan::empty(),
            routes: Vec::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.plan.buy.is_empty() && self.plan.sell.is_empty() && self.routes.is_empty()
    }
}

impl From<&TradeRoute> for OptimizeResponse {
    fn from(route: &TradeRoute) -> Self {
        OptimizeResponse::new(&route.plan, &route.routes)
    }
}

/// Answers optimization requests against a shared, read-only catalog.
///
/// Every request builds its own planner, so concurrent requests never share solver state.
#[derive(Debug, Clone)]
pub struct PlanningService {
    catalog: Arc<Catalog>,
    configuration: PlannerConfiguration,
}

impl PlanningService {
    pub fn new(catalog: Arc<Catalog>, configuration: PlannerConfiguration) -> Self {
        Self { catalog, configuration }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn configuration(&self) -> &PlannerConfiguration {
        &self.configuration
    }

    /// Runs both stages for a request. Anything short of a complete route, including failures of the
    /// solver itself, is reported as [`TradeRoute::null`].
    pub fn optimize(&self, request: &OptimizeRequest) -> TradeRoute {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_optimize(request))) {
            Ok(Ok(route)) => route,
            Ok(Err(err)) => {
                event!(Level::WARN, "Optimization failed, answering with an empty route: {:#}", err);
                TradeRoute::null()
            }
            Err(_) => {
                event!(Level::ERROR, "Solver panicked, answering with an empty route");
                TradeRoute::null()
            }
        }
    }

    fn try_optimize(&self, request: &OptimizeRequest) -> Result<TradeRoute> {
        let filter = LocationFilter::compile(&request.filter).with_context(|| format!("filter '{}'", request.filter))?;
        let shops = self.catalog.filtered_shops(&filter);
        if shops.is_empty() {
            event!(Level::INFO, "No shops match filter '{}'", request.filter);
            return Ok(TradeRoute::null());
        }

        let limits = self.limits_for(request);
        let route = RouteConstraints {
            max_level: request.max_range as f64,
            stop_count: usize::try_from(request.stops).map_err(|_| anyhow!("stops must not be negative, got {}", request.stops))?,
        };

        let planner = TwoStagePlanner::new(&shops);
        let plan = match planner.plan_stage_one(&limits, &route)? {
            SolveOutcome::Optimal { objective, value } => {
                event!(Level::DEBUG, "Stage one found a plan with profit {}", objective);
                value
            }
            SolveOutcome::NoSolution { reason } => {
                event!(Level::INFO, "Stage one has no solution: {}", reason);
                return Ok(TradeRoute::null());
            }
        };
        if plan.buy.is_empty() {
            event!(Level::INFO, "No profitable trade among {} shops", shops.len());
            return Ok(TradeRoute::null());
        }

        match planner.plan_refinement(&plan, &limits, self.configuration.travel_weight)? {
            SolveOutcome::Optimal { objective, value } => {
                event!(
                    Level::INFO,
                    "Found route with {} legs, stage one profit {:.2}, stage two objective {:.2}",
                    value.len(),
                    plan.profit(),
                    objective
                );
                Ok(TradeRoute { plan, routes: value })
            }
            SolveOutcome::NoSolution { reason } => {
                event!(Level::INFO, "Stage two has no solution: {}", reason);
                Ok(TradeRoute::null())
            }
        }
    }

    fn limits_for(&self, request: &OptimizeRequest) -> TradeLimits {
        TradeLimits::new(request.max_cargo as f64)
            .with_max_percent(self.configuration.max_percent)
            .with_max_commodity(request.max_commodity.clone())
            .with_max_commodity_location(request.restrictions.clone())
            .with_blacklist(request.blk_locations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_objects::{a_to_b_shops, assert_close, two_system_catalog};
    use std::collections::HashMap;
    use test_log::test;
    use tp_domain::{LocationPath, MATCH_EVERYTHING};

    fn service(catalog: Catalog) -> PlanningService {
        PlanningService::new(Arc::new(catalog), PlannerConfiguration::default())
    }

    fn request(max_range: i64, max_cargo: i64, stops: i64) -> OptimizeRequest {
        OptimizeRequest {
            max_range,
            max_cargo,
            stops,
            max_commodity: HashMap::new(),
            blk_locations: Vec::new(),
            restrictions: HashMap::new(),
            filter: MATCH_EVERYTHING.to_string(),
        }
    }

    #[test]
    fn finds_the_profitable_route() {
        let route = service(Catalog::new(a_to_b_shops())).optimize(&request(5, 10, 2));

        assert!(!route.is_null());
        assert_close(route.plan.profit(), 50.0);
        assert_eq!(route.routes.len(), 2);
        assert_eq!(route.routes[1].end, LocationPath::new("B"));
    }

    #[test]
    fn blacklisting_the_buyer_yields_the_null_route() {
        let mut req = request(5, 10, 2);
        req.blk_locations = vec![LocationPath::new("B")];

        let route = service(Catalog::new(a_to_b_shops())).optimize(&req);

        assert_eq!(route, TradeRoute::null());
    }

    #[test]
    fn filter_matching_nothing_yields_the_null_route() {
        let mut req = request(5, 10, 2);
        req.filter = "^Nowhere".to_string();
        assert!(service(Catalog::new(a_to_b_shops())).optimize(&req).is_null());
    }

    #[test]
    fn invalid_filter_yields_the_null_route() {
        let mut req = request(5, 10, 2);
        req.filter = "(".to_string();
        assert!(service(Catalog::new(a_to_b_shops())).optimize(&req).is_null());
    }

    #[test]
    fn infeasible_range_yields_the_null_route() {
        assert!(service(Catalog::new(a_to_b_shops())).optimize(&request(0, 10, 2)).is_null());
    }

    #[test]
    fn filter_restricts_planning_to_one_system() {
        let mut req = request(2, 25, 3);
        req.filter = "^Stanton".to_string();

        let route = service(two_system_catalog()).optimize(&req);

        assert!(!route.is_null());
        assert!(route.plan.transactions().all(|t| t.location.0.starts_with("Stanton")));
        assert!(route.routes.iter().all(|r| r.end.0.starts_with("Stanton")));
    }

    #[test]
    fn response_mirrors_the_route() {
        let route = service(Catalog::new(a_to_b_shops())).optimize(&request(5, 10, 2));
        let response = OptimizeResponse::from(&route);
        assert_eq!(response.routes.len(), route.routes.len());
        assert_eq!(response.plan.buy_transactions.len(), 1);
    }
}
