use crate::error::PlannerError;
use crate::matrix::Matrix;
use crate::symbol_index::SymbolIndex;
use tp_domain::{CommodityName, HighLevelPlan, LocationPath, RoutePath, Transaction};

/// Every strictly positive cell of a `[commodity, location]` amount matrix, in row-major order.
pub fn extract_transactions(
    amounts: &Matrix<f64>,
    commodities: &SymbolIndex<CommodityName>,
    locations: &SymbolIndex<LocationPath>,
) -> Vec<Transaction> {
    amounts
        .cells()
        .filter(|(_, _, amount)| **amount > 0.0)
        .map(|(com, loc, amount)| Transaction {
            location: locations.symbol(loc).clone(),
            commodity: commodities.symbol(com).clone(),
            amount: *amount,
        })
        .collect()
}

/// Builds the plan from snapped matrices; cost and revenue are recomputed from the same values.
pub fn extract_plan(
    buy: &Matrix<f64>,
    sell: &Matrix<f64>,
    buy_price: &Matrix<f64>,
    sell_price: &Matrix<f64>,
    commodities: &SymbolIndex<CommodityName>,
    locations: &SymbolIndex<LocationPath>,
) -> HighLevelPlan {
    HighLevelPlan {
        cost: buy.dot(buy_price),
        revenue: sell.dot(sell_price),
        buy: extract_transactions(buy, commodities, locations),
        sell: extract_transactions(sell, commodities, locations),
    }
}

/// Real locations in the order the tour visits them.
///
/// `tour` covers the real locations followed by the start and end sentinels. Fails if the walk from
/// start does not reach end, branches, or leaves a real location unvisited.
pub fn tour_order(tour: &Matrix<bool>) -> Result<Vec<usize>, PlannerError> {
    if tour.rows() < 2 || tour.rows() != tour.cols() {
        return Err(PlannerError::MalformedTour(format!("{}x{} is not an augmented adjacency matrix", tour.rows(), tour.cols())));
    }
    let n = tour.rows() - 2;
    let (start, end) = (n, n + 1);

    let successor = |node: usize| -> Result<usize, PlannerError> {
        let mut next = (0..tour.cols()).filter(|&c| tour[(node, c)]);
        match (next.next(), next.next()) {
            (Some(c), None) => Ok(c),
            (None, _) => Err(PlannerError::MalformedTour(format!("node {node} has no outgoing edge"))),
            (Some(_), Some(_)) => Err(PlannerError::MalformedTour(format!("node {node} has more than one outgoing edge"))),
        }
    };

    let mut order = Vec::with_capacity(n);
    let mut seen = vec![false; n];
    let mut current = successor(start)?;
    while current != end {
        if current == start {
            return Err(PlannerError::MalformedTour("walk returned to start".to_string()));
        }
        if seen[current] {
            return Err(PlannerError::MalformedTour(format!("location {current} is visited twice")));
        }
        seen[current] = true;
        order.push(current);
        current = successor(current)?;
    }

    if let Some(missed) = seen.iter().position(|s| !s) {
        return Err(PlannerError::MalformedTour(format!("location {missed} is not on the walk from start to end")));
    }
    Ok(order)
}

/// Groups the trades of consecutive stops into legs; a new leg begins whenever the destination changes.
/// The first leg departs from the synthetic start node.
pub fn extract_route(
    order: &[usize],
    buy: &Matrix<f64>,
    sell: &Matrix<f64>,
    commodities: &SymbolIndex<CommodityName>,
    locations: &SymbolIndex<LocationPath>,
) -> Vec<RoutePath> {
    let positive_at = |amounts: &Matrix<f64>, loc: usize| {
        (0..amounts.rows())
            .filter(|&com| amounts[(com, loc)] > 0.0)
            .map(|com| Transaction {
                location: locations.symbol(loc).clone(),
                commodity: commodities.symbol(com).clone(),
                amount: amounts[(com, loc)],
            })
            .collect::<Vec<_>>()
    };

    let mut routes: Vec<RoutePath> = Vec::new();
    let mut current_start = LocationPath::route_start();
    for &loc in order {
        let destination = locations.symbol(loc);
        let bought = positive_at(buy, loc);
        let sold = positive_at(sell, loc);
        let same_destination = routes.last().is_some_and(|leg| &leg.end == destination);
        if same_destination {
            if let Some(leg) = routes.last_mut() {
                leg.buy.extend(bought);
                leg.sell.extend(sold);
            }
        } else {
            routes.push(RoutePath {
                start: current_start.clone(),
                end: destination.clone(),
                buy: bought,
                sell: sold,
            });
        }
        current_start = destination.clone();
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::solver::snap_all;

    fn indices() -> (SymbolIndex<CommodityName>, SymbolIndex<LocationPath>) {
        let commodities = [CommodityName::new("X"), CommodityName::new("Y")].iter().collect();
        let locations = [LocationPath::new("A"), LocationPath::new("B"), LocationPath::new("C")].iter().collect();
        (commodities, locations)
    }

    /// Augmented adjacency matrix for `n` real locations from a list of edges.
    fn tour(n: usize, edges: &[(usize, usize)]) -> Matrix<bool> {
        let mut m = Matrix::filled(n + 2, n + 2, false);
        for &(from, to) in edges {
            m[(from, to)] = true;
        }
        m
    }

    #[test]
    fn only_positive_cells_become_transactions() {
        let (commodities, locations) = indices();
        let mut amounts = Matrix::zeros(2, 3);
        amounts[(0, 0)] = 10.0;
        amounts[(1, 2)] = 2.5;

        let transactions = extract_transactions(&amounts, &commodities, &locations);

        assert_eq!(
            transactions,
            vec![
                Transaction {
                    location: LocationPath::new("A"),
                    commodity: CommodityName::new("X"),
                    amount: 10.0
                },
                Transaction {
                    location: LocationPath::new("C"),
                    commodity: CommodityName::new("Y"),
                    amount: 2.5
                },
            ]
        );
    }

    #[test]
    fn re_extracting_snapped_values_is_stable() {
        let (commodities, locations) = indices();
        let raw = Matrix::from_fn(2, 3, |r, c| [0.0004, 10.0, -1e-9, 3.0, 0.002, 7.5][r * 3 + c]);
        let snapped = snap_all(&raw);

        let first = extract_transactions(&snapped, &commodities, &locations);
        let second = extract_transactions(&snap_all(&snapped), &commodities, &locations);

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn plan_cost_and_revenue_come_from_the_matrices() {
        let (commodities, locations) = indices();
        let mut buy = Matrix::zeros(2, 3);
        let mut sell = Matrix::zeros(2, 3);
        buy[(0, 0)] = 10.0;
        sell[(0, 1)] = 10.0;

        let plan = extract_plan(
            &buy,
            &sell,
            &Matrix::filled(2, 3, 10.0),
            &Matrix::filled(2, 3, 15.0),
            &commodities,
            &locations,
        );

        assert_eq!(plan.cost, 100.0);
        assert_eq!(plan.revenue, 150.0);
        assert_eq!(plan.profit(), 50.0);
        assert_eq!(plan.buy.len(), 1);
        assert_eq!(plan.sell[0].location, LocationPath::new("B"));
    }

    #[test]
    fn tour_is_walked_from_start_to_end() {
        // start(3) -> 2 -> 0 -> 1 -> end(4)
        let order = tour_order(&tour(3, &[(3, 2), (2, 0), (0, 1), (1, 4)])).unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn empty_tour_goes_straight_to_end() {
        assert_eq!(tour_order(&tour(0, &[(0, 1)])).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn detached_cycle_is_rejected() {
        // start(4) -> 0 -> 1 -> end(5), with 2 <-> 3 forming a separate cycle
        let result = tour_order(&tour(4, &[(4, 0), (0, 1), (1, 5), (2, 3), (3, 2)]));
        assert!(matches!(result, Err(PlannerError::MalformedTour(_))));
    }

    #[test]
    fn self_loop_is_rejected() {
        // start(2) -> 0 -> end(3), 1 loops on itself
        let result = tour_order(&tour(2, &[(2, 0), (0, 3), (1, 1)]));
        assert!(matches!(result, Err(PlannerError::MalformedTour(_))));
    }

    #[test]
    fn cycle_without_end_is_rejected() {
        // start(2) -> 0 -> 1 -> 0
        let result = tour_order(&tour(2, &[(2, 0), (0, 1), (1, 0)]));
        assert!(matches!(result, Err(PlannerError::MalformedTour(_))));
    }

    #[test]
    fn route_legs_follow_the_tour_and_start_at_the_sentinel() {
        let (commodities, locations) = indices();
        let mut buy = Matrix::zeros(2, 3);
        let mut sell = Matrix::zeros(2, 3);
        buy[(0, 2)] = 10.0;
        buy[(1, 0)] = 4.0;
        sell[(0, 0)] = 10.0;
        sell[(1, 1)] = 4.0;

        let route = extract_route(&[2, 0, 1], &buy, &sell, &commodities, &locations);

        assert_eq!(route.len(), 3);
        assert_eq!(route[0].start, LocationPath::route_start());
        assert_eq!(route[0].end, LocationPath::new("C"));
        assert_eq!(route[0].buy[0].amount, 10.0);
        assert!(route[0].sell.is_empty());
        assert_eq!((route[1].start.clone(), route[1].end.clone()), (LocationPath::new("C"), LocationPath::new("A")));
        assert_eq!(route[1].buy[0].commodity, CommodityName::new("Y"));
        assert_eq!(route[1].sell[0].commodity, CommodityName::new("X"));
        assert_eq!(route[2].end, LocationPath::new("B"));
        assert_eq!(route[2].sell[0].amount, 4.0);
    }
}
