use crate::matrix::Matrix;
use crate::optimizer::parameters::{StageOneParameters, TradeParameters};
use crate::optimizer::solver::{linear, snap_all, sum, values, SolveOutcome, BIG_M_FACTOR};
use good_lp::{default_solver, variable, Constraint, Expression, ProblemVariables, Solution, SolverModel, Variable};
use itertools::Itertools;
use tracing::{event, Level};

/// Snapped solution of the location & trade selection model.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOneSolution {
    /// Units bought, `[commodity, location]`.
    pub buy: Matrix<f64>,
    /// Units sold, `[commodity, location]`.
    pub sell: Matrix<f64>,
    pub visited: Vec<bool>,
}

/// Trade variables shared by both formulations: what to buy and sell where.
pub(crate) struct TradeVariables {
    pub buy: Matrix<Variable>,
    pub sell: Matrix<Variable>,
}

impl TradeVariables {
    /// Bought and sold amounts, bounded by supply and demand.
    pub fn new(vars: &mut ProblemVariables, trade: &TradeParameters) -> Self {
        let (n, m) = (trade.n_commodities(), trade.n_locations());
        let buy = Matrix::from_fn(n, m, |g, j| vars.add(variable().min(0.0).max(trade.supply[(g, j)])));
        let sell = Matrix::from_fn(n, m, |g, j| vars.add(variable().min(0.0).max(trade.demand[(g, j)])));
        Self { buy, sell }
    }

    /// `sum(sell ⊙ sell_price) − sum(buy ⊙ buy_price)`
    pub fn profit(&self, trade: &TradeParameters) -> Expression {
        let revenue = self.sell.cells().map(|(g, j, v)| (trade.sell_price[(g, j)], *v));
        let cost = self.buy.cells().map(|(g, j, v)| (-trade.buy_price[(g, j)], *v));
        linear(revenue.chain(cost))
    }

    /// Weighted caps: a trade may use at most the `cap` fraction of a cell's supply or demand.
    pub fn weighted_caps(&self, trade: &TradeParameters) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for (g, j, cap) in trade.cap.cells() {
            let sell_weight = trade.sell_weight[(g, j)];
            if sell_weight > 0.0 {
                constraints.push(linear([(sell_weight, self.sell[(g, j)])]).leq(*cap));
            }
            let buy_weight = trade.buy_weight[(g, j)];
            if buy_weight > 0.0 {
                constraints.push(linear([(buy_weight, self.buy[(g, j)])]).leq(*cap));
            }
        }
        constraints
    }

    pub fn bought_at(&self, location: usize) -> Expression {
        sum(self.buy.column(location).copied())
    }

    pub fn sold_at(&self, location: usize) -> Expression {
        sum(self.sell.column(location).copied())
    }
}

/// Chooses which locations to visit and how much of every commodity to buy and sell at each,
/// maximizing profit for a fixed number of stops within the travel cost budget.
pub fn solve_stage_one(params: &StageOneParameters) -> SolveOutcome<StageOneSolution> {
    let trade = &params.trade;
    let m = trade.n_locations();

    let mut vars = ProblemVariables::new();
    let trade_vars = TradeVariables::new(&mut vars, trade);
    let visit = (0..m).map(|_| vars.add(variable().binary())).collect_vec();
    let visited_pairs = (0..m)
        .tuple_combinations()
        .map(|(i, j)| (i, j, vars.add(variable().binary())))
        .collect_vec();

    let objective = trade_vars.profit(trade);
    let mut constraints: Vec<Constraint> = Vec::new();

    // every unit bought is sold again
    for g in 0..trade.n_commodities() {
        let bought = sum(trade_vars.buy.row(g).iter().copied());
        let sold = sum(trade_vars.sell.row(g).iter().copied());
        constraints.push((bought - sold).eq(0.0));
    }

    constraints.extend(trade_vars.weighted_caps(trade));

    for j in 0..m {
        constraints.push(trade_vars.bought_at(j).leq(trade.cargo));
        constraints.push(trade_vars.sold_at(j).leq(trade.cargo));

        // trading anywhere forces the visit flag on
        let mut traded = trade_vars.bought_at(j) + trade_vars.sold_at(j);
        traded.add_mul(-BIG_M_FACTOR * trade.cargo, visit[j]);
        constraints.push(traded.leq(0.0));
    }

    for &(i, j, both_visited) in visited_pairs.iter() {
        // both_visited >= visit[i] + visit[j] - 1
        constraints.push(linear([(1.0, both_visited), (-1.0, visit[i]), (-1.0, visit[j])]).geq(-1.0));
        constraints.push(linear([(params.travel_cost[(i, j)], both_visited)]).leq(params.max_level));
    }

    constraints.push(sum(visit.iter().copied()).eq(params.stop_count as f64));

    event!(
        Level::DEBUG,
        "Solving stage one over {} commodities x {} locations with {} constraints",
        trade.n_commodities(),
        m,
        constraints.len()
    );

    #[allow(unused_mut)]
    let mut problem = vars.maximise(objective).using(default_solver);
    #[cfg(feature = "coin_cbc")]
    problem.set_parameter("log", "0");
    let problem = constraints.into_iter().fold(problem, |p, c| p.with(c));

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(err) => {
            event!(Level::INFO, "Stage one has no solution: {}", err);
            return err.into();
        }
    };

    let bought = values(&solution, &trade_vars.buy);
    let sold = values(&solution, &trade_vars.sell);
    let objective = sold.dot(&trade.sell_price) - bought.dot(&trade.buy_price);
    if !objective.is_finite() {
        return SolveOutcome::NoSolution {
            reason: format!("objective is not finite ({objective})"),
        };
    }

    SolveOutcome::Optimal {
        objective,
        value: StageOneSolution {
            buy: snap_all(&bought),
            sell: snap_all(&sold),
            visited: visit.iter().map(|v| solution.value(*v) > 0.5).collect_vec(),
        },
    }
}
