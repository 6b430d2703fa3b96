use crate::matrix::Matrix;
use crate::optimizer::parameters::StageTwoParameters;
use crate::optimizer::solver::{boolean_values, linear, snap_all, sum, values, SolveOutcome, BIG_M_FACTOR};
use crate::optimizer::stage_one::TradeVariables;
use good_lp::{default_solver, variable, Constraint, Expression, ProblemVariables, SolverModel, Variable};
use itertools::Itertools;
use tracing::{event, Level};

/// Snapped solution of the sequencing model.
///
/// `tour` is the adjacency matrix over the real locations followed by the two sentinel nodes,
/// start at `n` and end at `n + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTwoSolution {
    pub buy: Matrix<f64>,
    pub sell: Matrix<f64>,
    pub tour: Matrix<bool>,
    pub travel_cost: f64,
}

/// Node layout of the augmented graph: real locations `0..n`, then start, then end.
#[derive(Debug, Clone, Copy)]
pub struct TourNodes {
    pub n_locations: usize,
}

impl TourNodes {
    pub fn start(&self) -> usize {
        self.n_locations
    }

    pub fn end(&self) -> usize {
        self.n_locations + 1
    }

    pub fn count(&self) -> usize {
        self.n_locations + 2
    }

    /// Every node a unit of reachability flow must be delivered to: real locations and end.
    pub fn flow_targets(&self) -> impl Iterator<Item = usize> {
        (0..self.n_locations).chain(std::iter::once(self.end()))
    }
}

fn row_sum(m: &Matrix<Variable>, r: usize) -> Expression {
    sum(m.row(r).iter().copied())
}

fn column_sum(m: &Matrix<Variable>, c: usize) -> Expression {
    sum(m.column(c).copied())
}

/// Assembled sequencing model, not yet handed to the solver.
pub(crate) struct StageTwoModel {
    pub vars: ProblemVariables,
    pub trade_vars: TradeVariables,
    /// Edge variables over the augmented graph, see [`TourNodes`].
    pub tour: Matrix<Variable>,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
}

/// Orders the locations of a plan into a single walk `start → … → end` and re-derives the trades
/// along it, paying a small penalty for the travel cost of every edge used.
pub fn solve_stage_two(params: &StageTwoParameters) -> SolveOutcome<StageTwoSolution> {
    solve_model(build_stage_two(params), params)
}

/// Subtours are ruled out with a multi-commodity flow: for every target node a separate unit of flow
/// leaves start and has to arrive at that target using tour edges only. Together with the in/out
/// degree of one per node, a cycle detached from start could never receive its flow.
pub(crate) fn build_stage_two(params: &StageTwoParameters) -> StageTwoModel {
    let trade = &params.trade;
    let n = trade.n_locations();
    let nodes = TourNodes { n_locations: n };
    let (start, end) = (nodes.start(), nodes.end());

    let mut vars = ProblemVariables::new();
    let trade_vars = TradeVariables::new(&mut vars, trade);
    let tour = Matrix::from_fn(nodes.count(), nodes.count(), |_, _| vars.add(variable().binary()));
    let reachability = nodes
        .flow_targets()
        .map(|k| (k, Matrix::from_fn(nodes.count(), nodes.count(), |_, _| vars.add(variable().min(0.0)))))
        .collect_vec();
    let cargo_flow = (0..trade.n_commodities())
        .map(|_| Matrix::from_fn(n, n, |_, _| vars.add(variable().min(0.0))))
        .collect_vec();

    let mut objective = trade_vars.profit(trade);
    for i in 0..n {
        for j in 0..n {
            objective.add_mul(-params.travel_weight * params.travel_cost[(i, j)], tour[(i, j)]);
        }
    }

    let mut constraints: Vec<Constraint> = Vec::new();

    // degrees: every node but end leaves once, every real node is entered once
    for r in 0..end {
        constraints.push(row_sum(&tour, r).eq(1.0));
    }
    for c in 0..n {
        constraints.push(column_sum(&tour, c).eq(1.0));
    }
    constraints.push(column_sum(&tour, end).eq(1.0));
    constraints.push(row_sum(&tour, end).eq(0.0));
    constraints.push(row_sum(&tour, start).eq(1.0));
    constraints.push(column_sum(&tour, start).eq(0.0));

    for (k, flow) in reachability.iter() {
        let k = *k;
        for (r, c, f) in flow.cells() {
            constraints.push(linear([(1.0, *f), (-1.0, tour[(r, c)])]).leq(0.0));
        }
        constraints.push(row_sum(flow, start).eq(1.0));
        constraints.push(column_sum(flow, k).eq(1.0));
        // conservation at every intermediate node
        for j in nodes.flow_targets().filter(|&j| j != k) {
            let mut balance = column_sum(flow, j) - row_sum(flow, j);
            balance.add_mul(1.0, flow[(j, start)]);
            constraints.push(balance.eq(0.0));
        }
    }

    // cargo only moves along tour edges, never more than the hold carries
    for flow in cargo_flow.iter() {
        for (i, j, f) in flow.cells() {
            constraints.push(linear([(1.0, *f), (-BIG_M_FACTOR * trade.cargo, tour[(i, j)])]).leq(0.0));
        }
    }
    for i in 0..n {
        let outgoing = linear(cargo_flow.iter().flat_map(|flow| flow.row(i).iter().map(|f| (1.0, *f))));
        constraints.push(outgoing.leq(trade.cargo));
    }
    // goods are picked up where bought and dropped where sold
    for (g, flow) in cargo_flow.iter().enumerate() {
        for j in 0..n {
            let mut balance = row_sum(flow, j) - column_sum(flow, j);
            balance.add_mul(-1.0, trade_vars.buy[(g, j)]);
            balance.add_mul(1.0, trade_vars.sell[(g, j)]);
            constraints.push(balance.eq(0.0));
        }
    }

    constraints.extend(trade_vars.weighted_caps(trade));

    StageTwoModel {
        vars,
        trade_vars,
        tour,
        objective,
        constraints,
    }
}

pub(crate) fn solve_model(model: StageTwoModel, params: &StageTwoParameters) -> SolveOutcome<StageTwoSolution> {
    let trade = &params.trade;
    let n = trade.n_locations();
    let StageTwoModel {
        vars,
        trade_vars,
        tour,
        objective,
        constraints,
    } = model;

    event!(
        Level::DEBUG,
        "Solving stage two over {} commodities x {} locations with {} constraints",
        trade.n_commodities(),
        n,
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
            event!(Level::INFO, "Stage two has no solution: {}", err);
            return err.into();
        }
    };

    let bought = values(&solution, &trade_vars.buy);
    let sold = values(&solution, &trade_vars.sell);
    let tour = boolean_values(&solution, &tour);
    let travel_cost: f64 = (0..n)
        .cartesian_product(0..n)
        .filter(|&(i, j)| tour[(i, j)])
        .map(|(i, j)| params.travel_cost[(i, j)])
        .sum();
    let objective = sold.dot(&trade.sell_price) - bought.dot(&trade.buy_price) - params.travel_weight * travel_cost;
    if !objective.is_finite() {
        return SolveOutcome::NoSolution {
            reason: format!("objective is not finite ({objective})"),
        };
    }

    SolveOutcome::Optimal {
        objective,
        value: StageTwoSolution {
            buy: snap_all(&bought),
            sell: snap_all(&sold),
            tour,
            travel_cost,
        },
    }
}
