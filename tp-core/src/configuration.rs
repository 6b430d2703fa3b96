use crate::optimizer::parameters::DEFAULT_TRAVEL_WEIGHT;

/// Settings applied to every optimization request.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfiguration {
    /// Global trading cap `Q`, as a fraction of a cell's supply or demand.
    pub max_percent: f64,
    /// Weight of the travel cost penalty when sequencing the route.
    pub travel_weight: f64,
}

impl Default for PlannerConfiguration {
    fn default() -> Self {
        Self {
            max_percent: 1.0,
            travel_weight: DEFAULT_TRAVEL_WEIGHT,
        }
    }
}
