pub mod catalog;
pub mod configuration;
pub mod error;
pub mod location_filter;
pub mod market_matrices;
pub mod matrix;
pub mod optimizer;
pub mod planner;
pub mod planning_service;
pub mod symbol_index;
pub mod travel_cost;

#[cfg(test)]
pub mod test_objects;
