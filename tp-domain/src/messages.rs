use crate::{CommodityName, HighLevelPlan, LocationPath, RoutePath, Transaction};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const MATCH_EVERYTHING: &str = ".*";

fn match_everything() -> String {
    MATCH_EVERYTHING.to_string()
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    #[serde(deserialize_with = "whole_number")]
    pub max_range: i64,
    #[serde(deserialize_with = "whole_number")]
    pub max_cargo: i64,
    #[serde(deserialize_with = "whole_number")]
    pub stops: i64,
    #[serde(default)]
    pub max_commodity: HashMap<CommodityName, f64>,
    #[serde(default)]
    pub blk_locations: Vec<LocationPath>,
    #[serde(default)]
    pub restrictions: HashMap<CommodityName, HashMap<LocationPath, f64>>,
    #[serde(default = "match_everything")]
    pub filter: String,
}

impl OptimizeRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_range < 0 {
            return Err(format!("max_range must not be negative, got {}", self.max_range));
        }
        if self.max_cargo < 0 {
            return Err(format!("max_cargo must not be negative, got {}", self.max_cargo));
        }
        if self.stops < 0 {
            return Err(format!("stops must not be negative, got {}", self.stops));
        }
        Ok(())
    }
}

/// Accepts integers, floats (truncated toward zero) and numeric strings, as clients send all three.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(i) => Ok(i),
        Raw::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Raw::Float(f) => Err(serde::de::Error::custom(format!("{f} is not a whole number"))),
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a whole number"))),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionResponse {
    pub location: LocationPath,
    pub commodity: CommodityName,
    pub amount: f64,
}

impl From<&Transaction> for TransactionResponse {
    fn from(t: &Transaction) -> Self {
        Self {
            location: t.location.clone(),
            commodity: t.commodity.clone(),
            amount: t.amount,
        }
    }
}

fn to_responses(transactions: &[Transaction]) -> Vec<TransactionResponse> {
    transactions.iter().map_into().collect_vec()
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub revenue: f64,
    pub cost: f64,
    pub buy_transactions: Vec<TransactionResponse>,
    pub sell_transactions: Vec<TransactionResponse>,
}

impl From<&HighLevelPlan> for PlanResponse {
    fn from(plan: &HighLevelPlan) -> Self {
        Self {
            revenue: plan.revenue,
            cost: plan.cost,
            buy_transactions: to_responses(&plan.buy),
            sell_transactions: to_responses(&plan.sell),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub start_location: LocationPath,
    pub end_location: LocationPath,
    pub buy_transactions: Vec<TransactionResponse>,
    pub sell_transactions: Vec<TransactionResponse>,
}

impl From<&RoutePath> for RouteResponse {
    fn from(route: &RoutePath) -> Self {
        Self {
            start_location: route.start.clone(),
            end_location: route.end.clone(),
            buy_transactions: to_responses(&route.buy),
            sell_transactions: to_responses(&route.sell),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OptimizeResponse {
    pub plan: PlanResponse,
    pub routes: Vec<RouteResponse>,
}

impl OptimizeResponse {
    pub fn new(plan: &HighLevelPlan, routes: &[RoutePath]) -> Self {
        Self {
            plan: plan.into(),
            routes: routes.iter().map_into().collect_vec(),
        }
    }
}

/// Body of `POST /{buy|sell}/stocks`. The per-commodity values are ignored.
pub type StockQuery = HashMap<LocationPath, HashMap<CommodityName, serde_json::Value>>;

pub type StockResponse = BTreeMap<LocationPath, BTreeMap<CommodityName, f64>>;
