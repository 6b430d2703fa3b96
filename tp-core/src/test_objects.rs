use crate::catalog::Catalog;
use tp_domain::{Commodity, CommodityName, LocationPath, Shop};

/// Offers are `(name, price, stock)`; refresh is irrelevant to planning and set to zero.
pub fn shop(path: &str, buys: &[(&str, f64, f64)], sells: &[(&str, f64, f64)]) -> Shop {
    let to_commodities = |offers: &[(&str, f64, f64)]| {
        offers
            .iter()
            .map(|(name, price, stock)| Commodity {
                name: CommodityName::new(*name),
                price: *price,
                stock: *stock,
                refresh: 0.0,
            })
            .collect()
    };
    Shop {
        path: LocationPath::new(path),
        buys: to_commodities(buys),
        sells: to_commodities(sells),
    }
}

/// `A` sells X at 10 (stock 50), `B` buys X at 15 (stock 50).
pub fn a_to_b_shops() -> Vec<Shop> {
    vec![shop("A", &[], &[("X", 10.0, 50.0)]), shop("B", &[("X", 15.0, 50.0)], &[])]
}

/// Four stations in two Stanton planets and one far away in Pyro.
pub fn stanton_and_pyro_shops() -> Vec<Shop> {
    vec![
        shop("Stanton>Crusader>Port Olisar", &[("Y", 9.0, 40.0)], &[("X", 10.0, 100.0)]),
        shop("Stanton>Crusader>Grim Hex", &[("X", 14.0, 30.0)], &[("Y", 5.0, 60.0)]),
        shop("Stanton>Hurston>Lorville", &[("X", 16.0, 50.0)], &[("Y", 4.0, 50.0)]),
        shop("Stanton>Hurston>Everus", &[("Y", 10.0, 20.0)], &[("X", 11.0, 40.0)]),
        shop("Pyro>Ruin Station>Docks", &[("X", 40.0, 100.0)], &[]),
    ]
}

pub fn two_system_catalog() -> Catalog {
    Catalog::new(stanton_and_pyro_shops())
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-4, "expected {expected}, got {actual}");
}
