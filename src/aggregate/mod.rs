// src/aggregate/mod.rs
pub mod group;
pub mod rank;

use std::collections::BTreeMap;

use crate::dataset::Dataset;
pub use group::{count_by, sort_by_count_desc};
pub use rank::{dense_rank, dense_rank_at_most, Ranked};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCount {
    pub city: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedVehicle {
    pub rank: u32,
    pub vehicle: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleCount {
    pub vehicle: String,
    pub count: u64,
}

/// Registered vehicles per city, most populous first (ties by city name).
pub fn count_cars_by_city(ds: &Dataset) -> Vec<CityCount> {
    let mut pairs: Vec<(String, u64)> = count_by(ds.iter().map(|r| r.city.clone()))
        .into_iter()
        .collect();
    sort_by_count_desc(&mut pairs);
    pairs
        .into_iter()
        .map(|(city, count)| CityCount { city, count })
        .collect()
}

/// Vehicles dense-ranked by registration count, keeping ranks `1..=n`.
///
/// More than `n` rows come back when counts tie.
pub fn top_n_vehicles(ds: &Dataset, n: u32) -> Vec<RankedVehicle> {
    let pairs: Vec<(String, u64)> = count_by(ds.iter().map(|r| r.vehicle()))
        .into_iter()
        .collect();
    dense_rank_at_most(pairs, n)
        .into_iter()
        .map(|r| RankedVehicle {
            rank: r.rank,
            vehicle: r.key,
            count: r.count,
        })
        .collect()
}

/// The most registered vehicle(s) in each postal code. Ties are listed by name.
pub fn most_popular_vehicle_by_postal_code(ds: &Dataset) -> BTreeMap<u32, Vec<VehicleCount>> {
    let counts = count_by(ds.iter().map(|r| (r.postal_code, r.vehicle())));

    let mut per_postal: BTreeMap<u32, Vec<(String, u64)>> = BTreeMap::new();
    for ((postal_code, vehicle), count) in counts {
        per_postal
            .entry(postal_code)
            .or_default()
            .push((vehicle, count));
    }

    per_postal
        .into_iter()
        .map(|(postal_code, pairs)| {
            let top = dense_rank_at_most(pairs, 1)
                .into_iter()
                .map(|r| VehicleCount {
                    vehicle: r.key,
                    count: r.count,
                })
                .collect();
            (postal_code, top)
        })
        .collect()
}

/// Registered vehicles per model year.
pub fn count_cars_by_year(ds: &Dataset) -> BTreeMap<u16, u64> {
    count_by(ds.iter().map(|r| r.model_year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::record;
    use crate::load::tests::sample_dataset;

    fn dataset(rows: &[(&str, u32, &str, &str)]) -> Dataset {
        Dataset::from_records(
            rows.iter()
                .map(|(city, postal, make, model)| record(city, *postal, 2020, make, model))
                .collect(),
        )
    }

    #[test]
    fn city_counts_cover_every_city_once() {
        let ds = sample_dataset();
        let cities = count_cars_by_city(&ds);

        assert_eq!(cities.iter().map(|c| c.count).sum::<u64>(), ds.len() as u64);
        assert_eq!(cities.len(), 8);
        assert_eq!(
            cities[0],
            CityCount {
                city: "Yakima".into(),
                count: 2
            }
        );

        let rest: Vec<&str> = cities[1..].iter().map(|c| c.city.as_str()).collect();
        assert_eq!(
            rest,
            vec![
                "Bothell",
                "Eugene",
                "Everett",
                "Naches",
                "Port Orchard",
                "Poulsbo",
                "San Diego"
            ]
        );
        assert!(cities[1..].iter().all(|c| c.count == 1));
    }

    #[test]
    fn top_three_on_sample() {
        let got: Vec<(u32, String, u64)> = top_n_vehicles(&sample_dataset(), 3)
            .into_iter()
            .map(|r| (r.rank, r.vehicle, r.count))
            .collect();
        let want: Vec<(u32, String, u64)> = vec![
            (1, "TESLA MODEL 3".into(), 3),
            (2, "NISSAN LEAF".into(), 2),
            (3, "BMW X5".into(), 1),
            (3, "MERCEDES-BENZ GLC-CLASS".into(), 1),
            (3, "TESLA MODEL X".into(), 1),
            (3, "VOLVO S60".into(), 1),
        ];
        assert_eq!(got, want);
    }

    #[test]
    fn top_n_uses_dense_rank() {
        // counts [3, 2, 1, 1, 1] for A, B, then C/D/E tied
        let ds = dataset(&[
            ("X", 1, "A", "1"),
            ("X", 1, "A", "1"),
            ("X", 1, "A", "1"),
            ("X", 1, "B", "1"),
            ("X", 1, "B", "1"),
            ("X", 1, "E", "1"),
            ("X", 1, "D", "1"),
            ("X", 1, "C", "1"),
        ]);
        let got: Vec<(u32, String, u64)> = top_n_vehicles(&ds, 3)
            .into_iter()
            .map(|r| (r.rank, r.vehicle, r.count))
            .collect();
        assert_eq!(
            got,
            vec![
                (1, "A 1".into(), 3),
                (2, "B 1".into(), 2),
                (3, "C 1".into(), 1),
                (3, "D 1".into(), 1),
                (3, "E 1".into(), 1),
            ]
        );

        let top1 = top_n_vehicles(&ds, 1);
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].vehicle, "A 1");
        assert!(top_n_vehicles(&ds, 0).is_empty());
    }

    #[test]
    fn most_popular_per_postal_code_on_sample() {
        let got = most_popular_vehicle_by_postal_code(&sample_dataset());
        let flat: Vec<(u32, Vec<(&str, u64)>)> = got
            .iter()
            .map(|(p, v)| (*p, v.iter().map(|c| (c.vehicle.as_str(), c.count)).collect()))
            .collect();
        assert_eq!(
            flat,
            vec![
                (98201, vec![("NISSAN LEAF", 1), ("TESLA MODEL 3", 1)]),
                (98366, vec![("NISSAN LEAF", 1)]),
                (98908, vec![("TESLA MODEL 3", 2)]),
                (98909, vec![("BMW X5", 1), ("TESLA MODEL X", 1)]),
                (98937, vec![("MERCEDES-BENZ GLC-CLASS", 1)]),
            ]
        );
    }

    #[test]
    fn most_popular_lists_ties_alphabetically() {
        let ds = dataset(&[("X", 10, "Y", "Y"), ("X", 10, "X", "X")]);
        let got = most_popular_vehicle_by_postal_code(&ds);
        assert_eq!(
            got[&10],
            vec![
                VehicleCount {
                    vehicle: "X X".into(),
                    count: 1
                },
                VehicleCount {
                    vehicle: "Y Y".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn counts_by_year_on_sample() {
        let got: Vec<(u16, u64)> = count_cars_by_year(&sample_dataset()).into_iter().collect();
        assert_eq!(
            got,
            vec![
                (2013, 1),
                (2015, 1),
                (2017, 1),
                (2018, 1),
                (2019, 3),
                (2020, 1),
                (2021, 1)
            ]
        );
    }

    #[test]
    fn empty_dataset_gives_empty_results() {
        let ds = Dataset::default();
        assert!(count_cars_by_city(&ds).is_empty());
        assert!(top_n_vehicles(&ds, 3).is_empty());
        assert!(most_popular_vehicle_by_postal_code(&ds).is_empty());
        assert!(count_cars_by_year(&ds).is_empty());
    }
}
