//! End-to-end tests for canonical tables and profile resampling

mod common;

use common::utf16_cast;
use korexo_profile::{
    CustomMapping, KorexoError, ResampleOptions, map_columns, map_columns_with, parse, resample,
};
use polars::prelude::*;
use std::collections::HashMap;

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn assert_close(actual: Option<f64>, expected: Option<f64>) {
    match (actual, expected) {
        (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "{} != {}", a, e),
        (a, e) => assert_eq!(a, e),
    }
}

#[test]
fn test_map_columns_on_parsed_cast() {
    let file = utf16_cast();
    let record = parse(file.path()).unwrap();
    let table = map_columns(&record.datasets).unwrap();

    let names: Vec<&str> = table.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(
        names,
        [
            "datetime",
            "date",
            "time",
            "time_sec",
            "site",
            "cond",
            "water_depth",
            "temp",
            "ph",
            "NA"
        ]
    );
    assert_eq!(table.height(), 5);
    assert!(matches!(
        table.column("datetime").unwrap().dtype(),
        DataType::Datetime(_, _)
    ));
}

#[test]
fn test_custom_mapping() {
    let file = utf16_cast();
    let record = parse(file.path()).unwrap();

    let names: HashMap<String, String> = [
        ("Date (MM/DD/YYYY)", "date"),
        ("Time (HH:mm:ss)", "time"),
        ("Depth m", "depth"),
        ("Temp °C", "temperature"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let mapping = CustomMapping::new(names).with_fallback("other");
    let table = map_columns_with(&record.datasets, &mapping).unwrap();

    let names: Vec<&str> = table.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, ["datetime", "date", "time", "other", "depth", "temperature"]);
}

#[test]
fn test_resample_cast_on_depth() {
    let file = utf16_cast();
    let record = parse(file.path()).unwrap();
    let table = map_columns(&record.datasets).unwrap();

    let profile = resample(&table, "water_depth", &ResampleOptions::new(0.5, 5)).unwrap();

    let names: Vec<&str> = profile.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names[0], "water_depth");
    for dropped in ["datetime", "date", "time", "site"] {
        assert!(!names.contains(&dropped), "{} should be dropped", dropped);
    }

    assert_eq!(
        floats(&profile, "water_depth"),
        [Some(0.0), Some(0.5), Some(1.0), Some(1.5), Some(2.0), Some(2.5)]
    );

    // the two readings at 1.0 m are averaged
    let expected = [None, Some(13.1), Some(12.9), Some(12.7), Some(12.6), None];
    for (actual, expected) in floats(&profile, "temp").into_iter().zip(expected) {
        assert_close(actual, expected);
    }

    let turbidity = floats(&profile, "NA");
    assert_close(turbidity[2], Some(1.3));
}

#[test]
fn test_resample_recovers_lattice_values() {
    // depths already on the 0.05 lattice, value = depth squared
    let depths: Vec<f64> = (10..=40).map(|i| i as f64 / 20.0).collect();
    let values: Vec<f64> = depths.iter().map(|d| d * d).collect();
    let df = df!("water_depth" => &depths, "value" => &values).unwrap();

    let profile = resample(&df, "water_depth", &ResampleOptions::default()).unwrap();
    let grid = floats(&profile, "water_depth");
    let resampled = floats(&profile, "value");

    for pair in grid.windows(2) {
        let gap = pair[1].unwrap() - pair[0].unwrap();
        assert!((gap - 0.05).abs() < 1e-9, "uneven spacing {}", gap);
    }

    for (g, v) in grid.iter().zip(&resampled) {
        let g = g.unwrap();
        if g > 0.5 + 1e-9 && g < 2.0 - 1e-9 {
            let v = v.expect("grid point inside the observed range");
            assert!((v - g * g).abs() < 1e-6, "at {}: {} vs {}", g, v, g * g);
        } else if g < 0.5 - 1e-9 || g > 2.0 + 1e-9 {
            assert!(v.is_none(), "at {}: expected null", g);
        }
    }
}

#[test]
fn test_resample_rejects_unknown_index() {
    let file = utf16_cast();
    let record = parse(file.path()).unwrap();
    let table = map_columns(&record.datasets).unwrap();

    match resample(&table, "vert_pos", &ResampleOptions::default()) {
        Err(KorexoError::MissingColumn { name }) => assert_eq!(name, "vert_pos"),
        other => panic!("Expected missing column, got {:?}", other.is_ok()),
    }
}

#[test]
fn test_resample_rejects_text_index() {
    let file = utf16_cast();
    let record = parse(file.path()).unwrap();
    let table = map_columns(&record.datasets).unwrap();

    let result = resample(&table, "site", &ResampleOptions::default());
    assert!(matches!(result, Err(KorexoError::InvalidResample { .. })));
}
