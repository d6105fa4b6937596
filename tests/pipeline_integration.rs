use std::fs;
use std::path::Path;
use traveller::charts::TrendPlotter;
use traveller::data::{DataLoader, Month, MonthlyTrendAnalyzer, TrendAggregate};
use traveller::stats::StatsCalculator;
use traveller::store::{self, ArrivalStore};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const ARRIVALS_2019: &str = "\
Country,January,February,March,April,May,June,July,August,September,October,November,December,Total
Sri Lanka,\"1,000\",N/A,\"12,345\",1,1,1,1,1,1,1,1,1,12000
India,500,600,700,800,900,N/A,1000,1100,1200,1300,1400,1500,11000
,1,1,1,1,1,1,1,1,1,1,1,1,12
India,5,5,5,5,5,5,5,5,5,5,5,5,60
";

fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn analyze(path: &Path, year: i32) -> TrendAggregate {
    let mut loader = DataLoader::new(path);
    assert!(loader.load_data());
    let df = loader.get_data().cloned().unwrap();
    MonthlyTrendAnalyzer::new(df).analyze_trend(year).unwrap()
}

// ---------------------------------------------------------------------------
// Analysis pipeline
// ---------------------------------------------------------------------------

#[test]
fn csv_to_trend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "all_country_arrivals_2019.csv", ARRIVALS_2019);

    let trend = analyze(&path, 2019);

    // two countries, twelve months each; blank-country row dropped
    assert_eq!(trend.len(), 24);
    assert_eq!(trend.countries(), vec!["India", "Sri Lanka"]);

    assert_eq!(trend.arrivals_for(2019, Month::January, "Sri Lanka"), Some(1000.0));
    assert_eq!(trend.arrivals_for(2019, Month::February, "Sri Lanka"), Some(0.0));
    assert_eq!(trend.arrivals_for(2019, Month::March, "Sri Lanka"), Some(12345.0));

    // duplicate India rows summed; N/A counted as zero
    assert_eq!(trend.arrivals_for(2019, Month::January, "India"), Some(505.0));
    assert_eq!(trend.arrivals_for(2019, Month::June, "India"), Some(5.0));

    for row in trend.rows() {
        assert!(Month::ALL.contains(&row.month));
        assert!(row.arrivals >= 0.0);
        assert!(!row.country.trim().is_empty());
        assert_eq!(row.year, 2019);
    }

    let df = trend.to_dataframe().unwrap();
    let months = df.column("Month").unwrap().str().unwrap().clone();
    assert!(months.into_iter().all(|m| m != Some("Total")));
}

#[test]
fn unreadable_file_yields_no_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = DataLoader::new(dir.path().join("all_country_arrivals_1999.csv"));
    assert!(!loader.load_data());
    assert!(loader.get_data().is_none());
}

#[test]
fn summary_and_chart_series_follow_the_trend() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "arrivals.csv", ARRIVALS_2019);
    let trend = analyze(&path, 2019);

    let summaries = StatsCalculator::summarize(&trend);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].country, "Sri Lanka");
    assert_eq!(summaries[0].peak_month, Month::March);

    let facets = TrendPlotter::series_by_year(&trend);
    let series = &facets[&2019];
    assert_eq!(series.len(), 2);
    let months: Vec<Month> = series[1].points.iter().map(|(m, _)| *m).collect();
    assert_eq!(months, Month::ALL.to_vec());
}

// ---------------------------------------------------------------------------
// Store round trip
// ---------------------------------------------------------------------------

#[test]
fn import_then_query_views() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "arrivals.csv", ARRIVALS_2019);
    let store_path = dir.path().join("store.json");
    let trend = analyze(&csv, 2019);

    let mut store = ArrivalStore::open(&store_path).unwrap();
    let report = store::import_aggregate(&mut store, &trend).unwrap();
    assert_eq!(report.inserted, 24);
    store.save().unwrap();

    let store = ArrivalStore::open(&store_path).unwrap();
    assert_eq!(store.count(Some(2019)), 24);

    let chart = store::country_arrivals(&store, "Sri Lanka");
    assert_eq!(chart.labels.len(), 12);
    assert_eq!(chart.labels[0], "January 2019");
    assert_eq!(chart.data[0], 1000);
    assert_eq!(chart.data[2], 12345);

    let page = store::arrivals_paginated(&store, 10, Some("3"));
    assert_eq!(page.num_pages, 3);
    assert_eq!(page.items.len(), 4);
    assert!(!page.has_next());

    let json = serde_json::to_value(store::all_arrivals(&store)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 24);
    assert_eq!(json[0]["country_id"], "INDIA");
    assert_eq!(json[0]["month"], "January");
}

#[test]
fn delete_year_then_reimport() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "arrivals.csv", ARRIVALS_2019);
    let trend = analyze(&csv, 2019);

    let mut store = ArrivalStore::in_memory();
    store::import_aggregate(&mut store, &trend).unwrap();

    let again = store::import_aggregate(&mut store, &trend).unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.skipped_duplicates, 24);

    let deleted = store.delete_stats(Some(2019));
    assert_eq!(deleted.stats, 24);
    assert_eq!(deleted.timeframes, 12);
    assert_eq!(store.count(None), 0);

    let report = store::import_aggregate(&mut store, &trend).unwrap();
    assert_eq!(report.inserted, 24);
}
