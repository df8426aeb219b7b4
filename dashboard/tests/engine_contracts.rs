mod support;

use std::collections::HashMap;
use std::sync::Arc;

use common::Error;
use dashboard::services::DashboardService;

use support::{MockGateway, date, test_settings};

/// Fixture: five canonical countries at 2020-05-10 with 2020-05-09 as the
/// reference date.
fn populated_gateway() -> MockGateway {
    let mut gateway = MockGateway::new("_5_10_20");
    gateway.snapshots = HashMap::from([
        (
            "confirmed_cases",
            vec![
                ("us", 100_000, 90_000),
                ("italy", 50_000, 48_000),
                ("spain", 40_000, 39_000),
                ("germany", 30_000, 29_500),
                ("south_korea", 10_000, 9_900),
            ],
        ),
        (
            "recovered_cases",
            vec![
                ("us", 20_000, 18_000),
                ("italy", 15_000, 14_000),
                ("spain", 12_000, 11_500),
                ("germany", 20_000, 19_000),
                ("south_korea", 8_000, 7_900),
            ],
        ),
        (
            "deaths",
            vec![
                ("us", 5_000, 4_500),
                ("italy", 6_000, 5_800),
                ("spain", 4_000, 3_900),
                ("germany", 1_000, 950),
                ("south_korea", 200, 190),
            ],
        ),
    ]);

    // Ten days of per-country values, 2020-05-01 through 2020-05-10.
    let confirmed: HashMap<&str, Vec<i64>> = HashMap::from([
        ("us", vec![0, 0, 10, 50, 200, 900, 4_000, 20_000, 60_000, 100_000]),
        ("south_korea", vec![0, 1, 2, 10, 100, 1_000, 3_000, 6_000, 9_000, 10_000]),
    ]);
    let recovered: HashMap<&str, Vec<i64>> = HashMap::from([
        ("us", vec![0, 0, 0, 0, 10, 100, 500, 4_000, 12_000, 20_000]),
        ("south_korea", vec![0, 0, 0, 1, 10, 200, 1_000, 4_000, 7_000, 8_000]),
    ]);
    let deaths: HashMap<&str, Vec<i64>> = HashMap::from([
        ("us", vec![0, 0, 0, 1, 5, 30, 200, 1_000, 3_000, 5_000]),
        ("south_korea", vec![0, 0, 0, 0, 1, 5, 30, 80, 150, 200]),
    ]);
    gateway.series = HashMap::from([
        ("confirmed_cases", confirmed),
        ("recovered_cases", recovered),
        ("deaths", deaths),
    ]);
    gateway
}

async fn service_with(gateway: Arc<MockGateway>) -> DashboardService {
    DashboardService::with_gateway(&test_settings(date(2020, 5, 1)), gateway, date(2020, 5, 10))
        .await
        .unwrap()
}

#[tokio::test]
async fn overview_rejects_out_of_range_limit_without_querying() {
    let gateway = Arc::new(populated_gateway());
    let service = service_with(Arc::clone(&gateway)).await;
    let after_startup = gateway.query_count();

    for limit in [0, 1, 21, 25] {
        match service.overview(limit).await {
            Err(Error::InvalidInput(_)) => {}
            other => panic!("limit {limit}: expected InvalidInput, got {other:?}"),
        }
    }
    assert_eq!(gateway.query_count(), after_startup);
}

#[tokio::test]
async fn overview_ranks_by_confirmed_and_truncates() {
    let service = service_with(Arc::new(populated_gateway())).await;

    let rows = service.overview(3).await.unwrap();
    let countries: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(countries, vec!["us", "italy", "spain"]);

    let full = service.overview(20).await.unwrap();
    assert_eq!(full.len(), 5);
    assert!(
        full.windows(2)
            .all(|w| w[0].current.confirmed_cases >= w[1].current.confirmed_cases)
    );
}

#[tokio::test]
async fn active_cases_are_derived_on_every_row() {
    let service = service_with(Arc::new(populated_gateway())).await;

    for row in service.overview(20).await.unwrap() {
        for counts in [&row.current, &row.reference] {
            assert_eq!(
                counts.active_cases,
                counts.confirmed_cases - counts.deaths - counts.recovered_cases,
                "row for {}",
                row.country
            );
        }
    }
}

#[tokio::test]
async fn global_totals_orders_reference_before_current() {
    let service = service_with(Arc::new(populated_gateway())).await;

    let totals = service.global_totals().await.unwrap();
    assert_eq!(totals.rows.len(), 2);
    assert_eq!(totals.rows[0].date, date(2020, 5, 9));
    assert_eq!(totals.rows[1].date, date(2020, 5, 10));
    assert_eq!(totals.reference().unwrap().date, totals.rows[0].date);

    let current = totals.current().unwrap().totals;
    assert_eq!(current.confirmed_cases, 230_000);
    assert_eq!(current.recovered_cases, 75_000);
    assert_eq!(current.deaths, 16_200);
    assert_eq!(
        current.active_cases,
        current.confirmed_cases - current.deaths - current.recovered_cases
    );
}

#[tokio::test]
async fn country_overview_accepts_raw_alias_spellings() {
    let service = service_with(Arc::new(populated_gateway())).await;

    let canonical = service.country_overview("south_korea").await.unwrap();
    let raw = service.country_overview("Korea, South").await.unwrap();
    let shouty = service.country_overview("SOUTH KOREA").await.unwrap();
    assert_eq!(canonical, raw);
    assert_eq!(canonical, shouty);
    assert_eq!(canonical.current.confirmed_cases, 10_000);
}

#[tokio::test]
async fn unknown_country_overview_is_not_found() {
    let service = service_with(Arc::new(populated_gateway())).await;

    match service.country_overview("Atlantis").await {
        Err(Error::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn query_failure_degrades_to_empty_results() {
    let mut gateway = populated_gateway();
    gateway.fail_data = true;
    let service = service_with(Arc::new(gateway)).await;

    assert!(service.overview(10).await.unwrap().is_empty());
    assert!(service.global_totals().await.unwrap().rows.is_empty());
    match service.country_overview("us").await {
        Err(Error::NotFound(_)) => {}
        other => panic!("expected NotFound on degraded data, got {other:?}"),
    }
}

#[tokio::test]
async fn repeated_overview_calls_hit_the_cache() {
    let gateway = Arc::new(populated_gateway());
    let service = service_with(Arc::clone(&gateway)).await;

    let first = service.overview(10).await.unwrap();
    let after_first = gateway.query_count();
    let second = service.overview(10).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(gateway.query_count(), after_first);
}

#[tokio::test]
async fn country_series_spans_epoch_through_resolved_date() {
    let service = service_with(Arc::new(populated_gateway())).await;

    let series = service.country_series("us").await.unwrap();
    assert_eq!(series.country, "us");
    assert_eq!(series.points.len(), 10);
    assert_eq!(series.points[0].date, date(2020, 5, 1));
    assert_eq!(series.points[9].date, date(2020, 5, 10));

    // Leading zero entries are retained; trimming is the consumer's job.
    assert_eq!(series.points[0].confirmed_cases, 0);
    assert_eq!(series.points[9].confirmed_cases, 100_000);
    assert_eq!(series.points[9].recovered_cases, 20_000);
    assert_eq!(series.points[9].deaths, 5_000);
}

#[tokio::test]
async fn country_series_accepts_raw_alias_spellings() {
    let service = service_with(Arc::new(populated_gateway())).await;

    let canonical = service.country_series("south_korea").await.unwrap();
    let raw = service.country_series("Korea, South").await.unwrap();
    assert_eq!(canonical, raw);
}

#[tokio::test]
async fn unknown_country_series_is_not_found() {
    let service = service_with(Arc::new(populated_gateway())).await;

    match service.country_series("Atlantis").await {
        Err(Error::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}
