use async_trait::async_trait;
use chrono::{Duration, Timelike};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nldas2::{ForcingDataError, ForcingFetcher, LonLat, Nldas, ServiceRequest};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Serves service-shaped bodies without touching the network, so the
/// benchmarks measure partitioning, parsing, and reassembly only.
struct SyntheticService;

#[async_trait]
impl ForcingFetcher for SyntheticService {
    async fn retrieve_text(
        &self,
        requests: &[ServiceRequest],
    ) -> Result<Vec<String>, ForcingDataError> {
        Ok(requests.iter().map(body_for).collect())
    }

    async fn retrieve_binary(&self, _url: &str) -> Result<Vec<u8>, ForcingDataError> {
        Ok(Vec::new())
    }
}

fn body_for(request: &ServiceRequest) -> String {
    let mut body: String = (0..39).map(|i| format!("metadata line {i}\n")).collect();
    body.push_str("Date&Time Data\n");
    let mut stamp = request.start;
    while stamp <= request.end {
        body.push_str(&format!(
            "{} {:02}Z {:.2}\n",
            stamp.format("%Y-%m-%d"),
            stamp.hour(),
            stamp.hour() as f64
        ));
        stamp += Duration::hours(1);
    }
    body
}

fn bench_point_queries(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let client = Nldas::with_fetcher(Arc::new(SyntheticService));

    c.bench_function("point_month_all_variables", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                client
                    .get_by_coords()
                    .coords(vec![LonLat(-100.0, 40.0), LonLat(-89.6, 35.1)])
                    .start_date("2022-01-01")
                    .end_date("2022-01-31")
                    .call()
                    .await
                    .unwrap(),
            )
        })
    });

    c.bench_function("point_year_one_variable_as_grid", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                client
                    .get_by_coords()
                    .coords(vec![LonLat(-100.0, 40.0)])
                    .start_date("2022-01-01")
                    .end_date("2022-12-31")
                    .variables(vec!["temp".to_string()])
                    .as_grid(true)
                    .call()
                    .await
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_point_queries);
criterion_main!(benches);
