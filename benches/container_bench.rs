//! Resolution throughput of the service container.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flux::errors::ContainerError;
use flux::{Injectable, Resolution, ServiceCollection};
use futures::future;
use std::sync::Arc;
use tokio::runtime::Runtime;

struct Settings {
    timeout: u64,
}

struct Repository {
    settings: Arc<Settings>,
}

impl Injectable for Repository {
    fn inject(resolution: &Resolution<'_>) -> Result<Self, ContainerError> {
        Ok(Repository {
            settings: resolution.require::<Settings>()?,
        })
    }
}

struct Handler {
    repository: Arc<Repository>,
}

impl Injectable for Handler {
    fn inject(resolution: &Resolution<'_>) -> Result<Self, ContainerError> {
        Ok(Handler {
            repository: resolution.require::<Repository>()?,
        })
    }
}

fn services() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .add_instance(Arc::new(Settings { timeout: 30 }))
        .add_singleton::<Repository, Repository>()
        .add_singleton::<Handler, Handler>();
    services
}

fn bench_first_resolution(c: &mut Criterion) {
    c.bench_function("first_resolution_with_dependencies", |b| {
        b.iter(|| {
            let provider = services().build();
            let handler = provider.require::<Handler>().unwrap();
            black_box(handler.repository.settings.timeout)
        });
    });
}

fn bench_cached_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_resolution");

    group.bench_function("instance", |b| {
        let provider = services().build();
        b.iter(|| black_box(provider.get::<Settings>().unwrap().timeout));
    });

    group.bench_function("singleton", |b| {
        let provider = services().build();
        provider.require::<Handler>().unwrap();
        b.iter(|| black_box(provider.get::<Handler>().unwrap().repository.settings.timeout));
    });

    group.finish();
}

fn bench_concurrent_resolution(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let mut group = c.benchmark_group("concurrent_resolution");

    for tasks in [10, 50, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(tasks), tasks, |b, &tasks| {
            b.iter(|| {
                runtime.block_on(async {
                    let provider = Arc::new(services().build());
                    let handles: Vec<_> = (0..tasks)
                        .map(|_| {
                            let provider = provider.clone();
                            tokio::spawn(async move { provider.get::<Handler>().unwrap().repository.settings.timeout })
                        })
                        .collect();

                    let sum: u64 = future::join_all(handles).await.into_iter().map(|r| r.unwrap()).sum();
                    black_box(sum)
                })
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_first_resolution,
    bench_cached_resolution,
    bench_concurrent_resolution
);
criterion_main!(benches);
