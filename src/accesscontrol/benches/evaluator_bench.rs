/// Benchmarks for the permission evaluation engine
///
/// Measures performance of:
/// - Held scope compilation and matching
/// - Template injection
/// - Tree evaluation against growing permission sets

use accesscontrol::evaluator::{eval_all, eval_any, eval_permission, Evaluator};
use accesscontrol::scope::{combine, matches, parameter, ScopePattern};
use accesscontrol::{PermissionSet, ScopeParams};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn declared_tree() -> Evaluator {
    let scope = combine(["reports", parameter(":reportId").as_str()]);
    eval_any([
        eval_permission("reports:admin", ""),
        eval_all([
            eval_permission("reports:read", scope.clone()),
            eval_permission("reports:write", scope),
        ]),
    ])
}

fn bench_scope_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_matching");

    let test_cases = vec![
        ("exact", "reports:1"),
        ("single_wildcard", "reports:*"),
        ("double_wildcard", "reports:**"),
        ("alternatives", "{reports,dashboards}:id:[0-9]*"),
    ];

    for (name, held) in test_cases {
        group.bench_with_input(BenchmarkId::new("compile", name), &held, |b, &held| {
            b.iter(|| ScopePattern::compile(black_box(held)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("match", name), &held, |b, &held| {
            b.iter(|| matches(black_box(held), black_box("reports:1")).unwrap());
        });
    }

    group.finish();
}

fn bench_injection(c: &mut Criterion) {
    let declared = declared_tree();
    let params = ScopeParams::from([(":reportId".to_string(), "42".to_string())]);

    c.bench_function("inject_tree", |b| {
        b.iter(|| declared.inject(black_box(&params)).unwrap());
    });
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    let params = ScopeParams::from([(":reportId".to_string(), "42".to_string())]);
    let resolved = declared_tree().inject(&params).unwrap();

    for held_count in [1usize, 10, 100] {
        let scopes: Vec<String> = (0..held_count).map(|i| format!("reports:{}", i + 1000)).collect();
        let permissions = PermissionSet::new()
            .with("reports:read", scopes.clone().into_iter().chain(["reports:*".to_string()]))
            .with("reports:write", scopes.into_iter().chain(["reports:42".to_string()]));

        group.bench_with_input(BenchmarkId::from_parameter(held_count), &permissions, |b, permissions| {
            b.iter(|| resolved.check(black_box(permissions)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scope_matching, bench_injection, bench_evaluation);
criterion_main!(benches);
