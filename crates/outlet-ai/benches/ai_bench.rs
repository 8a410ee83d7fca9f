use criterion::{black_box, criterion_group, criterion_main, Criterion};
use outlet_ai::{DemandCoefficients, LinearDemandModel, RatioStaffingModel};
use outlet_core::{
    DemandFeatures, DemandModel, Role, SalaryTable, ScenarioConfig, StaffPosition,
    StaffingConstraints, StaffingFeatures, StaffingModel,
};
use outlet_econ::{optimize_staffing_with_model, OptimizationTarget};

fn scenario() -> ScenarioConfig {
    let salaries = SalaryTable::default();
    let mut s = ScenarioConfig::named("bench", "Bench Outlet");
    s.foh_positions = [Role::Waiter, Role::Runner, Role::Host, Role::Cashier, Role::Manager]
        .into_iter()
        .map(|r| StaffPosition::for_role(r, salaries.salary(r), 2))
        .collect();
    s.boh_positions = [Role::Chef, Role::SousChef, Role::LineCook, Role::PrepCook]
        .into_iter()
        .map(|r| StaffPosition::for_role(r, salaries.salary(r), 2))
        .collect();
    s
}

fn bench_models(c: &mut Criterion) {
    let demand = LinearDemandModel::new(DemandCoefficients {
        intercept: 200.0,
        weekend: 80.0,
        temperature: -1.5,
        ..DemandCoefficients::default()
    });
    let features = DemandFeatures {
        is_weekend: true,
        temperature: 28.0,
        ..DemandFeatures::default()
    };
    c.bench_function("linear demand predict", |b| {
        b.iter(|| black_box(demand.predict(black_box(&features))))
    });

    let staffing = RatioStaffingModel::default();
    let constraints = StaffingConstraints {
        max_total_staff: Some(20),
        ..StaffingConstraints::default()
    };
    c.bench_function("ratio staffing optimize", |b| {
        b.iter(|| {
            black_box(staffing.optimize(black_box(&StaffingFeatures::default()), &constraints))
        })
    });

    let s = scenario();
    c.bench_function("optimizer with ratio model", |b| {
        b.iter(|| {
            black_box(optimize_staffing_with_model(
                &s,
                OptimizationTarget::Efficiency,
                &constraints,
                &staffing,
            ))
        })
    });
}

criterion_group!(benches, bench_models);
criterion_main!(benches);
