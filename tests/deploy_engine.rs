// ABOUTME: Integration tests for the Deploy -> Wire -> Seed pipeline.
// ABOUTME: Runs against the simulated backend with injected failures.

mod support;

use proxyforge::backend::{BackendError, BackendOp, Failure};
use proxyforge::deploy::{
    DeployError, DeployErrorKind, Deploying, Deployment, Phase, SeedSafety, verify_links,
};
use proxyforge::ledger::{AddressLedger, LedgerStore};
use std::time::Duration;
use support::{name, tournament_registry, tournament_seed, wired_backend};

fn fresh() -> Deployment<Deploying> {
    Deployment::<Deploying>::new(tournament_registry(), LedgerStore::in_memory())
        .unwrap()
        .with_seed(tournament_seed())
        .unwrap()
}

fn resumed_from(ledger: AddressLedger) -> Deployment<Deploying> {
    Deployment::<Deploying>::new(tournament_registry(), LedgerStore::from_ledger(ledger))
        .unwrap()
        .with_seed(tournament_seed())
        .unwrap()
}

// =============================================================================
// Full pipeline
// =============================================================================

#[tokio::test]
async fn fresh_deployment_runs_every_phase_in_order() {
    support::init_tracing();
    let backend = wired_backend();

    let deployment = fresh();
    let order: Vec<&str> = deployment.plan().iter().map(|n| n.as_str()).collect();
    assert_eq!(order, ["governance", "fencer", "tournament", "achievementSBT"]);

    let wiring = deployment.deploy_components(&backend).await.unwrap();
    assert_eq!(
        backend.deployments(),
        ["PlatformGovernance", "Fencer", "Tournament", "AchievementSBT"]
    );

    let seeding = wiring.wire(&backend).await.unwrap();
    assert_eq!(seeding.wire_report().len(), 2);
    assert_eq!(seeding.seed_safety(), SeedSafety::Fresh);

    let done = seeding.seed(&backend).await.unwrap();
    let (store, summary) = done.finish();

    assert_eq!(summary.deployed.len(), 4);
    assert!(summary.skipped.is_empty());
    assert!(summary.seeded);
    assert!(store.ledger().is_seeded());
    assert_eq!(store.ledger().len(), 4);

    let seed_methods: Vec<String> = backend
        .sent()
        .into_iter()
        .skip(2)
        .map(|(_, method, _)| method)
        .collect();
    assert_eq!(
        seed_methods,
        [
            "createTournament",
            "addCity",
            "addCountry",
            "addJudge",
            "addClub",
            "addUser",
            "addWeaponRating",
            "registerParticipant",
        ]
    );
}

#[tokio::test]
async fn init_args_carry_dependency_addresses() {
    let backend = wired_backend();
    let wiring = fresh().deploy_components(&backend).await.unwrap();
    let ledger = wiring.ledger();

    let governance = ledger.address(&name("governance")).unwrap();
    let fencer = ledger.address(&name("fencer")).unwrap();

    let tournament_init = backend
        .journal()
        .into_iter()
        .find_map(|op| match op {
            BackendOp::DeployProxy {
                contract,
                init_args,
                ..
            } if contract == "Tournament" => Some(init_args),
            _ => None,
        })
        .unwrap();

    let addresses: Vec<_> = tournament_init.iter().filter_map(|a| a.as_address()).collect();
    assert_eq!(addresses, [governance, fencer]);
}

#[tokio::test]
async fn links_read_back_after_wiring() {
    let backend = wired_backend();
    let done = fresh()
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap()
        .skip_seed();

    let report = verify_links(
        done.registry(),
        done.ledger(),
        &backend,
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    assert_eq!(report.checks.len(), 3);
    assert!(report.all_passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());
}

#[tokio::test]
async fn missing_view_is_reported_not_fatal() {
    let backend = proxyforge::backend::SimulatedBackend::new();
    let done = fresh()
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap()
        .skip_seed();

    let report = verify_links(
        done.registry(),
        done.ledger(),
        &backend,
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    assert_eq!(report.failures().count(), 3);
    assert!(report.checks.iter().all(|c| c.error.is_some()));
}

// =============================================================================
// Idempotence and resume
// =============================================================================

#[tokio::test]
async fn rerun_over_complete_ledger_deploys_nothing() {
    let backend = wired_backend();
    let (store, _) = fresh()
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap()
        .seed(&backend)
        .await
        .unwrap()
        .finish();
    let first = store.into_ledger();

    let seeding = resumed_from(first.clone())
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();

    assert!(seeding.summary().deployed.is_empty());
    assert_eq!(seeding.summary().skipped.len(), 4);
    assert_eq!(backend.deployments().len(), 4);
    assert_eq!(backend.proxy_count(), 4);
    assert_eq!(seeding.seed_safety(), SeedSafety::AlreadySeeded);

    let (seeding, err) = seeding.seed(&backend).await.unwrap_err();
    assert!(matches!(err, DeployError::SeedNotSafe(_)));

    for (component, entry) in first.iter() {
        assert_eq!(seeding.ledger().address(component), Some(entry.address));
    }
}

#[tokio::test]
async fn failed_deploy_keeps_prefix_and_resumes() {
    support::init_tracing();
    let backend = wired_backend();
    backend.fail_deploy("Tournament", Failure::Transport);

    let (failed, err) = fresh().deploy_components(&backend).await.unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::Transport);
    assert!(matches!(err, DeployError::Call { phase: Phase::Deploy, .. }));

    let partial = failed.ledger().clone();
    assert_eq!(partial.len(), 2);
    assert!(partial.contains(&name("governance")));
    assert!(partial.contains(&name("fencer")));

    let seeding = resumed_from(partial.clone())
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();

    let summary = seeding.summary();
    assert_eq!(summary.skipped, [name("governance"), name("fencer")]);
    assert_eq!(summary.deployed, [name("tournament"), name("achievementSBT")]);
    assert_eq!(backend.deployments().len(), 4);
    assert_eq!(
        seeding.ledger().address(&name("governance")),
        partial.address(&name("governance"))
    );
    assert_eq!(seeding.seed_safety(), SeedSafety::Resumed);
}

#[tokio::test]
async fn seeding_is_refused_after_resume() {
    let backend = wired_backend();
    backend.fail_deploy("AchievementSBT", Failure::Rejected);
    let (failed, _) = fresh().deploy_components(&backend).await.unwrap_err();

    let seeding = resumed_from(failed.ledger().clone())
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();

    let (seeding, err) = seeding.seed(&backend).await.unwrap_err();
    assert!(matches!(err, DeployError::SeedNotSafe(_)));
    assert!(err.to_string().contains("--skip-seed"));

    let before = backend.sent().len();
    let (_, summary) = seeding.skip_seed().finish();
    assert!(!summary.seeded);
    assert_eq!(backend.sent().len(), before);
}

#[tokio::test]
async fn unresolvable_env_argument_stops_before_any_call() {
    use proxyforge::plan::{ArgSpec, ComponentSpec, Registry};

    let arg: ArgSpec = serde_yaml::from_str("env: PROXYFORGE_TEST_NEVER_SET_ADMIN").unwrap();
    let registry = Registry::new(vec![ComponentSpec::new(name("governance")).with_init_arg(arg)])
        .unwrap();
    let backend = wired_backend();

    let (failed, err) = Deployment::<Deploying>::new(registry, LedgerStore::in_memory())
        .unwrap()
        .deploy_components(&backend)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::Configuration);
    assert!(failed.ledger().is_empty());
    assert!(backend.journal().is_empty());
}

// =============================================================================
// Failures inside Wire and Seed
// =============================================================================

#[tokio::test]
async fn hung_link_call_times_out() {
    let backend = wired_backend();
    backend.fail_send("initAddress", Failure::Hang);

    let wiring = fresh()
        .with_call_timeout(Duration::from_millis(50))
        .deploy_components(&backend)
        .await
        .unwrap();

    let (wiring, err) = wiring.wire(&backend).await.unwrap_err();
    assert!(matches!(
        err,
        DeployError::Call {
            phase: Phase::Wire,
            source: BackendError::Timeout(_),
            ..
        }
    ));
    assert_eq!(wiring.ledger().len(), 4);

    // Links are safe to re-issue once the gateway answers again.
    assert!(wiring.wire(&backend).await.is_ok());
}

#[tokio::test]
async fn rejected_payload_is_a_schema_mismatch() {
    let backend = wired_backend();
    backend.fail_send("createTournament", Failure::Rejected);

    let seeding = fresh()
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();

    let (seeding, err) = seeding.seed(&backend).await.unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::SchemaMismatch);
    assert!(!seeding.ledger().is_seeded());
}

#[tokio::test]
async fn rejected_plain_seed_call_is_a_call_failure() {
    let backend = wired_backend();
    backend.fail_send("addCity", Failure::Rejected);

    let seeding = fresh()
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();

    let (_, err) = seeding.seed(&backend).await.unwrap_err();
    assert!(matches!(err, DeployError::Call { phase: Phase::Seed, .. }));
}

#[tokio::test]
async fn partially_failed_seed_is_never_retried() {
    let backend = wired_backend();
    backend.fail_send("addCity", Failure::Transport);

    let seeding = fresh()
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();

    let (seeding, err) = seeding.seed(&backend).await.unwrap_err();
    assert!(matches!(err, DeployError::Call { phase: Phase::Seed, .. }));
    assert_eq!(seeding.seed_safety(), SeedSafety::Interrupted);
    assert!(seeding.ledger().seed_interrupted());

    let (seeding, err) = seeding.seed(&backend).await.unwrap_err();
    assert!(matches!(err, DeployError::SeedNotSafe(_)));

    let created = |b: &proxyforge::backend::SimulatedBackend| {
        b.sent()
            .iter()
            .filter(|(_, method, _)| method == "createTournament")
            .count()
    };
    assert_eq!(created(&backend), 1);

    // A later run over the same ledger refuses as well.
    let rerun = resumed_from(seeding.ledger().clone())
        .deploy_components(&backend)
        .await
        .unwrap()
        .wire(&backend)
        .await
        .unwrap();
    assert_eq!(rerun.seed_safety(), SeedSafety::Interrupted);
    let (_, err) = rerun.seed(&backend).await.unwrap_err();
    assert!(matches!(err, DeployError::SeedNotSafe(_)));
    assert_eq!(created(&backend), 1);
}

#[tokio::test]
async fn identical_runs_produce_identical_addresses_and_links() {
    let a = wired_backend();
    let b = wired_backend();

    let run_a = fresh()
        .deploy_components(&a)
        .await
        .unwrap()
        .wire(&a)
        .await
        .unwrap();
    let run_b = fresh()
        .deploy_components(&b)
        .await
        .unwrap()
        .wire(&b)
        .await
        .unwrap();

    assert_eq!(run_a.wire_report().signature(), run_b.wire_report().signature());
    for (component, entry) in run_a.ledger().iter() {
        assert_eq!(run_b.ledger().address(component), Some(entry.address));
    }
}
