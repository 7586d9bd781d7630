mod common;

use modsync_core::config::{ModDescriptor, ModList};
use modsync_core::reconcile::{ModOutcome, Reconciler, RetryPolicy};

use common::{Behaviour, StubChangelog, StubFetcher, TestEnv, changelog_page, unix_now};

fn policy() -> RetryPolicy {
    RetryPolicy::default().without_delay()
}

fn mods(entries: &[(&str, &str)]) -> ModList {
    entries
        .iter()
        .map(|(name, id)| ModDescriptor::new(*name, *id))
        .collect()
}

#[test]
fn missing_mod_is_fetched_and_updated() {
    let env = TestEnv::new();
    let fetcher = StubFetcher::new(&env.layout);
    let changelog = StubChangelog::page(changelog_page(unix_now()));
    let reads = changelog.reads();

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@cba", "450814997")]));

    let entry = report.entry("@cba").expect("entry for @cba");
    assert_eq!(entry.outcome, ModOutcome::Updated);
    assert!(!entry.currently_present);
    assert!(!entry.needs_update);
    assert_eq!(entry.fetch_attempts, 1);
    assert!(report.updated.contains("@cba"));
    assert!(env.content_path("450814997").is_dir());
    // No local directory means no changelog lookup
    assert!(reads.borrow().is_empty());
}

#[test]
fn never_appearing_mod_fails_after_exactly_ten_attempts() {
    let env = TestEnv::new();
    let fetcher = StubFetcher::new(&env.layout).with("463939057", Behaviour::Never);
    let calls = fetcher.calls();
    let changelog = StubChangelog::page(changelog_page(unix_now()));

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@ace", "463939057")]));

    let entry = report.entry("@ace").expect("entry for @ace");
    assert_eq!(entry.outcome, ModOutcome::Failed);
    assert_eq!(entry.fetch_attempts, 10);
    assert_eq!(StubFetcher::attempts_for(&calls, "463939057"), 10);
    assert!(report.nothing_to_do());
}

#[test]
fn existence_after_attempt_is_success_even_if_fetch_reported_errors() {
    let env = TestEnv::new();
    let fetcher = StubFetcher::new(&env.layout).with("450814997", Behaviour::SucceedOnAttempt(3));
    let calls = fetcher.calls();
    let changelog = StubChangelog::page(changelog_page(unix_now()));

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@cba", "450814997")]));

    let entry = report.entry("@cba").expect("entry for @cba");
    assert_eq!(entry.outcome, ModOutcome::Updated);
    assert_eq!(entry.fetch_attempts, 3);
    assert_eq!(StubFetcher::attempts_for(&calls, "450814997"), 3);
}

#[test]
fn one_failing_mod_does_not_block_others() {
    let env = TestEnv::new();
    let fetcher = StubFetcher::new(&env.layout)
        .with("111", Behaviour::Never)
        .with("222", Behaviour::SucceedOnAttempt(1));
    let changelog = StubChangelog::page(changelog_page(unix_now()));

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@broken", "111"), ("@works", "222")]));

    assert_eq!(report.updated.len(), 1);
    assert!(report.updated.contains("@works"));
    assert!(!report.updated.contains("@broken"));
    assert_eq!(report.entries.len(), 2);
    assert_eq!(
        report.entry("@broken").map(|e| e.outcome),
        Some(ModOutcome::Failed)
    );
}

#[test]
fn fresh_mod_is_skipped_without_fetching() {
    let env = TestEnv::new();
    env.install_mod("450814997");
    let fetcher = StubFetcher::new(&env.layout);
    let calls = fetcher.calls();
    // Remote update an hour before the local content appeared
    let changelog = StubChangelog::page(changelog_page(unix_now() - 3600));
    let reads = changelog.reads();

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@cba", "450814997")]));

    let entry = report.entry("@cba").expect("entry for @cba");
    assert_eq!(entry.outcome, ModOutcome::Skipped);
    assert!(entry.currently_present);
    assert_eq!(entry.fetch_attempts, 0);
    assert!(calls.borrow().is_empty());
    assert!(report.nothing_to_do());
    assert_eq!(reads.borrow().as_slice(), ["450814997".to_string()]);
}

#[test]
fn stale_mod_is_removed_then_fetched() {
    let env = TestEnv::new();
    let dir = env.install_mod("450814997");
    common::write_file(&dir.join("leftover.txt"), b"old build");
    let fetcher = StubFetcher::new(&env.layout);
    // Remote update an hour after the local content appeared
    let changelog = StubChangelog::page(changelog_page(unix_now() + 3600));

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@cba", "450814997")]));

    let entry = report.entry("@cba").expect("entry for @cba");
    assert_eq!(entry.outcome, ModOutcome::Updated);
    assert!(entry.currently_present);
    assert!(entry.needs_update);
    assert_eq!(entry.fetch_attempts, 1);
    assert!(!dir.join("leftover.txt").exists());
    assert!(dir.join("Addons").join("Mod_Main.PBO").exists());
}

#[test]
fn unparseable_changelog_keeps_installed_mod() {
    let env = TestEnv::new();
    let dir = env.install_mod("450814997");
    let fetcher = StubFetcher::new(&env.layout);
    let changelog = StubChangelog::page("<html>Steam is down for maintenance</html>");

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy());
    let report = reconciler.reconcile(&mods(&[("@cba", "450814997")]));

    assert_eq!(
        report.entry("@cba").map(|e| e.outcome),
        Some(ModOutcome::Skipped)
    );
    assert!(dir.join("Addons").join("Mod_Main.PBO").exists());
}

#[test]
fn zero_attempt_budget_fails_without_fetching() {
    let env = TestEnv::new();
    let fetcher = StubFetcher::new(&env.layout);
    let calls = fetcher.calls();
    let changelog = StubChangelog::page(changelog_page(unix_now()));
    let policy = RetryPolicy {
        max_attempts: 0,
        ..policy()
    };

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy);
    let report = reconciler.reconcile(&mods(&[("@cba", "450814997")]));

    assert_eq!(
        report.entry("@cba").map(|e| e.outcome),
        Some(ModOutcome::Failed)
    );
    assert!(calls.borrow().is_empty());
}

#[test]
fn pause_falls_only_between_attempts() {
    let env = TestEnv::new();
    let fetcher = StubFetcher::new(&env.layout).with("111", Behaviour::Never);
    let changelog = StubChangelog::unreachable();
    let policy = RetryPolicy {
        max_attempts: 3,
        retry_interval: std::time::Duration::from_millis(50),
    };

    let reconciler = Reconciler::new(&env.layout, &fetcher, &changelog, policy);
    let started = std::time::Instant::now();
    let report = reconciler.reconcile(&mods(&[("@broken", "111")]));
    let elapsed = started.elapsed();

    assert_eq!(
        report.entry("@broken").map(|e| e.fetch_attempts),
        Some(3)
    );
    assert!(elapsed >= policy.retry_interval * 2, "elapsed {elapsed:?}");
    assert!(elapsed < policy.retry_interval * 3, "elapsed {elapsed:?}");
}
