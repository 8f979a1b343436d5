//! Integration tests for the session: caching, failures, eviction.
//!
//! All loads go through the offline fake source, so these run without network.

use std::sync::Arc;

use cryptolens_core::data::testing::FakeSource;
use cryptolens_core::data::{DataError, MarketSession};
use cryptolens_core::domain::{Currency, FetchParams, SortOrder};

fn coins() -> FakeSource {
    FakeSource::with_coins(&[
        ("Bitcoin", "btc"),
        ("Ethereum", "eth"),
        ("XRP", "xrp"),
        ("Solana", "sol"),
    ])
}

fn params(currency: Currency, page_size: u16) -> FetchParams {
    FetchParams::new(currency, page_size, SortOrder::MarketCapDesc).unwrap()
}

#[test]
fn identical_params_hit_the_cache() {
    let fake = coins();
    let calls = fake.calls();
    let mut session = MarketSession::new(Box::new(fake), 8);

    for currency in [Currency::Usd, Currency::Btc, Currency::Eth] {
        for page_size in [1, 2, 50] {
            let p = params(currency, page_size);
            let first = session.load(&p).unwrap();
            let second = session.load(&p).unwrap();
            assert!(Arc::ptr_eq(&first, &second), "{p} should be served from cache");
        }
    }
    assert_eq!(calls.get(), 9);
    assert_eq!(session.cache_stats().hits, 9);
}

#[test]
fn page_size_truncates_snapshot() {
    let mut session = MarketSession::new(Box::new(coins()), 8);
    let snapshot = session.load(&params(Currency::Usd, 2)).unwrap();
    assert_eq!(snapshot.symbols(), vec!["BTC", "ETH"]);
}

#[test]
fn unauthorized_caches_nothing_and_keeps_prior_snapshots() {
    let fake = coins().fail_when(|p| p.currency == Currency::Btc, 401);
    let calls = fake.calls();
    let mut session = MarketSession::new(Box::new(fake), 8);

    let usd = params(Currency::Usd, 50);
    let before = session.load(&usd).unwrap();

    let btc = params(Currency::Btc, 50);
    match session.load(&btc) {
        Err(DataError::Api { status, .. }) => assert_eq!(status, Some(401)),
        other => panic!("expected 401, got {other:?}"),
    }
    assert!(!session.is_cached(&btc));
    assert_eq!(session.cached_len(), 1);

    // A failed load is retried on the next request rather than remembered.
    assert!(session.load(&btc).is_err());
    assert_eq!(calls.get(), 3);

    let after = session.load(&usd).unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(calls.get(), 3);
}

#[test]
fn long_sessions_stay_bounded() {
    let fake = coins();
    let calls = fake.calls();
    let mut session = MarketSession::new(Box::new(fake), 3);

    for page_size in 1..=20 {
        session.load(&params(Currency::Usd, page_size)).unwrap();
    }
    assert_eq!(session.cached_len(), 3);
    assert_eq!(session.cache_stats().evictions, 17);

    // The most recent three survive; an early one must be refetched.
    session.load(&params(Currency::Usd, 20)).unwrap();
    assert_eq!(calls.get(), 20);
    session.load(&params(Currency::Usd, 1)).unwrap();
    assert_eq!(calls.get(), 21);
}
