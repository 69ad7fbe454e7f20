//! Racing writers on a single pickup point.

use futures::future::join_all;

use pvz_core::{
    MemoryStore, PickupPointRegistry, ProductLedger, PvzError, ReceptionManager, Store,
};

const WRITERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_open_yields_one_session() {
    let store = MemoryStore::new();
    let pvz = PickupPointRegistry::new(&store)
        .create_pickup_point("Moscow")
        .await
        .expect("failed to create pickup point")
        .id;

    let handles = (0..WRITERS).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { ReceptionManager::new(&store).open_session(pvz).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let opened = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(opened, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, PvzError::SessionAlreadyOpen))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_and_deletes_stay_consistent() {
    let store = MemoryStore::new();
    let pvz = PickupPointRegistry::new(&store)
        .create_pickup_point("Kazan")
        .await
        .expect("failed to create pickup point")
        .id;
    let reception = ReceptionManager::new(&store)
        .open_session(pvz)
        .await
        .expect("open failed");

    let adds = (0..WRITERS).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { ProductLedger::new(&store).add_product(pvz, "обувь").await })
    });
    for joined in join_all(adds).await {
        joined.expect("task panicked").expect("add failed");
    }

    let half = WRITERS / 2;
    let deletes = (0..half).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { ProductLedger::new(&store).delete_last_product(pvz).await })
    });
    for joined in join_all(deletes).await {
        joined.expect("task panicked").expect("delete failed");
    }

    let remaining = store
        .products_of(reception.id)
        .await
        .expect("failed to read products");
    assert_eq!(remaining.len(), WRITERS - half);
}
