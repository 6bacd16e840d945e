//! Restart rehydration: the document store is the source of truth.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Harness, DEFENSE, PLAINTIFF};
    use gavel_casemanager::ports::CourtApi;
    use gavel_casemanager::{CaseStage, MotionKind};
    use gavel_warden::WardenApi;
    use shared_types::ports::DocumentStore;
    use shared_types::UserId;

    /// A case filed before "restart" comes back with its full state: stage,
    /// jury, queued motions, and vote tallies.
    #[tokio::test]
    async fn test_case_survives_restart() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        let jurors = fx.seat_jury(&case_id).await;
        fx.court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::Statement { text: "s".into() },
            )
            .await
            .unwrap();
        fx.court().cast_vote(&case_id, jurors[0], true).await.unwrap();

        // Same store, fresh process.
        let restarted = Harness::with_store(fx.store.clone(), fx.blobs.clone());
        restarted.stack.hydrate().await;

        let snapshot = restarted.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.stage, CaseStage::Argumentation);
        assert_eq!(snapshot.jury_pool.len(), 5);
        assert_eq!(snapshot.motion_queue.len(), 1);
        assert_eq!(snapshot.motion_queue[0].votes.yes.len(), 1);
        assert_eq!(snapshot.plaintiff, PLAINTIFF);
        assert_eq!(snapshot.defense, DEFENSE);
    }

    /// An unreadable document is skipped with a log line; the rest of the
    /// registry still loads.
    #[tokio::test]
    async fn test_partial_load_skips_bad_documents() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        fx.store
            .save("cases", "corrupt", serde_json::json!({ "stage": "not a number" }))
            .await
            .unwrap();

        let restarted = Harness::with_store(fx.store.clone(), fx.blobs.clone());
        assert_eq!(restarted.court().hydrate().await, 1);
        assert!(restarted.court().case_snapshot(&case_id).await.is_ok());
    }

    /// Warden bookings survive restart without re-running role mutations.
    #[tokio::test]
    async fn test_prisoner_survives_restart() {
        let fx = Harness::new();
        let target = UserId(10);
        fx.warden()
            .new_warrant(target, "case", "sentence", UserId(1), 600)
            .await
            .unwrap();
        fx.warden().tick(target).await.unwrap();
        let before = fx.warden().prisoner_snapshot(target).await.unwrap();

        let restarted = Harness::with_store(fx.store.clone(), fx.blobs.clone());
        restarted.stack.hydrate().await;

        let after = restarted.warden().prisoner_snapshot(target).await.unwrap();
        assert_eq!(after, before);
        assert!(after.booked);
        assert_eq!(after.warrants[0].expires, before.warrants[0].expires);
    }
}
