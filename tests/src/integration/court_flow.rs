//! Court flows: filing, jury recruitment, motions, verdicts.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Harness, DEFENSE, NEWS_CHANNEL, PLAINTIFF};
    use gavel_casemanager::ports::outbound::Recipient;
    use gavel_casemanager::ports::CourtApi;
    use gavel_casemanager::{CaseStage, EventKind, MotionKind, Penalty, Verdict};
    use gavel_warden::WardenApi;
    use shared_types::TimeSource;
    use shared_types::UserId;

    /// A filed case reaches argumentation automatically once the fifth juror
    /// is seated: the join itself triggers the promoting heartbeat.
    #[tokio::test]
    async fn test_case_promotes_when_fifth_juror_joins() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.stage, CaseStage::JurySelection);

        let jurors = fx.seat_jury(&case_id).await;
        assert!(jurors.len() >= 5);

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.stage, CaseStage::Argumentation);
        // Promotion happened on the join tick, not a manual one.
        assert!(snapshot
            .event_log
            .iter()
            .any(|e| e.kind == EventKind::StageChanged));
    }

    /// Invitations go out 2-3 per tick and never to parties or existing
    /// invitees.
    #[tokio::test]
    async fn test_invitations_respect_bounds_and_eligibility() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;

        fx.court().tick(&case_id).await.unwrap();
        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert!((2..=3).contains(&snapshot.jury_invites.len()));
        assert!(!snapshot.jury_invites.contains(&PLAINTIFF));
        assert!(!snapshot.jury_invites.contains(&DEFENSE));

        fx.court().tick(&case_id).await.unwrap();
        let later = fx.court().case_snapshot(&case_id).await.unwrap();
        assert!(later.jury_invites.len() > snapshot.jury_invites.len());
    }

    /// Scenario B: a rush motion cancels the active vote, passes on a
    /// deadline close, and leaves its target at the head of the queue in
    /// voting.
    #[tokio::test]
    async fn test_rush_flow_reprioritizes_second_statement() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        let jurors = fx.seat_jury(&case_id).await;

        let s1 = fx
            .court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::Statement {
                    text: "opening remarks".into(),
                },
            )
            .await
            .unwrap();
        // Filing triggers the tick that opens voting on the head.
        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.motion_queue[0].id, s1);
        assert!(snapshot.motion_queue[0].expiry.is_some());

        let s2 = fx
            .court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::Statement {
                    text: "closing remarks".into(),
                },
            )
            .await
            .unwrap();

        let rush = fx
            .court()
            .submit_motion(
                &case_id,
                DEFENSE,
                MotionKind::Rush {
                    rushed_motion_id: s2.clone(),
                },
            )
            .await
            .unwrap();

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.motion_queue[0].id, rush);
        let cancelled = snapshot
            .event_log
            .iter()
            .find(|e| e.kind == EventKind::VotingCancelled)
            .expect("first statement's vote should have been cancelled");
        assert!(cancelled.summary.contains("rush"));

        for juror in jurors.iter().take(3) {
            fx.court().cast_vote(&case_id, *juror, true).await.unwrap();
        }
        // Two jurors abstain; the 24h deadline closes the rush at 3 yes / 0 no.
        fx.time.advance(86_401);
        fx.court().tick(&case_id).await.unwrap();

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.motion_queue[0].id, s2);
        assert!(snapshot.motion_queue[0].expiry.is_some());
        assert!(snapshot.motion_queue.iter().any(|m| m.id == s1));
    }

    /// Scenario C: penalty adjustment passes 3-2 and replaces the sanction
    /// set; the guilty close then routes the prison term to the warden.
    #[tokio::test]
    async fn test_adjust_penalty_then_guilty_verdict_imprisons() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        let jurors = fx.seat_jury(&case_id).await;

        fx.court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::AdjustPenalty {
                    new_penalties: vec![Penalty::Prison { len_seconds: 600 }],
                },
            )
            .await
            .unwrap();

        for (i, juror) in jurors.iter().enumerate() {
            fx.court()
                .cast_vote(&case_id, *juror, i < 3)
                .await
                .unwrap();
        }

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(
            snapshot.penalties,
            vec![Penalty::Prison { len_seconds: 600 }]
        );

        fx.court()
            .close_case(&case_id, Verdict::Guilty, "the jury found for the plaintiff")
            .await
            .unwrap();

        let prisoner = fx.warden().prisoner_snapshot(DEFENSE).await.unwrap();
        assert!(prisoner.booked);
        assert_eq!(prisoner.warrants.len(), 1);
        assert_eq!(prisoner.warrants[0].category, "case");
        assert_eq!(
            prisoner.warrants[0].expires,
            Some(fx.time.now() + 600)
        );
        assert_eq!(fx.guild.roles(DEFENSE), vec![crate::fixtures::MUTE_ROLE]);

        // Closed cases disappear from the registry and the store.
        assert!(fx.court().case_snapshot(&case_id).await.is_err());
    }

    /// Scenario E: a motion with no votes fails on deadline (0-0 is a tie,
    /// ties fail).
    #[tokio::test]
    async fn test_unvoted_motion_fails_on_deadline() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        fx.seat_jury(&case_id).await;

        fx.court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::Statement { text: "s".into() },
            )
            .await
            .unwrap();

        fx.time.advance(86_401);
        fx.court().tick(&case_id).await.unwrap();

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert!(snapshot.motion_queue.is_empty());
        let resolved = snapshot
            .event_log
            .iter()
            .find(|e| e.kind == EventKind::MotionResolved)
            .unwrap();
        assert_eq!(resolved.payload["passed"], false);
        assert!(!snapshot
            .event_log
            .iter()
            .any(|e| e.kind == EventKind::StatementIssued));
    }

    /// A batch vote resolving an id that another batch already removed
    /// reports it as not found instead of failing.
    #[tokio::test]
    async fn test_batch_vote_reports_stale_ids() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        let jurors = fx.seat_jury(&case_id).await;

        let m1 = fx
            .court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::Statement { text: "one".into() },
            )
            .await
            .unwrap();
        let b1 = fx
            .court()
            .submit_motion(
                &case_id,
                PLAINTIFF,
                MotionKind::BatchVote {
                    pass: vec![],
                    deny: vec![m1.clone()],
                },
            )
            .await
            .unwrap();
        let b2 = fx
            .court()
            .submit_motion(
                &case_id,
                DEFENSE,
                MotionKind::BatchVote {
                    pass: vec![m1.clone()],
                    deny: vec![],
                },
            )
            .await
            .unwrap();

        // First batch passes: m1 denied and removed.
        for juror in &jurors {
            fx.court().cast_vote(&case_id, *juror, true).await.unwrap();
        }
        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert!(!snapshot.motion_queue.iter().any(|m| m.id == m1 || m.id == b1));

        // Second batch passes: its pass-reference is stale, reported not found.
        for juror in &jurors {
            fx.court().cast_vote(&case_id, *juror, true).await.unwrap();
        }
        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert!(!snapshot.motion_queue.iter().any(|m| m.id == b2));
        let note = snapshot
            .event_log
            .iter()
            .find(|e| {
                e.kind == EventKind::AdministrativeNote
                    && e.payload.get("not_found").is_some()
            })
            .expect("stale batch reference should be reported");
        assert_eq!(note.payload["not_found"][0], serde_json::json!(m1));
    }

    /// Announce fan-out: the news wire gets anonymized lines, and one closed
    /// DM does not stop the other audiences.
    #[tokio::test]
    async fn test_announce_fanout_and_anonymization() {
        let fx = Harness::new();
        fx.notifier.fail_for(Recipient::User(DEFENSE));
        let case_id = fx.file_case().await;

        let wire = fx.notifier.sent_to(Recipient::Channel(NEWS_CHANNEL));
        assert!(!wire.is_empty());
        assert!(wire[0].contains("case"));
        // Internal names never reach the public wire.
        assert!(!wire.iter().any(|line| line.contains("ada")));

        let plaintiff_dms = fx.notifier.sent_to(Recipient::User(PLAINTIFF));
        assert!(!plaintiff_dms.is_empty());
        assert!(fx.notifier.sent_to(Recipient::User(DEFENSE)).is_empty());

        fx.seat_jury(&case_id).await;
        fx.court()
            .submit_personal_statement(&case_id, PLAINTIFF, "I was wronged".into())
            .await
            .unwrap();
        let wire = fx.notifier.sent_to(Recipient::Channel(NEWS_CHANNEL));
        let statement_line = wire
            .iter()
            .find(|l| l.contains("personal statement"))
            .unwrap();
        assert!(statement_line.contains("the plaintiff"));
        assert!(!statement_line.contains("ada"));
    }

    /// A juror leaving below the floor demotes the case immediately and
    /// cancels the running vote.
    #[tokio::test]
    async fn test_juror_departure_demotes_immediately() {
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

        // Exactly at the floor: one departure drops below it.
        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.jury_pool.len(), 5);
        fx.court().leave_jury(&case_id, jurors[0]).await.unwrap();

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(snapshot.stage, CaseStage::JurySelection);
        assert!(snapshot.motion_queue[0].expiry.is_none());
        assert!(snapshot.motion_queue[0].votes.is_empty());
    }

    /// Departed guild members are pruned from the pool on tick.
    #[tokio::test]
    async fn test_departed_juror_pruned_on_tick() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        let jurors = fx.seat_jury(&case_id).await;

        fx.guild.remove_member(jurors[0]);
        fx.court().tick(&case_id).await.unwrap();

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert!(!snapshot.jury_pool.contains(&jurors[0]));
        assert_eq!(snapshot.stage, CaseStage::JurySelection);
    }

    /// Evidence: upload, seal, and visibility filtering through the stack.
    #[tokio::test]
    async fn test_evidence_upload_and_sealing() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        let jurors = fx.seat_jury(&case_id).await;

        let evidence_id = fx
            .court()
            .submit_evidence(&case_id, PLAINTIFF, "log.txt".into(), b"proof".to_vec())
            .await
            .unwrap();
        assert!(evidence_id.ends_with("-P1"));
        assert_eq!(fx.blobs.len(), 1);

        fx.court()
            .seal_evidence(&case_id, &evidence_id, jurors[0], "contains PII".into())
            .await
            .unwrap();

        // An uninvolved user sees nothing; a juror sees the sealed item.
        let outsider_view = fx
            .court()
            .list_evidence(&case_id, UserId(99))
            .await
            .unwrap();
        let juror_view = fx
            .court()
            .list_evidence(&case_id, jurors[0])
            .await
            .unwrap();
        assert!(outsider_view.is_empty());
        assert_eq!(juror_view.len(), 1);
        assert!(juror_view[0].certified);
    }

    /// Closing a case deletes its evidence blobs and leaves only the archive.
    #[tokio::test]
    async fn test_close_deletes_evidence_and_archives() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;
        fx.seat_jury(&case_id).await;

        fx.court()
            .submit_evidence(&case_id, PLAINTIFF, "log.txt".into(), b"proof".to_vec())
            .await
            .unwrap();
        assert_eq!(fx.blobs.len(), 1);

        fx.court()
            .close_case(&case_id, Verdict::Dismissed, "no merit")
            .await
            .unwrap();

        // Evidence blob gone; one archive blob remains.
        assert_eq!(fx.blobs.len(), 1);
        let ids = fx.court().active_case_ids().await;
        assert!(ids.is_empty());
    }

    /// Plea flow end to end: offer, accept, and the swapped set executes at
    /// the guilty close.
    #[tokio::test]
    async fn test_plea_acceptance_swaps_penalties() {
        let fx = Harness::new();
        let case_id = fx.file_case().await;

        fx.court()
            .offer_plea_deal(
                &case_id,
                PLAINTIFF,
                vec![Penalty::Warning {
                    note: "apologize publicly".into(),
                }],
                Some(fx.time.now() + 3_600),
            )
            .await
            .unwrap();
        fx.court().accept_plea_deal(&case_id, DEFENSE).await.unwrap();

        let snapshot = fx.court().case_snapshot(&case_id).await.unwrap();
        assert_eq!(
            snapshot.penalties,
            vec![Penalty::Warning {
                note: "apologize publicly".into()
            }]
        );
        assert!(snapshot.plea_deal.is_none());
    }
}
