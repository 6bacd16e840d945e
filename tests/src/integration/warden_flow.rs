//! Warden flows: warrant stacking and booking reconciliation.

#[cfg(test)]
mod tests {
    use crate::fixtures::{Harness, MUTE_ROLE};
    use gavel_warden::{WardenApi, STAY};
    use shared_types::{RoleId, TimeSource, UserId};

    const TARGET: UserId = UserId(10);

    /// Scenario D: a warrant for a user with no prisoner record creates one,
    /// activates on the first heartbeat, and books within that same tick.
    #[tokio::test]
    async fn test_new_warrant_books_on_first_tick() {
        let fx = Harness::new();
        assert!(fx.warden().prisoner_ids().await.is_empty());

        fx.warden()
            .new_warrant(TARGET, "case", "sentence", UserId(1), 300)
            .await
            .unwrap();
        let issued_at = fx.time.now();
        fx.warden().tick(TARGET).await.unwrap();

        let prisoner = fx.warden().prisoner_snapshot(TARGET).await.unwrap();
        assert!(prisoner.booked);
        assert_eq!(prisoner.warrants[0].expires, Some(issued_at + 300));
        assert_eq!(fx.guild.roles(TARGET), vec![MUTE_ROLE]);
    }

    /// Overlapping warrants serialize: the second only starts its clock once
    /// the first expires, and the user stays muted throughout.
    #[tokio::test]
    async fn test_stacked_warrants_serve_back_to_back() {
        let fx = Harness::new();
        fx.warden()
            .new_warrant(TARGET, "case", "first", UserId(1), 300)
            .await
            .unwrap();
        fx.warden()
            .new_warrant(TARGET, "manual", "second", UserId(2), 600)
            .await
            .unwrap();
        fx.warden().tick(TARGET).await.unwrap();

        let prisoner = fx.warden().prisoner_snapshot(TARGET).await.unwrap();
        assert_eq!(
            prisoner.warrants.iter().filter(|w| w.is_active()).count(),
            1
        );

        fx.time.advance(301);
        fx.warden().tick(TARGET).await.unwrap();
        let prisoner = fx.warden().prisoner_snapshot(TARGET).await.unwrap();
        assert_eq!(prisoner.warrants.len(), 1);
        assert_eq!(prisoner.warrants[0].description, "second");
        assert!(prisoner.booked);
        assert_eq!(fx.guild.roles(TARGET), vec![MUTE_ROLE]);

        // Second sentence served: released and archived.
        fx.time.advance(601);
        fx.warden().tick(TARGET).await.unwrap();
        assert!(fx.warden().prisoner_ids().await.is_empty());
        assert!(fx.guild.roles(TARGET).is_empty());
    }

    /// Release restores the pre-mute role snapshot.
    #[tokio::test]
    async fn test_release_restores_role_snapshot() {
        let fx = Harness::new();
        let original_roles = vec![RoleId(11), RoleId(12)];
        {
            // Give the target some roles before the mute lands.
            let mut profile =
                bot_runtime::adapters::memory::member_profile(TARGET.0, "citizen-10", 0, 500);
            profile.roles = original_roles.clone();
            fx.guild.upsert_member(profile);
        }

        let warrant_id = fx
            .warden()
            .new_warrant(TARGET, "manual", "cool off", UserId(1), 3_600)
            .await
            .unwrap();
        fx.warden().tick(TARGET).await.unwrap();
        assert_eq!(fx.guild.roles(TARGET), vec![MUTE_ROLE]);

        fx.warden().release_warrant(TARGET, &warrant_id).await.unwrap();
        assert_eq!(fx.guild.roles(TARGET), original_roles);
        assert!(fx.warden().prisoner_ids().await.is_empty());
    }

    /// A stay keeps the user muted with no clock; freezing it lifts the mute
    /// without dropping the warrant.
    #[tokio::test]
    async fn test_stay_and_freeze_cycle() {
        let fx = Harness::new();
        let warrant_id = fx
            .warden()
            .new_warrant(TARGET, "case", "indefinite", UserId(1), STAY)
            .await
            .unwrap();
        fx.warden().tick(TARGET).await.unwrap();

        let prisoner = fx.warden().prisoner_snapshot(TARGET).await.unwrap();
        assert!(prisoner.booked);
        assert!(prisoner.warrants[0].expires.is_none());

        // Time passes; a stay never expires.
        fx.time.advance(1_000_000);
        fx.warden().tick(TARGET).await.unwrap();
        assert!(fx.warden().prisoner_snapshot(TARGET).await.unwrap().booked);

        fx.warden().set_frozen(TARGET, &warrant_id, true).await.unwrap();
        let prisoner = fx.warden().prisoner_snapshot(TARGET).await.unwrap();
        assert!(!prisoner.booked);
        assert_eq!(prisoner.warrants.len(), 1);

        fx.warden().set_frozen(TARGET, &warrant_id, false).await.unwrap();
        assert!(fx.warden().prisoner_snapshot(TARGET).await.unwrap().booked);
    }

    /// Booking survives while any enforceable warrant remains, even after
    /// another is released.
    #[tokio::test]
    async fn test_partial_release_keeps_mute() {
        let fx = Harness::new();
        let first = fx
            .warden()
            .new_warrant(TARGET, "case", "first", UserId(1), STAY)
            .await
            .unwrap();
        fx.warden()
            .new_warrant(TARGET, "manual", "second", UserId(2), STAY)
            .await
            .unwrap();
        fx.warden().tick(TARGET).await.unwrap();

        fx.warden().release_warrant(TARGET, &first).await.unwrap();
        let prisoner = fx.warden().prisoner_snapshot(TARGET).await.unwrap();
        assert!(prisoner.booked);
        assert_eq!(prisoner.warrants.len(), 1);
        assert_eq!(fx.guild.roles(TARGET), vec![MUTE_ROLE]);
    }
}
