//! # CaseManager - active-case registry and tick orchestration
//!
//! Owns the process-wide registry of active cases and drives every mutation
//! through the same critical section: lock the case, apply the domain
//! mutation, run an out-of-cycle heartbeat, persist, announce. The registry
//! map itself is written only by case filing and case closing.
//!
//! The scheduler calls `tick_all` on a fixed interval; vote casting and juror
//! churn additionally trigger an immediate heartbeat so stage changes and
//! motion closes do not wait for the next cycle.

use crate::config::CourtConfig;
use crate::domain::{
    eligible_jurors, Case, CaseEvent, CaseStage, CourtError, Evidence, MotionKind, Penalty,
    Result, Verdict,
};
use crate::ports::{CourtApi, Notifier, Recipient, SentenceExecutor};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;
use sha2::{Digest, Sha256};
use shared_types::ports::{
    BlobStore, DocumentStore, ModerationGateway, StoreError, UserDirectory,
};
use shared_types::{CaseId, EvidenceId, MotionId, Timestamp, TimeSource, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

const CASES: &str = "cases";
const KV: &str = "kv";

/// The case manager service.
pub struct CaseManager {
    /// Active cases, each behind its own mutex.
    cases: RwLock<HashMap<CaseId, Arc<Mutex<Case>>>>,
    /// Plaintiff/defense per active case; parties never change after filing,
    /// so eligibility scans read this instead of locking every case.
    party_index: RwLock<HashMap<CaseId, (UserId, UserId)>>,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    directory: Arc<dyn UserDirectory>,
    gateway: Arc<dyn ModerationGateway>,
    notifier: Arc<dyn Notifier>,
    sentences: Arc<dyn SentenceExecutor>,
    time: Arc<dyn TimeSource>,
    config: CourtConfig,
}

impl CaseManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        directory: Arc<dyn UserDirectory>,
        gateway: Arc<dyn ModerationGateway>,
        notifier: Arc<dyn Notifier>,
        sentences: Arc<dyn SentenceExecutor>,
        time: Arc<dyn TimeSource>,
        config: CourtConfig,
    ) -> Self {
        info!("[casemanager] initializing (jury floor {})", config.rules.jury_floor);
        Self {
            cases: RwLock::new(HashMap::new()),
            party_index: RwLock::new(HashMap::new()),
            store,
            blobs,
            directory,
            gateway,
            notifier,
            sentences,
            time,
            config,
        }
    }

    /// Rehydrates the active-case registry from the document store.
    ///
    /// Documents that fail to deserialize are skipped and logged; a partial
    /// load never takes the process down.
    pub async fn hydrate(&self) -> usize {
        let docs = match self.store.find_all(CASES).await {
            Ok(docs) => docs,
            Err(e) => {
                error!("[casemanager] failed to scan case collection: {e}");
                return 0;
            }
        };
        let mut loaded = 0;
        for (id, doc) in docs {
            match serde_json::from_value::<Case>(doc) {
                Ok(case) if case.stage != CaseStage::Closed => {
                    self.party_index
                        .write()
                        .await
                        .insert(case.id.clone(), (case.plaintiff, case.defense));
                    self.cases
                        .write()
                        .await
                        .insert(case.id.clone(), Arc::new(Mutex::new(case)));
                    loaded += 1;
                }
                Ok(case) => {
                    warn!("[casemanager] skipping closed case {} left in store", case.id);
                }
                Err(e) => {
                    warn!("[casemanager] skipping unreadable case document {id}: {e}");
                }
            }
        }
        info!("[casemanager] hydrated {loaded} active case(s)");
        loaded
    }

    async fn case_handle(&self, case_id: &str) -> Result<Arc<Mutex<Case>>> {
        self.cases
            .read()
            .await
            .get(case_id)
            .cloned()
            .ok_or_else(|| CourtError::CaseNotFound(case_id.to_string()))
    }

    async fn persist(&self, case: &Case) -> Result<()> {
        let doc = serde_json::to_value(case).map_err(|e| StoreError::Serialize {
            collection: CASES.into(),
            id: case.id.clone(),
            reason: e.to_string(),
        })?;
        self.store.save(CASES, &case.id, doc).await?;
        Ok(())
    }

    /// Display name via the directory, falling back to the raw id for
    /// departed members.
    async fn resolve_name(&self, user: UserId) -> String {
        match self.directory.member(user).await {
            Ok(Some(profile)) => profile.display_name,
            _ => format!("user {user}"),
        }
    }

    /// Plaintiffs and defendants across all active cases.
    async fn disqualified_parties(&self) -> HashSet<UserId> {
        let mut out = HashSet::new();
        for (plaintiff, defense) in self.party_index.read().await.values() {
            out.insert(*plaintiff);
            out.insert(*defense);
        }
        out
    }

    /// One heartbeat under the caller's case lock: prune departed jurors,
    /// advance the stage machine, recruit when short-handed.
    async fn heartbeat_inner(&self, case: &mut Case) -> Vec<CaseEvent> {
        let now = self.time.now();

        let mut departed = Vec::new();
        for juror in case.jury_pool.iter().copied().collect::<Vec<_>>() {
            match self.directory.member(juror).await {
                Ok(None) => departed.push(juror),
                Ok(Some(_)) => {}
                Err(e) => {
                    // Directory outage: assume present rather than unseating.
                    warn!("[casemanager] juror lookup failed for {juror}: {e}");
                }
            }
        }

        let outcome = case.heartbeat(now, &departed, &self.config.rules);
        let mut events = outcome.events;

        if outcome.needs_invites {
            match self.directory.members().await {
                Ok(profiles) => {
                    let disqualified = self.disqualified_parties().await;
                    let eligible = eligible_jurors(
                        &profiles,
                        case,
                        &disqualified,
                        &self.config.eligibility,
                        now,
                    );
                    let picked: Vec<UserId> = {
                        let mut rng = rand::thread_rng();
                        let want = rng.gen_range(self.config.invite_min..=self.config.invite_max);
                        eligible
                            .choose_multiple(&mut rng, want.min(eligible.len()))
                            .copied()
                            .collect()
                    };
                    events.extend(case.add_invites(&picked, now));
                    for user in &picked {
                        let text = format!(
                            "You have been selected as a candidate juror for case {} ({}). \
                             Join with /jury join {}.",
                            case.id, case.title, case.id,
                        );
                        if let Err(e) = self.notifier.send(Recipient::User(*user), &text).await {
                            warn!("[casemanager] jury invitation not delivered: {e}");
                        }
                    }
                }
                Err(e) => {
                    warn!("[casemanager] member scan failed, no invitations this tick: {e}");
                }
            }
        }

        events
    }

    /// Fans an event out to its audiences. Failures are logged per recipient
    /// and never abort delivery to the others.
    async fn announce(&self, case: &Case, events: &[CaseEvent]) {
        for ev in events {
            let line = format!("⚖️ [{}] {}", case.id, ev.summary);
            if ev.audiences.jury {
                for juror in &case.jury_pool {
                    if let Err(e) = self.notifier.send(Recipient::User(*juror), &line).await {
                        warn!("[casemanager] juror announcement not delivered: {e}");
                    }
                }
            }
            if ev.audiences.defense {
                if let Err(e) = self
                    .notifier
                    .send(Recipient::User(case.defense), &line)
                    .await
                {
                    warn!("[casemanager] defense announcement not delivered: {e}");
                }
            }
            if ev.audiences.plaintiff {
                if let Err(e) = self
                    .notifier
                    .send(Recipient::User(case.plaintiff), &line)
                    .await
                {
                    warn!("[casemanager] plaintiff announcement not delivered: {e}");
                }
            }
            if ev.audiences.news_wire {
                if let Some(channel) = self.config.news_channel {
                    let public = format!("⚖️ [{}] {}", case.id, ev.public_line());
                    if let Err(e) = self.notifier.send(Recipient::Channel(channel), &public).await
                    {
                        warn!("[casemanager] news wire announcement not delivered: {e}");
                    }
                }
            }
        }
    }

    /// Completes a mutation: immediate heartbeat, persist, announce.
    async fn after_mutation(&self, case: &mut Case, mut events: Vec<CaseEvent>) -> Result<()> {
        events.extend(self.heartbeat_inner(case).await);
        self.persist(case).await?;
        self.announce(case, &events).await;
        Ok(())
    }

    /// Applies the case's penalty set against the defense.
    ///
    /// Ban delivery failures are noted on the record and do not abort the
    /// remaining penalties; a failed sentence hand-off propagates because the
    /// warden's ledger is our own persistence.
    async fn execute_punishments(&self, case: &mut Case) -> Result<Vec<CaseEvent>> {
        let now = self.time.now();
        let mut events = Vec::new();
        for penalty in case.penalties.clone() {
            match &penalty {
                Penalty::Warning { note } => {
                    events.push(case.administrative_note(
                        format!("a formal warning was recorded against the defense: {note}"),
                        json!({ "penalty": &penalty }),
                        crate::domain::Audiences::INTERNAL,
                        now,
                    ));
                }
                Penalty::PermanentBan { reason } => {
                    match self.gateway.ban(case.defense, reason).await {
                        Ok(()) => {
                            events.push(case.administrative_note(
                                format!("the defense was permanently banned: {reason}"),
                                json!({ "penalty": &penalty }),
                                crate::domain::Audiences::ALL,
                                now,
                            ));
                        }
                        Err(e) => {
                            error!("[casemanager] ban against {} failed: {e}", case.defense);
                            events.push(case.administrative_note(
                                format!("the ban could not be issued: {e}"),
                                json!({ "penalty": &penalty, "failed": true }),
                                crate::domain::Audiences::INTERNAL,
                                now,
                            ));
                        }
                    }
                }
                Penalty::Prison { len_seconds } => {
                    let description =
                        format!("sentence in case {} ({})", case.id, case.title);
                    self.sentences
                        .imprison(case.defense, "case", &description, case.plaintiff, *len_seconds)
                        .await
                        .map_err(|e| CourtError::Sentence(e.to_string()))?;
                    events.push(case.administrative_note(
                        format!(
                            "the defense was committed to prison ({})",
                            penalty.describe()
                        ),
                        json!({ "penalty": &penalty }),
                        crate::domain::Audiences::ALL,
                        now,
                    ));
                }
            }
        }
        Ok(events)
    }

    /// Generates a fresh `YYYYMMDD-XXXX` case id, re-rolling on collision
    /// with any active case.
    async fn generate_case_id(&self, now: Timestamp) -> CaseId {
        let date = chrono::DateTime::from_timestamp(now as i64, 0)
            .unwrap_or_default()
            .format("%Y%m%d")
            .to_string();
        loop {
            let suffix: String = {
                let mut rng = rand::thread_rng();
                (0..4)
                    .map(|_| {
                        let c = rng.sample(rand::distributions::Alphanumeric) as char;
                        c.to_ascii_uppercase()
                    })
                    .collect()
            };
            let id = format!("{date}-{suffix}");
            if !self.cases.read().await.contains_key(&id) {
                return id;
            }
        }
    }
}

#[async_trait]
impl CourtApi for CaseManager {
    async fn file_case(
        &self,
        title: String,
        description: String,
        plaintiff: UserId,
        defense: UserId,
    ) -> Result<CaseId> {
        if plaintiff == defense {
            return Err(CourtError::InvalidState(
                "a case cannot be filed against oneself".into(),
            ));
        }
        let now = self.time.now();
        let id = self.generate_case_id(now).await;
        let plaintiff_name = self.resolve_name(plaintiff).await;
        let defense_name = self.resolve_name(defense).await;

        let case = Case::new(
            id.clone(),
            title,
            description,
            plaintiff,
            defense,
            plaintiff_name,
            defense_name,
            now,
        );
        self.persist(&case).await?;
        self.announce(&case, &case.event_log.clone()).await;

        self.party_index
            .write()
            .await
            .insert(id.clone(), (plaintiff, defense));
        self.cases
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(case)));
        info!("[casemanager] case {id} filed ({plaintiff} v. {defense})");
        Ok(id)
    }

    async fn submit_motion(
        &self,
        case_id: &str,
        author: UserId,
        kind: MotionKind,
    ) -> Result<MotionId> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let author_name = self.resolve_name(author).await;
        let now = self.time.now();
        let (motion_id, events) = case.file_motion(author, author_name, kind, now)?;
        self.after_mutation(&mut case, events).await?;
        info!("[casemanager] motion {motion_id} filed on case {case_id}");
        Ok(motion_id)
    }

    async fn cast_vote(&self, case_id: &str, juror: UserId, in_favor: bool) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.cast_vote(juror, in_favor, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn join_jury(&self, case_id: &str, user: UserId) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let name = match self.directory.member(user).await? {
            Some(profile) => profile.display_name,
            None => {
                return Err(CourtError::InvalidState(
                    "you are no longer a member of this guild".into(),
                ))
            }
        };
        let events = case.join_jury(user, name, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn leave_jury(&self, case_id: &str, user: UserId) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.leave_jury(user, "stepped down", self.time.now())?;
        // The immediate heartbeat starts re-selection without waiting for the
        // next scheduled cycle.
        self.after_mutation(&mut case, events).await
    }

    async fn submit_evidence(
        &self,
        case_id: &str,
        submitter: UserId,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<EvidenceId> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let digest = hex::encode(Sha256::digest(&bytes));
        let blob_id = self.blobs.put(&filename, bytes).await?;
        let (evidence_id, events) =
            case.attach_evidence(submitter, filename, blob_id, digest, self.time.now());
        self.after_mutation(&mut case, events).await?;
        Ok(evidence_id)
    }

    async fn seal_evidence(
        &self,
        case_id: &str,
        evidence_id: &str,
        author: UserId,
        description: String,
    ) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.seal_evidence(evidence_id, author, description, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn list_evidence(&self, case_id: &str, viewer: UserId) -> Result<Vec<Evidence>> {
        let handle = self.case_handle(case_id).await?;
        let case = handle.lock().await;
        Ok(case.visible_evidence(viewer).into_iter().cloned().collect())
    }

    async fn submit_personal_statement(
        &self,
        case_id: &str,
        author: UserId,
        text: String,
    ) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.add_personal_statement(author, text, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn post_juror_message(&self, case_id: &str, author: UserId, text: String) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.add_juror_message(author, text, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn offer_plea_deal(
        &self,
        case_id: &str,
        by: UserId,
        penalties: Vec<Penalty>,
        expires: Option<Timestamp>,
    ) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.offer_plea(by, penalties, expires, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn accept_plea_deal(&self, case_id: &str, by: UserId) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.accept_plea(by, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn decline_plea_deal(&self, case_id: &str, by: UserId) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = case.decline_plea(by, self.time.now())?;
        self.after_mutation(&mut case, events).await
    }

    async fn set_case_frozen(&self, case_id: &str, frozen: bool) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        case.no_tick = frozen;
        self.persist(&case).await?;
        info!("[casemanager] case {case_id} {}", if frozen { "frozen" } else { "thawed" });
        Ok(())
    }

    async fn close_case(&self, case_id: &str, verdict: Verdict, reason: &str) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        {
            let mut case = handle.lock().await;
            if case.stage == CaseStage::Closed {
                return Err(CourtError::InvalidState("the case is already closed".into()));
            }
            let mut events = case.close(verdict, reason, self.time.now());
            if verdict == Verdict::Guilty {
                events.extend(self.execute_punishments(&mut case).await?);
            }

            // Retention archive before the working copies disappear.
            match serde_json::to_vec_pretty(&*case) {
                Ok(bytes) => match zstd::encode_all(bytes.as_slice(), 3) {
                    Ok(compressed) => {
                        let name = format!("{case_id}-archive.json.zst");
                        if let Err(e) = self.blobs.put(&name, compressed).await {
                            warn!("[casemanager] archive for {case_id} not written: {e}");
                        }
                    }
                    Err(e) => warn!("[casemanager] archive compression failed: {e}"),
                },
                Err(e) => warn!("[casemanager] archive serialization failed: {e}"),
            }

            for item in &case.evidence {
                if let Err(e) = self.blobs.delete(&item.blob_id).await {
                    warn!("[casemanager] evidence blob {} not deleted: {e}", item.blob_id);
                }
            }
            self.store.delete(CASES, case_id).await.map_err(CourtError::from)?;
            self.announce(&case, &events).await;
        }
        self.cases.write().await.remove(case_id);
        self.party_index.write().await.remove(case_id);
        info!("[casemanager] case {case_id} closed ({verdict})");
        Ok(())
    }

    async fn case_snapshot(&self, case_id: &str) -> Result<Case> {
        let handle = self.case_handle(case_id).await?;
        let case = handle.lock().await;
        Ok(case.clone())
    }

    async fn active_case_ids(&self) -> Vec<CaseId> {
        self.cases.read().await.keys().cloned().collect()
    }

    async fn tick(&self, case_id: &str) -> Result<()> {
        let handle = self.case_handle(case_id).await?;
        let mut case = handle.lock().await;
        let events = self.heartbeat_inner(&mut case).await;
        self.persist(&case).await?;
        self.announce(&case, &events).await;
        Ok(())
    }

    async fn tick_all(&self) {
        let handles: Vec<(CaseId, Arc<Mutex<Case>>)> = self
            .cases
            .read()
            .await
            .iter()
            .map(|(id, h)| (id.clone(), Arc::clone(h)))
            .collect();
        for (id, handle) in handles {
            let mut case = handle.lock().await;
            let events = self.heartbeat_inner(&mut case).await;
            if let Err(e) = self.persist(&case).await {
                error!("[casemanager] persisting case {id} failed: {e}");
                continue;
            }
            self.announce(&case, &events).await;
        }
    }

    async fn set_viewing(&self, user: UserId, case_id: Option<CaseId>) -> Result<()> {
        let key = format!("viewing:{user}");
        match case_id {
            Some(id) => {
                self.store
                    .save(KV, &key, json!({ "case_id": id }))
                    .await
                    .map_err(CourtError::from)?;
            }
            None => {
                self.store.delete(KV, &key).await.map_err(CourtError::from)?;
            }
        }
        Ok(())
    }

    async fn viewing(&self, user: UserId) -> Result<Option<CaseId>> {
        let key = format!("viewing:{user}");
        let doc = self.store.load(KV, &key).await.map_err(CourtError::from)?;
        Ok(doc
            .and_then(|d| d.get("case_id").cloned())
            .and_then(|v| v.as_str().map(str::to_string)))
    }
}
