//! Builder session controller.
//!
//! # Responsibility
//! - Drive one owner's builder lifecycle: standard selection, tree
//!   population, editing, drafting and submission.
//! - Mediate with catalog, generator and template services through
//!   begin/finish request tickets so in-flight work stays observable.
//!
//! # Invariants
//! - At most one request is in flight; a newer `begin_*` supersedes it and the
//!   superseded response is discarded on arrival.
//! - A failed request restores the phase (and standard) held before it began
//!   and leaves a dismissible notice. Nothing is retried automatically.
//! - `form.standard_id` names an unloaded catalog only while a catalog fetch
//!   is in flight. Superseding or cancelling that fetch restores the standard
//!   whose catalog is loaded.
//! - Autosave never surfaces an error and never overwrites a draft that is
//!   still awaiting a recovery decision.
//! - A successful submit clears the owner's draft.

use crate::config::BuilderConfig;
use crate::external::{
    GenerationRequest, ReferenceCatalog, ServiceError, ServiceResult, StructureGenerator,
    TemplateId, TemplateService, TemplateSubmission,
};
use crate::model::course::{CourseTree, Lesson, LessonKind, LessonPatch, Module, ModulePatch};
use crate::model::draft::{DraftSnapshot, DraftState, OwnerId};
use crate::model::form::BuilderForm;
use crate::model::ids::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use crate::model::linking::CoverageReport;
use crate::model::reference::{Classification, ReferenceId, ReferenceItem, StandardId};
use crate::repo::draft_repo::DraftRepository;
use crate::service::draft_service::DraftStore;
use crate::service::synthesizer::synthesize;
use crate::service::validation::{build_submission, validation_errors, ValidationError};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Lifecycle phase of a builder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    New,
    StandardSelected,
    TreePopulated,
    Editing,
    Saved,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::StandardSelected => "standard_selected",
            Self::TreePopulated => "tree_populated",
            Self::Editing => "editing",
            Self::Saved => "saved",
        }
    }
}

/// Kind of external request a session can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOperation {
    FetchReferences,
    GenerateStructure,
    SubmitTemplate,
    LoadTemplate,
}

impl PendingOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchReferences => "fetch_references",
            Self::GenerateStructure => "generate_structure",
            Self::SubmitTemplate => "submit_template",
            Self::LoadTemplate => "load_template",
        }
    }
}

/// Handle pairing a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    operation: PendingOperation,
}

impl RequestTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn operation(&self) -> PendingOperation {
        self.operation
    }
}

/// What happened to a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Response applied to the session.
    Applied,
    /// Request failed; session rolled back and a notice is set.
    Failed,
    /// Ticket was superseded or cancelled; response ignored.
    Discarded,
}

/// User-visible, dismissible failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNotice {
    pub operation: PendingOperation,
    pub error: ServiceError,
}

/// Why a draft write did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveSkip {
    Disabled,
    RecoveryPending,
    Unchanged,
}

/// Result of a best-effort draft write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveOutcome {
    Saved { saved_at: i64 },
    Skipped(AutosaveSkip),
    /// Encoding or storage failed; retried on the next cycle.
    Failed,
}

#[derive(Debug)]
struct PendingRequest {
    ticket: RequestTicket,
    previous_phase: SessionPhase,
    previous_standard: Option<StandardId>,
}

/// Editable builder session for one owner.
pub struct BuilderSession<R: DraftRepository> {
    owner_id: OwnerId,
    config: BuilderConfig,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    drafts: DraftStore<R>,
    phase: SessionPhase,
    form: BuilderForm,
    tree: CourseTree,
    reference_items: Vec<ReferenceItem>,
    pending: Option<PendingRequest>,
    next_ticket: u64,
    recovery: Option<DraftSnapshot>,
    notice: Option<SessionNotice>,
    revision: u64,
    drafted_revision: u64,
    last_draft_at: Option<i64>,
    saved_template_id: Option<TemplateId>,
}

impl<R: DraftRepository> BuilderSession<R> {
    pub fn new(
        owner_id: impl Into<OwnerId>,
        repo: R,
        config: BuilderConfig,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            config,
            ids,
            drafts: DraftStore::new(repo, Arc::clone(&clock)),
            clock,
            phase: SessionPhase::New,
            form: BuilderForm::default(),
            tree: CourseTree::new(),
            reference_items: Vec::new(),
            pending: None,
            next_ticket: 1,
            recovery: None,
            notice: None,
            revision: 0,
            drafted_revision: 0,
            last_draft_at: None,
            saved_template_id: None,
        }
    }

    /// Session with UUID ids, the system clock and default config.
    pub fn with_defaults(owner_id: impl Into<OwnerId>, repo: R) -> Self {
        Self::new(
            owner_id,
            repo,
            BuilderConfig::default(),
            Arc::new(UuidIdGenerator),
            Arc::new(SystemClock),
        )
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn form(&self) -> &BuilderForm {
        &self.form
    }

    pub fn tree(&self) -> &CourseTree {
        &self.tree
    }

    pub fn reference_items(&self) -> &[ReferenceItem] {
        &self.reference_items
    }

    pub fn drafts(&self) -> &DraftStore<R> {
        &self.drafts
    }

    pub fn notice(&self) -> Option<&SessionNotice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn last_draft_at(&self) -> Option<i64> {
        self.last_draft_at
    }

    pub fn saved_template_id(&self) -> Option<&str> {
        self.saved_template_id.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.revision != self.drafted_revision
    }

    /// In-flight request, for loading indicators.
    pub fn pending_operation(&self) -> Option<PendingOperation> {
        self.pending.as_ref().map(|pending| pending.ticket.operation)
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Looks for a draft left by an earlier session of this owner.
    ///
    /// Storage failures are logged and treated as "no draft".
    pub fn mount(&mut self) -> Option<&DraftSnapshot> {
        self.recovery = match self.drafts.load(&self.owner_id) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("event=session_mount module=session status=error error={err}");
                None
            }
        };
        info!(
            "event=session_mount module=session status=ok recovery_available={}",
            self.recovery.is_some()
        );
        self.recovery.as_ref()
    }

    pub fn recovery(&self) -> Option<&DraftSnapshot> {
        self.recovery.as_ref()
    }

    /// Restores the pending draft and jumps straight to editing.
    pub fn accept_recovery(&mut self) -> bool {
        let Some(snapshot) = self.recovery.take() else {
            return false;
        };
        self.drop_pending("draft_recover");
        self.form = snapshot.state.form;
        self.tree = snapshot.state.tree;
        self.reference_items = snapshot.state.reference_items;
        self.phase = SessionPhase::Editing;
        self.revision += 1;
        self.drafted_revision = self.revision;
        self.last_draft_at = Some(snapshot.saved_at);
        info!(
            "event=draft_recover module=session status=ok modules={} saved_at={}",
            self.tree.module_count(),
            snapshot.saved_at
        );
        true
    }

    /// Drops the pending draft and starts from an empty session.
    pub fn decline_recovery(&mut self) -> bool {
        if self.recovery.take().is_none() {
            return false;
        }
        if let Err(err) = self.drafts.clear(&self.owner_id) {
            warn!("event=draft_discard module=session status=error error={err}");
        }
        self.reset();
        info!("event=draft_discard module=session status=ok");
        true
    }

    fn reset(&mut self) {
        self.phase = SessionPhase::New;
        self.form = BuilderForm::default();
        self.tree = CourseTree::new();
        self.reference_items.clear();
        self.pending = None;
        self.notice = None;
        self.revision = 0;
        self.drafted_revision = 0;
        self.last_draft_at = None;
    }

    // ------------------------------------------------------------------
    // Form edits
    // ------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.form.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
        self.touch();
    }

    pub fn set_public(&mut self, is_public: bool) {
        self.form.is_public = is_public;
        self.touch();
    }

    pub fn set_generation_flags(&mut self, include_resources: bool, include_assessments: bool) {
        self.form.include_resources = include_resources;
        self.form.include_assessments = include_assessments;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Tree edits
    // ------------------------------------------------------------------

    pub fn add_module(&mut self) -> Module {
        let module = self.tree.add_module(self.ids.as_ref(), self.clock.now_ms());
        self.touch();
        module
    }

    pub fn add_lesson(&mut self, module_id: &str, kind: LessonKind) -> Option<Lesson> {
        let lesson = self
            .tree
            .add_lesson(self.ids.as_ref(), module_id, kind, self.clock.now_ms())?;
        self.touch();
        Some(lesson)
    }

    pub fn update_module(&mut self, module_id: &str, patch: ModulePatch) -> bool {
        let applied = self.tree.update_module(module_id, patch, self.clock.now_ms());
        self.touch_if(applied)
    }

    pub fn update_lesson(&mut self, module_id: &str, lesson_id: &str, patch: LessonPatch) -> bool {
        let applied = self
            .tree
            .update_lesson(module_id, lesson_id, patch, self.clock.now_ms());
        self.touch_if(applied)
    }

    pub fn delete_module(&mut self, module_id: &str) -> Option<Module> {
        let removed = self.tree.delete_module(module_id, self.clock.now_ms())?;
        self.touch();
        Some(removed)
    }

    pub fn delete_lesson(&mut self, module_id: &str, lesson_id: &str) -> Option<Lesson> {
        let removed = self
            .tree
            .delete_lesson(module_id, lesson_id, self.clock.now_ms())?;
        self.touch();
        Some(removed)
    }

    pub fn reorder_modules(&mut self, from: usize, to: usize) -> bool {
        let applied = self.tree.reorder_modules(from, to, self.clock.now_ms());
        self.touch_if(applied)
    }

    pub fn reorder_lessons(&mut self, module_id: &str, from: usize, to: usize) -> bool {
        let applied = self
            .tree
            .reorder_lessons(module_id, from, to, self.clock.now_ms());
        self.touch_if(applied)
    }

    /// Changes the selected module. Selection is drafted but is not an edit.
    pub fn select_module(&mut self, module_id: &str) -> bool {
        let applied = self.tree.select_module(module_id);
        if applied {
            self.revision += 1;
        }
        applied
    }

    // ------------------------------------------------------------------
    // Linking
    // ------------------------------------------------------------------

    pub fn toggle_reference(&mut self, lesson_id: &str, reference_id: ReferenceId) -> Option<bool> {
        let linked = self
            .tree
            .toggle_reference(lesson_id, reference_id, self.clock.now_ms())?;
        self.touch();
        Some(linked)
    }

    pub fn toggle_module_reference(
        &mut self,
        module_id: &str,
        reference_id: ReferenceId,
    ) -> Option<bool> {
        let linked = self
            .tree
            .toggle_module_reference(module_id, reference_id, self.clock.now_ms())?;
        self.touch();
        Some(linked)
    }

    /// Links every loaded item of `classification` to the lesson.
    pub fn select_all_of_classification(
        &mut self,
        lesson_id: &str,
        classification: Classification,
    ) -> usize {
        let added = self.tree.select_all_of_classification(
            lesson_id,
            classification,
            &self.reference_items,
            self.clock.now_ms(),
        );
        self.touch_if(added > 0);
        added
    }

    pub fn references(&self, lesson_id: &str) -> BTreeSet<ReferenceId> {
        self.tree.references(lesson_id)
    }

    pub fn coverage(&self) -> CoverageReport {
        self.tree.coverage(&self.reference_items)
    }

    /// Removes links to ids outside the loaded catalog.
    pub fn prune_stale_references(&mut self) -> usize {
        let removed = self
            .tree
            .prune_stale_references(&self.reference_items, self.clock.now_ms());
        self.touch_if(removed > 0);
        removed
    }

    // ------------------------------------------------------------------
    // Standard selection
    // ------------------------------------------------------------------

    /// Records the chosen standard and opens a catalog request.
    pub fn begin_select_standard(&mut self, standard_id: StandardId) -> RequestTicket {
        self.drop_pending("supersede");
        let previous_standard = self.form.standard_id;
        self.form.standard_id = Some(standard_id);
        self.pending_request(PendingOperation::FetchReferences, previous_standard)
    }

    pub fn finish_select_standard(
        &mut self,
        ticket: RequestTicket,
        result: ServiceResult<Vec<ReferenceItem>>,
    ) -> RequestOutcome {
        let Some(pending) = self.close_request(ticket) else {
            return RequestOutcome::Discarded;
        };
        match result {
            Ok(items) => {
                info!(
                    "event=standard_select module=session status=ok items={}",
                    items.len()
                );
                self.reference_items = items;
                if self.tree.is_empty() {
                    self.phase = SessionPhase::StandardSelected;
                    self.revision += 1;
                } else {
                    self.touch();
                }
                RequestOutcome::Applied
            }
            Err(error) => self.fail_request(pending, error),
        }
    }

    /// Selects a standard and waits for its catalog.
    ///
    /// Holds `&mut self` across the fetch. Hosts sharing the session with the
    /// autosave task should use `begin_select_standard`/`finish_select_standard`
    /// and release the lock while awaiting.
    pub async fn select_standard<C: ReferenceCatalog>(
        &mut self,
        standard_id: StandardId,
        catalog: &C,
    ) -> RequestOutcome {
        let ticket = self.begin_select_standard(standard_id);
        let result = catalog.fetch_reference_items(standard_id).await;
        self.finish_select_standard(ticket, result)
    }

    // ------------------------------------------------------------------
    // Tree population
    // ------------------------------------------------------------------

    /// Replaces the tree with the default skeleton for the loaded catalog.
    pub fn populate_from_synthesis(&mut self) -> usize {
        let modules = synthesize(
            &self.reference_items,
            self.ids.as_ref(),
            self.config.seed_limits(),
        );
        self.tree.replace_modules(modules, self.clock.now_ms());
        self.phase = SessionPhase::TreePopulated;
        self.revision += 1;
        info!(
            "event=tree_synthesize module=session status=ok modules={} lessons={}",
            self.tree.module_count(),
            self.tree.lesson_count()
        );
        self.tree.module_count()
    }

    /// Opens a generation request for the standard whose catalog is loaded.
    ///
    /// An in-flight catalog fetch is superseded.
    pub fn begin_generate(
        &mut self,
    ) -> Result<(RequestTicket, GenerationRequest), ValidationError> {
        let standard_id = self
            .loaded_standard()
            .ok_or(ValidationError::MissingStandard)?;
        let request = GenerationRequest {
            standard_id,
            include_resources: self.form.include_resources,
            include_assessments: self.form.include_assessments,
        };
        let ticket = self.open_request(PendingOperation::GenerateStructure);
        Ok((ticket, request))
    }

    pub fn finish_generate(
        &mut self,
        ticket: RequestTicket,
        result: ServiceResult<Vec<Module>>,
    ) -> RequestOutcome {
        let Some(pending) = self.close_request(ticket) else {
            return RequestOutcome::Discarded;
        };
        match result {
            Ok(modules) if modules.is_empty() => self.fail_request(
                pending,
                ServiceError::InvalidResponse("generator returned no modules".to_string()),
            ),
            Ok(modules) => {
                self.tree.replace_modules(modules, self.clock.now_ms());
                self.phase = SessionPhase::TreePopulated;
                self.revision += 1;
                info!(
                    "event=tree_generate module=session status=ok modules={} lessons={}",
                    self.tree.module_count(),
                    self.tree.lesson_count()
                );
                RequestOutcome::Applied
            }
            Err(error) => self.fail_request(pending, error),
        }
    }

    /// Holds `&mut self` across the generator call; see `select_standard`.
    pub async fn generate_structure<G: StructureGenerator>(
        &mut self,
        generator: &G,
    ) -> Result<RequestOutcome, ValidationError> {
        let (ticket, request) = self.begin_generate()?;
        let result = generator.generate_structure(&request).await;
        Ok(self.finish_generate(ticket, result))
    }

    // ------------------------------------------------------------------
    // Submission and template loading
    // ------------------------------------------------------------------

    /// Every validation problem, for inline display.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        validation_errors(&self.form, &self.tree)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.validation_errors().into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    /// Validates locally and opens a submit request.
    ///
    /// Validation failures never open a request.
    pub fn begin_submit(
        &mut self,
    ) -> Result<(RequestTicket, TemplateSubmission), ValidationError> {
        let form = BuilderForm {
            standard_id: self.loaded_standard(),
            ..self.form.clone()
        };
        let submission = build_submission(&form, &self.tree).inspect_err(|err| {
            debug!("event=template_submit module=session status=invalid reason={err}");
        })?;
        let ticket = self.open_request(PendingOperation::SubmitTemplate);
        Ok((ticket, submission))
    }

    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        result: ServiceResult<TemplateId>,
    ) -> RequestOutcome {
        let Some(pending) = self.close_request(ticket) else {
            return RequestOutcome::Discarded;
        };
        match result {
            Ok(template_id) => {
                self.saved_template_id = Some(template_id);
                self.phase = SessionPhase::Saved;
                self.drafted_revision = self.revision;
                self.last_draft_at = None;
                if let Err(err) = self.drafts.clear(&self.owner_id) {
                    warn!(
                        "event=template_submit module=session status=warn draft_clear_error={err}"
                    );
                }
                info!(
                    "event=template_submit module=session status=ok modules={}",
                    self.tree.module_count()
                );
                RequestOutcome::Applied
            }
            Err(error) => self.fail_request(pending, error),
        }
    }

    /// Holds `&mut self` across the template call; see `select_standard`.
    pub async fn submit<T: TemplateService>(
        &mut self,
        service: &T,
    ) -> Result<RequestOutcome, ValidationError> {
        let (ticket, submission) = self.begin_submit()?;
        let result = service.submit_template(&submission).await;
        Ok(self.finish_submit(ticket, result))
    }

    pub fn begin_load_template(&mut self) -> RequestTicket {
        self.open_request(PendingOperation::LoadTemplate)
    }

    /// Restores a stored template into the builder for editing.
    pub fn finish_load_template(
        &mut self,
        ticket: RequestTicket,
        result: ServiceResult<TemplateSubmission>,
    ) -> RequestOutcome {
        let Some(pending) = self.close_request(ticket) else {
            return RequestOutcome::Discarded;
        };
        match result {
            Ok(template) => {
                if self.form.standard_id != Some(template.standard_id) {
                    self.reference_items.clear();
                }
                self.form.title = template.title;
                self.form.description = template.description;
                self.form.standard_id = Some(template.standard_id);
                self.form.is_public = template.is_public;
                self.tree.replace_modules(template.modules, self.clock.now_ms());
                self.phase = SessionPhase::Editing;
                self.revision += 1;
                info!(
                    "event=template_load module=session status=ok modules={}",
                    self.tree.module_count()
                );
                RequestOutcome::Applied
            }
            Err(error) => self.fail_request(pending, error),
        }
    }

    /// Holds `&mut self` across the template call; see `select_standard`.
    pub async fn load_template<T: TemplateService>(
        &mut self,
        template_id: &str,
        service: &T,
    ) -> RequestOutcome {
        let ticket = self.begin_load_template();
        let result = service.load_template(template_id).await;
        self.finish_load_template(ticket, result)
    }

    /// Abandons the in-flight request; its response will be discarded.
    pub fn cancel_pending(&mut self) -> bool {
        self.drop_pending("cancel")
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    pub fn draft_state(&self) -> DraftState {
        DraftState {
            form: self.form.clone(),
            tree: self.tree.clone(),
            reference_items: self.reference_items.clone(),
        }
    }

    /// Explicit "Save Draft". Writes even when nothing changed.
    pub fn save_draft(&mut self) -> AutosaveOutcome {
        if self.recovery.is_some() {
            return AutosaveOutcome::Skipped(AutosaveSkip::RecoveryPending);
        }
        self.write_draft("manual")
    }

    /// Interval-driven draft write. Skips when there is nothing new.
    pub fn autosave(&mut self) -> AutosaveOutcome {
        let skip = if !self.config.autosave_enabled {
            Some(AutosaveSkip::Disabled)
        } else if self.recovery.is_some() {
            Some(AutosaveSkip::RecoveryPending)
        } else if !self.has_unsaved_changes() {
            Some(AutosaveSkip::Unchanged)
        } else {
            None
        };
        if let Some(reason) = skip {
            debug!("event=draft_autosave module=session status=skip reason={reason:?}");
            return AutosaveOutcome::Skipped(reason);
        }
        self.write_draft("interval")
    }

    fn write_draft(&mut self, trigger: &'static str) -> AutosaveOutcome {
        let state = self.draft_state();
        match self.drafts.save(&self.owner_id, &state) {
            Ok(saved_at) => {
                self.last_draft_at = Some(saved_at);
                self.drafted_revision = self.revision;
                AutosaveOutcome::Saved { saved_at }
            }
            Err(err) => {
                warn!(
                    "event=draft_autosave module=session status=error trigger={trigger} error={err}"
                );
                AutosaveOutcome::Failed
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn touch(&mut self) {
        self.revision += 1;
        self.phase = SessionPhase::Editing;
    }

    fn touch_if(&mut self, applied: bool) -> bool {
        if applied {
            self.touch();
        }
        applied
    }

    /// Standard whose catalog is in `reference_items`.
    fn loaded_standard(&self) -> Option<StandardId> {
        match &self.pending {
            Some(pending) if pending.ticket.operation == PendingOperation::FetchReferences => {
                pending.previous_standard
            }
            _ => self.form.standard_id,
        }
    }

    /// Forgets the in-flight request so its response is discarded. An
    /// abandoned catalog fetch gives back the standard it replaced.
    fn drop_pending(&mut self, reason: &'static str) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.ticket.operation == PendingOperation::FetchReferences {
            self.form.standard_id = pending.previous_standard;
        }
        debug!(
            "event=request_drop module=session status=ok operation={} reason={reason}",
            pending.ticket.operation.as_str()
        );
        true
    }

    /// Opens a request for the current form state, superseding any other.
    fn open_request(&mut self, operation: PendingOperation) -> RequestTicket {
        self.drop_pending("supersede");
        self.pending_request(operation, self.form.standard_id)
    }

    fn pending_request(
        &mut self,
        operation: PendingOperation,
        previous_standard: Option<StandardId>,
    ) -> RequestTicket {
        let ticket = RequestTicket {
            id: self.next_ticket,
            operation,
        };
        self.next_ticket += 1;
        self.pending = Some(PendingRequest {
            ticket,
            previous_phase: self.phase,
            previous_standard,
        });
        self.notice = None;
        debug!(
            "event=request_open module=session status=start operation={}",
            operation.as_str()
        );
        ticket
    }

    fn close_request(&mut self, ticket: RequestTicket) -> Option<PendingRequest> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take(),
            _ => {
                debug!(
                    "event=request_discard module=session status=skip operation={}",
                    ticket.operation.as_str()
                );
                None
            }
        }
    }

    fn fail_request(&mut self, pending: PendingRequest, error: ServiceError) -> RequestOutcome {
        warn!(
            "event=request_fail module=session status=error operation={} error_code={} phase={}",
            pending.ticket.operation.as_str(),
            error.code(),
            pending.previous_phase.as_str()
        );
        self.phase = pending.previous_phase;
        self.form.standard_id = pending.previous_standard;
        self.notice = Some(SessionNotice {
            operation: pending.ticket.operation,
            error,
        });
        RequestOutcome::Failed
    }
}
