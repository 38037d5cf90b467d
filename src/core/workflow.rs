//! Workflow engine for repair work orders
//!
//! Owns the repair lifecycle (Cotización → Confirmado → En Reparación →
//! Reparado → Entregado) and the invariants of the nested records: the
//! append-only evaluation log, the functionality test and the quote total.
//! Persistence is injected as a [`RepairStore`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_yml::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::store::{Patch, RepairStore, StoreError};
use crate::entities::functionality::{FunctionalityTest, TestItem, TestResult};
use crate::entities::quote::{validate_amount, Quote, RepairPart};
use crate::entities::repair::{
    is_assigned, DeviceType, EvaluationEntry, Repair, RepairField, RepairStatus, NO_TECHNICIAN,
};

/// Minimum length of the customer name at intake
const MIN_CUSTOMER_LEN: usize = 2;

/// Minimum length of the problem description at intake
const MIN_PROBLEM_LEN: usize = 10;

/// How status writes through [`WorkflowEngine::update_field`] are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Only the current status or its direct successor is accepted
    #[default]
    ForwardOnly,
    /// Staff may set any status (manual correction)
    Override,
}

impl std::fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusPolicy::ForwardOnly => write!(f, "forward_only"),
            StatusPolicy::Override => write!(f, "override"),
        }
    }
}

/// Workflow configuration from shop config
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Policy for direct status writes
    pub status_policy: StatusPolicy,

    /// Extra attempts for read-modify-write updates that hit a revision conflict
    pub conflict_retries: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            status_policy: StatusPolicy::ForwardOnly,
            conflict_retries: 3,
        }
    }
}

/// Coarse classification of workflow failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    PreconditionFailed,
    StorageUnavailable,
}

/// Errors that can occur during workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Repair not found: {id}")]
    NotFound { id: String },

    #[error("Quote part {part} not found on repair {repair}")]
    PartNotFound { repair: String, part: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("No technician assigned. Assign one before adding evaluation notes")]
    NoTechnicianAssigned,

    #[error("Evaluation note is empty")]
    EmptyNote,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: RepairStatus, to: RepairStatus },

    #[error("Repair {id} changed during the update ({attempts} attempt(s)). Try again")]
    Conflict { id: String, attempts: u32 },

    #[error("Storage unavailable: {0}")]
    Storage(StoreError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::NotFound { .. } | WorkflowError::PartNotFound { .. } => {
                ErrorKind::NotFound
            }
            WorkflowError::Validation { .. } => ErrorKind::Validation,
            WorkflowError::NoTechnicianAssigned
            | WorkflowError::EmptyNote
            | WorkflowError::InvalidTransition { .. } => ErrorKind::PreconditionFailed,
            WorkflowError::Conflict { .. } | WorkflowError::Storage(_) => {
                ErrorKind::StorageUnavailable
            }
        }
    }

    fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => WorkflowError::NotFound { id },
            StoreError::Conflict { id, .. } => WorkflowError::Conflict { id, attempts: 1 },
            other => WorkflowError::Storage(other),
        }
    }
}

/// A typed value for one mutable top-level field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Customer(String),
    Device(String),
    DeviceType(DeviceType),
    ImeiOrSn(Option<String>),
    Password(Option<String>),
    ProblemDescription(String),
    Technician(String),
    Status(RepairStatus),
    FunctionalityTest(Option<FunctionalityTest>),
    Quote(Option<Quote>),
}

impl FieldUpdate {
    /// Parse a field name and raw text value (as typed on a command line)
    ///
    /// `functionality_test` and `quote` take YAML; an empty value clears
    /// optional fields.
    pub fn parse(field: &str, raw: &str) -> Result<Self, WorkflowError> {
        let field: RepairField = field
            .parse()
            .map_err(|e: String| WorkflowError::validation("field", e))?;
        let optional = |raw: &str| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        match field {
            RepairField::Customer => Ok(FieldUpdate::Customer(raw.to_string())),
            RepairField::Device => Ok(FieldUpdate::Device(raw.to_string())),
            RepairField::DeviceType => raw
                .parse()
                .map(FieldUpdate::DeviceType)
                .map_err(|e: String| WorkflowError::validation(field.key(), e)),
            RepairField::ImeiOrSn => Ok(FieldUpdate::ImeiOrSn(optional(raw))),
            RepairField::Password => Ok(FieldUpdate::Password(optional(raw))),
            RepairField::ProblemDescription => {
                Ok(FieldUpdate::ProblemDescription(raw.to_string()))
            }
            RepairField::Technician => Ok(FieldUpdate::Technician(raw.to_string())),
            RepairField::Status => raw
                .parse()
                .map(FieldUpdate::Status)
                .map_err(|e: String| WorkflowError::validation(field.key(), e)),
            RepairField::FunctionalityTest => {
                if raw.trim().is_empty() {
                    return Ok(FieldUpdate::FunctionalityTest(None));
                }
                serde_yml::from_str(raw)
                    .map(|t| FieldUpdate::FunctionalityTest(Some(t)))
                    .map_err(|e| WorkflowError::validation(field.key(), e.to_string()))
            }
            RepairField::Quote => {
                if raw.trim().is_empty() {
                    return Ok(FieldUpdate::Quote(None));
                }
                serde_yml::from_str(raw)
                    .map(|q| FieldUpdate::Quote(Some(q)))
                    .map_err(|e| WorkflowError::validation(field.key(), e.to_string()))
            }
            RepairField::Evaluation => Err(WorkflowError::validation(
                field.key(),
                "the evaluation log is append-only; add notes instead",
            )),
            RepairField::Id | RepairField::EntryDate | RepairField::Revision => Err(
                WorkflowError::validation(field.key(), "field cannot be changed after creation"),
            ),
        }
    }

    pub fn field(&self) -> RepairField {
        match self {
            FieldUpdate::Customer(_) => RepairField::Customer,
            FieldUpdate::Device(_) => RepairField::Device,
            FieldUpdate::DeviceType(_) => RepairField::DeviceType,
            FieldUpdate::ImeiOrSn(_) => RepairField::ImeiOrSn,
            FieldUpdate::Password(_) => RepairField::Password,
            FieldUpdate::ProblemDescription(_) => RepairField::ProblemDescription,
            FieldUpdate::Technician(_) => RepairField::Technician,
            FieldUpdate::Status(_) => RepairField::Status,
            FieldUpdate::FunctionalityTest(_) => RepairField::FunctionalityTest,
            FieldUpdate::Quote(_) => RepairField::Quote,
        }
    }

    fn to_value(&self) -> Result<Value, WorkflowError> {
        let value = match self {
            FieldUpdate::Customer(s)
            | FieldUpdate::Device(s)
            | FieldUpdate::ProblemDescription(s)
            | FieldUpdate::Technician(s) => serde_yml::to_value(s.trim()),
            FieldUpdate::DeviceType(t) => serde_yml::to_value(t),
            FieldUpdate::ImeiOrSn(s) | FieldUpdate::Password(s) => serde_yml::to_value(s),
            FieldUpdate::Status(s) => serde_yml::to_value(s),
            FieldUpdate::FunctionalityTest(t) => serde_yml::to_value(t),
            FieldUpdate::Quote(q) => serde_yml::to_value(q),
        };
        value.map_err(|e| WorkflowError::validation(self.field().key(), e.to_string()))
    }
}

/// Intake data for a new work order
#[derive(Debug, Clone, Default)]
pub struct RepairIntake {
    pub customer: String,
    pub device_type: DeviceType,
    pub device: String,
    pub problem_description: String,
    pub imei_or_sn: Option<String>,
    pub password: Option<String>,
    /// Defaults to [`NO_TECHNICIAN`]
    pub technician: Option<String>,
    pub functionality_test: Option<FunctionalityTest>,
}

impl RepairIntake {
    fn validate(&self) -> Result<(), WorkflowError> {
        if self.customer.trim().chars().count() < MIN_CUSTOMER_LEN {
            return Err(WorkflowError::validation(
                "customer",
                format!("must have at least {} characters", MIN_CUSTOMER_LEN),
            ));
        }
        if self.device.trim().is_empty() {
            return Err(WorkflowError::validation("device", "must not be empty"));
        }
        if self.problem_description.trim().chars().count() < MIN_PROBLEM_LEN {
            return Err(WorkflowError::validation(
                "problem_description",
                format!("must have at least {} characters", MIN_PROBLEM_LEN),
            ));
        }
        Ok(())
    }

    fn into_repair(self) -> Repair {
        let mut repair = Repair::new(
            self.customer.trim(),
            self.device_type,
            self.device.trim(),
            self.problem_description.trim(),
        );
        repair.imei_or_sn = self.imei_or_sn.filter(|s| !s.trim().is_empty());
        repair.password = self.password.filter(|s| !s.is_empty());
        repair.technician = self
            .technician
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TECHNICIAN.to_string());
        repair.functionality_test = self.functionality_test;
        repair
    }
}

/// Predicate for [`WorkflowEngine::list_repairs`]
#[derive(Debug, Clone, Default)]
pub struct RepairFilter {
    pub status: Option<RepairStatus>,
    /// Exact technician name (use [`NO_TECHNICIAN`] for unassigned)
    pub technician: Option<String>,
    /// Case-insensitive substring over the displayable fields
    pub search: Option<String>,
}

impl RepairFilter {
    pub fn matches(&self, repair: &Repair) -> bool {
        self.status.map_or(true, |s| repair.status == s)
            && self
                .technician
                .as_ref()
                .map_or(true, |t| repair.technician.eq_ignore_ascii_case(t.trim()))
            && self
                .search
                .as_ref()
                .map_or(true, |term| repair.matches_search(term))
    }
}

/// Workflow engine for repair work orders
pub struct WorkflowEngine<S> {
    store: S,
    config: WorkflowConfig,
}

impl<S: RepairStore> WorkflowEngine<S> {
    /// Create a new workflow engine over a store
    pub fn new(store: S, config: WorkflowConfig) -> Self {
        Self { store, config }
    }

    /// Get the workflow configuration
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check if a single-step status transition is valid
    pub fn is_valid_transition(&self, from: RepairStatus, to: RepairStatus) -> bool {
        from.next() == Some(to)
    }

    /// Get allowed transitions from the current status
    pub fn allowed_transitions(&self, current: RepairStatus) -> Vec<RepairStatus> {
        current.next().into_iter().collect()
    }

    /// Register a new work order at `Cotización`
    pub fn create_repair(&self, intake: RepairIntake) -> Result<Repair, WorkflowError> {
        intake.validate()?;
        let repair = intake.into_repair();
        self.store.create(&repair)?;
        info!(id = %repair.id, customer = %repair.customer, device = %repair.device, "repair registered");
        Ok(repair)
    }

    pub fn get_repair(&self, id: &str) -> Result<Repair, WorkflowError> {
        Ok(self.store.get(id)?)
    }

    /// Linear scan of all repairs, oldest intake first
    pub fn list_repairs(&self, filter: &RepairFilter) -> Result<Vec<Repair>, WorkflowError> {
        let mut repairs: Vec<Repair> = self
            .store
            .list()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        repairs.sort_by_key(Entity::created);
        Ok(repairs)
    }

    /// Merge a single field into the stored repair
    pub fn update_field(&self, id: &str, update: FieldUpdate) -> Result<Repair, WorkflowError> {
        self.update_fields(id, vec![update])
    }

    /// Merge several fields in one write; nothing is written if any is invalid
    pub fn update_fields(
        &self,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<Repair, WorkflowError> {
        let current = self.get_repair(id)?;
        let patch = self.build_patch(&current, &updates)?;
        if patch.is_empty() {
            return Ok(current);
        }
        let repair = self.store.patch(id, &patch)?;
        debug!(%id, fields = ?updates.iter().map(|u| u.field().key()).collect::<Vec<_>>(), "repair updated");
        Ok(repair)
    }

    /// Move the repair one step along the lifecycle
    ///
    /// At `Entregado` this is a no-op that returns the repair unchanged.
    pub fn advance_status(&self, id: &str) -> Result<Repair, WorkflowError> {
        let observed = self.get_repair(id)?;
        let Some(next) = observed.status.next() else {
            debug!(%id, "repair already delivered; nothing to advance");
            return Ok(observed);
        };

        let repair = self.read_modify_write(id, |current| {
            // Someone else moved it first; advancing again would skip a stage
            if current.status != observed.status {
                return Err(WorkflowError::Conflict {
                    id: id.to_string(),
                    attempts: 1,
                });
            }
            Ok(vec![FieldUpdate::Status(next)])
        })?;
        info!(%id, from = %observed.status, to = %repair.status, "repair status advanced");
        Ok(repair)
    }

    /// Append a note to the evaluation log
    ///
    /// The append is guarded by the revision the technician check was made
    /// on, so a concurrent unassignment can't slip in between.
    pub fn append_evaluation_note(
        &self,
        id: &str,
        note: &str,
        author: &str,
    ) -> Result<Repair, WorkflowError> {
        let note = note.trim();
        let author = author.trim();
        let attempts = self.config.conflict_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let current = self.get_repair(id)?;
            if !current.has_technician() || !is_assigned(author) {
                return Err(WorkflowError::NoTechnicianAssigned);
            }
            if note.is_empty() {
                return Err(WorkflowError::EmptyNote);
            }

            let entry = EvaluationEntry {
                note: note.to_string(),
                author: author.to_string(),
                date: Utc::now(),
            };
            let item = serde_yml::to_value(&entry)
                .map_err(|e| WorkflowError::validation("evaluation", e.to_string()))?;
            match self
                .store
                .append(id, RepairField::Evaluation, item, Some(current.revision))
            {
                Ok(repair) => {
                    info!(%id, %author, entries = repair.evaluation.len(), "evaluation note added");
                    return Ok(repair);
                }
                Err(StoreError::Conflict { expected, actual, .. }) => {
                    warn!(%id, attempt, expected, actual, "revision conflict on note; retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(WorkflowError::Conflict {
            id: id.to_string(),
            attempts,
        })
    }

    /// Replace the functionality test results
    pub fn set_functionality_test(
        &self,
        id: &str,
        results: FunctionalityTest,
    ) -> Result<Repair, WorkflowError> {
        self.update_field(id, FieldUpdate::FunctionalityTest(Some(results)))
    }

    /// Set one functionality test item, creating an all-`na` test if needed
    pub fn set_functionality_check(
        &self,
        id: &str,
        item: TestItem,
        result: TestResult,
    ) -> Result<Repair, WorkflowError> {
        self.set_functionality_checks(id, &[(item, result)], None)
    }

    /// Set several functionality test items and the observations in one write
    ///
    /// Items not named keep their stored result; `other: None` keeps the
    /// stored observations.
    pub fn set_functionality_checks(
        &self,
        id: &str,
        checks: &[(TestItem, TestResult)],
        other: Option<&str>,
    ) -> Result<Repair, WorkflowError> {
        let repair = self.read_modify_write(id, |current| {
            let mut test = current.functionality_test.clone().unwrap_or_default();
            for (item, result) in checks {
                test.set(*item, *result);
            }
            if let Some(other) = other {
                test.other = other.trim().to_string();
            }
            Ok(vec![FieldUpdate::FunctionalityTest(Some(test))])
        })?;
        debug!(%id, checks = checks.len(), "functionality test recorded");
        Ok(repair)
    }

    /// Add a part to the quote; the total is recomputed in the same write
    pub fn add_quote_part(
        &self,
        id: &str,
        name: &str,
        price: f64,
    ) -> Result<Repair, WorkflowError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkflowError::validation("part name", "must not be empty"));
        }
        let price = validate_amount(price).map_err(|e| WorkflowError::validation("price", e))?;
        let part = RepairPart::new(name, price);

        let repair = self.modify_quote(id, |quote| {
            quote.add_part(part.clone());
            Ok(())
        })?;
        info!(%id, part = %part.id, %price, "quote part added");
        Ok(repair)
    }

    /// Remove a part from the quote
    pub fn remove_quote_part(
        &self,
        id: &str,
        part_id: &str,
    ) -> Result<Repair, WorkflowError> {
        let part_not_found = || WorkflowError::PartNotFound {
            repair: id.to_string(),
            part: part_id.to_string(),
        };
        let part_id: EntityId = part_id.parse().map_err(|_| part_not_found())?;

        self.modify_quote(id, |quote| {
            quote
                .remove_part(&part_id)
                .map(|_| ())
                .ok_or_else(part_not_found)
        })
    }

    /// Set the labor charge; the total is recomputed in the same write
    pub fn set_labor(&self, id: &str, labor: f64) -> Result<Repair, WorkflowError> {
        let labor = validate_amount(labor).map_err(|e| WorkflowError::validation("labor", e))?;
        self.modify_quote(id, |quote| {
            quote.set_labor(labor);
            Ok(())
        })
    }

    fn modify_quote<F>(&self, id: &str, mut modify: F) -> Result<Repair, WorkflowError>
    where
        F: FnMut(&mut Quote) -> Result<(), WorkflowError>,
    {
        self.read_modify_write(id, |current| {
            let mut quote = current.quote.clone().unwrap_or_default();
            modify(&mut quote)?;
            Ok(vec![FieldUpdate::Quote(Some(quote))])
        })
    }

    /// Revision-guarded read-modify-write, retried on conflict
    fn read_modify_write<F>(&self, id: &str, mut build: F) -> Result<Repair, WorkflowError>
    where
        F: FnMut(&Repair) -> Result<Vec<FieldUpdate>, WorkflowError>,
    {
        let attempts = self.config.conflict_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let current = self.get_repair(id)?;
            let updates = build(&current)?;
            let patch = self
                .build_patch(&current, &updates)?
                .if_revision(current.revision);
            match self.store.patch(id, &patch) {
                Ok(repair) => return Ok(repair),
                Err(StoreError::Conflict { expected, actual, .. }) => {
                    warn!(%id, attempt, expected, actual, "revision conflict; retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(WorkflowError::Conflict {
            id: id.to_string(),
            attempts,
        })
    }

    /// Validate updates against the current state and turn them into a store patch
    fn build_patch(
        &self,
        current: &Repair,
        updates: &[FieldUpdate],
    ) -> Result<Patch, WorkflowError> {
        let mut patch = Patch::new();
        for update in updates {
            let update = self.check_update(current, update)?;
            patch = patch.set(update.field(), update.to_value()?);
        }
        Ok(patch)
    }

    fn check_update(
        &self,
        current: &Repair,
        update: &FieldUpdate,
    ) -> Result<FieldUpdate, WorkflowError> {
        let key = update.field().key();
        match update {
            FieldUpdate::Customer(s)
            | FieldUpdate::Device(s)
            | FieldUpdate::ProblemDescription(s)
            | FieldUpdate::Technician(s) => {
                if s.trim().is_empty() {
                    return Err(WorkflowError::validation(key, "must not be empty"));
                }
            }
            FieldUpdate::Status(to) => {
                let from = current.status;
                let allowed = match self.config.status_policy {
                    StatusPolicy::Override => true,
                    StatusPolicy::ForwardOnly => *to == from || from.next() == Some(*to),
                };
                if !allowed {
                    return Err(WorkflowError::InvalidTransition { from, to: *to });
                }
            }
            FieldUpdate::Quote(Some(quote)) => {
                for part in &quote.parts {
                    validate_amount(part.price)
                        .map_err(|e| WorkflowError::validation("price", e))?;
                }
                validate_amount(quote.labor).map_err(|e| WorkflowError::validation("labor", e))?;
                // Callers never get to pick the total
                return Ok(FieldUpdate::Quote(Some(quote.clone().normalized())));
            }
            FieldUpdate::DeviceType(_)
            | FieldUpdate::ImeiOrSn(_)
            | FieldUpdate::Password(_)
            | FieldUpdate::FunctionalityTest(_)
            | FieldUpdate::Quote(None) => {}
        }
        Ok(update.clone())
    }
}
