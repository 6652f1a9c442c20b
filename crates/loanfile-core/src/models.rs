//! Core data models for loanfile.
//!
//! These types are shared across all loanfile crates and represent the field
//! schema, extraction candidates, resolved submission fields and the
//! eligibility snapshot derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// =============================================================================
// FIELD SCHEMA TYPES
// =============================================================================

/// Declared value type of a schema field. Drives the fill test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
        }
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            _ => Err(format!("Invalid field type: {}", s)),
        }
    }
}

/// One entry of the master field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Display name; never affects reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldDefinition {
    /// Required field of the given type.
    pub fn required(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            required: true,
            label: None,
        }
    }

    /// Optional field of the given type.
    pub fn optional(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            required: false,
            label: None,
        }
    }
}

// =============================================================================
// CANDIDATE TYPES
// =============================================================================

/// Extractor-reported confidence. Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Parse an extractor-supplied label. Missing or unknown labels rank as `Low`.
    pub fn parse_lenient(label: Option<&str>) -> Self {
        label
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid confidence: {}", s)),
        }
    }
}

/// A field value as extracted (`raw`) and after extractor normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(default)]
    pub raw: JsonValue,
    #[serde(default)]
    pub normalized: JsonValue,
}

impl FieldValue {
    /// Value with only a raw component.
    pub fn raw(raw: impl Into<JsonValue>) -> Self {
        Self {
            raw: raw.into(),
            normalized: JsonValue::Null,
        }
    }

    /// Set the normalized component.
    pub fn with_normalized(mut self, normalized: impl Into<JsonValue>) -> Self {
        self.normalized = normalized.into();
        self
    }

    /// The value used for fill tests: `normalized` when present, else `raw`.
    pub fn effective(&self) -> &JsonValue {
        if self.normalized.is_null() {
            &self.raw
        } else {
            &self.normalized
        }
    }
}

/// One conflicting value, as a canonical string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub raw: JsonValue,
}

/// Where in a document a value was seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_hint: Option<String>,
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

/// Outcome of running the field's validation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
}

impl FieldValidation {
    /// Validation ran and passed.
    pub fn is_clean_pass(&self) -> bool {
        self.validated && self.passed
    }

    /// Validation ran and failed with at least one reported error.
    pub fn failed(&self) -> bool {
        self.validated && !self.passed && !self.errors.is_empty()
    }
}

/// Provenance of an extracted value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Traceability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
}

impl Traceability {
    /// Both document name and file id are populated.
    pub fn is_complete(&self) -> bool {
        let named = self
            .document_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        let filed = self.file_id.as_deref().is_some_and(|f| !f.trim().is_empty());
        named && filed
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldSource {
    /// Chosen from a document extraction pass.
    Extraction {
        #[serde(rename = "documentEntryId")]
        document_entry_id: Uuid,
        #[serde(rename = "fileId", default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extracted_at: Option<DateTime<Utc>>,
    },
    /// Set by a reviewer and pinned against re-extraction.
    Manual {
        #[serde(rename = "actorId")]
        actor_id: String,
        #[serde(rename = "setAt")]
        set_at: DateTime<Utc>,
    },
}

impl FieldSource {
    pub fn is_manual(&self) -> bool {
        matches!(self, FieldSource::Manual { .. })
    }

    /// Document entry this value was sourced from, if any.
    pub fn document_entry_id(&self) -> Option<Uuid> {
        match self {
            FieldSource::Extraction {
                document_entry_id, ..
            } => Some(*document_entry_id),
            FieldSource::Manual { .. } => None,
        }
    }
}

/// A candidate as emitted by the extraction collaborator.
///
/// Every field is optional on the wire and deserializes leniently: `null`,
/// wrong-typed or malformed members become `None` or empty instead of failing
/// the record. The collector turns records into [`ExtractedCandidate`]s and
/// drops the ones without a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default, deserialize_with = "lenient::label")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient::field_value")]
    pub value: Option<FieldValue>,
    /// Non-string labels are dropped and rank as `low`.
    #[serde(default, deserialize_with = "lenient::label")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient::conflicts")]
    pub conflicts: Vec<Conflict>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub occurrences: Vec<Occurrence>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub validation: Option<FieldValidation>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub traceability: Option<Traceability>,
}

/// Tolerant deserializers for extractor output.
///
/// Each reads the member as a raw JSON value first, so no shape mismatch can
/// fail the enclosing record.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    use super::{Conflict, FieldValue};

    /// A string member; anything else is `None`.
    pub fn label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::String(s) => Some(s),
            _ => None,
        })
    }

    /// Any member that parses as `T`; anything else is `None`.
    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// Array elements that parse as `T`; a non-array is empty.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    /// `{ "raw": .. }` objects, or bare values taken as the raw value.
    pub fn conflicts<'de, D>(deserializer: D) -> Result<Vec<Conflict>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::Object(mut map) if map.contains_key("raw") => Conflict {
                        raw: map.remove("raw").unwrap_or(JsonValue::Null),
                    },
                    other => Conflict { raw: other },
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// `{ "raw", "normalized" }` objects, or a bare value taken as raw.
    pub fn field_value<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => None,
            JsonValue::Object(mut map)
                if map.contains_key("raw") || map.contains_key("normalized") =>
            {
                Some(FieldValue {
                    raw: map.remove("raw").unwrap_or(JsonValue::Null),
                    normalized: map.remove("normalized").unwrap_or(JsonValue::Null),
                })
            }
            other => Some(FieldValue::raw(other)),
        })
    }
}

/// One field-value proposal from one document's extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCandidate {
    pub key: String,
    pub value: FieldValue,
    pub confidence: Confidence,
    pub conflicts: Vec<Conflict>,
    pub occurrences: Vec<Occurrence>,
    pub notes: Option<String>,
    pub validation: Option<FieldValidation>,
    pub traceability: Traceability,
    pub source: FieldSource,
}

/// A document attached to a submission, with its extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: Uuid,
    #[serde(default)]
    pub file_id: Option<String>,
    pub document_name: String,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
    /// Entries that are not objects are skipped.
    #[serde(default, deserialize_with = "lenient::list")]
    pub extracted_candidates: Vec<CandidateRecord>,
}

// =============================================================================
// RESOLVED FIELD TYPES
// =============================================================================

/// The canonical value of one field key on a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub key: String,
    pub value: FieldValue,
    pub confidence: Confidence,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceability: Option<Traceability>,
    pub source: FieldSource,
    #[serde(default)]
    pub is_reviewed: bool,
    #[serde(rename = "reviewedAt", default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer who marked the field reviewed; `None` for auto-review.
    #[serde(rename = "reviewedBy", default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

impl ResolvedField {
    pub fn is_manual(&self) -> bool {
        self.source.is_manual()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn failed_validation(&self) -> bool {
        self.validation.as_ref().is_some_and(FieldValidation::failed)
    }

    /// Whether the field belongs in a needs-review list once it is filled.
    pub fn needs_review(&self) -> bool {
        !self.is_reviewed
            || self.has_conflicts()
            || self.confidence == Confidence::Low
            || self.failed_validation()
    }
}

// =============================================================================
// ELIGIBILITY TYPES
// =============================================================================

/// Fill and review counts for a submission, recomputed in full on every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    pub eligible: bool,
    pub required_total: usize,
    pub filled_required: usize,
    pub missing_required_keys: Vec<String>,
    pub needs_review_keys: Vec<String>,
    pub optional_total: usize,
    pub filled_optional: usize,
    pub missing_optional_keys: Vec<String>,
    pub needs_review_optional_keys: Vec<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SUBMISSION TYPES
// =============================================================================

/// Lifecycle status of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Documents uploaded, nothing reviewed yet
    #[default]
    Pending,
    /// Required fields missing; awaiting reviewers
    Review,
    /// Every required field is filled
    Completed,
}

impl SubmissionStatus {
    /// Status after a recompute with the given eligibility.
    ///
    /// Eligible submissions complete; a pending submission moves to review;
    /// anything else keeps its status.
    pub fn after_recompute(self, eligible: bool) -> Self {
        if eligible {
            Self::Completed
        } else if self == Self::Pending {
            Self::Review
        } else {
            self
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Review => write!(f, "review"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "review" => Ok(Self::Review),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid submission status: {}", s)),
        }
    }
}

/// A loan submission with its embedded resolved fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub fields: Vec<ResolvedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<EligibilitySnapshot>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// New pending submission with no fields.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            status: SubmissionStatus::Pending,
            fields: Vec::new(),
            eligibility: None,
            updated_at: Utc::now(),
        }
    }

    /// Look up a resolved field by key.
    pub fn field(&self, key: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// The full next state written by one recompute. Replaced atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedState {
    pub fields: Vec<ResolvedField>,
    pub eligibility: EligibilitySnapshot,
    pub status: SubmissionStatus,
}

// =============================================================================
// MANUAL EDIT TYPES
// =============================================================================

/// A reviewer-supplied value for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualFieldSet {
    pub key: String,
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A batch of manual edits. Applied in order: set, review, clear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEdits {
    #[serde(default)]
    pub set: Vec<ManualFieldSet>,
    #[serde(default)]
    pub review: Vec<String>,
    #[serde(default, alias = "clearManual")]
    pub clear_manual: Vec<String>,
}

impl ManualEdits {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.review.is_empty() && self.clear_manual.is_empty()
    }
}

/// Kind of manual field mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    Set,
    Review,
    ClearManual,
}

impl std::fmt::Display for FieldAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Review => write!(f, "review"),
            Self::ClearManual => write!(f, "clear_manual"),
        }
    }
}

/// Audit record for one applied manual mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEvent {
    pub submission_id: Uuid,
    pub key: String,
    pub action: FieldAction,
    pub old_value: Option<FieldValue>,
    pub new_value: Option<FieldValue>,
    pub actor_id: String,
    pub occurred_at: DateTime<Utc>,
}

// =============================================================================
// RECOMPUTE TYPES
// =============================================================================

/// What caused a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeTrigger {
    DocumentAdded,
    DocumentReplaced,
    DocumentRemoved,
    ManualEdit,
    Explicit,
}

impl std::fmt::Display for RecomputeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentAdded => write!(f, "document_added"),
            Self::DocumentReplaced => write!(f, "document_replaced"),
            Self::DocumentRemoved => write!(f, "document_removed"),
            Self::ManualEdit => write!(f, "manual_edit"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// Keys whose resolved value appeared, changed or disappeared in one recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChanges {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub dropped: Vec<String>,
}

impl FieldChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.dropped.is_empty()
    }
}

/// Result returned to callers of recompute and manual edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeOutcome {
    pub submission_id: Uuid,
    pub resolved_fields: Vec<ResolvedField>,
    pub eligibility: EligibilitySnapshot,
    pub status: SubmissionStatus,
    pub previous_status: SubmissionStatus,
    pub changes: FieldChanges,
}
