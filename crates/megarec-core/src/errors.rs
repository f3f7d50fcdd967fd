use thiserror::Error;

/// Result type alias using MegarecError
pub type Result<T> = std::result::Result<T, MegarecError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecErrorKind {
    // Resolution
    CycleDetected,
    SchemaContractViolation,
    SchemaCallbackFailed,

    // Construction
    IncompleteSchema,
    InvalidConfig,

    // Lifecycle
    Destroyed,

    // Internal
    Internal,
}

impl RecErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            RecErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            RecErrorKind::SchemaContractViolation => "ERR_SCHEMA_CONTRACT_VIOLATION",
            RecErrorKind::SchemaCallbackFailed => "ERR_SCHEMA_CALLBACK_FAILED",
            RecErrorKind::IncompleteSchema => "ERR_INCOMPLETE_SCHEMA",
            RecErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            RecErrorKind::Destroyed => "ERR_DESTROYED",
            RecErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus the record
/// and attribute context the failure happened in.
#[derive(Debug, Clone)]
pub struct RecError {
    kind: RecErrorKind,
    op: Option<String>,
    record: Option<String>,
    key: Option<String>,
    message: String,
}

impl RecError {
    /// Create a new error with the specified kind
    pub fn new(kind: RecErrorKind) -> Self {
        Self {
            kind,
            op: None,
            record: None,
            key: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add record context
    pub fn with_record(mut self, record: impl Into<String>) -> Self {
        self.record = Some(record.into());
        self
    }

    /// Add attribute key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> RecErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn record(&self) -> Option<&str> {
        self.record.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(record) = &self.record {
            write!(f, " (record: {})", record)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        Ok(())
    }
}

impl std::error::Error for RecError {}

// ========== End Error Facility ==========

/// Error taxonomy for attribute resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MegarecError {
    // ===== Resolution Errors =====
    /// An attribute's classification re-entered itself on the same record
    #[error("Cyclic dependency: attribute '{key}' of {record} re-entered its own resolution")]
    CyclicDependency { record: String, key: String },

    /// A schema-reported descriptor is structurally invalid
    #[error("Schema contract violation for attribute '{key}': {reason}")]
    SchemaContractViolation { key: String, reason: String },

    /// A schema callback reported its own failure
    #[error("Schema callback failed for attribute '{key}': {message}")]
    SchemaCallbackFailed { key: String, message: String },

    // ===== Construction Errors =====
    /// A schema was assembled without one of its required operations
    #[error("Incomplete schema: missing {operation}")]
    IncompleteSchema { operation: String },

    /// Engine configuration could not be parsed or is invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ===== Lifecycle Errors =====
    /// Attribute access on a record that was already destroyed
    #[error("Record was destroyed: {record}")]
    RecordDestroyed { record: String },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<MegarecError> for RecError {
    fn from(err: MegarecError) -> Self {
        match err {
            MegarecError::CyclicDependency { record, key } => {
                RecError::new(RecErrorKind::CycleDetected)
                    .with_op("resolve_value")
                    .with_record(record)
                    .with_key(key)
                    .with_message("Attribute re-entered its own resolution")
            }
            MegarecError::SchemaContractViolation { key, reason } => {
                RecError::new(RecErrorKind::SchemaContractViolation)
                    .with_key(key)
                    .with_message(reason)
            }
            MegarecError::SchemaCallbackFailed { key, message } => {
                RecError::new(RecErrorKind::SchemaCallbackFailed)
                    .with_key(key)
                    .with_message(message)
            }
            MegarecError::IncompleteSchema { operation } => {
                RecError::new(RecErrorKind::IncompleteSchema)
                    .with_op("build_schema")
                    .with_message(format!("Missing {}", operation))
            }
            MegarecError::InvalidConfig { message } => {
                RecError::new(RecErrorKind::InvalidConfig).with_message(message)
            }
            MegarecError::RecordDestroyed { record } => RecError::new(RecErrorKind::Destroyed)
                .with_record(record)
                .with_message("Record was destroyed"),
            MegarecError::Internal { message } => {
                RecError::new(RecErrorKind::Internal).with_message(message)
            }
        }
    }
}
