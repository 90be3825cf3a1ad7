//! Diagnostic infrastructure for error reporting
//!
//! Converts processing errors and warnings into codespan diagnostics that a host
//! can render to a terminal or serialize to JSON for IDE integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use termcolor::{ColorChoice, NoColor, StandardStream};

use crate::error::{ProcessingError, ProcessingWarning};
use crate::model::{ElementRef, Span};

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The underlying codespan diagnostic
    inner: CsDiagnostic<usize>,
    /// Error code (e.g., "E3002")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.inner = self.inner.with_code(code.0);
        self.code = Some(code);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        let label = Label::primary(span.file_id, span.start as usize..span.end as usize)
            .with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Point at `element`, falling back to a note when it has no source location
    fn at_element(self, element: &ElementRef, label: &str) -> Self {
        match element.span {
            Some(span) => self.with_primary_label(span, label),
            None => self.with_note(format!("at {}", element)),
        }
    }

    /// Create diagnostic from a ProcessingError
    pub fn from_processing_error(error: &ProcessingError) -> Self {
        use ProcessingError::*;

        let diag = Diagnostic::error(error.to_string()).with_code(error_code(error));
        match error {
            DefaultPackage { element } => diag
                .at_element(element, "declared in the default package")
                .with_help("Move the type into a named package"),
            ForeignSingleton { element, expected, .. } => diag
                .at_element(element, "wrong singleton marker")
                .with_help(format!("Replace the marker with {}", expected)),
            StaticMemberNotExecutable {
                element,
                executable,
            } => diag
                .at_element(element, "static method")
                .with_help(format!("Annotate the method with {}", executable)),
            InaccessibleMember {
                element,
                reflective,
            }
            | PrivateExecutable {
                element,
                reflective,
            }
            | ReflectionNotPermitted {
                element,
                reflective,
            } => diag
                .at_element(element, "not accessible to generated code")
                .with_help(format!("Annotate the member with {}", reflective)),
            FinalClassAdvised { element }
            | FinalMethodAdvised { element }
            | FinalMethodInheritsAdvice { element } => {
                diag.at_element(element, "declared final")
            }
            PrivateMethodAdvised { element } => diag.at_element(element, "declared private"),
            StaticMethodAdvised { element } => diag.at_element(element, "declared static"),
            AdapterTypeMismatch {
                element,
                position,
                ..
            } => diag.at_element(element, format!("parameter {} does not match", position).as_str()),
            NotSamType { element, target, .. } => diag
                .at_element(element, "adapter target")
                .with_note(format!("{} must declare exactly one abstract method", target)),
            UnproxyableConstructor { element, .. } => diag
                .at_element(element, "produced here")
                .with_help("Set proxyTargetMode to allow or warn on the around advice"),
            _ => {
                let element = error.element();
                diag.at_element(element, "here")
            }
        }
    }

    /// Create diagnostic from a ProcessingWarning
    pub fn from_processing_warning(warning: &ProcessingWarning) -> Self {
        let code = match warning {
            ProcessingWarning::ProxiedWithEmptyArguments { .. } => ErrorCode("W5001"),
        };
        Diagnostic::warning(warning.to_string())
            .with_code(code)
            .at_element(warning.element(), "proxied with empty arguments")
    }

    pub fn severity(&self) -> Severity {
        self.inner.severity
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Emit the diagnostic to stderr
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Render the diagnostic without colors
    pub fn render(&self, files: &SimpleFiles<String, String>) -> Result<String, codespan_reporting::files::Error> {
        let mut writer = NoColor::new(Vec::new());
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic for IDE integration
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "E3002")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: Option<String>,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file_id = label.file_id;
                let file_name = files.name(file_id).ok()?;
                let start = files.location(file_id, label.range.start).ok()?;
                let end = files.location(file_id, label.range.end).ok()?;

                Some(JsonLabel {
                    file: file_name,
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a ProcessingError
pub fn error_code(error: &ProcessingError) -> ErrorCode {
    use ProcessingError::*;

    match error {
        DefaultPackage { .. } => ErrorCode("E1001"),
        EnumBean { .. } => ErrorCode("E1002"),
        ForeignSingleton { .. } => ErrorCode("E1003"),
        UnresolvedType { .. } => ErrorCode("E1004"),
        InvalidConfigurationMethod { .. } => ErrorCode("E1005"),
        StaticMemberNotExecutable { .. } => ErrorCode("E2001"),
        InaccessibleMember { .. } => ErrorCode("E2002"),
        PrivateExecutable { .. } => ErrorCode("E2003"),
        ReflectionNotPermitted { .. } => ErrorCode("E2004"),
        FinalClassAdvised { .. } => ErrorCode("E3001"),
        FinalMethodAdvised { .. } => ErrorCode("E3002"),
        FinalMethodInheritsAdvice { .. } => ErrorCode("E3003"),
        PrivateMethodAdvised { .. } => ErrorCode("E3004"),
        StaticMethodAdvised { .. } => ErrorCode("E3005"),
        AdapterTargetNotInterface { .. } => ErrorCode("E4001"),
        NotSamType { .. } => ErrorCode("E4002"),
        AdapterArityMismatch { .. } => ErrorCode("E4003"),
        AdapterTypeMismatch { .. } => ErrorCode("E4004"),
        SuspendAdapter { .. } => ErrorCode("E4005"),
        ExecutableOnUnsupportedType { .. } => ErrorCode("E5001"),
        PreDestroyOnUnsupportedType { .. } => ErrorCode("E5002"),
        AopOnUnsupportedType { .. } => ErrorCode("E5003"),
        UnproxyableConstructor { .. } => ErrorCode("E5004"),
        PrivateProducerField { .. } => ErrorCode("E5005"),
        MissingPreDestroyMethod { .. } => ErrorCode("E5006"),
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}
