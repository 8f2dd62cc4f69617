//! Trace rendering options
//!
//! Every option the writer understands is a field of [`TraceOptions`] with a
//! default. Loose host option maps are decoded into it at the boundary, and
//! [`TraceOptions::load`] layers a config file and environment overrides on
//! top of the defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Loose option map handed over by a host runtime
pub type OptionMap = serde_json::Map<String, serde_json::Value>;

/// Largest accepted `indent`
pub const MAX_INDENT: usize = 64;

/// Host spelling of `max_frames`
const MAX_DEPTH_KEY: &str = "maxDepth";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TraceFormat {
    /// Conventional multi-line stack trace
    #[default]
    Text,
    /// JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

/// Options controlling how a trace is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    /// Spaces prefixed to every emitted line
    pub indent: usize,

    /// Frames printed per error; `None` prints all of them
    pub max_frames: Option<usize>,

    /// Emit the cause chain. Off unless requested.
    pub include_causes: bool,

    /// Causes emitted before the chain is cut off
    pub max_causes: usize,

    /// Collapse trailing frames a cause shares with its enclosing error
    pub elide_common_frames: bool,

    /// Output format
    pub format: TraceFormat,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            indent: 0,
            max_frames: None,
            include_causes: false,
            max_causes: 16,
            elide_common_frames: true,
            format: TraceFormat::Text,
        }
    }
}

impl TraceOptions {
    /// Create a builder starting from the defaults
    pub fn builder() -> TraceOptionsBuilder {
        TraceOptionsBuilder::new()
    }

    /// Decode a host option map.
    ///
    /// Unrecognized keys are ignored and missing keys keep their defaults.
    /// `maxDepth` is accepted for `max_frames`; when both are present
    /// `max_frames` wins.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::InvalidArgument`] if a recognized key has a value
    /// of the wrong type or the result fails validation.
    pub fn from_map(map: &OptionMap) -> Result<Self> {
        let mut map = map.clone();
        if let Some(depth) = map.remove(MAX_DEPTH_KEY) {
            map.entry("max_frames").or_insert(depth);
        }

        let options: TraceOptions =
            serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| {
                TraceError::InvalidArgument(format!("Invalid trace option: {}", e))
            })?;

        options.validate()?;
        Ok(options)
    }

    /// Load options from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default options
    /// 2. `errtrace.toml` in the working directory
    /// 3. The file named by `ERRTRACE_CONFIG_PATH`, if set
    /// 4. `ERRTRACE_*` environment overrides (e.g. `ERRTRACE_MAX_FRAMES=25`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new().merge(Toml::file("errtrace.toml"));

        if let Ok(path) = std::env::var("ERRTRACE_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let options: TraceOptions = figment
            .merge(Env::prefixed("ERRTRACE_").ignore(&["config_path"]))
            .extract()?;

        options.validate()?;
        tracing::debug!(?options, "Loaded trace options");
        Ok(options)
    }

    /// Load options from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let options: TraceOptions = Figment::new().merge(Toml::file(path.as_ref())).extract()?;

        options.validate()?;
        Ok(options)
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns an error if `indent` exceeds [`MAX_INDENT`].
    pub fn validate(&self) -> Result<()> {
        if self.indent > MAX_INDENT {
            return Err(TraceError::InvalidArgument(format!(
                "indent {} exceeds maximum of {}",
                self.indent, MAX_INDENT
            )));
        }
        Ok(())
    }

    /// Line prefix derived from `indent`
    pub(crate) fn prefix(&self) -> String {
        " ".repeat(self.indent)
    }
}

/// Builder for [`TraceOptions`]
#[derive(Debug, Clone, Default)]
pub struct TraceOptionsBuilder {
    options: TraceOptions,
}

impl TraceOptionsBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line indent
    pub fn indent(mut self, indent: usize) -> Self {
        self.options.indent = indent;
        self
    }

    /// Limit the frames printed per error
    pub fn max_frames(mut self, max_frames: usize) -> Self {
        self.options.max_frames = Some(max_frames);
        self
    }

    /// Enable or disable the cause chain
    pub fn include_causes(mut self, include: bool) -> Self {
        self.options.include_causes = include;
        self
    }

    /// Limit the causes emitted
    pub fn max_causes(mut self, max_causes: usize) -> Self {
        self.options.max_causes = max_causes;
        self
    }

    /// Enable or disable eliding frames shared with the enclosing error
    pub fn elide_common_frames(mut self, elide: bool) -> Self {
        self.options.elide_common_frames = elide;
        self
    }

    /// Set the output format
    pub fn format(mut self, format: TraceFormat) -> Self {
        self.options.format = format;
        self
    }

    /// Build the options
    pub fn build(self) -> TraceOptions {
        self.options
    }
}
