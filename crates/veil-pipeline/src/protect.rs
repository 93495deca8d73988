//! Protector: probe injection around the opaque transform.
//!
//! # Design
//! - Development mode returns the source untouched and never calls the transform.
//! - Probe identifiers come from an injected [`TokenSource`] so tests can pin them.
//! - Transform failures propagate as [`PipelineError::Transform`] with no retry.

use rand::Rng;
use tracing::{debug, info};
use veil_config::{BuildMode, ProtectionOptions};

use crate::error::{BoxError, PipelineError, PipelineResult};
use crate::model::{ProtectedText, SourceDocument};
use crate::transform::Transform;

/// Number of random bytes behind each probe identifier.
pub const TOKEN_BYTES: usize = 8;

/// Generator of fresh identifier suffixes for the anti-debug probe.
pub trait TokenSource {
    /// Next identifier suffix; must be a valid identifier continuation.
    fn next_token(&self) -> String;
}

/// Thread RNG backed tokens: [`TOKEN_BYTES`] bytes rendered as lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn next_token(&self) -> String {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::rng().fill(&mut bytes);
        hex::encode(bytes)
    }
}

/// Self-contained anti-debug probe with per-build identifiers.
#[must_use]
pub fn probe_block(tokens: &dyn TokenSource) -> String {
    let guard = tokens.next_token();
    let inner = tokens.next_token();
    let caught = tokens.next_token();
    format!(
        r"
(function() {{
  var _0x{guard} = function() {{
    var _0x{inner} = {{
      'check': function() {{
        try {{
          (function() {{
            return (function() {{}}).constructor('return this')();
          }})();
        }} catch (_0x{caught}) {{
          return false;
        }}
        return true;
      }}
    }};
    return _0x{inner};
  }}();

  if (!_0x{guard}.check()) {{
    console.clear();
  }}
}})();
"
    )
}

/// Wraps a [`Transform`] with mode handling and probe injection.
pub struct Protector {
    transform: Box<dyn Transform>,
    tokens: Box<dyn TokenSource>,
}

impl std::fmt::Debug for Protector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protector")
            .field("transform", &self.transform.name())
            .finish_non_exhaustive()
    }
}

impl Protector {
    /// Protector using random probe tokens.
    #[must_use]
    pub fn new(transform: Box<dyn Transform>) -> Self {
        Self::with_token_source(transform, Box::new(RandomTokens))
    }

    /// Protector with an explicit token generator.
    #[must_use]
    pub fn with_token_source(transform: Box<dyn Transform>, tokens: Box<dyn TokenSource>) -> Self {
        Self { transform, tokens }
    }

    /// Name of the wrapped transform.
    #[must_use]
    pub fn transform_name(&self) -> &str {
        self.transform.name()
    }

    /// Check that the wrapped transform can run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Transform`] when the preflight fails.
    pub fn preflight(&self) -> PipelineResult<()> {
        self.transform
            .preflight()
            .map_err(|err| self.transform_error(err))
    }

    /// Produce the text handed to the finisher.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Transform`] when the transform fails.
    pub fn protect(
        &self,
        source: &SourceDocument,
        options: &ProtectionOptions,
        mode: BuildMode,
    ) -> PipelineResult<ProtectedText> {
        if mode.is_development() {
            info!("development mode: skipping protection transform");
            return Ok(ProtectedText::passthrough(source.as_str().to_string()));
        }

        let resolved = options.resolve(mode);
        let probe_injected = resolved.wants_probe();
        let input = if probe_injected {
            let mut text = probe_block(self.tokens.as_ref());
            text.push_str(source.as_str());
            text
        } else {
            source.as_str().to_string()
        };

        debug!(
            transform = self.transform.name(),
            probe_injected,
            bytes = input.len(),
            "invoking protection transform"
        );
        let text = self
            .transform
            .transform(&input, &resolved.to_options_map())
            .map_err(|err| self.transform_error(err))?;

        Ok(ProtectedText {
            text,
            transformed: true,
            probe_injected,
        })
    }

    fn transform_error(&self, source: BoxError) -> PipelineError {
        PipelineError::transform(self.transform.name(), source)
    }
}
