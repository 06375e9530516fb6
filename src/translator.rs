//! Error translation strategies
//!
//! An [`ErrorTranslator`] turns a failure raised by a backend method into the
//! failure the delegate's caller sees. Translators are pure: they only
//! inspect the failure and its cause chain.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::failure::{Failure, FailureKind};

/// Strategy converting a backend failure into a caller-facing failure
pub trait ErrorTranslator: Send + Sync {
    fn convert(&self, failure: Failure) -> Failure;
}

impl<F> ErrorTranslator for F
where
    F: Fn(Failure) -> Failure + Send + Sync,
{
    fn convert(&self, failure: Failure) -> Failure {
        self(failure)
    }
}

/// Wraps every failure in a new unchecked failure caused by it
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapAll;

impl ErrorTranslator for WrapAll {
    fn convert(&self, failure: Failure) -> Failure {
        Failure::wrapping(failure)
    }
}

/// Hides the access layer's wrapper failures from callers
///
/// - A remote access failure caused by an unchecked failure yields that cause;
///   otherwise a new unchecked failure wrapping the remote access failure.
/// - A local access failure caused by an unchecked failure yields that cause;
///   otherwise the local access failure itself.
/// - Anything else is returned untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessNormalizer;

impl ErrorTranslator for AccessNormalizer {
    fn convert(&self, failure: Failure) -> Failure {
        match failure.kind() {
            FailureKind::RemoteAccess => match unchecked_cause(&failure) {
                Some(cause) => cause,
                None => Failure::wrapping(failure),
            },
            FailureKind::LocalAccess => unchecked_cause(&failure).unwrap_or(failure),
            _ => failure,
        }
    }
}

fn unchecked_cause(failure: &Failure) -> Option<Failure> {
    failure
        .cause()
        .filter(|cause| cause.kind().is_unchecked())
        .cloned()
}

/// Config-selectable translator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TranslatorPolicy {
    /// [`WrapAll`]
    WrapAll,

    /// [`AccessNormalizer`]
    #[default]
    AccessNormalizing,
}

impl TranslatorPolicy {
    pub fn into_translator(self) -> Arc<dyn ErrorTranslator> {
        match self {
            TranslatorPolicy::WrapAll => Arc::new(WrapAll),
            TranslatorPolicy::AccessNormalizing => Arc::new(AccessNormalizer),
        }
    }
}
