//! Failure values raised by backends
//!
//! A [`Failure`] is reference counted: cloning it keeps the same identity, so an
//! error translator can hand back exactly the failure (or cause) it received.
//! Identity is observable through [`Failure::same`].

use std::fmt;
use std::sync::Arc;

/// Classification of a failure raised through a backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Declared business failure the caller is expected to handle
    Checked,

    /// Runtime failure outside any declared contract
    Unchecked,

    /// Raised by the remote access layer, usually around the real cause
    RemoteAccess,

    /// Raised by the local access layer, usually around the real cause
    LocalAccess,
}

impl FailureKind {
    /// Whether a failure of this kind is a runtime (unchecked) failure.
    ///
    /// The local access wrapper is itself a runtime failure, so it counts.
    pub fn is_unchecked(&self) -> bool {
        matches!(self, FailureKind::Unchecked | FailureKind::LocalAccess)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Checked => "checked failure",
            FailureKind::Unchecked => "unchecked failure",
            FailureKind::RemoteAccess => "remote access failure",
            FailureKind::LocalAccess => "local access failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct FailureRepr {
    kind: FailureKind,
    message: String,
    cause: Option<Failure>,
}

/// A failure raised by a backend method or a construction entry point
#[derive(Clone)]
pub struct Failure {
    repr: Arc<FailureRepr>,
}

impl Failure {
    /// Create a failure without a cause
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            repr: Arc::new(FailureRepr {
                kind,
                message: message.into(),
                cause: None,
            }),
        }
    }

    /// Create a failure caused by `cause`
    pub fn with_cause(kind: FailureKind, message: impl Into<String>, cause: Failure) -> Self {
        Self {
            repr: Arc::new(FailureRepr {
                kind,
                message: message.into(),
                cause: Some(cause),
            }),
        }
    }

    pub fn checked(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Checked, message)
    }

    pub fn unchecked(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unchecked, message)
    }

    /// Remote access wrapper around `cause`
    pub fn remote_access(message: impl Into<String>, cause: Failure) -> Self {
        Self::with_cause(FailureKind::RemoteAccess, message, cause)
    }

    /// Local access wrapper around `cause`
    pub fn local_access(message: impl Into<String>, cause: Failure) -> Self {
        Self::with_cause(FailureKind::LocalAccess, message, cause)
    }

    /// New unchecked failure whose cause is exactly `cause`.
    ///
    /// The message is the cause's display form.
    pub fn wrapping(cause: Failure) -> Self {
        let message = cause.to_string();
        Self::with_cause(FailureKind::Unchecked, message, cause)
    }

    pub fn kind(&self) -> FailureKind {
        self.repr.kind
    }

    pub fn message(&self) -> &str {
        &self.repr.message
    }

    pub fn cause(&self) -> Option<&Failure> {
        self.repr.cause.as_ref()
    }

    /// Innermost failure of the cause chain (`self` when there is no cause)
    pub fn root_cause(&self) -> &Failure {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// Identity comparison: true only for clones of the same failure
    pub fn same(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.repr, &other.repr)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repr.message.is_empty() {
            write!(f, "{}", self.repr.kind)
        } else {
            write!(f, "{}: {}", self.repr.kind, self.repr.message)
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("kind", &self.repr.kind)
            .field("message", &self.repr.message)
            .field("cause", &self.repr.cause)
            .finish()
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.repr
            .cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_clone_keeps_identity() {
        let failure = Failure::checked("insufficient funds");
        let copy = failure.clone();
        assert!(failure.same(&copy));
        assert!(!failure.same(&Failure::checked("insufficient funds")));
    }

    #[test]
    fn test_wrapping_keeps_cause() {
        let cause = Failure::checked("insufficient funds");
        let wrapped = Failure::wrapping(cause.clone());

        assert_eq!(wrapped.kind(), FailureKind::Unchecked);
        assert!(wrapped.cause().unwrap().same(&cause));
        assert_eq!(wrapped.message(), "checked failure: insufficient funds");
    }

    #[test]
    fn test_local_access_counts_as_unchecked() {
        assert!(FailureKind::Unchecked.is_unchecked());
        assert!(FailureKind::LocalAccess.is_unchecked());
        assert!(!FailureKind::Checked.is_unchecked());
        assert!(!FailureKind::RemoteAccess.is_unchecked());
    }

    #[test]
    fn test_root_cause_and_source_chain() {
        let root = Failure::unchecked("disk gone");
        let remote = Failure::remote_access("call failed", root.clone());

        assert!(remote.root_cause().same(&root));
        assert!(root.root_cause().same(&root));
        assert_eq!(
            remote.source().map(|s| s.to_string()),
            Some("unchecked failure: disk gone".to_string())
        );
    }

    #[test]
    fn test_display_without_message() {
        assert_eq!(Failure::unchecked("").to_string(), "unchecked failure");
    }
}
