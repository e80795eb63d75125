/// Why a sandbox document could not be built for the given code.
///
/// These never reach callers of [`crate::synthesize`]; they are rendered as
/// the "Preview Error" page instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("Nothing to preview: the code is empty")]
    Empty,
}
