use thiserror::Error;

use crate::program::ConfigId;

/// Runtime fault taxonomy for the tape machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// No branch of the current configuration accepts the symbol under the pointer.
    #[error("no matching branch for symbol under the pointer")]
    NoMatchingBranch,
    /// A pointer move or write fell outside the tape.
    #[error("pointer moved outside the tape")]
    TapeBoundsExceeded,
}

/// A latched runtime fault with the machine context it was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("{code} (configuration {configuration}, line {line}, pointer {pointer})")]
pub struct RuntimeFault {
    /// Fault classification.
    pub code: FaultCode,
    /// Configuration that was active when the fault was raised.
    pub configuration: ConfigId,
    /// Source line of the failing branch, or of the configuration when no
    /// branch matched.
    pub line: usize,
    /// Pointer position before the faulting step.
    pub pointer: usize,
    /// Symbol under the pointer before the faulting step.
    pub symbol: char,
}

#[cfg(test)]
mod tests {
    use super::{FaultCode, RuntimeFault};
    use crate::program::ConfigId;

    #[test]
    fn runtime_fault_display_names_context() {
        let fault = RuntimeFault {
            code: FaultCode::TapeBoundsExceeded,
            configuration: ConfigId(2),
            line: 7,
            pointer: 255,
            symbol: '1',
        };
        let text = fault.to_string();
        assert!(text.starts_with("pointer moved outside the tape"));
        assert!(text.contains("line 7"));
        assert!(text.contains("pointer 255"));
    }
}
