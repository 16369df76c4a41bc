//! Decision tree models.
//!
//! Every top-level `select()` call records the stages it walked through, for
//! debuggability. The log is reset at the start of each call and accumulates
//! across the retry rounds of that one logical selection.

use serde::Serialize;
use serde_json::Value;

/// A stage taken during one selection attempt.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStage {
    CheckShortCircuit,
    GetAllServices,
    FilterToWhitelist,
    FilterFromBlacklist,
    FilterOutKnownUnhealthy,
    GetSelectionRound,
    RoundFailedRetry,
    NoServicesLeftToTry,
    SelectedFromBackup,
    FailedAndResetting,
    MadeASelection,
}

/// One entry of the decision log: a stage plus the value observed at it.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Decision {
    pub stage: DecisionStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<Value>,
}

impl Decision {
    pub fn new(stage: DecisionStage) -> Self {
        Self { stage, val: None }
    }

    pub fn with_val(stage: DecisionStage, val: impl Into<Value>) -> Self {
        Self {
            stage,
            val: Some(val.into()),
        }
    }
}
