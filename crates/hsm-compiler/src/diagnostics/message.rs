/// Diagnostic kinds, grouped by the rule family that produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Structure
    MissingRoot,
    OrphanState,
    ParentCycle,
    MultipleInitialStates,
    HistoryNotComposite,
    HistoryOnParallel,

    // References
    UnregisteredAction,
    UnregisteredGuard,
    UnregisteredEvent,
    MissingTransitionTarget,
    TransitionToRoot,
    TimerTriggerWithoutTimer,

    // Limits
    TooManyStates,
    TooManyTransitions,
    DepthExceeded,
    PriorityOutOfRange,
    ZeroTimerDuration,
    LeafCapacityExceeded,
    TimerCapacityExceeded,
    HistoryCapacityExceeded,

    // Events
    OversizedInlinePayload,
    ByReferenceDeferred,

    // Slots and identity
    RegionSlotConflict,
    DuplicateStableId,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ByReferenceDeferred | Self::TimerTriggerWithoutTimer => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Base message, used when no detail is given.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::MissingRoot => "machine has no top-level state",
            Self::OrphanState => "state is not reachable from the root",
            Self::ParentCycle => "parent chain forms a cycle",
            Self::MultipleInitialStates => "more than one initial child",
            Self::HistoryNotComposite => "history state has no children to remember",
            Self::HistoryOnParallel => "parallel states cannot keep history",

            Self::UnregisteredAction => "action is not registered",
            Self::UnregisteredGuard => "guard is not registered",
            Self::UnregisteredEvent => "event is not declared",
            Self::MissingTransitionTarget => "transition has no target",
            Self::TransitionToRoot => "transition targets the root",
            Self::TimerTriggerWithoutTimer => "timer transition on a state without a timer",

            Self::TooManyStates => "too many states",
            Self::TooManyTransitions => "too many transitions",
            Self::DepthExceeded => "hierarchy too deep",
            Self::PriorityOutOfRange => "priority out of range",
            Self::ZeroTimerDuration => "timer duration must be positive",
            Self::LeafCapacityExceeded => "too many simultaneously active leaves",
            Self::TimerCapacityExceeded => "too many timer slots",
            Self::HistoryCapacityExceeded => "too many history slots",

            Self::OversizedInlinePayload => "payload does not fit inline",
            Self::ByReferenceDeferred => "by-reference payload is lost when deferred",

            Self::RegionSlotConflict => "slot claimed by co-active states",
            Self::DuplicateStableId => "stable id used more than once",
        }
    }

    /// Template for custom messages; `{}` is replaced by caller detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnregisteredAction => "action `{}` is not registered".to_string(),
            Self::UnregisteredGuard => "guard `{}` is not registered".to_string(),
            Self::UnregisteredEvent => "event `{}` is not declared".to_string(),
            Self::OversizedInlinePayload => {
                "payload of event `{}` does not fit inline; mark it by-reference".to_string()
            }
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One validator finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    /// State the finding is about, if any.
    pub state: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(state) = &self.state {
            write!(f, " (in `{state}`)")?;
        }
        Ok(())
    }
}
