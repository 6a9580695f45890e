use std::fmt;

/// Outcome tally for one sending run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub successful: usize,
    pub failed: usize,
}

impl DispatchStats {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sending completed")?;
        writeln!(f, "  Successful: {}", self.successful)?;
        writeln!(f, "  Failed: {}", self.failed)?;
        write!(f, "  Total: {}", self.total())
    }
}

pub const SAFETY_TIPS: [&str; 3] = [
    "Wait at least 1 hour before sending more messages",
    "Only message people who have your number saved",
    "Use personalized messages when possible",
];
