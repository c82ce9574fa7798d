use std::collections::VecDeque;

/// Pending action codes for one agent, consumed one per tick.
#[derive(Debug, Default, Clone)]
pub struct ActionQueue {
    pending: VecDeque<String>,
    script: Vec<String>,
    cursor: usize,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays `script` forever once the pending codes run out.
    pub fn looping(script: Vec<String>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    pub fn push(&mut self, code: impl Into<String>) {
        self.pending.push_back(code.into());
    }

    pub fn next_code(&mut self) -> Option<String> {
        if let Some(code) = self.pending.pop_front() {
            return Some(code);
        }

        if self.script.is_empty() {
            return None;
        }

        let code = self.script[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.script.len();
        Some(code)
    }
}
