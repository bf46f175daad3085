use std::collections::VecDeque;

const MAX_ENTRIES: usize = 200;

/// Non-fatal event log for the widget.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: VecDeque<String>,
    warnings: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_ENTRIES),
            warnings: 0,
        }
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!("{msg}");
        self.push(format!("[INFO] {msg}"));
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!("{msg}");
        self.warnings += 1;
        self.push(format!("[WARN] {msg}"));
    }

    fn push(&mut self, line: String) {
        self.entries.push_back(line);
        while self.entries.len() > MAX_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Warnings recorded over the widget's lifetime, including evicted ones.
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|line| line.contains(needle))
    }
}
