use crate::application::pipeline::stage::StageName;
use crate::application::pipeline::SourceError;

/// Yields the heights a run visits, in increasing order
pub trait Source: Send {
    /// Advances to the next height. The first call yields the start height.
    fn next(&mut self) -> bool;

    fn current(&self) -> i64;

    /// Whether `stage` should be skipped for the current height
    fn skip(&self, stage: StageName) -> bool;

    /// Whether `task` should be skipped for the current height. Defaults to
    /// the decision for its whole stage.
    fn skip_task(&self, stage: StageName, _task: &str) -> bool {
        self.skip(stage)
    }

    /// Error that ended iteration early, if any
    fn err(&self) -> Option<&SourceError>;

    /// Number of heights in the range
    fn len(&self) -> i64;

    fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// Walks `[start, end]` one height at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightCursor {
    start: i64,
    end: i64,
    current: i64,
    started: bool,
}

impl HeightCursor {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            current: start,
            started: false,
        }
    }

    pub fn advance(&mut self) -> bool {
        if !self.started {
            self.started = true;
            return self.start <= self.end;
        }
        if self.current < self.end {
            self.current += 1;
            return true;
        }
        false
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn len(&self) -> i64 {
        (self.end - self.start + 1).max(0)
    }

    /// Splits the range into at most `n` contiguous, disjoint chunks
    pub fn split(&self, n: usize) -> Vec<(i64, i64)> {
        let len = self.len();
        if len == 0 {
            return Vec::new();
        }
        let n = (n.max(1) as i64).min(len);
        let base = len / n;
        let extra = len % n;

        let mut chunks = Vec::with_capacity(n as usize);
        let mut start = self.start;
        for i in 0..n {
            let size = base + i64::from(i < extra);
            chunks.push((start, start + size - 1));
            start += size;
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_yields_start_first_and_stops_at_end() {
        let mut cursor = HeightCursor::new(5, 7);
        let mut visited = Vec::new();
        while cursor.advance() {
            visited.push(cursor.current());
        }
        assert_eq!(visited, vec![5, 6, 7]);
        assert!(!cursor.advance());
    }

    #[test]
    fn test_empty_range_yields_nothing() {
        let mut cursor = HeightCursor::new(10, 9);
        assert!(!cursor.advance());
        assert_eq!(cursor.len(), 0);
    }

    #[test]
    fn test_split_covers_range_without_overlap() {
        let cursor = HeightCursor::new(1, 10);
        assert_eq!(cursor.split(3), vec![(1, 4), (5, 7), (8, 10)]);
        assert_eq!(cursor.split(20).len(), 10);
        assert_eq!(cursor.split(0), vec![(1, 10)]);
    }
}
