use std::ops::Range;

pub type Row = Vec<String>;

const SEPARATOR: char = ' ';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    widths: Vec<usize>,
}

impl ColumnLayout {
    pub fn new(widths: Vec<usize>) -> Self {
        Self { widths }
    }

    /// Derives column widths from the dash ruler printed under a report header.
    ///
    /// Every space-separated token is one column. Runs of spaces yield
    /// zero-width columns so later columns stay aligned with the data lines.
    pub fn from_ruler(ruler: &str) -> Self {
        let ruler = ruler.trim_end();
        if ruler.is_empty() {
            return Self::default();
        }
        let widths = ruler
            .split(SEPARATOR)
            .map(|token| token.chars().count())
            .collect();
        Self { widths }
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn column_count(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Character span of every column within `line`, clamped to the line.
    pub fn spans(&self, line: &str) -> Vec<Range<usize>> {
        let len = line.chars().count();
        let mut start = 0usize;
        self.widths
            .iter()
            .map(|width| {
                let end = start.saturating_add(*width).min(len);
                let span = start.min(end)..end;
                // one separator column is consumed even past the ragged edge
                start = end + 1;
                span
            })
            .collect()
    }

    pub fn decode(&self, line: &str) -> Row {
        let boundaries: Vec<usize> = line
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(line.len()))
            .collect();
        self.spans(line)
            .into_iter()
            .map(|span| {
                line[boundaries[span.start]..boundaries[span.end]]
                    .trim()
                    .to_string()
            })
            .collect()
    }
}
