//! Column-aligned tables

use console::{measure_text_width, pad_str, style, Alignment};

/// Plain text table, columns padded to their widest cell
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with bold headers
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; cells may carry styling
    pub fn row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Rendered lines, trailing spaces trimmed
    pub fn lines(&self) -> Vec<String> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0; columns];
        for line in std::iter::once(&self.headers).chain(&self.rows) {
            for (idx, cell) in line.iter().enumerate() {
                widths[idx] = widths[idx].max(measure_text_width(cell));
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        if !self.headers.is_empty() {
            let headers: Vec<String> = self
                .headers
                .iter()
                .map(|h| style(h).bold().to_string())
                .collect();
            lines.push(render_line(&headers, &widths));
        }
        for row in &self.rows {
            lines.push(render_line(row, &widths));
        }
        lines
    }

    /// Print to stdout
    pub fn print(&self) {
        for line in self.lines() {
            println!("{}", line);
        }
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| pad_str(cell, width, Alignment::Left, None).into_owned())
        .collect();
    padded.join("  ").trim_end().to_string()
}
