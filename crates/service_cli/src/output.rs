//! Terminal rendering: box-drawn tables and pretty JSON.

use clap::ValueEnum;
use serde::Serialize;

use crate::Result;

/// How command results are printed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawn text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Column alignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Align {
    /// Pad on the right
    Left,
    /// Pad on the left
    Right,
}

/// A text table with an optional title.
#[derive(Debug, Clone)]
pub struct Table {
    title: Option<String>,
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table; the first column is left-aligned, the rest right.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = (0..headers.len())
            .map(|i| if i == 0 { Align::Left } else { Align::Right })
            .collect();
        Self {
            title: None,
            headers,
            align,
            rows: Vec::new(),
        }
    }

    /// Sets a title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides the alignment of column `index`.
    pub fn align(mut self, index: usize, align: Align) -> Self {
        if let Some(a) = self.align.get_mut(index) {
            *a = align;
        }
        self
    }

    /// Appends a row. Short rows are padded with blanks.
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn rule(widths: &[usize], left: char, mid: char, right: char) -> String {
        let body: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, body.join(&mid.to_string()), right)
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let body: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, w), align)| match align {
                Align::Left => format!(" {:<w$} ", cell, w = w),
                Align::Right => format!(" {:>w$} ", cell, w = w),
            })
            .collect();
        format!("│{}│", body.join("│"))
    }

    /// Renders the table.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = Vec::with_capacity(self.rows.len() + 5);
        if let Some(title) = &self.title {
            out.push(title.clone());
        }
        out.push(Self::rule(&widths, '┌', '┬', '┐'));
        out.push(self.line(&self.headers, &widths));
        out.push(Self::rule(&widths, '├', '┼', '┤'));
        if self.rows.is_empty() {
            let blank: Vec<String> = std::iter::once("(no data)".to_string())
                .chain(std::iter::repeat(String::new()))
                .take(self.headers.len())
                .collect();
            out.push(self.line(&blank, &widths));
        }
        for row in &self.rows {
            out.push(self.line(row, &widths));
        }
        out.push(Self::rule(&widths, '└', '┴', '┘'));
        out.join("\n")
    }

    /// Prints the table with a leading blank line.
    pub fn print(&self) {
        println!("\n{}", self.render());
    }
}

/// USD amount with thousands separators and no decimals.
pub fn usd(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.0}", value.abs());
    let digits: Vec<char> = rounded.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if value < 0.0 && rounded != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Optional USD amount; `n/a` when undefined.
pub fn usd_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), usd)
}

/// Percentage with `decimals` places; `n/a` when undefined.
pub fn pct_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.*}%", decimals, v))
}

/// Number with `decimals` places; `n/a` when undefined.
pub fn num_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.*}", decimals, v))
}
