use std::path::PathBuf;

use casebook::{
    Case, Directory, SearchCriteria,
    domain::{ProcessStatus, Stage, Status, search},
};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use super::show::{filing_number, taxpayer_id};

/// Command arguments for `case list`.
#[derive(Debug, Default, Parser)]
#[command(about = "List cases matching the given filters")]
pub struct List {
    /// Taxpayer id, with or without punctuation.
    #[arg(long)]
    taxpayer_id: Option<String>,

    /// Filing number, with or without punctuation.
    #[arg(long)]
    filing_number: Option<String>,

    /// Case-insensitive fragment of the requester's name.
    #[arg(long = "name")]
    requester_name: Option<String>,

    /// Exact case status.
    #[arg(long)]
    status: Option<Status>,

    /// Exact workflow stage.
    #[arg(long)]
    stage: Option<Stage>,

    /// Exact process status.
    #[arg(long)]
    process_status: Option<ProcessStatus>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One row of the listing.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct Row {
    id: Option<String>,
    requester_name: Option<String>,
    taxpayer_id: Option<String>,
    filing_number: Option<String>,
    status: Option<String>,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;
        let rows = self.rows(&directory)?;

        match self.output {
            OutputFormat::Table => print!("{}", render_table(&rows)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        }

        Ok(())
    }

    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            taxpayer_id: self.taxpayer_id.clone(),
            filing_number: self.filing_number.clone(),
            requester_name: self.requester_name.clone(),
            status: self.status.clone(),
            stage: self.stage.clone(),
            process_status: self.process_status.clone(),
        }
    }

    fn rows(&self, directory: &Directory) -> anyhow::Result<Vec<Row>> {
        let config = directory.config();
        let found = search(directory.cases(), &self.criteria())?;

        Ok(found
            .into_iter()
            .map(|case: &Case| Row {
                id: case.id().map(str::to_string),
                requester_name: case.requester_name().map(str::to_string),
                taxpayer_id: case.taxpayer_id().map(|v| taxpayer_id(config, v)),
                filing_number: case.filing_number().map(|v| filing_number(config, v)),
                status: case.status().map(ToString::to_string),
            })
            .collect())
    }
}

fn render_table(rows: &[Row]) -> String {
    use std::fmt::Write;

    const HEADERS: [&str; 5] = ["ID", "REQUESTER", "TAXPAYER", "FILING", "STATUS"];

    let cells: Vec<[&str; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.id.as_deref().unwrap_or("-"),
                row.requester_name.as_deref().unwrap_or("-"),
                row.taxpayer_id.as_deref().unwrap_or("-"),
                row.filing_number.as_deref().unwrap_or("-"),
                row.status.as_deref().unwrap_or("-"),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for line in std::iter::once(&HEADERS).chain(&cells) {
        let padded: Vec<String> = line
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    }

    let noun = if rows.len() == 1 { "case" } else { "cases" };
    let _ = writeln!(out, "\n{} {noun} found", rows.len());
    out
}

#[cfg(test)]
mod tests {
    use casebook::{Case, Directory};
    use tempfile::tempdir;

    use super::*;

    fn directory() -> (tempfile::TempDir, Directory) {
        let tmp = tempdir().unwrap();
        let mut directory = Directory::new(tmp.path().to_path_buf()).unwrap();

        for (id, name, cpf, status) in [
            ("c-1", "Maria Silva", "00000000000", "Deferido"),
            ("c-2", "João Santos", "11111111111", "Em análise"),
        ] {
            let mut case = Case::new();
            case.set_id(id.to_string());
            case.set_requester_name(name.to_string());
            case.set_taxpayer_id(cpf.to_string());
            case.set_status(status.parse::<Status>().unwrap());
            directory.insert(case).unwrap();
        }

        (tmp, directory)
    }

    #[test]
    fn lists_all_cases_by_default() {
        let (_tmp, directory) = directory();
        let rows = List::default().rows(&directory).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("c-1"));
        assert_eq!(rows[0].taxpayer_id.as_deref(), Some("000.000.000-00"));
    }

    #[test]
    fn filters_by_masked_taxpayer_id() {
        let (_tmp, directory) = directory();
        let list = List {
            taxpayer_id: Some("111.111.111-11".to_string()),
            ..List::default()
        };

        let rows = list.rows(&directory).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].requester_name.as_deref(), Some("João Santos"));
    }

    #[test]
    fn malformed_filter_is_an_error() {
        let (_tmp, directory) = directory();
        let list = List {
            filing_number: Some("123".to_string()),
            ..List::default()
        };

        assert!(list.rows(&directory).is_err());
    }

    #[test]
    fn table_ends_with_count() {
        let rows = vec![Row {
            id: Some("c-1".to_string()),
            requester_name: None,
            taxpayer_id: None,
            filing_number: None,
            status: Some("Deferido".to_string()),
        }];

        let table = render_table(&rows);

        assert!(table.starts_with("ID   REQUESTER  TAXPAYER  FILING  STATUS\n"));
        assert!(table.contains("c-1  -          -         -       Deferido\n"));
        assert!(table.ends_with("\n1 case found\n"));
    }
}
