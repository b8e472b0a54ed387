//! Presentation of resolver results: a serializable per-mapper record, and a
//! coloured text view for terminals.
use std::fmt::{Display, Write as _};
use std::hash::Hash;

use colored::Colorize;
use serde::Serialize;

use crate::analyze::{MapperKind, Resolution};
use crate::ir::{EnumMapping, Mapping};

/// Outcome for one mapper of one request file.
#[derive(Debug, Serialize)]
pub struct MapperReport<T: Hash + Eq> {
    pub file: String,
    pub mapper: String,
    pub applicable: Vec<MapperKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Hash + Eq> MapperReport<T> {
    /// Fields or members left for manual input.
    pub fn unresolved_count(&self) -> usize {
        match &self.resolution {
            None => 0,
            Some(Resolution::Enum(m)) => m.unmapped.len(),
            Some(Resolution::Object(m) | Resolution::Constructor(m)) => m.unresolved_fields().count(),
        }
    }
}

pub fn render_text<T: Hash + Eq + Display>(reports: &[MapperReport<T>]) -> String {
    let mut out = String::new();
    for report in reports {
        let kind = report
            .resolution
            .as_ref()
            .map(|r| r.kind().to_string())
            .unwrap_or_else(|| kinds_label(&report.applicable));
        let _ = writeln!(out, "{} ({})  {}", report.mapper.bold(), kind, report.file.dimmed());

        if let Some(error) = &report.error {
            let _ = writeln!(out, "  {} {}", "error:".red().bold(), error);
        }
        match &report.resolution {
            None => {}
            Some(Resolution::Enum(m)) => render_enum(&mut out, m),
            Some(Resolution::Object(m) | Resolution::Constructor(m)) => render_fields(&mut out, m),
        }
    }
    out
}

fn kinds_label(kinds: &[MapperKind]) -> String {
    if kinds.is_empty() {
        return "not a mapper".to_string();
    }
    kinds.iter().map(MapperKind::to_string).collect::<Vec<_>>().join(", ")
}

fn render_fields<T: Hash + Eq + Display>(out: &mut String, mapping: &Mapping<T>) {
    let width = mapping.iter().map(|(f, _)| f.name.len()).max().unwrap_or(0);
    for (field, expr) in mapping.iter() {
        let value = match expr {
            Some(e) if e.used_adapter.is_some() => e.render().cyan().to_string(),
            Some(e) => e.render().green().to_string(),
            None => "? (manual input required)".yellow().to_string(),
        };
        let _ = writeln!(out, "  {:<width$} : {} ← {}", field.name, field.ty, value);
    }
}

fn render_enum<T: Hash + Eq>(out: &mut String, mapping: &EnumMapping<T>) {
    for (from, to) in &mapping.mapped {
        let _ = writeln!(out, "  {} → {}", from.name, to.name.green());
    }
    for member in &mapping.unmapped {
        let _ = writeln!(out, "  {} → {}", member.name, "? (unmapped)".yellow());
    }
}
