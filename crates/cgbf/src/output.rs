use std::fmt::Write as _;
use std::io::IsTerminal;

use cgbf_window::{Cohort, Reading, Window};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    /// VISL CG text stream.
    Cg,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Cg
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct WindowOutput<'a> {
    index: usize,
    window: &'a Window,
}

/// Totals gathered by `cgbf stats`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub windows: u64,
    pub cohorts: u64,
    pub readings: u64,
    pub subreadings: u64,
    pub relations: u64,
    pub flushes: u64,
}

impl StreamStats {
    pub fn add(&mut self, window: &Window) {
        self.windows += 1;
        self.flushes += u64::from(window.flush_after);
        for cohort in &window.cohorts {
            self.cohorts += 1;
            self.readings += cohort.readings.len() as u64;
            self.subreadings += (cohort.reading_count() - cohort.readings.len()) as u64;
            self.relations += cohort.relations.iter().map(|(_, t)| t.len() as u64).sum::<u64>();
        }
    }

    fn rows(&self) -> [(&'static str, u64); 6] {
        [
            ("windows", self.windows),
            ("cohorts", self.cohorts),
            ("readings", self.readings),
            ("subreadings", self.subreadings),
            ("relations", self.relations),
            ("flushes", self.flushes),
        ]
    }
}

pub fn print_window(window: &Window, index: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WindowOutput { index, window };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => println!("{}", window_table(window, index)),
        OutputFormat::Cg => print!("{}", render_cg(window)),
    }
}

pub fn print_stats(stats: &StreamStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(stats).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["METRIC", "VALUE"]);
            for (name, value) in stats.rows() {
                table.add_row(vec![name.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Cg => {
            for (name, value) in stats.rows() {
                println!("{name}: {value}");
            }
        }
    }
}

fn window_table(window: &Window, index: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            format!("WINDOW {index}"),
            "LEMMA".to_string(),
            "TAGS".to_string(),
            "DEP".to_string(),
        ]);

    for cohort in &window.cohorts {
        let dep = match cohort.dep_parent {
            Some(parent) => format!("{}->{}", cohort.dep_self, parent),
            None => String::new(),
        };
        table.add_row(vec![
            cohort.wordform().to_string(),
            String::new(),
            join_tags(&cohort.static_reading),
            dep,
        ]);
        for reading in &cohort.readings {
            for (depth, r) in reading.chain().enumerate() {
                table.add_row(vec![
                    String::new(),
                    format!("{}{}", "  ".repeat(depth), r.lemma),
                    join_tags(r),
                    String::new(),
                ]);
            }
        }
    }
    table
}

fn join_tags(reading: &Reading) -> String {
    reading
        .tags
        .iter()
        .map(|t| &**t)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a window in the VISL CG text format.
pub fn render_cg(window: &Window) -> String {
    let mut out = String::new();

    if !window.set_vars.is_empty() {
        let vars: Vec<String> = window
            .set_vars
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{name}={value}"),
                None => name.to_string(),
            })
            .collect();
        let _ = writeln!(out, "<STREAMCMD:SETVAR:{}>", vars.join(","));
    }
    if !window.rem_vars.is_empty() {
        let vars: Vec<&str> = window.rem_vars.iter().map(|v| &**v).collect();
        let _ = writeln!(out, "<STREAMCMD:REMVAR:{}>", vars.join(","));
    }

    push_text(&mut out, &window.text);
    for cohort in &window.cohorts {
        render_cohort(&mut out, cohort);
    }
    push_text(&mut out, &window.text_post);

    if window.flush_after {
        out.push_str("<STREAMCMD:FLUSH>\n");
    }
    out
}

fn render_cohort(out: &mut String, cohort: &Cohort) {
    push_text(out, &cohort.text);
    out.push_str(&cohort.wblank);
    out.push_str(cohort.wordform());
    for tag in &cohort.static_reading.tags {
        out.push(' ');
        out.push_str(tag);
    }
    out.push('\n');

    for reading in &cohort.readings {
        for (depth, r) in reading.chain().enumerate() {
            out.push_str(&"\t".repeat(depth + 1));
            out.push_str(&r.lemma);
            for tag in &r.tags {
                out.push(' ');
                out.push_str(tag);
            }
            if let Some(parent) = cohort.dep_parent {
                let _ = write!(out, " #{}->{}", cohort.dep_self, parent);
            }
            if !cohort.relations.is_empty() {
                let _ = write!(out, " ID:{}", cohort.dep_self);
                for (name, targets) in cohort.relations.iter() {
                    for target in targets {
                        let _ = write!(out, " R:{name}:{target}");
                    }
                }
            }
            out.push('\n');
        }
    }
}

/// Literal text is emitted on its own line(s).
fn push_text(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}
