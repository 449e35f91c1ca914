//! Standalone HTML report of a finished search.
//!
//! A `Report` is a titled page made of `ReportSection`s, each holding maud
//! markup blocks and plotly figures. `render_search_report` assembles the
//! default page for a search: an overview with the best setting, the score
//! chart, the full results table and the search configuration.
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;

use crate::params::format_params;
use crate::report::plots::plot_candidate_scores;
use crate::search::{CvResults, HyperSearch};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// A titled block of markup and plots.
pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
    plots: Vec<Plot>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        ReportSection {
            title: title.to_string(),
            content: Vec::new(),
            plots: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content.push(content);
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.plots.push(plot);
    }

    fn render(&self, section_idx: usize) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    div class="content" { (block) }
                }
                @for (i, plot) in self.plots.iter().enumerate() {
                    div class="plot" {
                        (PreEscaped(plot.to_inline_html(Some(&format!("plot-{}-{}", section_idx, i)))))
                    }
                }
            }
        }
    }
}

pub struct Report {
    tool: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(tool: &str, version: &str, title: &str) -> Self {
        Report {
            tool: tool.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> String {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let page = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                        table { border-collapse: collapse; }
                        th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: right; }
                        tr.best { background-color: #e8f4e8; }
                        pre { background-color: #f5f5f5; padding: 10px; border-radius: 5px; }"
                    }
                }
                body {
                    header {
                        h1 { (self.title) }
                        p { (self.tool) " " (self.version) " | generated " (generated) }
                    }
                    @for (i, section) in self.sections.iter().enumerate() {
                        (section.render(i))
                    }
                }
            }
        };
        page.into_string()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.render())
            .with_context(|| format!("Failed to write report: {}", path.as_ref().display()))
    }
}

fn results_table(results: &CvResults, best_index: Option<usize>) -> Markup {
    let names = results.param_names();
    html! {
        table {
            thead {
                tr {
                    th { "rank" }
                    @for name in &names { th { (name) } }
                    th { "mean test" }
                    th { "std test" }
                    @for fold in 0..results.n_splits { th { "split" (fold) }  }
                    th { "mean fit (s)" }
                }
            }
            tbody {
                @for (idx, record) in results.iter().enumerate() {
                    tr class=[if Some(idx) == best_index { Some("best") } else { None }] {
                        td { (record.rank_test_score) }
                        @for name in &names {
                            td {
                                @if let Some(value) = record.params.get(name) { (value.to_string()) } @else { "-" }
                            }
                        }
                        td { (format!("{:.4}", record.mean_test_score)) }
                        td { (format!("{:.4}", record.std_test_score)) }
                        @for score in &record.split_test_scores { td { (format!("{:.4}", score)) } }
                        td { (format!("{:.4}", record.mean_fit_time)) }
                    }
                }
            }
        }
    }
}

/// Build the HTML report of a fitted search.
pub fn render_search_report<S: HyperSearch + ?Sized>(search: &S, title: &str) -> Result<Report> {
    let results = search
        .cv_results()
        .ok_or_else(|| anyhow!("{} has not been fitted", search.search_name()))?;
    let best_index = search.best_index();

    let mut report = Report::new("hpsearch", env!("CARGO_PKG_VERSION"), title);

    let mut overview = ReportSection::new("Overview");
    overview.add_content(html! {
        p {
            (search.search_name()) " evaluated " (results.len()) " candidates with "
            (results.n_splits) "-fold cross-validation, scored by " (results.scoring) "."
        }
        @if let (Some(params), Some(score)) = (search.best_params(), search.best_score()) {
            p { "Best parameters: " code { (format_params(params)) } }
            p { "Best mean " (results.scoring) ": " (format!("{:.4}", score)) }
        }
        @if let Some(refit) = search.refit_time() {
            p { "Refit time: " (format!("{:.3}", refit)) " s" }
        }
    });
    let chart = plot_candidate_scores(results, "Mean cross-validated score per candidate")
        .map_err(|e| anyhow!(e))?;
    overview.add_plot(chart);
    report.add_section(overview);

    let mut table = ReportSection::new("Candidates");
    table.add_content(results_table(results, best_index));
    report.add_section(table);

    let mut config = ReportSection::new("Configuration");
    config.add_content(html! {
        pre { code { (serde_json::to_string_pretty(search.config())?) } }
    });
    report.add_section(config);

    Ok(report)
}
