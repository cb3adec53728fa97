//! Rendering of the dashboard (and the pages around it) as HTML.

use std::fmt;
use std::fmt::Write;

use crate::dashboard::charts::Chart;
use crate::dashboard::charts::Figure;
use crate::dashboard::Dashboard;
use crate::dashboard::Metric;
use crate::dashboard::TOP_REFERENCES;
use crate::errors::Error;
use crate::reports::idxstats::ReferenceStat;
use crate::reports::ParseDiagnostics;
use crate::utils::display::CountFormat;
use crate::utils::display::CoverageFormat;

/// plotly.js bundle matching the version the `plotly` crate targets.
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; color: #222; background: #fafafa; }
header { background: #1f3a5f; color: #fff; padding: 16px 32px; }
header h1 { margin: 0 0 4px 0; font-size: 26px; }
header p { margin: 0; color: #d6e2f0; }
main { padding: 16px 32px 48px 32px; max-width: 1400px; }
nav { position: sticky; top: 0; background: #fafafa; padding: 8px 0; border-bottom: 1px solid #ddd; z-index: 10; }
nav a { margin-right: 20px; color: #1f3a5f; font-weight: bold; text-decoration: none; }
section { margin-top: 24px; }
h2 { font-size: 20px; border-bottom: 2px solid #3498db; padding-bottom: 6px; }
.columns { display: flex; gap: 48px; flex-wrap: wrap; }
.columns dl { flex: 1; min-width: 280px; margin: 0; }
dt { font-weight: bold; margin-top: 10px; }
dd { margin: 2px 0 0 0; font-family: monospace; }
table { border-collapse: collapse; margin: 8px 0 20px 0; font-size: 14px; }
th, td { border: 1px solid #ddd; padding: 4px 10px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
th { background: #eef2f7; }
pre { background: #fff; border: 1px solid #e5e5e5; padding: 12px; overflow-x: auto; }
details { margin: 12px 0; }
.chart { background: #fff; border: 1px solid #e5e5e5; margin: 12px 0; padding: 8px; }
.caption { color: #555; font-size: 13px; margin: 4px 0 0 0; }
.illustrative { border-left: 4px solid #e6a23c; }
.badge { display: inline-block; background: #e6a23c; color: #fff; font-size: 12px; padding: 1px 6px; border-radius: 3px; }
.info { background: #e8f1fb; border: 1px solid #b9d4f1; padding: 10px 14px; }
.warning { background: #fff6e5; border: 1px solid #f0d18a; padding: 10px 14px; }
.error { background: #fdecea; border: 1px solid #f5b7b1; padding: 10px 14px; }
.placeholder { color: #777; font-style: italic; }
form { margin: 12px 0; }
"#;

const UPLOAD_SCRIPT: &str = r#"
document.getElementById("upload").addEventListener("submit", async function (event) {
  event.preventDefault();
  var file = document.getElementById("bam").files[0];
  var status = document.getElementById("upload-status");
  var name = file ? file.name : "";
  status.textContent = file ? "Indexing BAM file..." : "";
  var response = await fetch("/analyze?name=" + encodeURIComponent(name), {
    method: "POST",
    body: file || new Blob([]),
  });
  var page = await response.text();
  document.open();
  document.write(page);
  document.close();
});
"#;

/// Options controlling how the dashboard page is rendered.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Include the upload form so another file can be analyzed.
    pub upload_form: bool,
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

//=======//
// Pages //
//=======//

/// Renders the dashboard page for one file.
pub fn render(dashboard: &Dashboard, options: RenderOptions) -> Result<String, fmt::Error> {
    page(&format!("BAMalyzer: {}", dashboard.source_name), |html| {
        if options.upload_form {
            write_upload_form(html)?;
        }

        writeln!(
            html,
            "<p class=\"info\">Showing results for <strong>{}</strong>.</p>",
            escape(&dashboard.source_name)
        )?;
        writeln!(
            html,
            "<nav><a href=\"#statistics\">Statistics</a><a href=\"#chromosomes\">Chromosomes</a><a href=\"#visualizations\">Visualizations</a></nav>"
        )?;

        write_statistics(html, dashboard)?;
        write_chromosomes(html, dashboard)?;
        write_visualizations(html, dashboard)
    })
}

/// Renders the upload page, optionally with a notice above the form.
pub fn upload_page(notice: Option<&str>) -> Result<String, fmt::Error> {
    page("BAMalyzer", |html| {
        match notice {
            Some(notice) => writeln!(html, "<p class=\"warning\">{}</p>", escape(notice))?,
            None => writeln!(
                html,
                "<p class=\"info\">Please upload a BAM file to begin analysis.</p>"
            )?,
        }
        write_upload_form(html)
    })
}

/// Renders the page shown when a request fails.
pub fn error_page(error: &Error) -> Result<String, fmt::Error> {
    page("BAMalyzer: error", |html| {
        writeln!(html, "<div class=\"error\">")?;
        writeln!(html, "<h2>Could not analyze the file</h2>")?;
        writeln!(html, "<p>{}</p>", escape(&error.to_string()))?;

        if let Error::ToolExecution { stderr, .. } = error {
            if !stderr.is_empty() {
                writeln!(html, "<p>Diagnostic output from samtools:</p>")?;
                writeln!(html, "<pre>{}</pre>", escape(stderr))?;
            }
        }

        writeln!(html, "</div>")?;
        writeln!(html, "<p>You can try again with a different file.</p>")?;
        write_upload_form(html)
    })
}

fn page<F>(title: &str, body: F) -> Result<String, fmt::Error>
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    let mut html = String::with_capacity(64 * 1024);
    write_page(&mut html, title, body)?;
    Ok(html)
}

fn write_page<F>(html: &mut String, title: &str, body: F) -> fmt::Result
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{}</title>", escape(title))?;
    writeln!(html, "<script src=\"{}\"></script>", PLOTLY_JS)?;
    writeln!(html, "<style>{}</style>", STYLE)?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<header>")?;
    writeln!(html, "<h1>&#x1F9EC; BAMalyzer</h1>")?;
    writeln!(
        html,
        "<p>Upload a BAM file to visualize basic quality metrics.</p>"
    )?;
    writeln!(html, "</header>")?;
    writeln!(html, "<main>")?;
    body(html)?;
    writeln!(html, "</main>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")
}

fn write_upload_form(html: &mut String) -> fmt::Result {
    writeln!(html, "<form id=\"upload\">")?;
    writeln!(
        html,
        "<label for=\"bam\">Upload BAM file</label> <input type=\"file\" id=\"bam\" name=\"bam\" accept=\".bam\"/>"
    )?;
    writeln!(html, "<button type=\"submit\">Analyze</button>")?;
    writeln!(html, "<span id=\"upload-status\"></span>")?;
    writeln!(html, "</form>")?;
    writeln!(html, "<script>{}</script>", UPLOAD_SCRIPT)
}

//============//
// Statistics //
//============//

fn write_metric_list(html: &mut String, metrics: &[Metric]) -> fmt::Result {
    writeln!(html, "<dl>")?;
    for metric in metrics {
        writeln!(
            html,
            "<dt>{}</dt><dd>{}</dd>",
            escape(&metric.description),
            CountFormat(metric.count)
        )?;
    }
    writeln!(html, "</dl>")
}

fn write_diagnostics(html: &mut String, report: &str, diagnostics: &ParseDiagnostics) -> fmt::Result {
    if diagnostics.skipped() == 0 {
        return Ok(());
    }

    writeln!(html, "<details class=\"warning\">")?;
    writeln!(
        html,
        "<summary>Skipped {} of {} lines in the {} report</summary>",
        diagnostics.skipped(),
        diagnostics.lines_read,
        report
    )?;
    writeln!(html, "<pre>")?;
    for skipped in &diagnostics.skipped_lines {
        writeln!(html, "{:>6}: {}", skipped.line_number, escape(&skipped.line))?;
    }
    writeln!(html, "</pre>")?;
    writeln!(html, "</details>")
}

fn write_statistics(html: &mut String, dashboard: &Dashboard) -> fmt::Result {
    let statistics = &dashboard.statistics;

    writeln!(html, "<section id=\"statistics\">")?;
    writeln!(html, "<h2>Comprehensive Alignment Statistics</h2>")?;

    if statistics.is_empty() {
        writeln!(
            html,
            "<p class=\"placeholder\">The flagstat report contained no metrics.</p>"
        )?;
    } else {
        writeln!(html, "<div class=\"columns\">")?;
        write_metric_list(html, &statistics.left)?;
        write_metric_list(html, &statistics.right)?;
        writeln!(html, "</div>")?;
    }

    write_diagnostics(html, "flagstat", &statistics.diagnostics)?;

    writeln!(html, "<details>")?;
    writeln!(html, "<summary>View Raw Flagstats</summary>")?;
    writeln!(html, "<pre>{}</pre>", escape(&statistics.raw_report))?;
    writeln!(html, "</details>")?;
    writeln!(html, "</section>")
}

//=============//
// Chromosomes //
//=============//

fn write_reference_table(html: &mut String, rows: &[ReferenceStat]) -> fmt::Result {
    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<tr><th>Chromosome</th><th>Length</th><th>Mapped</th><th>Unmapped</th><th>Coverage</th></tr>"
    )?;
    for row in rows {
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(row.name()),
            CountFormat(row.length()),
            CountFormat(row.mapped()),
            CountFormat(row.unmapped()),
            CoverageFormat(row.coverage())
        )?;
    }
    writeln!(html, "</table>")
}

fn write_chromosomes(html: &mut String, dashboard: &Dashboard) -> fmt::Result {
    let chromosomes = &dashboard.chromosomes;

    writeln!(html, "<section id=\"chromosomes\">")?;
    writeln!(html, "<h2>Chromosome Distribution</h2>")?;

    if chromosomes.sorted.is_empty() {
        writeln!(
            html,
            "<p class=\"placeholder\">The idxstats report contained no references.</p>"
        )?;
    } else {
        writeln!(html, "<h3>Top {} Chromosomes</h3>", TOP_REFERENCES)?;
        write_reference_table(html, &chromosomes.top)?;

        if let Some(chart) = &chromosomes.chart {
            write_chart(html, chart)?;
        }

        writeln!(html, "<h3>All Chromosomes</h3>")?;
        write_reference_table(html, &chromosomes.sorted)?;
    }

    write_diagnostics(html, "idxstats", &chromosomes.diagnostics)?;
    writeln!(html, "</section>")
}

//================//
// Visualizations //
//================//

fn write_chart(html: &mut String, chart: &Chart) -> fmt::Result {
    let class = match chart.illustrative {
        true => "chart illustrative",
        false => "chart",
    };

    writeln!(html, "<div class=\"{}\">", class)?;
    if chart.illustrative {
        writeln!(html, "<span class=\"badge\">Simulated</span>")?;
    }

    match &chart.figure {
        Figure::Plotly(plot) => writeln!(html, "{}", plot.to_inline_html(Some(chart.id)))?,
        Figure::Json(figure) => {
            let figure = figure.to_string().replace("</", "<\\/");
            writeln!(html, "<div id=\"{}\"></div>", chart.id)?;
            writeln!(
                html,
                "<script>(function () {{ var figure = {}; Plotly.newPlot(\"{}\", figure.data, figure.layout); }})();</script>",
                figure, chart.id
            )?;
        }
    }

    if let Some(caption) = &chart.caption {
        writeln!(html, "<p class=\"caption\">{}</p>", escape(caption))?;
    }

    writeln!(html, "</div>")
}

fn write_visualizations(html: &mut String, dashboard: &Dashboard) -> fmt::Result {
    let visualizations = &dashboard.visualizations;

    writeln!(html, "<section id=\"visualizations\">")?;
    writeln!(html, "<h2>Visualizations</h2>")?;

    writeln!(html, "<h3>Flagstats Composition</h3>")?;
    match &visualizations.composition {
        Some(chart) => write_chart(html, chart)?,
        None => writeln!(html, "<p class=\"warning\">Could not generate pie chart.</p>")?,
    }

    writeln!(html, "<h3>Illustrative Charts</h3>")?;
    writeln!(
        html,
        "<p class=\"warning\">The charts below are placeholders drawn from simulated distributions. They are not derived from the uploaded file.</p>"
    )?;
    for chart in &visualizations.illustrative {
        write_chart(html, chart)?;
    }

    writeln!(html, "</section>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::build;
    use crate::errors::ToolStep;
    use crate::reports::flagstat;
    use crate::reports::idxstats;
    use crate::reports::ParsePolicy;

    fn dashboard(flagstat_text: &str, idxstats_text: &str) -> Dashboard {
        let summary = flagstat::parse(flagstat_text, ParsePolicy::Permissive).unwrap();
        let references = idxstats::parse(idxstats_text, ParsePolicy::Permissive).unwrap();
        build("<sample>.bam", flagstat_text, &summary, &references, 42)
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">R&D's</a>"),
            "&lt;a href=&quot;x&quot;&gt;R&amp;D&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_contains_all_views() {
        let html = render(
            &dashboard(
                "1000 + 0 in total (QC-passed reads + QC-failed reads)\n950 + 0 mapped\n",
                "chr1\t248956422\t500000\t1200\nchrM\t16569\t300\n",
            ),
            RenderOptions::default(),
        )
        .unwrap();

        assert!(html.contains("id=\"statistics\""));
        assert!(html.contains("id=\"chromosomes\""));
        assert!(html.contains("id=\"visualizations\""));
        assert!(html.contains("<dt>in total</dt><dd>1,000</dd>"));
        assert!(html.contains("<td>chr1</td><td>248,956,422</td><td>500,000</td><td>1,200</td><td>0.002008</td>"));
        assert!(html.contains("Read Composition from Flagstats"));
        assert!(html.contains("&lt;sample&gt;.bam"));
        assert!(!html.contains("id=\"upload\""));
    }

    #[test]
    fn test_illustrative_charts_are_captioned() {
        let html = render(&dashboard("", ""), RenderOptions::default()).unwrap();
        assert_eq!(html.matches("class=\"badge\">Simulated<").count(), 4);
        assert_eq!(
            html.matches("not computed from the uploaded file").count(),
            4
        );
    }

    #[test]
    fn test_empty_reports_render_placeholders() {
        let html = render(&dashboard("", ""), RenderOptions { upload_form: true }).unwrap();

        assert!(html.contains("The flagstat report contained no metrics."));
        assert!(html.contains("The idxstats report contained no references."));
        assert!(html.contains("Could not generate pie chart."));
        assert!(html.contains("id=\"upload\""));
    }

    #[test]
    fn test_skipped_lines_are_surfaced() {
        let html = render(
            &dashboard("header line\n5 + 0 mapped\n", "chr1\t10\n"),
            RenderOptions::default(),
        )
        .unwrap();

        assert!(html.contains("Skipped 1 of 2 lines in the flagstat report"));
        assert!(html.contains("Skipped 1 of 1 lines in the idxstats report"));
    }

    #[test]
    fn test_error_page_shows_diagnostics() {
        let html = error_page(&Error::ToolExecution {
            step: ToolStep::Index,
            status: String::from("exit code 1"),
            stderr: String::from("[E::hts_idx_push] NO_COOR reads not in a single block"),
        })
        .unwrap();

        assert!(html.contains("samtools index failed"));
        assert!(html.contains("NO_COOR reads not in a single block"));
        assert!(html.contains("id=\"upload\""));
    }

    #[test]
    fn test_upload_page_notice() {
        let html = upload_page(Some("Please choose a file.")).unwrap();
        assert!(html.contains("Please choose a file."));

        let html = upload_page(None).unwrap();
        assert!(html.contains("Please upload a BAM file to begin analysis."));
    }
}
