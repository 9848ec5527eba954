//! HTML digest of a run's listings, grouped by source.

use chrono::NaiveDate;
use common::JobListing;
use indexmap::IndexMap;

/// Listings from one source, in the order they were scraped.
#[derive(Debug)]
pub struct SourceSection<'a> {
    pub source: &'a str,
    pub jobs: Vec<&'a JobListing>,
}

/// Rendered digest ready to be wrapped in an email.
#[derive(Debug, Clone)]
pub struct Digest {
    pub subject: String,
    pub html: String,
}

impl Digest {
    pub fn build(jobs: &[JobListing], run_date: NaiveDate) -> Self {
        let date = format_run_date(run_date);
        Self {
            subject: subject_line(&date),
            html: render_html(jobs, &date),
        }
    }
}

/// e.g. "March 07, 2024"
pub fn format_run_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

pub fn subject_line(date: &str) -> String {
    format!("Outdoor/Nature Jobs in Tampa Bay - {}", date)
}

/// Groups listings by `source`, keeping first-seen order of sources and of
/// listings inside each source.
pub fn group_by_source(jobs: &[JobListing]) -> Vec<SourceSection<'_>> {
    let mut groups: IndexMap<&str, Vec<&JobListing>> = IndexMap::new();
    for job in jobs {
        groups.entry(job.source.as_str()).or_default().push(job);
    }

    groups
        .into_iter()
        .map(|(source, jobs)| SourceSection { source, jobs })
        .collect()
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
    .container { background-color: #fff; padding: 20px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
    .header { text-align: center; border-bottom: 3px solid #2E7D32; padding-bottom: 20px; margin-bottom: 30px; }
    .header h1 { color: #2E7D32; margin: 0; font-size: 24px; }
    .header p { color: #666; margin: 10px 0 0 0; }
    .summary { background-color: #E8F5E8; padding: 15px; border-radius: 5px; margin-bottom: 30px; border-left: 4px solid #2E7D32; }
    .source-section { margin-bottom: 40px; }
    .source-header { background-color: #2E7D32; color: #fff; padding: 10px 15px; border-radius: 5px 5px 0 0; margin: 0; font-size: 18px; }
    .job { border: 1px solid #ddd; border-top: none; padding: 15px; background-color: #fafafa; }
    .job-title { font-size: 16px; font-weight: bold; color: #2E7D32; margin: 0 0 5px 0; }
    .job-company { font-weight: bold; color: #555; margin: 0 0 5px 0; }
    .job-location { color: #666; font-size: 14px; margin: 0 0 10px 0; }
    .job-description { color: #444; font-size: 14px; margin: 0 0 10px 0; }
    .job-link { display: inline-block; background-color: #2E7D32; color: #fff; padding: 8px 15px; text-decoration: none; border-radius: 4px; font-size: 14px; font-weight: bold; }
    .job-posted { font-size: 12px; color: #888; margin-top: 5px; }
    .footer { text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; color: #666; font-size: 12px; }
"#;

/// Renders the full HTML document. Every scraped field is escaped.
pub fn render_html(jobs: &[JobListing], date: &str) -> String {
    let sections = group_by_source(jobs);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Outdoor Jobs in Tampa Bay</title>
<style>{style}</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>🌲 Outdoor/Nature Jobs in Tampa Bay</h1>
<p>Job Search Results - {date}</p>
</div>
<div class="summary"><strong>📊 Summary:</strong> Found {total} outdoor and nature-related job opportunities in the Tampa Bay area.</div>
"#,
        style = STYLE,
        date = escape_html(date),
        total = jobs.len(),
    );

    for section in &sections {
        html.push_str(&format!(
            "<div class=\"source-section\">\n<h2 class=\"source-header\">{} ({} jobs)</h2>\n",
            escape_html(section.source),
            section.jobs.len()
        ));

        for job in &section.jobs {
            html.push_str(&render_job(job));
        }

        html.push_str("</div>\n");
    }

    html.push_str(
        r#"<div class="footer">
<p>Generated by Outdoor Job Scraper | Tampa Bay Area</p>
<p>Good luck with your job search! 🌿</p>
</div>
</div>
</body>
</html>
"#,
    );

    html
}

fn render_job(job: &JobListing) -> String {
    let mut block = format!(
        r#"<div class="job">
<div class="job-title">{title}</div>
<div class="job-company">{company}</div>
<div class="job-location">📍 {location}</div>
<div class="job-description">{description}</div>
<a href="{url}" class="job-link">Apply Now</a>
"#,
        title = escape_html(&job.title),
        company = escape_html(&job.company),
        location = escape_html(&job.location),
        description = escape_html(&job.description),
        url = escape_html(&job.url),
    );

    if let Some(posted) = &job.date_posted {
        block.push_str(&format!(
            "<div class=\"job-posted\">Posted: {}</div>\n",
            escape_html(posted)
        ));
    }

    block.push_str("</div>\n");
    block
}
