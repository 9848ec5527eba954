//! The configured job sources, in the order they are scraped.

use crate::extractor::{FieldRule, LinkRule, SourceDescriptor};

/// Anchor hrefs on the government career pages that look like job links.
const CAREER_HREF: &str = "career|job|employment";

const PARK_KEYWORDS: &[&str] = &["park", "recreation", "outdoor", "nature", "environmental"];
const STATE_PARK_KEYWORDS: &[&str] = &[
    "park",
    "ranger",
    "recreation",
    "outdoor",
    "nature",
    "environmental",
];

pub fn indeed() -> SourceDescriptor {
    SourceDescriptor {
        name: "Indeed.com",
        page_url: "https://www.indeed.com/jobs",
        query: &[
            (
                "q",
                "park ranger OR outdoor OR nature OR environmental OR conservation OR wildlife OR naturalist OR recreation coordinator",
            ),
            ("l", "Tampa, FL"),
            ("radius", "25"),
            ("jt", "fulltime"),
            ("sort", "date"),
        ],
        candidates: &["div.job_seen_beacon", "div[data-jk]"],
        href_filter: None,
        title: FieldRule::Select {
            selectors: &["h2.jobTitle", "a[data-jk]"],
            placeholder: None,
        },
        company: FieldRule::Select {
            selectors: &["span.companyName", "div.company_location"],
            placeholder: Some("Unknown Company"),
        },
        location: FieldRule::Select {
            selectors: &["div.companyLocation", "span.location"],
            placeholder: Some("Tampa Bay Area"),
        },
        description: FieldRule::Select {
            selectors: &["div.job-snippet", "span.summary"],
            placeholder: Some("No description available"),
        },
        date_posted: Some(FieldRule::Select {
            selectors: &["span.date", "span.postedDate"],
            placeholder: None,
        }),
        link: LinkRule::Select(&["h2.jobTitle a", "a[data-jk]"]),
        keywords: &[],
        limit: 20,
        description_limit: Some(200),
    }
}

/// A government careers page scanned for job anchors.
fn career_page(
    name: &'static str,
    page_url: &'static str,
    company: &'static str,
    location: &'static str,
    description: &'static str,
    keywords: &'static [&'static str],
) -> SourceDescriptor {
    SourceDescriptor {
        name,
        page_url,
        query: &[],
        candidates: &["a[href]"],
        href_filter: Some(CAREER_HREF),
        title: FieldRule::OwnText,
        company: FieldRule::Fixed(company),
        location: FieldRule::Fixed(location),
        description: FieldRule::Fixed(description),
        date_posted: None,
        link: LinkRule::OwnHref,
        keywords,
        limit: 10,
        description_limit: None,
    }
}

pub fn hillsborough_parks() -> SourceDescriptor {
    career_page(
        "Hillsborough County Parks",
        "https://www.hillsboroughcounty.org/en/government/departments/human-resources",
        "Hillsborough County",
        "Hillsborough County, FL",
        "County park and recreation position",
        PARK_KEYWORDS,
    )
}

pub fn pinellas_parks() -> SourceDescriptor {
    career_page(
        "Pinellas County Parks",
        "https://www.pinellas.gov/Government/Human-Resources",
        "Pinellas County",
        "Pinellas County, FL",
        "County park and recreation position",
        PARK_KEYWORDS,
    )
}

pub fn tampa_parks() -> SourceDescriptor {
    career_page(
        "Tampa Parks & Recreation",
        "https://www.tampa.gov/careers",
        "City of Tampa",
        "Tampa, FL",
        "City park and recreation position",
        PARK_KEYWORDS,
    )
}

pub fn stpete_parks() -> SourceDescriptor {
    career_page(
        "St. Pete Parks & Recreation",
        "https://www.stpete.org/government/city_departments/human_resources/employment_opportunities.php",
        "City of St. Petersburg",
        "St. Petersburg, FL",
        "City park and recreation position",
        PARK_KEYWORDS,
    )
}

pub fn florida_state_parks() -> SourceDescriptor {
    career_page(
        "Florida State Parks",
        "https://www.floridastateparks.org/employment",
        "Florida State Parks",
        "Tampa Bay Area, FL",
        "State park position",
        STATE_PARK_KEYWORDS,
    )
}

/// All sources in scrape order: the job board first, then the park sites.
pub fn all_sources() -> Vec<SourceDescriptor> {
    vec![
        indeed(),
        hillsborough_parks(),
        pinellas_parks(),
        tampa_parks(),
        stpete_parks(),
        florida_state_parks(),
    ]
}
