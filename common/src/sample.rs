//! Canned listings used when a demo run comes back empty.
//!
//! These are not live postings. They only exist so the digest and delivery
//! path has something to render when every source failed.

use crate::JobListing;

fn sample(
    title: &str,
    company: &str,
    location: &str,
    description: &str,
    url: &str,
    source: &str,
) -> JobListing {
    JobListing {
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        date_posted: Some("Recent".to_string()),
        experience_level: None,
        source: source.to_string(),
    }
}

/// The fixed five-record sample set.
pub fn sample_jobs() -> Vec<JobListing> {
    vec![
        sample(
            "Park Ranger - Entry Level",
            "Hillsborough County Parks",
            "Tampa, FL",
            "Assist with park maintenance, visitor services, and environmental education programs. Great opportunity for outdoor enthusiasts!",
            "https://www.hillsboroughcounty.org/jobs",
            "Hillsborough County Parks",
        ),
        sample(
            "Environmental Specialist",
            "Pinellas County",
            "St. Petersburg, FL",
            "Work on environmental conservation projects and outdoor education programs in beautiful Pinellas County parks.",
            "https://www.pinellas.gov/jobs",
            "Pinellas County Parks",
        ),
        sample(
            "Recreation Coordinator",
            "City of Tampa",
            "Tampa, FL",
            "Plan and coordinate outdoor recreational activities and nature programs for city residents.",
            "https://www.tampa.gov/jobs",
            "Tampa Parks & Recreation",
        ),
        sample(
            "Wildlife Biologist Assistant",
            "Florida State Parks",
            "Tampa Bay Area, FL",
            "Support wildlife research and conservation efforts in state parks throughout the Tampa Bay region.",
            "https://www.floridastateparks.org/jobs",
            "Florida State Parks",
        ),
        sample(
            "Outdoor Education Instructor",
            "Tampa Bay Nature Center",
            "Tampa, FL",
            "Lead educational programs about local wildlife and ecosystems for school groups and families.",
            "https://example.com/apply",
            "Indeed.com",
        ),
    ]
}
