//! Descriptor-driven job extraction.
//!
//! Every source is read by the same [`Extractor`]; what differs between
//! sites lives in a [`SourceDescriptor`]. Each field has an ordered selector
//! chain and falls back to a placeholder when nothing matches, so relocated
//! markup degrades a record instead of dropping the batch.

use common::JobListing;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::ExtractError;

/// How one text field of a listing is obtained.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Text of the candidate element itself.
    OwnText,
    /// First selector (in order) that yields non-empty text inside the
    /// candidate, otherwise the placeholder.
    Select {
        selectors: &'static [&'static str],
        placeholder: Option<&'static str>,
    },
    /// Same value for every listing from the source.
    Fixed(&'static str),
}

/// How the listing URL is obtained. Relative hrefs resolve against the page URL.
#[derive(Debug, Clone)]
pub enum LinkRule {
    OwnHref,
    /// First `href` found through the selector chain, or an empty URL.
    Select(&'static [&'static str]),
}

/// Static description of one job source.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Label stored in [`JobListing::source`].
    pub name: &'static str,
    pub page_url: &'static str,
    pub query: &'static [(&'static str, &'static str)],
    /// Candidate record elements; the second selector is tried only when
    /// the first matches nothing.
    pub candidates: &'static [&'static str],
    /// Case-insensitive pattern a candidate's `href` must match.
    pub href_filter: Option<&'static str>,
    pub title: FieldRule,
    pub company: FieldRule,
    pub location: FieldRule,
    pub description: FieldRule,
    pub date_posted: Option<FieldRule>,
    pub link: LinkRule,
    /// Accept a listing only if its lower-cased title contains one of these.
    /// Empty means no filtering.
    pub keywords: &'static [&'static str],
    /// Candidates examined, counted before the keyword filter.
    pub limit: usize,
    pub description_limit: Option<usize>,
}

enum CompiledField {
    OwnText,
    Select {
        chain: Vec<Selector>,
        placeholder: Option<&'static str>,
    },
    Fixed(&'static str),
}

enum CompiledLink {
    OwnHref,
    Select(Vec<Selector>),
}

pub struct Extractor {
    descriptor: SourceDescriptor,
    page_url: Url,
    candidates: Vec<Selector>,
    href_filter: Option<Regex>,
    title: CompiledField,
    company: CompiledField,
    location: CompiledField,
    description: CompiledField,
    date_posted: Option<CompiledField>,
    link: CompiledLink,
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn parse_chain(selectors: &[&str]) -> Result<Vec<Selector>, ExtractError> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}

fn compile_field(rule: &FieldRule) -> Result<CompiledField, ExtractError> {
    Ok(match rule {
        FieldRule::OwnText => CompiledField::OwnText,
        FieldRule::Select {
            selectors,
            placeholder,
        } => CompiledField::Select {
            chain: parse_chain(selectors)?,
            placeholder: *placeholder,
        },
        FieldRule::Fixed(value) => CompiledField::Fixed(*value),
    })
}

/// Whitespace-normalised text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive substring match against the keyword list.
pub fn matches_keywords(title: &str, keywords: &[&str]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let title = title.to_lowercase();
    keywords.iter().any(|k| title.contains(k))
}

impl Extractor {
    /// Compiles every selector and pattern of the descriptor.
    pub fn new(descriptor: SourceDescriptor) -> Result<Self, ExtractError> {
        let mut page_url =
            Url::parse(descriptor.page_url).map_err(|source| ExtractError::BaseUrl {
                url: descriptor.page_url.to_string(),
                source,
            })?;
        if !descriptor.query.is_empty() {
            page_url.query_pairs_mut().extend_pairs(descriptor.query);
        }

        let href_filter = descriptor
            .href_filter
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .transpose()?;

        Ok(Self {
            page_url,
            candidates: parse_chain(descriptor.candidates)?,
            href_filter,
            title: compile_field(&descriptor.title)?,
            company: compile_field(&descriptor.company)?,
            location: compile_field(&descriptor.location)?,
            description: compile_field(&descriptor.description)?,
            date_posted: descriptor.date_posted.as_ref().map(compile_field).transpose()?,
            link: match descriptor.link {
                LinkRule::OwnHref => CompiledLink::OwnHref,
                LinkRule::Select(selectors) => CompiledLink::Select(parse_chain(selectors)?),
            },
            descriptor,
        })
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    /// Full URL to fetch, query string included.
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Extracts every acceptable listing from `document`.
    ///
    /// A candidate that fails to extract is logged and skipped.
    pub fn extract(&self, document: &Html) -> Vec<JobListing> {
        let mut jobs = Vec::new();

        for candidate in self.candidates(document) {
            match self.extract_one(candidate) {
                Ok(Some(job)) => {
                    debug!(source = self.name(), title = %job.title, "Found listing");
                    jobs.push(job);
                }
                Ok(None) => {}
                Err(e) => warn!("Error parsing {} listing: {}", self.name(), e),
            }
        }

        jobs
    }

    fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let mut found = Vec::new();
        for selector in &self.candidates {
            found = document
                .select(selector)
                .filter(|el| self.href_accepted(*el))
                .collect();
            if !found.is_empty() {
                break;
            }
        }
        found.truncate(self.descriptor.limit);
        found
    }

    fn href_accepted(&self, element: ElementRef<'_>) -> bool {
        match &self.href_filter {
            Some(pattern) => element
                .value()
                .attr("href")
                .is_some_and(|href| pattern.is_match(href)),
            None => true,
        }
    }

    fn extract_one(&self, candidate: ElementRef<'_>) -> Result<Option<JobListing>, ExtractError> {
        let Some(title) = self.field(&self.title, candidate) else {
            return Ok(None);
        };

        if !matches_keywords(&title, self.descriptor.keywords) {
            return Ok(None);
        }

        let mut description = self.field(&self.description, candidate).unwrap_or_default();
        if let Some(max) = self.descriptor.description_limit {
            description = description.chars().take(max).collect();
        }

        Ok(Some(JobListing {
            title,
            company: self.field(&self.company, candidate).unwrap_or_default(),
            location: self.field(&self.location, candidate).unwrap_or_default(),
            description,
            url: self.link(candidate)?,
            date_posted: self
                .date_posted
                .as_ref()
                .and_then(|rule| self.field(rule, candidate)),
            experience_level: None,
            source: self.descriptor.name.to_string(),
        }))
    }

    fn field(&self, rule: &CompiledField, candidate: ElementRef<'_>) -> Option<String> {
        match rule {
            CompiledField::OwnText => Some(element_text(candidate)).filter(|t| !t.is_empty()),
            CompiledField::Select { chain, placeholder } => chain
                .iter()
                .find_map(|selector| {
                    candidate
                        .select(selector)
                        .next()
                        .map(element_text)
                        .filter(|t| !t.is_empty())
                })
                .or_else(|| placeholder.map(str::to_string)),
            CompiledField::Fixed(value) => Some(value.to_string()),
        }
    }

    fn link(&self, candidate: ElementRef<'_>) -> Result<String, ExtractError> {
        let href = match &self.link {
            CompiledLink::OwnHref => Some(
                candidate
                    .value()
                    .attr("href")
                    .ok_or(ExtractError::MissingHref)?,
            ),
            CompiledLink::Select(chain) => chain.iter().find_map(|selector| {
                candidate
                    .select(selector)
                    .find_map(|el| el.value().attr("href"))
            }),
        };

        match href {
            Some(href) => self
                .page_url
                .join(href.trim())
                .map(|u| u.to_string())
                .map_err(|source| ExtractError::Link {
                    href: href.to_string(),
                    source,
                }),
            None => Ok(String::new()),
        }
    }
}
