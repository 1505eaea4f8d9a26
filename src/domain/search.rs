//! Filtering cases the way the listing screen does.

use thiserror::Error;

use crate::{
    Case,
    domain::{
        document::{FILING_NUMBER_DIGITS, TAXPAYER_ID_DIGITS, digits},
        label::{ProcessStatus, Stage, Status},
    },
};

/// Errors raised by a malformed search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The taxpayer id filter does not have the expected number of digits.
    #[error("taxpayer id must have 11 digits, found {found}")]
    TaxpayerIdLength {
        /// Number of digits in the filter.
        found: usize,
    },
    /// The filing number filter does not have the expected number of digits.
    #[error("filing number must have 17 digits, found {found}")]
    FilingNumberLength {
        /// Number of digits in the filter.
        found: usize,
    },
}

/// Filters applied when searching for cases.
///
/// Every filter is optional, and a case must pass all that are set. The
/// default criteria match every case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Taxpayer id, with or without punctuation.
    pub taxpayer_id: Option<String>,
    /// Filing number, with or without punctuation.
    pub filing_number: Option<String>,
    /// Case-insensitive fragment of the requester's name.
    pub requester_name: Option<String>,
    /// Exact status.
    pub status: Option<Status>,
    /// Exact stage.
    pub stage: Option<Stage>,
    /// Exact process status.
    pub process_status: Option<ProcessStatus>,
}

impl SearchCriteria {
    /// Check that the document number filters are well formed.
    ///
    /// Empty filters are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`SearchError`] if a document number filter has the wrong
    /// number of digits.
    pub fn validate(&self) -> Result<(), SearchError> {
        if let Some(found) = filter_digits(self.taxpayer_id.as_deref()) {
            if found.len() != TAXPAYER_ID_DIGITS {
                return Err(SearchError::TaxpayerIdLength { found: found.len() });
            }
        }
        if let Some(found) = filter_digits(self.filing_number.as_deref()) {
            if found.len() != FILING_NUMBER_DIGITS {
                return Err(SearchError::FilingNumberLength { found: found.len() });
            }
        }
        Ok(())
    }

    /// Whether the case passes every filter that is set.
    ///
    /// Document numbers are compared on their digits alone.
    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        matches_document(self.taxpayer_id.as_deref(), case.taxpayer_id())
            && matches_document(self.filing_number.as_deref(), case.filing_number())
            && self.matches_name(case.requester_name())
            && matches_label(self.status.as_ref(), case.status())
            && matches_label(self.stage.as_ref(), case.stage())
            && matches_label(self.process_status.as_ref(), case.process_status())
    }

    fn matches_name(&self, name: Option<&str>) -> bool {
        match self.requester_name.as_deref() {
            None | Some("") => true,
            Some(fragment) => name.is_some_and(|name| {
                name.to_lowercase().contains(&fragment.to_lowercase())
            }),
        }
    }
}

/// Digits of a filter, or `None` if the filter is unset or blank.
fn filter_digits(filter: Option<&str>) -> Option<String> {
    filter.filter(|f| !f.trim().is_empty()).map(digits)
}

fn matches_document(filter: Option<&str>, value: Option<&str>) -> bool {
    match filter_digits(filter) {
        None => true,
        Some(wanted) => value.is_some_and(|value| digits(value) == wanted),
    }
}

fn matches_label<T: PartialEq>(filter: Option<&T>, value: Option<&T>) -> bool {
    filter.is_none_or(|wanted| value == Some(wanted))
}

/// Find the cases matching the criteria.
///
/// Results are ordered by id, with cases lacking an id last in their original
/// order.
///
/// # Errors
///
/// Returns a [`SearchError`] if the criteria are malformed.
pub fn search<'a, I>(cases: I, criteria: &SearchCriteria) -> Result<Vec<&'a Case>, SearchError>
where
    I: IntoIterator<Item = &'a Case>,
{
    criteria.validate()?;

    let mut found: Vec<&Case> = cases
        .into_iter()
        .filter(|case| criteria.matches(case))
        .collect();

    found.sort_by(|a, b| match (a.id(), b.id()) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    tracing::debug!("search matched {} cases", found.len());

    Ok(found)
}
