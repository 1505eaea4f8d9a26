use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::label::{Hypothesis, ProcessStatus, ServiceGroup, Stage, Status};

/// A case is a single request tracked by the registry ("Requerimento").
///
/// It records who filed the request, under which registry number, and how
/// the request is currently classified. Every field is optional and freely
/// settable: the record enforces no invariants of its own. Validation of
/// document numbers happens at the search boundary, not here.
///
/// Related cases are held by value. They carry no reference back to the case
/// that contains them, so the same id may appear at several depths. Use
/// [`CaseGraph`](crate::domain::CaseGraph) when relations need to be checked
/// for cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    filing_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    taxpayer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    requester_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    birth_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Status>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    hypothesis: Option<Hypothesis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_group: Option<ServiceGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    related_cases: Vec<Case>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    process_status: Option<ProcessStatus>,
}

impl Case {
    /// Construct an empty case.
    ///
    /// All fields are unset and there are no related cases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The opaque identifier of the case.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the identifier. Uniqueness is the caller's concern.
    pub fn set_id(&mut self, id: impl Into<Option<String>>) {
        self.id = id.into();
    }

    /// The external registry number ("NumeroSei").
    #[must_use]
    pub fn filing_number(&self) -> Option<&str> {
        self.filing_number.as_deref()
    }

    /// Set the external registry number, stored exactly as given.
    pub fn set_filing_number(&mut self, filing_number: impl Into<Option<String>>) {
        self.filing_number = filing_number.into();
    }

    /// The requester's national taxpayer identifier ("CPF").
    #[must_use]
    pub fn taxpayer_id(&self) -> Option<&str> {
        self.taxpayer_id.as_deref()
    }

    /// Set the taxpayer identifier, stored exactly as given.
    pub fn set_taxpayer_id(&mut self, taxpayer_id: impl Into<Option<String>>) {
        self.taxpayer_id = taxpayer_id.into();
    }

    /// The requester's name.
    #[must_use]
    pub fn requester_name(&self) -> Option<&str> {
        self.requester_name.as_deref()
    }

    /// Set the requester's name.
    pub fn set_requester_name(&mut self, requester_name: impl Into<Option<String>>) {
        self.requester_name = requester_name.into();
    }

    /// The requester's date of birth.
    #[must_use]
    pub const fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    /// Set the requester's date of birth.
    pub fn set_birth_date(&mut self, birth_date: impl Into<Option<NaiveDate>>) {
        self.birth_date = birth_date.into();
    }

    /// The overall state of the case.
    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Set the overall state of the case.
    pub fn set_status(&mut self, status: impl Into<Option<Status>>) {
        self.status = status.into();
    }

    /// The hypothesis the case is classified under.
    #[must_use]
    pub const fn hypothesis(&self) -> Option<&Hypothesis> {
        self.hypothesis.as_ref()
    }

    /// Set the hypothesis.
    pub fn set_hypothesis(&mut self, hypothesis: impl Into<Option<Hypothesis>>) {
        self.hypothesis = hypothesis.into();
    }

    /// The service group handling the requester.
    #[must_use]
    pub const fn service_group(&self) -> Option<&ServiceGroup> {
        self.service_group.as_ref()
    }

    /// Set the service group.
    pub fn set_service_group(&mut self, service_group: impl Into<Option<ServiceGroup>>) {
        self.service_group = service_group.into();
    }

    /// The workflow stage.
    #[must_use]
    pub const fn stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    /// Set the workflow stage.
    pub fn set_stage(&mut self, stage: impl Into<Option<Stage>>) {
        self.stage = stage.into();
    }

    /// Related cases, in the order they were stored.
    #[must_use]
    pub fn related_cases(&self) -> &[Self] {
        &self.related_cases
    }

    /// Mutable access to the related cases.
    pub fn related_cases_mut(&mut self) -> &mut Vec<Self> {
        &mut self.related_cases
    }

    /// Replace the related cases.
    ///
    /// The sequence is stored as given; no ids are checked.
    pub fn set_related_cases(&mut self, related_cases: Vec<Self>) {
        self.related_cases = related_cases;
    }

    /// The status of the administrative process.
    #[must_use]
    pub const fn process_status(&self) -> Option<&ProcessStatus> {
        self.process_status.as_ref()
    }

    /// Set the status of the administrative process.
    pub fn set_process_status(&mut self, process_status: impl Into<Option<ProcessStatus>>) {
        self.process_status = process_status.into();
    }

    /// Depth-first, pre-order walk over every case nested below this one.
    ///
    /// This case itself is not yielded.
    pub fn descendants(&self) -> impl Iterator<Item = &Self> + '_ {
        let mut stack: Vec<&Self> = self.related_cases.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.related_cases.iter().rev());
            Some(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_id(id: &str) -> Case {
        let mut case = Case::new();
        case.set_id(id.to_string());
        case
    }

    #[test]
    fn new_case_is_empty() {
        let case = Case::new();
        assert_eq!(case.id(), None);
        assert_eq!(case.filing_number(), None);
        assert_eq!(case.taxpayer_id(), None);
        assert_eq!(case.requester_name(), None);
        assert_eq!(case.birth_date(), None);
        assert_eq!(case.status(), None);
        assert_eq!(case.hypothesis(), None);
        assert_eq!(case.service_group(), None);
        assert_eq!(case.stage(), None);
        assert!(case.related_cases().is_empty());
        assert_eq!(case.process_status(), None);
    }

    #[test]
    fn setters_store_values_verbatim() {
        let mut case = Case::new();
        case.set_id("c-1".to_string());
        case.set_filing_number("SEI-123".to_string());
        case.set_taxpayer_id("not a cpf".to_string());
        case.set_requester_name(String::new());
        case.set_birth_date(NaiveDate::from_ymd_opt(1990, 1, 1));
        case.set_status(Status::try_from("Deferido").unwrap());
        case.set_hypothesis(Hypothesis::try_from("H1").unwrap());
        case.set_service_group(ServiceGroup::try_from("G1").unwrap());
        case.set_stage(Stage::try_from("Triagem").unwrap());
        case.set_process_status(ProcessStatus::try_from("Aberto").unwrap());

        assert_eq!(case.id(), Some("c-1"));
        assert_eq!(case.filing_number(), Some("SEI-123"));
        assert_eq!(case.taxpayer_id(), Some("not a cpf"));
        assert_eq!(case.requester_name(), Some(""));
        assert_eq!(case.birth_date(), NaiveDate::from_ymd_opt(1990, 1, 1));
        assert_eq!(case.status().map(Status::as_str), Some("Deferido"));
        assert_eq!(case.hypothesis().map(Hypothesis::as_str), Some("H1"));
        assert_eq!(case.service_group().map(ServiceGroup::as_str), Some("G1"));
        assert_eq!(case.stage().map(Stage::as_str), Some("Triagem"));
        assert_eq!(
            case.process_status().map(ProcessStatus::as_str),
            Some("Aberto")
        );
    }

    #[test]
    fn setting_none_clears_every_field() {
        let mut case = with_id("c-1");
        case.set_filing_number("SEI-123".to_string());
        case.set_taxpayer_id("00000000000".to_string());
        case.set_requester_name("Jane Doe".to_string());
        case.set_birth_date(NaiveDate::from_ymd_opt(2000, 2, 29));
        case.set_status(Status::try_from("Deferido").unwrap());
        case.set_hypothesis(Hypothesis::try_from("H1").unwrap());
        case.set_service_group(ServiceGroup::try_from("G1").unwrap());
        case.set_stage(Stage::try_from("Triagem").unwrap());
        case.set_process_status(ProcessStatus::try_from("Aberto").unwrap());

        case.set_id(None);
        case.set_filing_number(None);
        case.set_taxpayer_id(None);
        case.set_requester_name(None);
        case.set_birth_date(None);
        case.set_status(None);
        case.set_hypothesis(None);
        case.set_service_group(None);
        case.set_stage(None);
        case.set_process_status(None);

        assert_eq!(case, Case::new());
        assert_eq!(case.id(), None);
        assert_eq!(case.filing_number(), None);
        assert_eq!(case.taxpayer_id(), None);
        assert_eq!(case.requester_name(), None);
        assert_eq!(case.birth_date(), None);
        assert_eq!(case.status(), None);
        assert_eq!(case.hypothesis(), None);
        assert_eq!(case.service_group(), None);
        assert_eq!(case.stage(), None);
        assert_eq!(case.process_status(), None);
    }

    #[test]
    fn related_cases_keep_their_order() {
        let mut case = with_id("parent");
        let related = vec![with_id("c"), with_id("a"), with_id("b")];
        case.set_related_cases(related.clone());

        assert_eq!(case.related_cases(), related.as_slice());

        case.set_related_cases(Vec::new());
        assert!(case.related_cases().is_empty());
    }

    #[test]
    fn example_scenario() {
        let mut case = Case::new();
        case.set_id("c-1".to_string());
        case.set_filing_number("SEI-123".to_string());
        case.set_taxpayer_id("00000000000".to_string());
        case.set_requester_name("Jane Doe".to_string());
        case.set_birth_date(NaiveDate::from_ymd_opt(1990, 1, 1));
        case.set_related_cases(vec![with_id("c-2")]);

        assert_eq!(case.id(), Some("c-1"));
        assert_eq!(case.related_cases()[0].id(), Some("c-2"));
    }

    #[test]
    fn equal_cases_are_independent() {
        let mut first = with_id("c-1");
        first.set_related_cases(vec![with_id("c-2")]);
        let mut second = first.clone();
        assert_eq!(first, second);

        second.set_id("changed".to_string());
        second.related_cases_mut()[0].set_id("also changed".to_string());
        second.related_cases_mut().push(with_id("c-3"));

        assert_eq!(first.id(), Some("c-1"));
        assert_eq!(first.related_cases().len(), 1);
        assert_eq!(first.related_cases()[0].id(), Some("c-2"));
    }

    #[test]
    fn a_case_may_contain_a_copy_of_itself() {
        let mut case = with_id("c-1");
        let copy = case.clone();
        case.set_related_cases(vec![copy]);

        assert_eq!(case.related_cases()[0].id(), case.id());
    }

    #[test]
    fn descendants_are_walked_depth_first() {
        let mut b = with_id("b");
        b.set_related_cases(vec![with_id("b1"), with_id("b2")]);
        let mut root = with_id("root");
        root.set_related_cases(vec![with_id("a"), b, with_id("c")]);

        let ids: Vec<_> = root.descendants().filter_map(Case::id).collect();
        assert_eq!(ids, ["a", "b", "b1", "b2", "c"]);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let mut case = with_id("c-1");
        case.set_filing_number("SEI-123".to_string());
        case.set_birth_date(NaiveDate::from_ymd_opt(1990, 1, 1));
        case.set_process_status(ProcessStatus::try_from("Aberto").unwrap());
        case.set_related_cases(vec![with_id("c-2")]);

        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "c-1",
                "filingNumber": "SEI-123",
                "birthDate": "1990-01-01",
                "relatedCases": [{ "id": "c-2" }],
                "processStatus": "Aberto"
            })
        );
    }

    #[test]
    fn missing_fields_deserialize_as_unset() {
        let case: Case = serde_json::from_str("{}").unwrap();
        assert_eq!(case, Case::new());
    }
}
