use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub report: String,
    pub generated_on: NaiveDate,
}
