use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::time_interval::TimeInterval;
use crate::errors::CalendarError;

pub type TransactionId = u64;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn sign(self) -> f64 {
        match self {
            TransactionKind::Income => 1.0,
            TransactionKind::Expense => -1.0,
        }
    }

    pub fn parse(value: &str) -> Result<Self, CalendarError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(CalendarError::Validation(format!(
                "unknown transaction type `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurring {
    #[default]
    Once,
    Weekly,
    Biweekly,
    Monthly,
}

impl Recurring {
    /// Step between occurrences; `None` for one-time rules.
    pub fn interval(self) -> Option<TimeInterval> {
        match self {
            Recurring::Once => None,
            Recurring::Weekly => Some(TimeInterval::weeks(1)),
            Recurring::Biweekly => Some(TimeInterval::weeks(2)),
            Recurring::Monthly => Some(TimeInterval::months(1)),
        }
    }

    pub fn label(self) -> String {
        match self.interval() {
            Some(interval) => interval.label(),
            None => "Once".into(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, CalendarError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Recurring::Once),
            "weekly" => Ok(Recurring::Weekly),
            "biweekly" => Ok(Recurring::Biweekly),
            "monthly" => Ok(Recurring::Monthly),
            other => Err(CalendarError::Validation(format!(
                "unknown recurrence `{other}`"
            ))),
        }
    }
}

/// A budget rule: one income or expense that fires once or on a fixed cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub recurring: Recurring,
    #[serde(
        default,
        serialize_with = "serialize_end_date",
        deserialize_with = "deserialize_end_date"
    )]
    pub end_date: Option<NaiveDate>,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        kind: TransactionKind,
        name: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            amount,
            date,
            recurring: Recurring::Once,
            end_date: None,
        }
    }

    pub fn with_recurring(mut self, recurring: Recurring) -> Self {
        self.recurring = recurring;
        self
    }

    pub fn with_end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    /// Effect of one occurrence on the running balance.
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring != Recurring::Once
    }
}

/// Unvalidated form input for creating or editing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub name: String,
    pub amount: String,
    pub date: NaiveDate,
    pub recurring: Recurring,
    pub end_date: Option<NaiveDate>,
}

impl TransactionDraft {
    /// Empty form pre-filled with `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            kind: TransactionKind::Expense,
            name: String::new(),
            amount: String::new(),
            date,
            recurring: Recurring::Once,
            end_date: None,
        }
    }

    /// Checks the draft and produces a transaction carrying `id`.
    pub fn validate(&self, id: TransactionId) -> Result<Transaction, CalendarError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CalendarError::Validation("name must not be empty".into()));
        }
        let amount = parse_amount(&self.amount)?;
        let end_date = match self.recurring {
            Recurring::Once => None,
            _ => self.end_date,
        };
        if let Some(end) = end_date {
            if end < self.date {
                return Err(CalendarError::Validation(format!(
                    "end date {} is before start date {}",
                    end.format(DATE_FORMAT),
                    self.date.format(DATE_FORMAT)
                )));
            }
        }
        Ok(Transaction {
            id,
            kind: self.kind,
            name: name.to_string(),
            amount,
            date: self.date,
            recurring: self.recurring,
            end_date,
        })
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(txn: &Transaction) -> Self {
        Self {
            kind: txn.kind,
            name: txn.name.clone(),
            amount: format!("{:.2}", txn.amount),
            date: txn.date,
            recurring: txn.recurring,
            end_date: txn.end_date,
        }
    }
}

/// Parses user supplied amount text into a finite, non-negative magnitude.
pub fn parse_amount(raw: &str) -> Result<f64, CalendarError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '_'))
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| CalendarError::InvalidAmount(format!("`{}` is not a number", raw.trim())))?;
    if !value.is_finite() {
        return Err(CalendarError::InvalidAmount(format!(
            "`{}` is not a finite number",
            raw.trim()
        )));
    }
    if value < 0.0 {
        return Err(CalendarError::InvalidAmount(format!(
            "`{}` is negative; choose income or expense instead",
            raw.trim()
        )));
    }
    Ok(value)
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|err| CalendarError::InvalidDate(format!("`{}`: {err}", raw.trim())))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Missing(()),
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawAmount::deserialize(deserializer)?;
    let value = match raw {
        RawAmount::Number(value) => value,
        RawAmount::Text(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
        RawAmount::Missing(()) => f64::NAN,
    };
    if !value.is_finite() {
        tracing::warn!("stored amount is not numeric; treating it as 0");
        return Ok(0.0);
    }
    if value < 0.0 {
        tracing::warn!(amount = value, "stored amount is negative; using its magnitude");
        return Ok(value.abs());
    }
    Ok(value)
}

fn serialize_end_date<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_end_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn wire_format_matches_persisted_shape() {
        let txn = Transaction::new(7, TransactionKind::Income, "Paycheck", 500.0, ymd(2024, 1, 1))
            .with_recurring(Recurring::Biweekly);
        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "type": "income",
                "name": "Paycheck",
                "amount": 500.0,
                "date": "2024-01-01",
                "recurring": "biweekly",
                "endDate": ""
            })
        );
    }

    #[test]
    fn empty_end_date_is_open_ended() {
        let txn: Transaction = serde_json::from_value(json!({
            "id": 1, "type": "expense", "name": "Rent", "amount": 900,
            "date": "2024-02-01", "recurring": "monthly", "endDate": ""
        }))
        .unwrap();
        assert_eq!(txn.end_date, None);

        let bounded: Transaction = serde_json::from_value(json!({
            "id": 2, "type": "expense", "name": "Gym", "amount": 30,
            "date": "2024-02-01", "recurring": "weekly", "endDate": "2024-03-01"
        }))
        .unwrap();
        assert_eq!(bounded.end_date, Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn garbage_amounts_are_normalized_on_load() {
        let txn: Transaction = serde_json::from_value(json!({
            "id": 3, "type": "expense", "name": "Broken", "amount": null,
            "date": "2024-02-01", "recurring": "once", "endDate": ""
        }))
        .unwrap();
        assert_eq!(txn.amount, 0.0);

        let text: Transaction = serde_json::from_value(json!({
            "id": 4, "type": "income", "name": "Legacy", "amount": "12.5",
            "date": "2024-02-01", "recurring": "once", "endDate": ""
        }))
        .unwrap();
        assert_eq!(text.amount, 12.5);

        let negative: Transaction = serde_json::from_value(json!({
            "id": 5, "type": "expense", "name": "Signed", "amount": -40,
            "date": "2024-02-01", "recurring": "once", "endDate": ""
        }))
        .unwrap();
        assert_eq!(negative.amount, 40.0);
    }

    #[test]
    fn draft_validation_rejects_bad_input() {
        let mut draft = TransactionDraft::new(ymd(2024, 1, 1));
        assert!(matches!(
            draft.validate(1),
            Err(CalendarError::Validation(_))
        ));

        draft.name = "Coffee".into();
        draft.amount = "abc".into();
        assert!(matches!(draft.validate(1), Err(CalendarError::InvalidAmount(_))));

        draft.amount = "-3".into();
        assert!(matches!(draft.validate(1), Err(CalendarError::InvalidAmount(_))));

        draft.amount = "NaN".into();
        assert!(matches!(draft.validate(1), Err(CalendarError::InvalidAmount(_))));

        draft.amount = "1,250.50".into();
        let txn = draft.validate(9).expect("valid draft");
        assert_eq!(txn.amount, 1250.5);
        assert_eq!(txn.id, 9);
    }

    #[test]
    fn draft_rejects_end_before_start_and_drops_end_for_once() {
        let mut draft = TransactionDraft::new(ymd(2024, 5, 10));
        draft.name = "Gym".into();
        draft.amount = "30".into();
        draft.recurring = Recurring::Weekly;
        draft.end_date = Some(ymd(2024, 5, 1));
        assert!(matches!(draft.validate(1), Err(CalendarError::Validation(_))));

        draft.recurring = Recurring::Once;
        let txn = draft.validate(1).expect("once ignores end date");
        assert_eq!(txn.end_date, None);
    }

    #[test]
    fn signed_amount_follows_kind() {
        let income = Transaction::new(1, TransactionKind::Income, "In", 10.0, ymd(2024, 1, 1));
        let expense = Transaction::new(2, TransactionKind::Expense, "Out", 10.0, ymd(2024, 1, 1));
        assert_eq!(income.signed_amount(), 10.0);
        assert_eq!(expense.signed_amount(), -10.0);
    }
}
