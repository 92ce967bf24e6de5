//! Filter, sort, projection, and paging options for listing dentists.
//!
//! Query strings arrive as ordered key/value pairs:
//!
//! ```text
//! ?experienceYears[gte]=5&expertise[in]=Orthodontics,Endodontics
//!     &select=name,expertise&sort=-experienceYears,name&page=2&limit=10
//! ```
//!
//! Reserved keys (`select`, `sort`, `page`, `limit`) configure the listing;
//! every other key is a filter on a dentist field, optionally qualified with
//! one of the `gt`, `gte`, `lt`, `lte`, or `in` operators.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use pagination::{PageRequest, PageRequestError};

use super::Dentist;

/// Errors raised while parsing list options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DentistQueryError {
    #[error("unknown dentist field '{field}'")]
    UnknownField { field: String },
    #[error("unsupported filter operator '{operator}'")]
    UnknownOperator { operator: String },
    #[error("field '{field}' cannot be used in filters")]
    NotFilterable { field: String },
    #[error("invalid value '{value}' for '{field}'")]
    InvalidValue { field: String, value: String },
    #[error(transparent)]
    Page(#[from] PageRequestError),
}

/// Dentist attributes addressable from a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DentistField {
    Id,
    Name,
    ExperienceYears,
    Expertise,
    CreatedAt,
    UpdatedAt,
}

impl DentistField {
    /// Parse the camelCase wire name.
    pub fn from_wire(name: &str) -> Result<Self, DentistQueryError> {
        match name.trim() {
            "id" | "_id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "experienceYears" => Ok(Self::ExperienceYears),
            "expertise" => Ok(Self::Expertise),
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            other => Err(DentistQueryError::UnknownField {
                field: other.to_owned(),
            }),
        }
    }

    /// camelCase wire name.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::ExperienceYears => "experienceYears",
            Self::Expertise => "expertise",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

/// Comparison applied to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison<T> {
    Eq(T),
    Gt(T),
    Gte(T),
    Lt(T),
    Lte(T),
    In(Vec<T>),
}

impl<T: PartialOrd> Comparison<T> {
    /// Whether `value` satisfies the comparison.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Eq(operand) => value == operand,
            Self::Gt(operand) => value > operand,
            Self::Gte(operand) => value >= operand,
            Self::Lt(operand) => value < operand,
            Self::Lte(operand) => value <= operand,
            Self::In(operands) => operands.iter().any(|operand| operand == value),
        }
    }
}

/// A typed filter on one dentist field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DentistFilter {
    Name(Comparison<String>),
    ExperienceYears(Comparison<i32>),
    Expertise(Comparison<String>),
    CreatedAt(Comparison<DateTime<Utc>>),
    UpdatedAt(Comparison<DateTime<Utc>>),
}

impl DentistFilter {
    /// Whether `dentist` passes this filter.
    pub fn matches(&self, dentist: &Dentist) -> bool {
        match self {
            Self::Name(cmp) => cmp.matches(&dentist.name),
            Self::ExperienceYears(cmp) => cmp.matches(&dentist.experience_years),
            Self::Expertise(cmp) => cmp.matches(&dentist.expertise),
            Self::CreatedAt(cmp) => cmp.matches(&dentist.created_at),
            Self::UpdatedAt(cmp) => cmp.matches(&dentist.updated_at),
        }
    }
}

/// One sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: DentistField,
    pub descending: bool,
}

impl SortKey {
    fn parse(raw: &str) -> Result<Self, DentistQueryError> {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some(name) => Ok(Self {
                field: DentistField::from_wire(name)?,
                descending: true,
            }),
            None => Ok(Self {
                field: DentistField::from_wire(raw.strip_prefix('+').unwrap_or(raw))?,
                descending: false,
            }),
        }
    }

    fn compare(&self, a: &Dentist, b: &Dentist) -> Ordering {
        let ordering = match self.field {
            DentistField::Id => a.id.cmp(&b.id),
            DentistField::Name => a.name.cmp(&b.name),
            DentistField::ExperienceYears => a.experience_years.cmp(&b.experience_years),
            DentistField::Expertise => a.expertise.cmp(&b.expertise),
            DentistField::CreatedAt => a.created_at.cmp(&b.created_at),
            DentistField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Parsed list options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DentistListQuery {
    pub filters: Vec<DentistFilter>,
    pub sort: Vec<SortKey>,
    /// Projection; `None` returns every field. The id is always returned.
    pub select: Option<Vec<DentistField>>,
    pub page: PageRequest,
}

impl Default for DentistListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: default_sort(),
            select: None,
            page: PageRequest::default(),
        }
    }
}

fn default_sort() -> Vec<SortKey> {
    vec![SortKey {
        field: DentistField::CreatedAt,
        descending: true,
    }]
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}

impl DentistListQuery {
    /// Parse ordered query-string pairs.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::{DentistField, DentistListQuery};
    ///
    /// let pairs = vec![
    ///     ("experienceYears[gte]".to_owned(), "5".to_owned()),
    ///     ("sort".to_owned(), "-experienceYears".to_owned()),
    ///     ("page".to_owned(), "2".to_owned()),
    ///     ("limit".to_owned(), "1".to_owned()),
    /// ];
    /// let query = DentistListQuery::from_pairs(&pairs).expect("valid query");
    /// assert_eq!(query.filters.len(), 1);
    /// assert_eq!(query.sort[0].field, DentistField::ExperienceYears);
    /// assert_eq!(query.page.page(), 2);
    /// ```
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, DentistQueryError> {
        let mut filters = Vec::new();
        let mut sort = None;
        let mut select = None;
        let mut page = None;
        let mut limit = None;

        for (key, value) in pairs {
            match key.as_str() {
                "select" => {
                    let fields = split_list(value)
                        .map(DentistField::from_wire)
                        .collect::<Result<Vec<_>, _>>()?;
                    select = Some(fields);
                }
                "sort" => {
                    let keys = split_list(value)
                        .map(SortKey::parse)
                        .collect::<Result<Vec<_>, _>>()?;
                    sort = Some(keys);
                }
                "page" => page = Some(value.as_str()),
                "limit" => limit = Some(value.as_str()),
                _ => filters.push(parse_filter(key, value)?),
            }
        }

        Ok(Self {
            filters,
            sort: sort.filter(|keys| !keys.is_empty()).unwrap_or_else(default_sort),
            select: select.filter(|fields| !fields.is_empty()),
            page: PageRequest::parse(page, limit)?,
        })
    }

    /// Whether `dentist` passes every filter.
    pub fn matches(&self, dentist: &Dentist) -> bool {
        self.filters.iter().all(|filter| filter.matches(dentist))
    }

    /// Order two dentists by the configured sort keys.
    pub fn compare(&self, a: &Dentist, b: &Dentist) -> Ordering {
        self.sort
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

fn split_key(key: &str) -> Result<(&str, Operator), DentistQueryError> {
    let Some((field, rest)) = key.split_once('[') else {
        return Ok((key, Operator::Eq));
    };
    let operator = rest.strip_suffix(']').unwrap_or(rest);
    let operator = match operator {
        "gt" => Operator::Gt,
        "gte" => Operator::Gte,
        "lt" => Operator::Lt,
        "lte" => Operator::Lte,
        "in" => Operator::In,
        other => {
            return Err(DentistQueryError::UnknownOperator {
                operator: other.to_owned(),
            });
        }
    };
    Ok((field, operator))
}

fn build<T>(
    operator: Operator,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    field: DentistField,
) -> Result<Comparison<T>, DentistQueryError> {
    let parse_one = |value: &str| {
        parse(value.trim()).ok_or_else(|| DentistQueryError::InvalidValue {
            field: field.wire_name().to_owned(),
            value: value.to_owned(),
        })
    };
    Ok(match operator {
        Operator::Eq => Comparison::Eq(parse_one(raw)?),
        Operator::Gt => Comparison::Gt(parse_one(raw)?),
        Operator::Gte => Comparison::Gte(parse_one(raw)?),
        Operator::Lt => Comparison::Lt(parse_one(raw)?),
        Operator::Lte => Comparison::Lte(parse_one(raw)?),
        Operator::In => Comparison::In(
            split_list(raw)
                .map(parse_one)
                .collect::<Result<Vec<_>, _>>()?,
        ),
    })
}

fn parse_text(value: &str) -> Option<String> {
    Some(value.to_owned())
}

fn parse_years(value: &str) -> Option<i32> {
    value.parse().ok()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn parse_filter(key: &str, value: &str) -> Result<DentistFilter, DentistQueryError> {
    let (name, operator) = split_key(key)?;
    let field = DentistField::from_wire(name)?;
    Ok(match field {
        DentistField::Name => DentistFilter::Name(build(operator, value, parse_text, field)?),
        DentistField::ExperienceYears => {
            DentistFilter::ExperienceYears(build(operator, value, parse_years, field)?)
        }
        DentistField::Expertise => {
            DentistFilter::Expertise(build(operator, value, parse_text, field)?)
        }
        DentistField::CreatedAt => {
            DentistFilter::CreatedAt(build(operator, value, parse_timestamp, field)?)
        }
        DentistField::UpdatedAt => {
            DentistFilter::UpdatedAt(build(operator, value, parse_timestamp, field)?)
        }
        DentistField::Id => {
            return Err(DentistQueryError::NotFilterable {
                field: name.to_owned(),
            });
        }
    })
}
