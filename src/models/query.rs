use rocket::FromForm;
use schemars::JsonSchema;

/// User attributes that can be searched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserField {
    Id,
    FirstName,
    LastName,
    Nickname,
    Email,
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Strict, case-sensitive equality.
    Exact,
    /// Case-insensitive substring containment.
    Partial,
}

impl UserField {
    #[cfg(test)]
    pub const ALL: [UserField; 6] = [
        UserField::Id,
        UserField::FirstName,
        UserField::LastName,
        UserField::Nickname,
        UserField::Email,
        UserField::Country,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(UserField::Id),
            "first_name" => Some(UserField::FirstName),
            "last_name" => Some(UserField::LastName),
            "nickname" => Some(UserField::Nickname),
            "email" => Some(UserField::Email),
            "country" => Some(UserField::Country),
            _ => None,
        }
    }

    /// Column name, also the query parameter name.
    pub fn column(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::FirstName => "first_name",
            UserField::LastName => "last_name",
            UserField::Nickname => "nickname",
            UserField::Email => "email",
            UserField::Country => "country",
        }
    }

    pub fn match_kind(self) -> MatchKind {
        match self {
            UserField::Id | UserField::Country => MatchKind::Exact,
            UserField::FirstName | UserField::LastName | UserField::Nickname | UserField::Email => MatchKind::Partial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactCriterion {
    pub field: UserField,
    pub value: String,
}

/// A partial match. `pattern` is the escaped form of the caller's value and is
/// safe to hand to a regex engine as a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialCriterion {
    pub field: UserField,
    pub pattern: String,
}

/// Search criteria, ANDed together. Empty means "match everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub exact: Vec<ExactCriterion>,
    pub partial: Vec<PartialCriterion>,
}

impl SearchCriteria {
    /// Partitions `(name, value)` pairs into exact and partial criteria.
    /// Unknown names are ignored; a repeated name keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values: Vec<(UserField, String)> = Vec::new();
        for (name, value) in pairs {
            let Some(field) = UserField::from_name(name.as_ref()) else {
                continue;
            };
            let value = value.into();
            match values.iter_mut().find(|(f, _)| *f == field) {
                Some(existing) => existing.1 = value,
                None => values.push((field, value)),
            }
        }
        values.sort_by_key(|(field, _)| *field);

        let mut criteria = SearchCriteria::default();
        for (field, value) in values {
            match field.match_kind() {
                MatchKind::Exact => criteria.exact.push(ExactCriterion { field, value }),
                MatchKind::Partial => criteria.partial.push(PartialCriterion {
                    field,
                    pattern: regex::escape(&value),
                }),
            }
        }
        criteria
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.partial.is_empty()
    }
}

/// Query string accepted by the user listing endpoint.
#[derive(FromForm, Debug, Clone, Default, JsonSchema)]
pub struct UserListQuery {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
}

impl UserListQuery {
    pub fn criteria(&self) -> SearchCriteria {
        let supplied = [
            ("id", &self.id),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("nickname", &self.nickname),
            ("email", &self.email),
            ("country", &self.country),
        ];
        SearchCriteria::from_pairs(supplied.into_iter().filter_map(|(name, value)| value.clone().map(|v| (name, v))))
    }
}
