use convert_case::{Case, Casing};

///
/// NamingPolicy
///
/// Converts a declared property ident into its store-facing column name
/// when no explicit name is tagged. `Snake` is the default: capitalized
/// word boundaries become lowercase-underscore (`userName` -> `user_name`).
///

#[derive(Clone, Copy, Debug, Default)]
pub enum NamingPolicy {
    #[default]
    Snake,
    Lower,
    Preserve,
    Custom(fn(&str) -> String),
}

impl NamingPolicy {
    #[must_use]
    pub fn column_name(self, ident: &str) -> String {
        match self {
            Self::Snake => ident.to_case(Case::Snake),
            Self::Lower => ident.to_lowercase(),
            Self::Preserve => ident.to_string(),
            Self::Custom(f) => f(ident),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_splits_on_capitalized_word_boundaries() {
        let policy = NamingPolicy::Snake;
        assert_eq!(policy.column_name("userName"), "user_name");
        assert_eq!(policy.column_name("CreatedAt"), "created_at");
        assert_eq!(policy.column_name("id"), "id");
        assert_eq!(policy.column_name("httpStatusCode"), "http_status_code");
    }

    #[test]
    fn preserve_and_lower_leave_word_boundaries_alone() {
        assert_eq!(NamingPolicy::Preserve.column_name("userName"), "userName");
        assert_eq!(NamingPolicy::Lower.column_name("userName"), "username");
    }

    #[test]
    fn custom_policy_is_pluggable() {
        fn shout(ident: &str) -> String {
            ident.to_uppercase()
        }
        assert_eq!(NamingPolicy::Custom(shout).column_name("id"), "ID");
    }
}
