// document key constants
pub const DOC_ID: &str = "_id";
pub const TYPE_NAME: &str = "_type";
pub const ID_ALIAS: &str = "id";
pub const CONDITIONS_KEY: &str = "conditions";

// operator constants
pub const OR_OPERATOR: &str = "$or";
pub const AND_OPERATOR: &str = "$and";
pub const NOR_OPERATOR: &str = "$nor";
pub const IN_OPERATOR: &str = "$in";
pub const NESTING_OPERATORS: [&str; 3] = [OR_OPERATOR, AND_OPERATOR, NOR_OPERATOR];

// Compile-time assertion for nesting operators count
const _: () = {
    const NESTING_OPERATORS_COUNT: usize = 3;
    const ACTUAL_COUNT: usize = NESTING_OPERATORS.len();
    const _: [(); 1] = [(); (ACTUAL_COUNT == NESTING_OPERATORS_COUNT) as usize];
};

// option key constants
pub const SORT_KEY: &str = "sort";
pub const FIELDS_KEY: &str = "fields";
pub const SKIP_KEY: &str = "skip";
pub const LIMIT_KEY: &str = "limit";
pub const ORDER_ALIAS: &str = "order";
pub const SELECT_ALIAS: &str = "select";
pub const OFFSET_ALIAS: &str = "offset";
pub const NATURAL_ORDER: &str = "$natural";

pub const QUARRY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns true if the key is one of the nesting operators (`$or`, `$and`,
/// `$nor`), whose operand is an array of nested criteria documents rather
/// than a modifier operand.
#[inline]
pub fn is_nesting_operator(key: &str) -> bool {
    NESTING_OPERATORS.contains(&key)
}

/// Returns true if the key is a modifier, i.e. a `$`-prefixed operator key
/// such as `$gt` or `$in`.
#[inline]
pub fn is_modifier(key: &str) -> bool {
    key.starts_with('$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_nesting_operator() {
        assert!(is_nesting_operator("$or"));
        assert!(is_nesting_operator("$and"));
        assert!(is_nesting_operator("$nor"));
        assert!(!is_nesting_operator("$in"));
        assert!(!is_nesting_operator("$elemMatch"));
        assert!(!is_nesting_operator("or"));
    }

    #[test]
    fn test_is_modifier() {
        assert!(is_modifier("$gt"));
        assert!(is_modifier("$in"));
        assert!(is_modifier("$or"));
        assert!(!is_modifier("age"));
        assert!(!is_modifier(""));
    }
}
