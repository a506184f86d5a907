use std::cmp::Ordering;
use std::fmt::{Debug, Display};

/// The comparator half of a [FieldToken].
///
/// Covers the comparison, membership, and array operators a criteria document
/// understands, plus the `asc`/`desc` directions consumed by the sort
/// normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Gt,
    Lt,
    Gte,
    Lte,
    Ne,
    In,
    Nin,
    Mod,
    All,
    Size,
    Exists,
    Asc,
    Desc,
}

impl Comparator {
    /// The lowercase operator name, as written in the fluent builder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Gt => "gt",
            Comparator::Lt => "lt",
            Comparator::Gte => "gte",
            Comparator::Lte => "lte",
            Comparator::Ne => "ne",
            Comparator::In => "in",
            Comparator::Nin => "nin",
            Comparator::Mod => "mod",
            Comparator::All => "all",
            Comparator::Size => "size",
            Comparator::Exists => "exists",
            Comparator::Asc => "asc",
            Comparator::Desc => "desc",
        }
    }

    /// The `$`-prefixed modifier name this comparator expands to when a token
    /// is used as a criteria key, e.g. `$gt` for `gt`.
    pub fn modifier(&self) -> &'static str {
        match self {
            Comparator::Gt => "$gt",
            Comparator::Lt => "$lt",
            Comparator::Gte => "$gte",
            Comparator::Lte => "$lte",
            Comparator::Ne => "$ne",
            Comparator::In => "$in",
            Comparator::Nin => "$nin",
            Comparator::Mod => "$mod",
            Comparator::All => "$all",
            Comparator::Size => "$size",
            Comparator::Exists => "$exists",
            Comparator::Asc => "$asc",
            Comparator::Desc => "$desc",
        }
    }
}

impl Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PartialOrd for Comparator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Comparator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// An immutable (field name, comparator) pair.
///
/// A `FieldToken` is the typed stand-in for the `field.operator` syntax of
/// dynamic query builders: it names a field and a comparator without carrying
/// an operand. Used as a criteria key it expands to a modifier entry
/// (`set(field("age").gt(), 12)` stores `{"age": {"$gt": 12}}`); used as a
/// sort value it contributes a `(field, direction)` pair.
///
/// Two tokens are equal iff both components are equal; ordering is
/// lexicographic by field name, then by comparator name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldToken {
    field: String,
    comparator: Comparator,
}

impl FieldToken {
    pub fn new(field: impl Into<String>, comparator: Comparator) -> Self {
        FieldToken {
            field: field.into(),
            comparator,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }
}

impl Display for FieldToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.field, self.comparator)
    }
}

impl PartialOrd for FieldToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldToken {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.field.cmp(&other.field) {
            Ordering::Equal => self.comparator.cmp(&other.comparator),
            ordering => ordering,
        }
    }
}

/// Creates a fluent token builder for the specified field name.
///
/// This function initializes a builder that produces [FieldToken]s for a
/// specific field. Each builder method names the comparator the token should
/// carry; the operand is supplied later, to
/// [`CriteriaDocument::set`](crate::criteria::CriteriaDocument::set).
///
/// # Arguments
///
/// * `field_name` - The name of the field the tokens refer to
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::criteria::{field, CriteriaDocument};
///
/// let mut criteria = CriteriaDocument::new();
/// criteria.set(field("age").gt(), 12);
/// criteria.set(field("age").lt(), 20);
/// // {"age": {"$gt": 12, "$lt": 20}}
/// ```
pub fn field(field_name: &str) -> FluentField {
    FluentField {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder producing [FieldToken]s for one field.
///
/// # Responsibilities
///
/// * **Token Construction**: one chainable method per comparator
/// * **Comparison Operators**: `gt`, `gte`, `lt`, `lte`, `ne`
/// * **Membership and Array Operators**: `in_array`, `not_in_array`, `all`,
///   `size`, `exists`, `modulo`
/// * **Sort Directions**: `asc`, `desc` for use as sort values
pub struct FluentField {
    field_name: String,
}

impl FluentField {
    /// A token comparing the field as greater than an operand.
    #[inline]
    pub fn gt(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Gt)
    }

    /// A token comparing the field as less than an operand.
    #[inline]
    pub fn lt(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Lt)
    }

    /// A token comparing the field as greater than or equal to an operand.
    #[inline]
    pub fn gte(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Gte)
    }

    /// A token comparing the field as less than or equal to an operand.
    #[inline]
    pub fn lte(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Lte)
    }

    /// A token comparing the field as not equal to an operand.
    #[inline]
    pub fn ne(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Ne)
    }

    /// A token matching when the field value is in the operand list.
    #[inline]
    pub fn in_array(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::In)
    }

    /// A token matching when the field value is not in the operand list.
    #[inline]
    pub fn not_in_array(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Nin)
    }

    /// A token matching on the remainder of dividing the field value.
    #[inline]
    pub fn modulo(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Mod)
    }

    /// A token matching when the field array contains all operand elements.
    #[inline]
    pub fn all(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::All)
    }

    /// A token matching on the length of the field array.
    #[inline]
    pub fn size(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Size)
    }

    /// A token matching on the presence of the field.
    #[inline]
    pub fn exists(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Exists)
    }

    /// An ascending sort token for this field.
    #[inline]
    pub fn asc(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Asc)
    }

    /// A descending sort token for this field.
    #[inline]
    pub fn desc(self) -> FieldToken {
        FieldToken::new(self.field_name, Comparator::Desc)
    }
}
