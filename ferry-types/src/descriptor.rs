//! The type-descriptor algebra and its wire grammar.
//!
//! A [`TypeDescriptor`] is the canonical description of a value's shape,
//! shared verbatim by workers and hosts. Descriptors are declared once at
//! export time; they never come from reflection. The wire grammar is the
//! textual form carried inside introspection payloads:
//!
//! ```text
//! int | float | str | bool | None | Any
//! List | List[T] | Dict | Dict[str, T] | Optional[T] | Union[A, B, ...]
//! ```
//!
//! Printing and parsing round-trip: `parse_wire(d.to_string()) == d` for
//! every descriptor the grammar can express.

use std::fmt;
use std::str::FromStr;

use crate::error::DescriptorParseError;

/// Canonical, serializable description of a value's shape.
///
/// The algebra is closed and recursive with no cycles. `Dict` keys are
/// always strings and are not separately typed. `Optional(T)` is the
/// nullability sugar for `Union(T, None)`. `Any` disables validation for
/// the position it annotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A JSON integer.
    Int,
    /// A JSON number. Integers are accepted and widened.
    Float,
    /// A JSON string.
    Str,
    /// A JSON boolean. Never accepted where `Int` is expected.
    Bool,
    /// The null value.
    None,
    /// Any value; validation is skipped.
    Any,
    /// A possibly-null value of the inner type.
    Optional(Box<TypeDescriptor>),
    /// A JSON array. With no item type, elements are unchecked.
    List(Option<Box<TypeDescriptor>>),
    /// A string-keyed JSON object. With no value type, values are unchecked.
    Dict(Option<Box<TypeDescriptor>>),
    /// One of several alternatives, matched in declared order.
    Union(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Whether a null value is acceptable for this descriptor.
    ///
    /// True for `None`, `Any`, `Optional`, and any `Union` with a nullable
    /// member. Parameters with nullable descriptors may be omitted from a
    /// request entirely; the function then receives null.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::None | Self::Any | Self::Optional(_) => true,
            Self::Union(members) => members.iter().any(Self::is_nullable),
            _ => false,
        }
    }

    /// Parse a descriptor from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorParseError`] when the text is not a valid wire
    /// expression, including `Dict` forms whose key type is not `str`.
    pub fn parse_wire(text: &str) -> Result<Self, DescriptorParseError> {
        let text = text.trim();
        match text {
            "int" => return Ok(Self::Int),
            "float" => return Ok(Self::Float),
            "str" => return Ok(Self::Str),
            "bool" => return Ok(Self::Bool),
            "None" | "NoneType" => return Ok(Self::None),
            "Any" => return Ok(Self::Any),
            "List" => return Ok(Self::List(None)),
            "Dict" => return Ok(Self::Dict(None)),
            _ => {}
        }

        if let Some(inner) = bracketed(text, "List") {
            let item = Self::parse_wire(inner)?;
            return Ok(Self::List(Some(Box::new(item))));
        }

        if let Some(inner) = bracketed(text, "Dict") {
            let args = split_type_args(inner);
            if args.len() != 2 {
                return Err(DescriptorParseError::DictArity(text.to_string()));
            }
            if args[0] != "str" {
                return Err(DescriptorParseError::DictKey(args[0].to_string()));
            }
            let value = Self::parse_wire(&args[1])?;
            return Ok(Self::Dict(Some(Box::new(value))));
        }

        if let Some(inner) = bracketed(text, "Optional") {
            let item = Self::parse_wire(inner)?;
            return Ok(Self::Optional(Box::new(item)));
        }

        if let Some(inner) = bracketed(text, "Union") {
            let args = split_type_args(inner);
            if args.is_empty() {
                return Err(DescriptorParseError::EmptyUnion);
            }
            let members = args
                .iter()
                .map(|a| Self::parse_wire(a))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Union(members));
        }

        Err(DescriptorParseError::Unrecognized(text.to_string()))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Bool => f.write_str("bool"),
            Self::None => f.write_str("None"),
            Self::Any => f.write_str("Any"),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::List(None) => f.write_str("List"),
            Self::List(Some(item)) => write!(f, "List[{item}]"),
            Self::Dict(None) => f.write_str("Dict"),
            Self::Dict(Some(value)) => write!(f, "Dict[str, {value}]"),
            Self::Union(members) => {
                f.write_str("Union[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = DescriptorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_wire(s)
    }
}

/// Strip `head[` ... `]` from `text`, returning the bracketed interior.
fn bracketed<'a>(text: &'a str, head: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(head)?;
    rest.strip_prefix('[')?.strip_suffix(']')
}

/// Split comma-separated type arguments, respecting bracket nesting.
///
/// `"str, Dict[str, int]"` splits into `["str", "Dict[str, int]"]`.
fn split_type_args(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

/// A named, typed parameter of an exported function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The parameter name, as it appears in request `args`.
    pub name: String,
    /// The declared shape of the parameter's value.
    pub descriptor: TypeDescriptor,
}

/// The declared signature of an exported function.
///
/// Parameter order is significant: it is the positional order used by
/// generated client bindings. Signatures are built fluently:
///
/// ```
/// use ferry_types::{FunctionSignature, TypeDescriptor};
///
/// let sig = FunctionSignature::new("divide")
///     .param("a", TypeDescriptor::Float)
///     .param("b", TypeDescriptor::Float)
///     .returns(TypeDescriptor::Float);
/// assert_eq!(sig.params.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// The exported name, unique within a registry.
    pub name: String,
    /// Ordered parameters.
    pub params: Vec<Parameter>,
    /// The return descriptor; `None` means the function returns no value.
    pub returns: Option<TypeDescriptor>,
}

impl FunctionSignature {
    /// Start a signature with the given exported name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    /// Append a parameter. Order of calls is the positional order.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            descriptor,
        });
        self
    }

    /// Declare the return descriptor.
    #[must_use]
    pub fn returns(mut self, descriptor: TypeDescriptor) -> Self {
        self.returns = Some(descriptor);
        self
    }
}
