//! Runtime values and their type tags.
//!
//! Every value carries a [`TypeTag`]. Values produced by the host (standard
//! library constants, for instance) may arrive as [`Value::Thin`] wrappers and
//! are promoted to a tagged value before they are stored or compared.

use std::{cell::OnceCell, fmt, io::Write, rc::Rc};

use crate::{
    ast::{ast::Identifier, statements::BlockStmt},
    errors::errors::ErrorImpl,
    Position,
};

/// Built-in type names visible from every environment.
pub const BUILTIN_TYPE_NAMES: [&str; 6] = ["nil", "Void", "Integer", "String", "Boolean", "List"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Integer,
    String,
    Boolean,
    List,
    Void,
    Function,
    Type,
}

impl TypeTag {
    /// Resolves a built-in type name. `nil` is an alias for `Void`.
    pub fn builtin(name: &str) -> Option<TypeTag> {
        match name {
            "nil" | "Void" => Some(TypeTag::Void),
            "Integer" => Some(TypeTag::Integer),
            "String" => Some(TypeTag::String),
            "Boolean" => Some(TypeTag::Boolean),
            "List" => Some(TypeTag::List),
            _ => None,
        }
    }

    pub fn type_check(&self, value: &Value) -> Result<(), ErrorImpl> {
        let received = value.type_tag();
        if received == *self {
            Ok(())
        } else {
            Err(ErrorImpl::TypeMatchError {
                expected: self.to_string(),
                received: received.to_string(),
            })
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Integer => "Integer",
            TypeTag::String => "String",
            TypeTag::Boolean => "Boolean",
            TypeTag::List => "List",
            TypeTag::Void => "Void",
            TypeTag::Function => "Function",
            TypeTag::Type => "Type",
        };
        write!(f, "{}", name)
    }
}

/// A resolved type annotation: a tag, or a list whose elements all satisfy
/// an inner annotation (`T[]`).
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    Tag(TypeTag),
    ListOf(Box<DeclaredType>),
}

impl DeclaredType {
    /// The annotation a value satisfies by its own tag.
    pub fn of(value: &Value) -> DeclaredType {
        DeclaredType::Tag(value.type_tag())
    }

    pub fn type_check(&self, value: &Value) -> Result<(), ErrorImpl> {
        match self {
            DeclaredType::Tag(tag) => tag.type_check(value),
            DeclaredType::ListOf(element) => {
                TypeTag::List.type_check(value).map_err(|_| ErrorImpl::TypeMatchError {
                    expected: self.to_string(),
                    received: value.type_tag().to_string(),
                })?;

                if let Value::List(items) = value {
                    for item in items.iter() {
                        element.type_check(item).map_err(|_| ErrorImpl::TypeMatchError {
                            expected: self.to_string(),
                            received: format!("List containing {}", item.type_tag()),
                        })?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Tag(tag) => write!(f, "{}", tag),
            DeclaredType::ListOf(element) => write!(f, "{}[]", element),
        }
    }
}

/// A literal handed over by the host, not yet given a runtime type.
#[derive(Debug, Clone, PartialEq)]
pub enum HostLiteral {
    Integer(i64),
    String(String),
    Boolean(bool),
    Nil,
}

pub type NativeFn = fn(&mut dyn Write, Vec<Value>) -> Result<Value, ErrorImpl>;

/// A function implemented by the host and exported through the standard library.
#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub call: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

/// A user-defined function.
///
/// Per-invocation state lives in the call frame. The only state shared between
/// invocations is the inferred return type, which is written at most once.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub parameters: Vec<(Identifier, Option<DeclaredType>)>,
    pub return_type: Option<DeclaredType>,
    pub body: BlockStmt,
    /// Where the function was declared.
    pub position: Position,
    inferred_return: OnceCell<DeclaredType>,
}

impl FunctionValue {
    pub fn new(
        name: String,
        parameters: Vec<(Identifier, Option<DeclaredType>)>,
        return_type: Option<DeclaredType>,
        body: BlockStmt,
        position: Position,
    ) -> Self {
        FunctionValue {
            name,
            parameters,
            return_type,
            body,
            position,
            inferred_return: OnceCell::new(),
        }
    }

    /// The return type a `return` must satisfy: the declared one, or the one
    /// fixed by the first `return` executed in any activation.
    pub fn enforced_return_type(&self) -> Option<DeclaredType> {
        self.return_type
            .clone()
            .or_else(|| self.inferred_return.get().cloned())
    }

    pub fn inferred_return_type(&self) -> Option<&DeclaredType> {
        self.inferred_return.get()
    }

    /// Records the inferred return type. Later calls are ignored.
    pub fn record_inferred(&self, return_type: DeclaredType) {
        let _ = self.inferred_return.set(return_type);
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    String(String),
    Boolean(bool),
    List(Rc<Vec<Value>>),
    Void,
    Function(Rc<FunctionValue>),
    Native(NativeFunction),
    Type(TypeTag),
    Thin(HostLiteral),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Integer(_) => TypeTag::Integer,
            Value::String(_) => TypeTag::String,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::List(_) => TypeTag::List,
            Value::Void => TypeTag::Void,
            Value::Function(_) | Value::Native(_) => TypeTag::Function,
            Value::Type(_) => TypeTag::Type,
            Value::Thin(literal) => match literal {
                HostLiteral::Integer(_) => TypeTag::Integer,
                HostLiteral::String(_) => TypeTag::String,
                HostLiteral::Boolean(_) => TypeTag::Boolean,
                HostLiteral::Nil => TypeTag::Void,
            },
        }
    }

    /// Turns a thin host literal into a tagged value; other values pass through.
    pub fn promote(self) -> Value {
        match self {
            Value::Thin(HostLiteral::Integer(value)) => Value::Integer(value),
            Value::Thin(HostLiteral::String(value)) => Value::String(value),
            Value::Thin(HostLiteral::Boolean(value)) => Value::Boolean(value),
            Value::Thin(HostLiteral::Nil) => Value::Void,
            value => value,
        }
    }

    /// Structural equality; functions compare by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Thin(_), _) => self.clone().promote().equals(other),
            (_, Value::Thin(_)) => self.equals(&other.clone().promote()),
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Void, Value::Void) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => write!(f, "{:?}", value),
            Value::Thin(HostLiteral::String(value)) => write!(f, "{:?}", value),
            value => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::List(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Void => write!(f, "nil"),
            Value::Function(function) => write!(f, "<function {}>", function.name),
            Value::Native(native) => write!(f, "<native function {}>", native.name),
            Value::Type(tag) => write!(f, "{}", tag),
            Value::Thin(literal) => match literal {
                HostLiteral::Integer(value) => write!(f, "{}", value),
                HostLiteral::String(value) => write!(f, "{}", value),
                HostLiteral::Boolean(value) => write!(f, "{}", value),
                HostLiteral::Nil => write!(f, "nil"),
            },
        }
    }
}
