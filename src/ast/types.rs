//! Type annotations as written in source.
//!
//! Annotations are kept symbolic here. The runtime resolves a symbol against
//! the names bound in the environment when the annotated statement executes.

use std::any::Any;

use crate::Position;

use super::ast::{Type, TypeType, TypeWrapper};

/// A named type reference, e.g. `Integer`.
#[derive(Debug, Clone)]
pub struct SymbolType {
    pub name: String,
    pub position: Position,
}

impl Type for SymbolType {
    fn clone_wrapper(&self) -> TypeWrapper {
        TypeWrapper::new(self.clone())
    }
    fn get_type_type(&self) -> TypeType {
        TypeType::Symbol(self.name.clone())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `T[]`: a list whose every element satisfies `T`.
#[derive(Debug)]
pub struct ArrayType {
    pub underlying: TypeWrapper,
}

impl Type for ArrayType {
    fn clone_wrapper(&self) -> TypeWrapper {
        TypeWrapper::new(ArrayType {
            underlying: self.underlying.clone_wrapper(),
        })
    }
    fn get_type_type(&self) -> TypeType {
        TypeType::Array(Box::new(self.underlying.get_type_type()))
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}
