//! Lexical environments stored in an arena.
//!
//! Each [`Environment`] owns a mutable and a const mapping plus an optional
//! parent link. Environments are addressed by [`EnvId`]; released slots are
//! recycled by later scopes.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::{ast::ast::Identifier, errors::errors::ErrorImpl};

use super::objects::{TypeTag, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(usize);

/// Whether a declaration hid a binding that was already visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Fresh,
    Shadowed,
}

#[derive(Debug, Default)]
struct Environment {
    bindings: HashMap<Identifier, Value>,
    const_bindings: HashMap<Identifier, Value>,
    parent: Option<EnvId>,
}

impl Environment {
    fn get(&self, identifier: &Identifier) -> Option<&Value> {
        self.bindings
            .get(identifier)
            .or_else(|| self.const_bindings.get(identifier))
    }

    fn holds(&self, identifier: &Identifier) -> bool {
        self.bindings.contains_key(identifier) || self.const_bindings.contains_key(identifier)
    }
}

#[derive(Debug, Default)]
pub struct Environments {
    slots: Vec<Option<Environment>>,
    free: Vec<usize>,
}

impl Environments {
    pub fn new() -> Self {
        Environments::default()
    }

    pub fn create(&mut self, parent: Option<EnvId>) -> EnvId {
        let environment = Environment {
            parent,
            ..Environment::default()
        };

        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(environment);
                EnvId(index)
            }
            None => {
                self.slots.push(Some(environment));
                EnvId(self.slots.len() - 1)
            }
        };
        trace!(?id, ?parent, "created environment");
        id
    }

    pub fn release(&mut self, id: EnvId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                self.free.push(id.0);
                trace!(?id, "released environment");
            }
        }
    }

    /// Number of environments currently alive.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn get(&self, id: EnvId) -> Result<&Environment, ErrorImpl> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| ErrorImpl::Panic {
                message: format!("environment {} is not live", id.0),
            })
    }

    fn get_mut(&mut self, id: EnvId) -> Result<&mut Environment, ErrorImpl> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| ErrorImpl::Panic {
                message: format!("environment {} is not live", id.0),
            })
    }

    pub fn parent(&self, id: EnvId) -> Result<Option<EnvId>, ErrorImpl> {
        Ok(self.get(id)?.parent)
    }

    /// Binds `identifier` in `id` only, as a mutable or const slot.
    ///
    /// A binding that was already visible is shadowed, which is logged.
    pub fn declare(
        &mut self,
        id: EnvId,
        identifier: Identifier,
        value: Value,
        is_const: bool,
    ) -> Result<Declaration, ErrorImpl> {
        let declaration = if self.is_bound(id, &identifier, true)? {
            warn!(line = identifier.line, "shadowing variable {:?}", identifier.name);
            Declaration::Shadowed
        } else {
            Declaration::Fresh
        };

        self.insert(id, identifier, value, is_const)?;
        Ok(declaration)
    }

    /// Binds a call argument to its parameter. Parameters shadow silently.
    pub fn bind_parameter(&mut self, id: EnvId, identifier: Identifier, value: Value) -> Result<(), ErrorImpl> {
        debug!(parameter = %identifier.name, "binding parameter");
        self.insert(id, identifier, value, false)
    }

    fn insert(&mut self, id: EnvId, identifier: Identifier, value: Value, is_const: bool) -> Result<(), ErrorImpl> {
        let value = value.promote();
        let environment = self.get_mut(id)?;

        // A name lives in at most one of the two mappings.
        if is_const {
            environment.bindings.remove(&identifier);
            environment.const_bindings.insert(identifier, value);
        } else {
            environment.const_bindings.remove(&identifier);
            environment.bindings.insert(identifier, value);
        }
        Ok(())
    }

    pub fn lookup(&self, id: EnvId, identifier: &Identifier) -> Result<Value, ErrorImpl> {
        if let Some(tag) = TypeTag::builtin(&identifier.name) {
            return Ok(Value::Type(tag));
        }

        let mut current = Some(id);
        while let Some(env_id) = current {
            let environment = self.get(env_id)?;
            if let Some(value) = environment.get(identifier) {
                return Ok(value.clone());
            }
            current = environment.parent;
        }

        Err(ErrorImpl::VariableNotDeclared {
            variable: identifier.name.clone(),
        })
    }

    /// Replaces the nearest mutable binding of `identifier`.
    ///
    /// A const binding of the name anywhere up the chain forbids the
    /// reassignment, even when a mutable binding shadows it. The new value
    /// must carry the same type tag as the old one. On failure the binding is
    /// left untouched.
    pub fn reassign(&mut self, id: EnvId, identifier: &Identifier, value: Value) -> Result<(), ErrorImpl> {
        if TypeTag::builtin(&identifier.name).is_some() {
            return Err(ErrorImpl::ConstReassignment {
                variable: identifier.name.clone(),
            });
        }

        let mut target = None;
        let mut current = Some(id);
        while let Some(env_id) = current {
            let environment = self.get(env_id)?;

            if environment.const_bindings.contains_key(identifier) {
                return Err(ErrorImpl::ConstReassignment {
                    variable: identifier.name.clone(),
                });
            }
            if target.is_none() && environment.bindings.contains_key(identifier) {
                target = Some(env_id);
            }

            current = environment.parent;
        }

        let target = target.ok_or_else(|| ErrorImpl::VariableNotDeclared {
            variable: identifier.name.clone(),
        })?;

        let value = value.promote();
        let environment = self.get_mut(target)?;
        if let Some(existing) = environment.bindings.get(identifier) {
            existing.type_tag().type_check(&value)?;
        }
        environment.bindings.insert(identifier.clone(), value);
        Ok(())
    }

    /// The value `identifier` is bound to in `id` itself, ignoring parents
    /// and built-in type names.
    pub fn lookup_local(&self, id: EnvId, identifier: &Identifier) -> Result<Option<Value>, ErrorImpl> {
        Ok(self.get(id)?.get(identifier).cloned())
    }

    /// Built-in type names count as bound everywhere.
    pub fn is_bound(&self, id: EnvId, identifier: &Identifier, recursive: bool) -> Result<bool, ErrorImpl> {
        if TypeTag::builtin(&identifier.name).is_some() {
            return Ok(true);
        }

        let mut current = Some(id);
        while let Some(env_id) = current {
            let environment = self.get(env_id)?;
            if environment.holds(identifier) {
                return Ok(true);
            }
            if !recursive {
                break;
            }
            current = environment.parent;
        }

        Ok(false)
    }
}
