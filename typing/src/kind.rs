//! The kind: the type of types.

use nomos_contract::Violation;

use crate::table::SymbolTable;
use crate::types::{Type, TypeBuilder, TypeVariant};
use crate::value::{Value, ValueClass};

/// A view of a type whose variant is [`TypeVariant::Kind`].
#[derive(Debug, Clone, Copy)]
pub struct Kind<'a> {
    ty: &'a Type,
}

impl<'a> Kind<'a> {
    /// Views `ty` as a kind, if it is one.
    #[must_use]
    pub fn of(ty: &'a Type) -> Option<Self> {
        (ty.variant() == TypeVariant::Kind).then_some(Self { ty })
    }

    /// The underlying type.
    #[must_use]
    pub fn as_type(&self) -> &'a Type {
        self.ty
    }

    /// Starts a standard type of `value_class` whose table starts as the
    /// non-structural entries of `table`.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `raw_name` is malformed.
    pub fn type_builder(
        &self,
        raw_name: &str,
        value_class: ValueClass,
        none: Value,
        table: &SymbolTable,
    ) -> Result<TypeBuilder, Violation> {
        Ok(TypeBuilder::new(raw_name, value_class, none)?.with_table(table))
    }
}
