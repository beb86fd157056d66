//! The operation seam: signatures, evaluation and casts.
//!
//! Evaluation validates inputs and output against the declared types and
//! reports any rejection as the output type's none sentinel plus a
//! violation.

use core::fmt;
use std::sync::Arc;

use nomos_contract::{Contract, Filter, FilterState, Violation};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::contracts::TypeMustNotBeUnknown;
use crate::failure::{Failure, Outcome};
use crate::id::{NamespaceKey, SymbolId, SymbolKind};
use crate::registry::Registry;
use crate::types::Type;
use crate::value::Value;

/// Declared input types, in order, and output type of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    inputs: Vec<NamespaceKey>,
    output: NamespaceKey,
}

impl Signature {
    /// Creates a signature.
    #[must_use]
    pub fn new(inputs: Vec<NamespaceKey>, output: NamespaceKey) -> Self {
        Self { inputs, output }
    }

    /// Number of inputs.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// The declared type of input `n`, counting from zero.
    #[must_use]
    pub fn input_type(&self, n: usize) -> Option<NamespaceKey> {
        self.inputs.get(n).copied()
    }

    /// All declared input types.
    #[must_use]
    pub fn inputs(&self) -> &[NamespaceKey] {
        &self.inputs
    }

    /// The declared output type.
    #[must_use]
    pub fn output(&self) -> NamespaceKey {
        self.output
    }
}

/// An operation registered as a symbol.
pub trait Operation: Send + Sync + fmt::Debug {
    /// The identifier the operation is registered under.
    fn id(&self) -> &SymbolId;

    /// Declared input and output types.
    fn signature(&self) -> &Signature;

    /// Runs the operation body on already validated inputs.
    ///
    /// # Errors
    ///
    /// Returns a violation when the body cannot produce a value.
    fn apply(&self, inputs: &[Value]) -> Result<Value, Violation>;
}

type Body = Arc<dyn Fn(&[Value]) -> Result<Value, Violation> + Send + Sync>;

/// An operation backed by a closure.
#[derive(Clone)]
pub struct StandardOperation {
    id: SymbolId,
    signature: Signature,
    body: Body,
}

impl StandardOperation {
    /// Creates an operation named `name`.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    pub fn new<F>(name: &str, signature: Signature, body: F) -> Result<Self, Violation>
    where
        F: Fn(&[Value]) -> Result<Value, Violation> + Send + Sync + 'static,
    {
        Ok(Self {
            id: SymbolId::try_new(name, SymbolKind::Operation)?,
            signature,
            body: Arc::new(body),
        })
    }
}

impl fmt::Debug for StandardOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardOperation")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Operation for StandardOperation {
    fn id(&self) -> &SymbolId {
        &self.id
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn apply(&self, inputs: &[Value]) -> Result<Value, Violation> {
        (self.body)(inputs)
    }
}

type Conversion = Arc<dyn Fn(&Value) -> Result<Value, Violation> + Send + Sync>;

/// A one-input operation converting values of one type into another.
#[derive(Clone)]
pub struct Cast {
    id: SymbolId,
    from: NamespaceKey,
    signature: Signature,
    convert: Conversion,
}

impl Cast {
    /// Creates a cast from the type at `from` to the type at `to`.
    ///
    /// # Errors
    ///
    /// Returns a `NameMustBeWellFormed` violation if `name` is malformed.
    pub fn new<F>(
        name: &str,
        from: NamespaceKey,
        to: NamespaceKey,
        convert: F,
    ) -> Result<Self, Violation>
    where
        F: Fn(&Value) -> Result<Value, Violation> + Send + Sync + 'static,
    {
        Ok(Self {
            id: SymbolId::try_new(name, SymbolKind::Operation)?,
            from,
            signature: Signature::new(vec![from], to),
            convert: Arc::new(convert),
        })
    }

    /// The source type.
    #[must_use]
    pub fn source(&self) -> NamespaceKey {
        self.from
    }

    /// The target type.
    #[must_use]
    pub fn target(&self) -> NamespaceKey {
        self.signature.output
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cast")
            .field("id", &self.id)
            .field("from", &self.source())
            .field("to", &self.target())
            .finish_non_exhaustive()
    }
}

impl Operation for Cast {
    fn id(&self) -> &SymbolId {
        &self.id
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn apply(&self, inputs: &[Value]) -> Result<Value, Violation> {
        match inputs {
            [value] => (self.convert)(value),
            _ => Err(InputCountMustMatch::new(1).violation(self.id.name(), inputs)),
        }
    }
}

/// Keeps input lists of the declared arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCountMustMatch {
    arity: usize,
}

impl InputCountMustMatch {
    /// Binds the contract to `arity`.
    #[must_use]
    pub fn new(arity: usize) -> Self {
        Self { arity }
    }
}

impl Filter<[Value]> for InputCountMustMatch {
    fn filter(&self, inputs: &[Value]) -> FilterState {
        FilterState::from_bool(inputs.len() == self.arity)
    }
}

impl Contract<[Value]> for InputCountMustMatch {
    fn name(&self) -> &str {
        "InputCountMustMatch"
    }

    fn terms(&self) -> String {
        format!("exactly {} input(s) must be supplied", self.arity)
    }
}

/// Keeps input `index` when its declared type accepts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationInputMustBeValid<'a> {
    expected: &'a Type,
    index: usize,
}

impl<'a> OperationInputMustBeValid<'a> {
    /// Binds the contract to the declared type of input `index`.
    #[must_use]
    pub fn new(expected: &'a Type, index: usize) -> Self {
        Self { expected, index }
    }
}

impl Filter<Value> for OperationInputMustBeValid<'_> {
    fn filter(&self, value: &Value) -> FilterState {
        FilterState::from_bool(self.expected.is_instance(value))
    }
}

impl Contract<Value> for OperationInputMustBeValid<'_> {
    fn name(&self) -> &str {
        "OperationInputMustBeValid"
    }

    fn terms(&self) -> String {
        format!("input {} must be an instance of `{}`", self.index, self.expected.id())
    }
}

/// Keeps results accepted by the declared output type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationTypesMustMatch<'a> {
    expected: &'a Type,
}

impl<'a> OperationTypesMustMatch<'a> {
    /// Binds the contract to the declared output type.
    #[must_use]
    pub fn new(expected: &'a Type) -> Self {
        Self { expected }
    }
}

impl Filter<Value> for OperationTypesMustMatch<'_> {
    fn filter(&self, value: &Value) -> FilterState {
        FilterState::from_bool(self.expected.is_instance(value))
    }
}

impl Contract<Value> for OperationTypesMustMatch<'_> {
    fn name(&self) -> &str {
        "OperationTypesMustMatch"
    }

    fn terms(&self) -> String {
        format!("the result must be an instance of `{}`", self.expected.id())
    }
}

/// Keeps cast sources accepted by the cast's source type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastSourceMustBeValid<'a> {
    expected: &'a Type,
}

impl<'a> CastSourceMustBeValid<'a> {
    /// Binds the contract to the cast's source type.
    #[must_use]
    pub fn new(expected: &'a Type) -> Self {
        Self { expected }
    }
}

impl Filter<Value> for CastSourceMustBeValid<'_> {
    fn filter(&self, value: &Value) -> FilterState {
        FilterState::from_bool(self.expected.is_instance(value))
    }
}

impl Contract<Value> for CastSourceMustBeValid<'_> {
    fn name(&self) -> &str {
        "CastSourceMustBeValid"
    }

    fn terms(&self) -> String {
        format!("the cast source must be an instance of `{}`", self.expected.id())
    }
}

impl Registry {
    fn resolve_type(&self, key: NamespaceKey, plaintiff: &str) -> Result<&Type, Violation> {
        let ty = self.get_type(key);
        TypeMustNotBeUnknown.enforce(plaintiff, &ty)?;
        ty.ok_or_else(|| TypeMustNotBeUnknown.violation(plaintiff, &ty))
    }

    /// Validates `inputs`, runs `operation` and validates its result.
    ///
    /// # Errors
    ///
    /// Fails with the output type's none sentinel (the unknown type's when
    /// the output type cannot be resolved) and the first violation among
    /// `TypeMustNotBeUnknown`, `InputCountMustMatch`,
    /// `OperationInputMustBeValid`, the body's own, and
    /// `OperationTypesMustMatch`.
    pub fn evaluate(&self, operation: &dyn Operation, inputs: &[Value]) -> Outcome<Value> {
        let plaintiff = operation.id().name();
        let signature = operation.signature();
        let output = self
            .resolve_type(signature.output(), plaintiff)
            .map_err(|violation| Failure::new(self.unknown_none(), violation))?;
        let fail = |violation| Failure::new(output.none().clone(), violation);

        InputCountMustMatch::new(signature.arity())
            .enforce(plaintiff, inputs)
            .map_err(fail)?;
        for (index, (key, value)) in signature.inputs().iter().zip(inputs).enumerate() {
            let expected = self.resolve_type(*key, plaintiff).map_err(fail)?;
            OperationInputMustBeValid::new(expected, index)
                .enforce(plaintiff, value)
                .map_err(fail)?;
        }
        let result = operation.apply(inputs).map_err(fail)?;
        OperationTypesMustMatch::new(output)
            .enforce(plaintiff, &result)
            .map_err(fail)?;
        trace!(operation = %operation.id(), result = %result, "evaluated operation");
        Ok(result)
    }

    /// Checks `value` against the cast's source type, then evaluates it.
    ///
    /// # Errors
    ///
    /// Fails with the target type's none sentinel and
    /// `CastSourceMustBeValid`, or as [`Registry::evaluate`] does.
    pub fn cast(&self, cast: &Cast, value: &Value) -> Outcome<Value> {
        let plaintiff = cast.id().name();
        let none = self
            .get_type(cast.target())
            .map_or_else(|| self.unknown_none(), |ty| ty.none().clone());
        let source = self
            .resolve_type(cast.source(), plaintiff)
            .map_err(|violation| Failure::new(none.clone(), violation))?;
        CastSourceMustBeValid::new(source)
            .enforce(plaintiff, value)
            .map_err(|violation| Failure::new(none, violation))?;
        self.evaluate(cast, core::slice::from_ref(value))
    }
}
