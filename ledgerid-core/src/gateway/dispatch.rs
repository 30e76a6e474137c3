use std::collections::BTreeMap;

use ledgerid_common::{GatewayError, Result};

/// Expected call shape of a chaincode function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionShape {
    /// Number of positional arguments, passed through in order.
    pub arity: usize,
}

/// Maps chaincode function names to their call shape.
///
/// This is the one place to extend when the chaincode grows a new function.
/// Lookups happen before any connection is opened.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    functions: BTreeMap<String, FunctionShape>,
}

impl DispatchTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The functions exposed by the user and legal-record chaincode.
    pub fn standard() -> Self {
        Self::empty()
            .with("CreateUser", 1)
            .with("UpdateUser", 2)
            .with("CreateLegalRecord", 1)
            .with("UpdateLegalRecord", 2)
    }

    pub fn with(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.register(name, arity);
        self
    }

    /// Adds or replaces an entry.
    pub fn register(&mut self, name: impl Into<String>, arity: usize) {
        self.functions.insert(name.into(), FunctionShape { arity });
    }

    /// Looks up `name` and checks `args` against its arity.
    pub fn resolve(&self, name: &str, args: &[String]) -> Result<FunctionShape> {
        let shape = self
            .functions
            .get(name)
            .copied()
            .ok_or_else(|| GatewayError::UnknownFunction(name.to_string()))?;

        if args.len() != shape.arity {
            return Err(GatewayError::InvalidArguments {
                function: name.to_string(),
                expected: shape.arity,
                actual: args.len(),
            });
        }
        Ok(shape)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, FunctionShape)> {
        self.functions.iter().map(|(name, shape)| (name.as_str(), *shape))
    }
}
