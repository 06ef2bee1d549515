use std::sync::Arc;

use crate::lifecycle::{downcast, Instance};
use crate::metadata::Param;
use crate::RegistryError;

struct Arg {
    index: usize,
    interface: String,
    value: Option<Instance>,
}

/// Resolved parameter values handed to a constructor, supplier or accessor.
///
/// Values are looked up by the index they were declared with.
pub struct Args {
    owner: String,
    values: Vec<Arg>,
}

impl Args {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            values: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, param: &Param, value: Option<Instance>) {
        self.values.push(Arg {
            index: param.index(),
            interface: param.interface().name().to_string(),
            value,
        });
    }

    fn find(&self, index: usize) -> Result<&Arg, RegistryError> {
        self.values
            .iter()
            .find(|a| a.index == index)
            .ok_or_else(|| RegistryError::UndeclaredParam {
                owner: self.owner.clone(),
                index,
            })
    }

    /// Value of a required param.
    pub fn required<I: ?Sized + 'static>(&self, index: usize) -> Result<Arc<I>, RegistryError> {
        let arg = self.find(index)?;
        match arg.value.as_ref() {
            Some(value) => downcast::<I>(value, &arg.interface),
            None => Err(RegistryError::MissingDependency {
                owner: self.owner.clone(),
                interface: arg.interface.clone(),
            }),
        }
    }

    /// Value of an optional param; `None` when nothing resolved.
    pub fn optional<I: ?Sized + 'static>(&self, index: usize) -> Result<Option<Arc<I>>, RegistryError> {
        let arg = self.find(index)?;
        arg.value
            .as_ref()
            .map(|value| downcast::<I>(value, &arg.interface))
            .transpose()
    }

    /// Name of the definition these args were resolved for.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::InterfaceEntry;
    use crate::lifecycle::wrap;

    fn param(name: &str, index: usize, optional: bool) -> Param {
        Param::new(Arc::new(InterfaceEntry::new(name)), name.to_lowercase(), index, optional)
    }

    #[test]
    fn test_lookup_by_declared_index() {
        let mut args = Args::new("Thing");
        args.push(&param("Number", 0, false), Some(wrap::<u32>(Arc::new(5))));
        args.push(&param("Missing", 2, true), None);

        assert_eq!(*args.required::<u32>(0).unwrap(), 5);
        assert!(args.optional::<u32>(2).unwrap().is_none());
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_undeclared_index() {
        let args = Args::new("Thing");
        assert!(args.is_empty());
        assert_eq!(
            args.required::<u32>(1).err().unwrap(),
            RegistryError::UndeclaredParam {
                owner: "Thing".into(),
                index: 1
            }
        );
    }

    #[test]
    fn test_wrong_type() {
        let mut args = Args::new("Thing");
        args.push(&param("Number", 0, false), Some(wrap::<u32>(Arc::new(5))));
        assert!(matches!(
            args.required::<String>(0),
            Err(RegistryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_required_but_absent() {
        let mut args = Args::new("Thing");
        args.push(&param("Number", 0, true), None);
        assert_eq!(
            args.required::<u32>(0).err().unwrap().to_string(),
            "Could not construct Thing param Number"
        );
    }
}
