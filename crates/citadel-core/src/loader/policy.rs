use crate::component::Instance;
use crate::loader::{Group, Resolved};

/// Per-group rule for turning a resolved value into the stored instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstancePolicy {
    /// Construct constructors, unwrap a namespace export named like the
    /// entry, otherwise keep the value.
    Instantiate,
    /// Keep the resolved value as is.
    Verbatim,
}

impl InstancePolicy {
    pub fn for_group(group: Group) -> Self {
        match group {
            Group::Modules => InstancePolicy::Verbatim,
            Group::Controllers | Group::Services | Group::Objects | Group::Plugins | Group::Widgets => {
                InstancePolicy::Instantiate
            }
        }
    }

    /// `None` means there is nothing to register for `name`.
    pub fn apply(&self, name: &str, resolved: Resolved) -> Option<Instance> {
        match (self, resolved) {
            (_, Resolved::Empty) => None,
            (_, Resolved::Value(instance)) => Some(instance),
            (InstancePolicy::Instantiate, Resolved::Constructor(constructor)) => Some(constructor.construct()),
            (InstancePolicy::Instantiate, Resolved::Namespace(namespace)) => match namespace.get(name) {
                Some(export) => Some(export.clone()),
                None => Some(Instance::passive(namespace)),
            },
            (InstancePolicy::Verbatim, Resolved::Constructor(constructor)) => Some(Instance::passive(constructor)),
            (InstancePolicy::Verbatim, Resolved::Namespace(namespace)) => Some(Instance::passive(namespace)),
        }
    }
}
