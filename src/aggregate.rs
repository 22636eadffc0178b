use crate::model::{view_of, FunctionEntry, MemberView};
use crate::store::Schema;

/// Computes the override-resolved member set of a struct.
#[derive(Debug, Clone, Copy)]
pub struct MemberAggregator<'s> {
    schema: &'s Schema,
}

impl<'s> MemberAggregator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        MemberAggregator { schema }
    }

    /// Every member visible on `struct_name`, merged in increasing priority:
    ///
    /// 1. the struct's own `functions`,
    /// 2. each composed function set, in registry order,
    /// 3. the composition's `custom_functions`.
    ///
    /// A later layer replaces an earlier one on a name collision; the member
    /// keeps the position where it first appeared. Unknown structs have no
    /// members.
    pub fn all_members_of(&self, struct_name: &str) -> MemberView<'s> {
        let mut members = self.schema.struct_functions(struct_name);

        if let Some(composition) = self.schema.composition(struct_name) {
            for registry in &composition.registries {
                members.extend(self.schema.function_set_functions(registry));
            }
            members.extend(view_of(&composition.custom_functions));
        }

        members
    }

    /// Members of an entry that declares its own inline table. Inline members
    /// win; the composed members of its `struct_type` only fill the gaps.
    pub fn inline_members_of(&self, entry: &'s FunctionEntry) -> MemberView<'s> {
        let mut members = entry.inline_functions().map(view_of).unwrap_or_default();

        if let Some(struct_type) = entry.struct_type() {
            for (name, member) in self.all_members_of(struct_type) {
                members.entry(name).or_insert(member);
            }
        }

        members
    }
}
