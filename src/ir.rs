// Strongly-typed mapping IR. Type handles stay opaque (`T`); no code text here.

use indexmap::IndexMap;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A target slot to fill, or a top-level source value (parameter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSchema<T> {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: T,
}

impl<T> FieldSchema<T> {
    pub fn new(name: impl Into<String>, ty: T) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Enum case. Matching only ever looks at `name`, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumMember<T> {
    pub name: String,
    pub owner: T,
}

/// Unary conversion function the host type system offers for a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AdapterFunction<T> {
    pub name: String,
    pub return_type: T,
}

/// A value reachable from a source parameter through zero or more member hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub ty: T,
    /// Lower-cased names, most specific first: `["city", "addresscity"]`.
    pub name_variants: Vec<String>,
    /// Access chain a code generator would emit: `address.City`.
    pub expression_path: String,
}

impl<T: Clone> Candidate<T> {
    pub fn root(field: &FieldSchema<T>) -> Self {
        Self {
            ty: field.ty.clone(),
            name_variants: vec![field.name.to_lowercase()],
            expression_path: field.name.clone(),
        }
    }

    /// One member hop further. Every existing variant gets the member name appended,
    /// so the ancestor chain is folded in as a prefix.
    pub fn child(&self, member: &FieldSchema<T>) -> Self {
        let lower = member.name.to_lowercase();
        let mut name_variants = Vec::with_capacity(self.name_variants.len() + 1);
        name_variants.push(lower.clone());
        name_variants.extend(self.name_variants.iter().map(|v| format!("{v}{lower}")));
        Self {
            ty: member.ty.clone(),
            name_variants,
            expression_path: format!("{}.{}", self.expression_path, member.name),
        }
    }
}

impl<T> Candidate<T> {
    /// Number of member hops from the originating parameter.
    pub fn depth(&self) -> usize {
        self.name_variants.len() - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedExpression<T> {
    pub path: String,
    pub used_adapter: Option<AdapterFunction<T>>,
}

impl<T> ResolvedExpression<T> {
    /// Path with the adapter call suffix appended, if one was needed.
    pub fn render(&self) -> String {
        match &self.used_adapter {
            None => self.path.clone(),
            Some(adapter) => format!("{}.{}()", self.path, adapter.name),
        }
    }
}

/// Target field → chosen expression. Every target field is a key; `None` means
/// "left for the human".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping<T: Hash + Eq> {
    entries: IndexMap<FieldSchema<T>, Option<ResolvedExpression<T>>>,
}

impl<T: Hash + Eq + Clone> Mapping<T> {
    pub fn unresolved(targets: &[FieldSchema<T>]) -> Self {
        let entries = targets.iter().map(|t| (t.clone(), None)).collect();
        Self { entries }
    }

    pub(crate) fn resolve(&mut self, target: &FieldSchema<T>, expr: ResolvedExpression<T>) {
        if let Some(slot) = self.entries.get_mut(target) {
            *slot = Some(expr);
        }
    }
}

impl<T: Hash + Eq> Mapping<T> {
    pub fn get(&self, target: &FieldSchema<T>) -> Option<&ResolvedExpression<T>> {
        self.entries.get(target).and_then(Option::as_ref)
    }

    /// Lookup by target field name (case-sensitive, first hit).
    pub fn get_by_name(&self, name: &str) -> Option<&ResolvedExpression<T>> {
        self.entries
            .iter()
            .find(|(field, _)| field.name == name)
            .and_then(|(_, expr)| expr.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSchema<T>, Option<&ResolvedExpression<T>>)> {
        self.entries.iter().map(|(k, v)| (k, v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unresolved_fields(&self) -> impl Iterator<Item = &FieldSchema<T>> {
        self.entries.iter().filter(|(_, v)| v.is_none()).map(|(k, _)| k)
    }
}

#[derive(Serialize)]
struct MappingEntryOut<'a, T> {
    field: &'a str,
    #[serde(rename = "type")]
    ty: &'a T,
    expression: Option<String>,
    adapter: Option<&'a str>,
}

impl<T: Hash + Eq + Serialize> Serialize for Mapping<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|(field, expr)| MappingEntryOut {
            field: &field.name,
            ty: &field.ty,
            expression: expr.as_ref().map(ResolvedExpression::render),
            adapter: expr
                .as_ref()
                .and_then(|e| e.used_adapter.as_ref())
                .map(|a| a.name.as_str()),
        }))
    }
}

/// Source-perspective enum mapping: matched pairs plus the leftovers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMapping<T: Hash + Eq> {
    pub mapped: IndexMap<EnumMember<T>, EnumMember<T>>,
    pub unmapped: Vec<EnumMember<T>>,
}

impl<T: Hash + Eq> Default for EnumMapping<T> {
    fn default() -> Self {
        Self { mapped: IndexMap::new(), unmapped: Vec::new() }
    }
}

impl<T: Hash + Eq> EnumMapping<T> {
    pub fn target_of(&self, source_name: &str) -> Option<&EnumMember<T>> {
        self.mapped
            .iter()
            .find(|(from, _)| from.name == source_name)
            .map(|(_, to)| to)
    }

    pub fn is_unmapped(&self, source_name: &str) -> bool {
        self.unmapped.iter().any(|m| m.name == source_name)
    }
}

impl<T: Hash + Eq + Serialize> Serialize for EnumMapping<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mapped: IndexMap<&str, &str> = self
            .mapped
            .iter()
            .map(|(from, to)| (from.name.as_str(), to.name.as_str()))
            .collect();
        let unmapped: Vec<&str> = self.unmapped.iter().map(|m| m.name.as_str()).collect();
        let mut st = serializer.serialize_struct("EnumMapping", 2)?;
        st.serialize_field("mapped", &mapped)?;
        st.serialize_field("unmapped", &unmapped)?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_folds_ancestor_names_into_variants() {
        let person = Candidate::root(&FieldSchema::new("person", "Person"));
        let address = person.child(&FieldSchema::new("Address", "Address"));
        let city = address.child(&FieldSchema::new("City", "string"));

        assert_eq!(person.name_variants, vec!["person"]);
        assert_eq!(address.name_variants, vec!["address", "personaddress"]);
        assert_eq!(city.name_variants, vec!["city", "addresscity", "personaddresscity"]);
        assert_eq!(city.expression_path, "person.Address.City");
        assert_eq!(city.depth(), 2);
    }

    #[test]
    fn root_path_is_the_bare_name() {
        let c = Candidate::root(&FieldSchema::new("Order", "Order"));
        assert_eq!(c.expression_path, "Order");
        assert_eq!(c.name_variants, vec!["order"]);
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn render_appends_adapter_call() {
        let plain = ResolvedExpression::<&str> { path: "src.Age".into(), used_adapter: None };
        let adapted = ResolvedExpression {
            path: "src.Age".into(),
            used_adapter: Some(AdapterFunction { name: "ToText".into(), return_type: "string" }),
        };
        assert_eq!(plain.render(), "src.Age");
        assert_eq!(adapted.render(), "src.Age.ToText()");
    }

    #[test]
    fn mapping_serializes_every_target_in_order() {
        let targets = vec![FieldSchema::new("Name", "string"), FieldSchema::new("Phone", "string")];
        let mut m = Mapping::unresolved(&targets);
        m.resolve(&targets[0], ResolvedExpression { path: "name".into(), used_adapter: None });

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"field": "Name", "type": "string", "expression": "name", "adapter": null},
                {"field": "Phone", "type": "string", "expression": null, "adapter": null},
            ])
        );
        assert_eq!(m.unresolved_fields().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Phone"]);
    }
}
