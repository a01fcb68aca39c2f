use serde::Serialize;

/// Widget kind the host should generate for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Bool,
}

/// A single settings field: the settings key plus a localized label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    pub description: String,
    pub kind: PropertyKind,
}

/// Declarative settings schema returned by a filter for host-generated UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    props: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bool(&mut self, name: &str, description: &str) -> &Property {
        self.push(name, description, PropertyKind::Bool)
    }

    fn push(&mut self, name: &str, description: &str, kind: PropertyKind) -> &Property {
        if let Some(index) = self.props.iter().position(|prop| prop.name == name) {
            tracing::warn!(property = name, "duplicate property name; keeping the first");
            return &self.props[index];
        }
        self.props.push(Property {
            name: name.to_string(),
            description: description.to_string(),
            kind,
        });
        &self.props[self.props.len() - 1]
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.props.iter().find(|prop| prop.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.props.iter()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}
