//! Schema provider for template validation.
//!
//! The validator never sees feature data; it only asks a [`SchemaProvider`]
//! which attribute a path segment names and what type that attribute has.

use smol_str::SmolStr;
use std::collections::HashMap;
use std::fmt;

/// Leaf attribute types. Paths cannot navigate into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleType {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    DateTime,
    Geometry,
}

impl SimpleType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Geometry => "Geometry",
        }
    }
}

/// The type currently addressable by a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Simple(SimpleType),
    /// A complex type, by name. Its attributes live in the schema.
    Complex(SmolStr),
}

impl TypeDescriptor {
    pub fn complex(name: impl Into<SmolStr>) -> Self {
        Self::Complex(name.into())
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(simple) => f.write_str(simple.name()),
            Self::Complex(name) => f.write_str(name),
        }
    }
}

/// An attribute of a complex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Attribute name, optionally namespace-prefixed (`gsml:specification`).
    pub name: SmolStr,
    pub attribute_type: TypeDescriptor,
    /// Whether the attribute may occur more than once.
    pub multiple: bool,
}

/// A complex type and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: SmolStr,
    pub attributes: Vec<AttributeDefinition>,
}

impl ComplexType {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<SmolStr>, attribute_type: TypeDescriptor) -> Self {
        self.attributes.push(AttributeDefinition {
            name: name.into(),
            attribute_type,
            multiple: false,
        });
        self
    }

    pub fn with_collection(mut self, name: impl Into<SmolStr>, attribute_type: TypeDescriptor) -> Self {
        self.attributes.push(AttributeDefinition {
            name: name.into(),
            attribute_type,
            multiple: true,
        });
        self
    }

    /// Finds the attribute a path segment names.
    ///
    /// Tried in order: the exact (qualified) name; the unqualified local
    /// part on both sides, so `gml:name` and `name` address the same
    /// attribute; finally a typed step `attribute:Type`, where the prefix
    /// names the attribute and the local part its complex type.
    pub fn attribute(&self, segment: &str) -> Option<&AttributeDefinition> {
        if let Some(exact) = self.attributes.iter().find(|a| a.name == segment) {
            return Some(exact);
        }
        let local = local_name(segment);
        if let Some(by_local) = self.attributes.iter().find(|a| local_name(&a.name) == local) {
            return Some(by_local);
        }
        let (attribute, type_name) = segment.split_once(':')?;
        self.attributes.iter().find(|a| {
            a.name == attribute
                && matches!(&a.attribute_type, TypeDescriptor::Complex(name) if local_name(name) == type_name)
        })
    }
}

/// The part of a qualified name after its namespace prefix.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Read-only schema access for the validator.
///
/// Implementations must tolerate concurrent reads: independent templates
/// may be validated in parallel against one provider.
pub trait SchemaProvider: Send + Sync {
    /// Type of the feature the template encodes; the root scope.
    fn feature_type(&self) -> TypeDescriptor;

    /// Name of the root feature type, possibly qualified.
    fn root_type_name(&self) -> &str;

    /// Looks up a named attribute within `owner`.
    ///
    /// Returns `None` when `owner` is simple or has no such attribute.
    fn resolve_attribute(&self, owner: &TypeDescriptor, segment: &str) -> Option<TypeDescriptor>;
}

/// In-memory schema keyed by complex type name.
#[derive(Debug, Clone)]
pub struct InMemorySchema {
    root: SmolStr,
    types: HashMap<SmolStr, ComplexType>,
}

impl InMemorySchema {
    /// Creates a schema whose root feature type is `root`.
    pub fn new(root: ComplexType) -> Self {
        let name = root.name.clone();
        let mut types = HashMap::new();
        types.insert(name.clone(), root);
        Self { root: name, types }
    }

    pub fn with_type(mut self, complex: ComplexType) -> Self {
        self.types.insert(complex.name.clone(), complex);
        self
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.types.get(name)
    }

    /// A GeoSciML mapped feature schema, useful for demos and tests.
    pub fn example() -> Self {
        let mapped_feature = ComplexType::new("gsml:MappedFeature")
            .with_attribute("gml:name", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gml:description", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gsml:observationMethod", TypeDescriptor::complex("gsml:CGI_TermValue"))
            .with_attribute("gsml:positionalAccuracy", TypeDescriptor::complex("gsml:CGI_NumericValue"))
            .with_attribute("gsml:samplingFrame", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gsml:specification", TypeDescriptor::complex("gsml:GeologicUnit"))
            .with_attribute("gsml:shape", TypeDescriptor::Simple(SimpleType::Geometry));

        let geologic_unit = ComplexType::new("gsml:GeologicUnit")
            .with_attribute("gml:name", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gml:description", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gsml:purpose", TypeDescriptor::Simple(SimpleType::String))
            .with_collection("gsml:composition", TypeDescriptor::complex("gsml:CompositionPart"));

        let composition_part = ComplexType::new("gsml:CompositionPart")
            .with_attribute("gsml:role", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gsml:proportion", TypeDescriptor::complex("gsml:CGI_TermValue"))
            .with_collection("gsml:lithology", TypeDescriptor::complex("gsml:ControlledConcept"));

        let controlled_concept = ComplexType::new("gsml:ControlledConcept")
            .with_attribute("gml:name", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("gsml:vocabulary", TypeDescriptor::Simple(SimpleType::String));

        let term_value = ComplexType::new("gsml:CGI_TermValue")
            .with_attribute("gsml:value", TypeDescriptor::Simple(SimpleType::String));

        let numeric_value = ComplexType::new("gsml:CGI_NumericValue")
            .with_attribute("gsml:principalValue", TypeDescriptor::Simple(SimpleType::Double))
            .with_attribute("gsml:uom", TypeDescriptor::Simple(SimpleType::String));

        Self::new(mapped_feature)
            .with_type(geologic_unit)
            .with_type(composition_part)
            .with_type(controlled_concept)
            .with_type(term_value)
            .with_type(numeric_value)
    }
}

impl SchemaProvider for InMemorySchema {
    fn feature_type(&self) -> TypeDescriptor {
        TypeDescriptor::Complex(self.root.clone())
    }

    fn root_type_name(&self) -> &str {
        &self.root
    }

    fn resolve_attribute(&self, owner: &TypeDescriptor, segment: &str) -> Option<TypeDescriptor> {
        let TypeDescriptor::Complex(name) = owner else {
            return None;
        };
        self.types
            .get(name)?
            .attribute(segment)
            .map(|attribute| attribute.attribute_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> InMemorySchema {
        InMemorySchema::new(
            ComplexType::new("Station")
                .with_attribute("name", TypeDescriptor::Simple(SimpleType::String))
                .with_collection("members", TypeDescriptor::complex("Member")),
        )
        .with_type(
            ComplexType::new("Member")
                .with_attribute("code", TypeDescriptor::Simple(SimpleType::Integer)),
        )
    }

    #[test]
    fn root_type() {
        let schema = station();
        assert_eq!(schema.root_type_name(), "Station");
        assert_eq!(schema.feature_type(), TypeDescriptor::complex("Station"));
    }

    #[test]
    fn resolves_by_exact_and_local_name() {
        let schema = InMemorySchema::example();
        let root = schema.feature_type();
        assert_eq!(
            schema.resolve_attribute(&root, "gml:name"),
            Some(TypeDescriptor::Simple(SimpleType::String))
        );
        assert_eq!(
            schema.resolve_attribute(&root, "name"),
            Some(TypeDescriptor::Simple(SimpleType::String))
        );
        assert_eq!(
            schema.resolve_attribute(&root, "gsml:specification"),
            Some(TypeDescriptor::complex("gsml:GeologicUnit"))
        );
    }

    #[test]
    fn resolves_typed_step() {
        let schema = station();
        let root = schema.feature_type();
        assert_eq!(
            schema.resolve_attribute(&root, "members:Member"),
            Some(TypeDescriptor::complex("Member"))
        );
        assert_eq!(schema.resolve_attribute(&root, "members:Other"), None);
    }

    #[test]
    fn simple_types_have_no_attributes() {
        let schema = station();
        let string = TypeDescriptor::Simple(SimpleType::String);
        assert_eq!(schema.resolve_attribute(&string, "length"), None);
    }

    #[test]
    fn unknown_attribute_and_type() {
        let schema = station();
        assert_eq!(schema.resolve_attribute(&schema.feature_type(), "missing"), None);
        assert_eq!(
            schema.resolve_attribute(&TypeDescriptor::complex("Nowhere"), "name"),
            None
        );
    }

    #[test]
    fn local_name_strips_prefix() {
        assert_eq!(local_name("gsml:MappedFeature"), "MappedFeature");
        assert_eq!(local_name("plain"), "plain");
    }

    #[test]
    fn descriptor_display() {
        assert_eq!(TypeDescriptor::complex("Member").to_string(), "Member");
        assert_eq!(
            TypeDescriptor::Simple(SimpleType::Geometry).to_string(),
            "Geometry"
        );
    }
}
