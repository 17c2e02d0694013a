//! View schema: declarative projections of a bucket.
//!
//! A view is an ordered list of [`ViewEntry`] values. Fields pull from the model
//! (`model`), from a function (`computed`) or from a related bucket (`graph`), and
//! can be post-processed by [`FieldModifier`]s. Views compose through `embed`
//! (pure composition) and `extend` (base view plus overriding entries).

use std::fmt;
use std::sync::Arc;

use crate::value::Value;
use crate::view::ViewContext;

/// Function evaluated by a `computed` field.
pub type ComputedFn = Arc<dyn Fn(&ViewContext<'_>) -> Value + Send + Sync>;

/// Function applied by a `transform` modifier.
pub type TransformFn = Arc<dyn Fn(Value, &ViewContext<'_>) -> Value + Send + Sync>;

/// Ambient value spread into the output by an `inject` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectSource {
    /// The top-level record being projected
    Root,
    /// Nearest enclosing container during a chain/map
    Parent,
    /// Value fed by a chain/map
    Value,
    /// Model node currently being projected
    Current,
}

/// Where a field's value comes from.
#[derive(Clone)]
pub enum FieldSource {
    Model {
        path: String,
        subfields: Option<Vec<ViewEntry>>,
    },
    Computed(ComputedFn),
    Graph {
        link: String,
        view: Option<String>,
    },
}

/// Post-processing step applied to a field value, in declaration order.
#[derive(Clone)]
pub enum FieldModifier {
    /// Resolve another field per resolved element, keeping the container shape
    Chain(Box<ViewField>),
    /// Resolve another field per entry, output as a sequence
    Map(Box<ViewField>),
    /// Resolve another field per entry, output as a record
    Obj(Box<ViewField>),
    Pick(String),
    /// Key a sequence of objects by the given field path
    AsDict(String),
    Transform(TransformFn),
}

/// One output field definition.
#[derive(Clone)]
pub struct ViewField {
    pub source: FieldSource,
    pub modifiers: Vec<FieldModifier>,
}

impl ViewField {
    fn from_source(source: FieldSource) -> Self {
        Self {
            source,
            modifiers: Vec::new(),
        }
    }

    pub fn model(path: impl Into<String>) -> Self {
        Self::from_source(FieldSource::Model {
            path: path.into(),
            subfields: None,
        })
    }

    /// Model path whose resolved value(s) are projected through `subfields`.
    ///
    /// Paths inside `subfields` are relative to the resolved node.
    pub fn model_with(path: impl Into<String>, subfields: Vec<ViewEntry>) -> Self {
        Self::from_source(FieldSource::Model {
            path: path.into(),
            subfields: Some(subfields),
        })
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&ViewContext<'_>) -> Value + Send + Sync + 'static,
    {
        Self::from_source(FieldSource::Computed(Arc::new(f)))
    }

    /// Related record(s) through `link`, returned as stored.
    pub fn graph(link: impl Into<String>) -> Self {
        Self::from_source(FieldSource::Graph {
            link: link.into(),
            view: None,
        })
    }

    /// Related record(s) through `link`, projected through the target bucket's `view`.
    pub fn graph_view(link: impl Into<String>, view: impl Into<String>) -> Self {
        Self::from_source(FieldSource::Graph {
            link: link.into(),
            view: Some(view.into()),
        })
    }

    pub fn chain(mut self, next: ViewField) -> Self {
        self.modifiers.push(FieldModifier::Chain(Box::new(next)));
        self
    }

    pub fn map(mut self, next: ViewField) -> Self {
        self.modifiers.push(FieldModifier::Map(Box::new(next)));
        self
    }

    pub fn obj(mut self, next: ViewField) -> Self {
        self.modifiers.push(FieldModifier::Obj(Box::new(next)));
        self
    }

    pub fn pick(mut self, key: impl Into<String>) -> Self {
        self.modifiers.push(FieldModifier::Pick(key.into()));
        self
    }

    pub fn as_dict(mut self, key: impl Into<String>) -> Self {
        self.modifiers.push(FieldModifier::AsDict(key.into()));
        self
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, &ViewContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.modifiers.push(FieldModifier::Transform(Arc::new(f)));
        self
    }
}

impl fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Model { path, subfields } => f
                .debug_struct("Model")
                .field("path", path)
                .field("subfields", subfields)
                .finish(),
            FieldSource::Computed(_) => f.write_str("Computed(<fn>)"),
            FieldSource::Graph { link, view } => f
                .debug_struct("Graph")
                .field("link", link)
                .field("view", view)
                .finish(),
        }
    }
}

impl fmt::Debug for FieldModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldModifier::Chain(next) => f.debug_tuple("Chain").field(next).finish(),
            FieldModifier::Map(next) => f.debug_tuple("Map").field(next).finish(),
            FieldModifier::Obj(next) => f.debug_tuple("Obj").field(next).finish(),
            FieldModifier::Pick(key) => f.debug_tuple("Pick").field(key).finish(),
            FieldModifier::AsDict(key) => f.debug_tuple("AsDict").field(key).finish(),
            FieldModifier::Transform(_) => f.write_str("Transform(<fn>)"),
        }
    }
}

impl fmt::Debug for ViewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewField")
            .field("source", &self.source)
            .field("modifiers", &self.modifiers)
            .finish()
    }
}

/// Entry of a view or of a `model_with` subfield list.
#[derive(Debug, Clone)]
pub enum ViewEntry {
    Field { name: String, field: ViewField },
    /// Embed another view of the same bucket
    Embed(String),
    Inject(InjectSource),
}

impl ViewEntry {
    pub fn field(name: impl Into<String>, field: ViewField) -> Self {
        ViewEntry::Field {
            name: name.into(),
            field,
        }
    }

    pub fn embed(view: impl Into<String>) -> Self {
        ViewEntry::Embed(view.into())
    }

    pub fn inject(source: InjectSource) -> Self {
        ViewEntry::Inject(source)
    }
}

/// A named view of a bucket.
#[derive(Debug, Clone)]
pub struct ViewSchema {
    pub name: String,
    /// View this one extends; its entries are overridden by same-named entries here
    pub base: Option<String>,
    pub entries: Vec<ViewEntry>,
}

impl ViewSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            entries: Vec::new(),
        }
    }

    /// `extend(base, overrides)`: starts from `base`, later entries override.
    pub fn extend(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: Some(base.into()),
            entries: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: ViewField) -> Self {
        self.entries.push(ViewEntry::field(name, field));
        self
    }

    pub fn embed(mut self, view: impl Into<String>) -> Self {
        self.entries.push(ViewEntry::embed(view));
        self
    }

    pub fn inject(mut self, source: InjectSource) -> Self {
        self.entries.push(ViewEntry::Inject(source));
        self
    }
}
