//! View composition: resolves `embed` and `extend` into a flat entry list.

use super::error::{ViewError, ViewResult};
use crate::schema::types::{InjectSource, ViewEntry, ViewField, ViewSchema};
use crate::schema::Bucket;

/// A view entry after composition.
#[derive(Debug, Clone, Copy)]
pub enum FlatEntry<'v> {
    Field { name: &'v str, field: &'v ViewField },
    Inject(InjectSource),
}

impl<'v> FlatEntry<'v> {
    pub fn name(&self) -> Option<&'v str> {
        match self {
            FlatEntry::Field { name, .. } => Some(name),
            FlatEntry::Inject(_) => None,
        }
    }
}

/// Flattens `view` of `bucket`.
///
/// The base of an extending view comes first; the view's own fields replace base
/// fields of the same name in place, new fields are appended. Embedded views are
/// spliced where they appear and must not redefine a field. Cycles through `extend`
/// or `embed` are rejected.
pub fn flatten<'v>(bucket: &'v Bucket, view: &'v ViewSchema) -> ViewResult<Vec<FlatEntry<'v>>> {
    let mut stack = Vec::new();
    flatten_view(bucket, view, &mut stack)
}

/// Flattens a loose entry list, such as the subfields of a `model_with` field.
pub fn flatten_entries<'v>(
    bucket: &'v Bucket,
    owner: &str,
    entries: &'v [ViewEntry],
) -> ViewResult<Vec<FlatEntry<'v>>> {
    let mut stack = Vec::new();
    flatten_list(bucket, owner, entries, &mut stack)
}

fn lookup<'v>(bucket: &'v Bucket, name: &str) -> ViewResult<&'v ViewSchema> {
    bucket.view(name).ok_or_else(|| ViewError::ViewNotFound {
        bucket: bucket.name.clone(),
        view: name.to_string(),
    })
}

fn flatten_view<'v>(
    bucket: &'v Bucket,
    view: &'v ViewSchema,
    stack: &mut Vec<&'v str>,
) -> ViewResult<Vec<FlatEntry<'v>>> {
    if stack.contains(&view.name.as_str()) {
        let mut cycle = stack.join(" -> ");
        cycle.push_str(" -> ");
        cycle.push_str(&view.name);
        return Err(ViewError::invalid(&view.name, format!("view cycle: {}", cycle)));
    }
    stack.push(view.name.as_str());

    let mut flat = match &view.base {
        Some(base) => flatten_view(bucket, lookup(bucket, base)?, stack)?,
        None => Vec::new(),
    };
    for entry in flatten_list(bucket, &view.name, &view.entries, stack)? {
        let existing = entry
            .name()
            .and_then(|name| flat.iter().position(|e| e.name() == Some(name)));
        match existing {
            Some(index) => flat[index] = entry,
            None => flat.push(entry),
        }
    }

    stack.pop();
    Ok(flat)
}

fn flatten_list<'v>(
    bucket: &'v Bucket,
    owner: &str,
    entries: &'v [ViewEntry],
    stack: &mut Vec<&'v str>,
) -> ViewResult<Vec<FlatEntry<'v>>> {
    let mut flat: Vec<FlatEntry<'v>> = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            ViewEntry::Field { name, field } => flat.push(FlatEntry::Field { name, field }),
            ViewEntry::Inject(source) => flat.push(FlatEntry::Inject(*source)),
            ViewEntry::Embed(name) => {
                let embedded = lookup(bucket, name)?;
                flat.extend(flatten_view(bucket, embedded, stack)?);
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    for name in flat.iter().filter_map(FlatEntry::name) {
        if !seen.insert(name) {
            return Err(ViewError::invalid(
                owner,
                format!("field '{}' is defined more than once", name),
            ));
        }
    }
    Ok(flat)
}
