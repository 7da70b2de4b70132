//! Record resolution.
//!
//! Walks a record's field metadata (breadth-first through explicit and
//! implicit embeds) and produces an index from decode name to a field
//! locator plus mode overrides. Name collisions resolve shallower over
//! deeper, then tagged over untagged, then declaration order. Indexes are
//! cached per record type; tag names are decoder configuration, so the
//! cache lives on the decoder.

use std::any::TypeId;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::error::{FieldError, TagError};
use crate::level::Level;
use crate::modes::{Overrides, SetOption};
use crate::target::{FieldInfo, Kind, RecordMeta};

pub(crate) const DEFAULT_BASE_TAG: &str = "qry";
pub(crate) const DEFAULT_SET_TAG: &str = "qrySet";

const EMBED_DIRECTIVE: &str = "embed";

/// Tag names the resolver recognizes.
#[derive(Debug, Clone)]
pub(crate) struct TagNames {
    pub base: String,
    pub set: String,
}

impl Default for TagNames {
    fn default() -> Self {
        TagNames {
            base: DEFAULT_BASE_TAG.to_string(),
            set: DEFAULT_SET_TAG.to_string(),
        }
    }
}

/// One step of a field locator: index into the record, optionally peeling
/// pointer layers afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocatorStep {
    pub index: usize,
    pub follow_pointer: bool,
}

/// A resolved field: how to reach it and which overrides apply.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedField {
    pub locator: Vec<LocatorStep>,
    pub overrides: Overrides,
    tagged: bool,
}

impl ResolvedField {
    fn depth(&self) -> usize {
        self.locator.len()
    }
}

/// Decode-name index of one record type.
#[derive(Debug, Default)]
pub(crate) struct RecordIndex {
    entries: IndexMap<String, ResolvedField>,
}

impl RecordIndex {
    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.entries.get(name)
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    fn register(&mut self, name: String, field: ResolvedField) {
        // BFS discovery makes depth monotonic; the explicit check also
        // covers tagged-over-untagged at equal depth.
        let wins = match self.entries.get(&name) {
            None => true,
            Some(existing) => {
                field.depth() < existing.depth()
                    || (field.depth() == existing.depth() && field.tagged && !existing.tagged)
            }
        };
        if wins {
            self.entries.insert(name, field);
        }
    }
}

/// Per-decoder resolution cache.
#[derive(Debug, Default)]
pub(crate) struct RecordCache {
    entries: RwLock<HashMap<TypeId, Arc<RecordIndex>>>,
}

impl RecordCache {
    pub fn resolve(
        &self,
        meta: &RecordMeta,
        tags: &TagNames,
    ) -> Result<Arc<RecordIndex>, FieldError> {
        if let Ok(cache) = self.entries.read() {
            if let Some(index) = cache.get(&meta.type_id) {
                return Ok(Arc::clone(index));
            }
        }

        let index = Arc::new(build_index(meta, tags)?);
        if let Ok(mut cache) = self.entries.write() {
            cache.insert(meta.type_id, Arc::clone(&index));
        }
        Ok(index)
    }
}

/// Lowercase the first character, the default decode-name derivation.
fn decode_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Default)]
struct ParsedTags {
    /// Decode name from the base tag; `Some("-")` only via the `"-,"` form.
    name: Option<String>,
    omit: bool,
    embed: bool,
    overrides: Overrides,
    has_set: bool,
}

fn parse_tags(field: &FieldInfo, tags: &TagNames) -> Result<ParsedTags, TagError> {
    let mut parsed = ParsedTags::default();

    match field.tag(&tags.base) {
        None => {}
        Some("") => return Err(TagError::EmptyBaseTag),
        Some("-") => parsed.omit = true,
        Some("-,") => parsed.name = Some("-".to_string()),
        Some(tag) => {
            let mut items = tag.split(',');
            let name = items.next().unwrap_or_default();
            if !name.is_empty() {
                parsed.name = Some(name.to_string());
            }
            for directive in items {
                if directive == EMBED_DIRECTIVE {
                    parsed.embed = true;
                } else {
                    return Err(TagError::InvalidBaseDirective(directive.to_string()));
                }
            }
            if parsed.embed && parsed.name.is_some() {
                return Err(TagError::EmbedWithName);
            }
        }
    }

    match field.tag(&tags.set) {
        None => {}
        Some("") => return Err(TagError::EmptySetTag),
        Some(tag) => {
            parsed.has_set = true;
            for item in tag.split(',') {
                match item.split_once('=') {
                    None => {
                        let opt = SetOption::parse_tag(item)
                            .ok_or_else(|| TagError::InvalidSetOption(item.to_string()))?;
                        parsed.overrides.default_level.push(opt);
                    }
                    Some((level, opt)) => {
                        let level = Level::parse_tag(level)
                            .ok_or_else(|| TagError::InvalidSetLevel(level.to_string()))?;
                        let opt = SetOption::parse_tag(opt)
                            .ok_or_else(|| TagError::InvalidSetOption(opt.to_string()))?;
                        match parsed
                            .overrides
                            .per_level
                            .iter_mut()
                            .find(|(l, _)| *l == level)
                        {
                            Some((_, opts)) => opts.push(opt),
                            None => parsed.overrides.per_level.push((level, vec![opt])),
                        }
                    }
                }
            }
        }
    }

    if parsed.has_set {
        if parsed.omit {
            return Err(TagError::OmitWithSetOptions);
        }
        if parsed.embed {
            return Err(TagError::EmbedWithSetOptions);
        }
    }

    Ok(parsed)
}

fn field_error(record: &RecordMeta, field: &FieldInfo, cause: TagError) -> FieldError {
    FieldError {
        field: field.name,
        record: record.type_name,
        cause,
    }
}

fn build_index(meta: &RecordMeta, tags: &TagNames) -> Result<RecordIndex, FieldError> {
    let mut index = RecordIndex::default();
    let mut work: VecDeque<(RecordMeta, Vec<LocatorStep>)> = VecDeque::new();
    work.push_back((*meta, Vec::new()));

    while let Some((record, prefix)) = work.pop_front() {
        for (i, field) in record.fields.iter().enumerate() {
            let parsed =
                parse_tags(field, tags).map_err(|cause| field_error(&record, field, cause))?;

            if parsed.omit {
                continue;
            }

            let field_meta = (field.ty)();
            let (peeled, followed) = field_meta.peeled();
            // Embed steps peel pointer layers; a leaf locator ends on the
            // field itself so indirect handling still sees the pointer.
            let embed_step = LocatorStep {
                index: i,
                follow_pointer: followed,
            };

            if parsed.embed {
                if !field.anonymous && !field.exported {
                    return Err(field_error(&record, field, TagError::EmbedUnexported));
                }
                if field_meta.kind == Kind::Pointer && !field.exported {
                    return Err(field_error(&record, field, TagError::EmbedUnexportedPointer));
                }
                let Some(inner) = peeled.record else {
                    return Err(field_error(&record, field, TagError::EmbedInvalidType));
                };
                let mut locator = prefix.clone();
                locator.push(embed_step);
                work.push_back((inner(), locator));
                continue;
            }

            // Implicit embed: untagged anonymous record fields splice their
            // names in, unless the field type is a text-decode leaf.
            if parsed.name.is_none()
                && field.anonymous
                && !field_meta.text_decodes
                && !peeled.text_decodes
            {
                if let Some(inner) = peeled.record {
                    if parsed.has_set {
                        return Err(field_error(&record, field, TagError::EmbedWithSetOptions));
                    }
                    let mut locator = prefix.clone();
                    locator.push(embed_step);
                    work.push_back((inner(), locator));
                    continue;
                }
                // Not a record: registered as an ordinary leaf below.
            }

            if !field.exported {
                if parsed.name.is_some() || parsed.has_set {
                    return Err(field_error(&record, field, TagError::TagOnUnexported));
                }
                continue;
            }

            let tagged = parsed.name.is_some();
            let name = parsed
                .name
                .unwrap_or_else(|| decode_name(field.name));
            let mut locator = prefix.clone();
            locator.push(LocatorStep {
                index: i,
                follow_pointer: false,
            });
            index.register(
                name,
                ResolvedField {
                    locator,
                    overrides: parsed.overrides,
                    tagged,
                },
            );
        }
    }

    Ok(index)
}

