//! Matching of Rust vertex fields to GLSL attributes.
//!
//! Names are split into lowercase words on underscores and case changes.
//! Each word is then replaced by its canonical form from [SYNONYMS].
//! A field matches the attribute sharing the most distinct canonical words with it.
//! Ties go to the attribute declared first.
//!
//! | Rust field | GLSL attribute | Canonical words |
//! |---|---|---|
//! | `position` | `a_VertexPosition` | `position` |
//! | `tex_coord` | `a_UV` | `texcoord` |
//! | `bone_weights` | `boneWeights` | `boneweights` |
//!
//! Attribute names may use a single character storage qualifier prefix
//! like `a_`, `v_`, or `u_`, which is ignored.
use std::collections::BTreeSet;

use log::{debug, trace};

use crate::{error::NoMatchError, glsl::extract_attributes, VariableDeclaration};

/// Canonical forms for words commonly used in vertex attribute names.
///
/// Each entry maps a lowercase word to its canonical word.
/// Words not listed here are compared as is.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("pos", "position"),
    ("position", "position"),
    ("nrm", "normal"),
    ("normal", "normal"),
    ("uv", "texcoord"),
    ("tex", "texcoord"),
    ("coord", "texcoord"),
    ("texcoord", "texcoord"),
    ("col", "color"),
    ("colour", "color"),
    ("color", "color"),
    ("vert", "vertex"),
    ("vertex", "vertex"),
    ("tangent", "tangent"),
    ("bi", "binormal"),
    ("binormal", "binormal"),
    ("bone", "boneweights"),
    ("weights", "boneweights"),
    ("boneweights", "boneweights"),
    ("indices", "boneindices"),
    ("boneindices", "boneindices"),
];

/// Prefixes for attribute, varying, and uniform names.
const QUALIFIER_PREFIXES: [&str; 3] = ["a_", "v_", "u_"];

/// An attribute that has not been matched to a field yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The index of the declaration in the shader.
    pub location: u32,
    pub declaration: VariableDeclaration,
}

/// The attributes of a shader available for matching the fields of a single vertex struct.
///
/// Matched attributes are removed from the pool,
/// so no two fields of the same struct can use the same attribute.
/// Create a new pool for each vertex struct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Create a pool from attributes in declaration order.
    pub fn new(attributes: Vec<VariableDeclaration>) -> Self {
        Self {
            candidates: attributes
                .into_iter()
                .enumerate()
                .map(|(i, declaration)| Candidate {
                    location: i as u32,
                    declaration,
                })
                .collect(),
        }
    }

    /// Create a pool from the attributes declared in `glsl_source`.
    pub fn from_source(glsl_source: &str) -> Self {
        Self::new(extract_attributes(glsl_source))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// The names of the remaining attributes in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|c| c.declaration.name.clone())
            .collect()
    }

    /// Remove and return the best matching attribute for `field`.
    ///
    /// The pool is unchanged if no attribute has a word in common with `field`.
    pub fn take_best(&mut self, field: &VariableDeclaration) -> Result<Candidate, NoMatchError> {
        let field_words = normalized_words(&field.name);

        let mut best: Option<(usize, usize)> = None;
        for (i, candidate) in self.candidates.iter().enumerate() {
            let name = strip_qualifier_prefix(&candidate.declaration.name);
            let score = match_score(&field_words, &normalized_words(name));
            trace!(
                "Field {:?} and attribute {:?} have score {score}",
                field.name,
                candidate.declaration.name
            );

            // Only a strictly higher score replaces the first best candidate.
            if score > 0 && best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, _)) => Ok(self.candidates.remove(i)),
            None => Err(NoMatchError {
                field: field.name.clone(),
                candidates: self.names(),
            }),
        }
    }
}

/// Find the attribute in `pool` for `field` and remove it from the pool.
///
/// Returns the original name of the matched attribute.
/**
```rust
use glsl_vertex_layout::{resolve_field, CandidatePool, VariableDeclaration};

let mut pool = CandidatePool::from_source(
    "attribute vec3 a_VertexPosition; attribute vec4 a_VertexColor;",
);

let position = VariableDeclaration::new("Position", "[f32;3]");
assert_eq!("a_VertexPosition", resolve_field(&position, &mut pool).unwrap());

let color = VariableDeclaration::new("Color", "[f32;4]");
assert_eq!("a_VertexColor", resolve_field(&color, &mut pool).unwrap());
assert!(pool.is_empty());
```
 */
pub fn resolve_field(
    field: &VariableDeclaration,
    pool: &mut CandidatePool,
) -> Result<String, NoMatchError> {
    let candidate = pool.take_best(field)?;
    debug!(
        "Matched field {:?} to attribute {:?}",
        field.name, candidate.declaration.name
    );
    Ok(candidate.declaration.name)
}

// The number of shared words, or 0 if the names only share numbers like the 1 in Color1.
fn match_score(field_words: &BTreeSet<String>, attribute_words: &BTreeSet<String>) -> usize {
    let shared: Vec<_> = field_words.intersection(attribute_words).collect();
    if shared.iter().all(|w| w.chars().all(|c| c.is_numeric())) {
        0
    } else {
        shared.len()
    }
}

fn strip_qualifier_prefix(name: &str) -> &str {
    QUALIFIER_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

fn normalized_words(name: &str) -> BTreeSet<String> {
    split_words(name).into_iter().map(normalize_word).collect()
}

/// Convert `word` to lowercase and replace it with its canonical form from [SYNONYMS] if present.
pub fn normalize_word(word: &str) -> String {
    let word = word.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(from, _)| *from == word)
        .map(|(_, to)| to.to_string())
        .unwrap_or(word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Separator,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_numeric() {
            Self::Digit
        } else if c.is_uppercase() {
            Self::Upper
        } else if c.is_alphanumeric() {
            // Letters without case continue the current word.
            Self::Lower
        } else {
            Self::Separator
        }
    }
}

/// Split a snake_case, camelCase, or PascalCase name into words.
///
/// Consecutive capitals form a single word unless followed by a lowercase letter,
/// so `HTMLParser` becomes `HTML` and `Parser`.
/// Digits form their own words, so `Color0` becomes `Color` and `0`.
pub fn split_words(name: &str) -> Vec<&str> {
    let chars: Vec<(usize, CharClass)> = name
        .char_indices()
        .map(|(i, c)| (i, CharClass::of(c)))
        .collect();

    let mut words = Vec::new();
    let mut start = None;
    for (k, &(i, class)) in chars.iter().enumerate() {
        if class == CharClass::Separator {
            if let Some(s) = start.take() {
                words.push(&name[s..i]);
            }
            continue;
        }

        match start {
            Some(s) => {
                // The previous character is part of the current word.
                let previous = chars[k - 1].1;
                let next = chars.get(k + 1).map(|(_, c)| *c);
                if is_word_boundary(previous, class, next) {
                    words.push(&name[s..i]);
                    start = Some(i);
                }
            }
            None => start = Some(i),
        }
    }
    if let Some(s) = start {
        words.push(&name[s..]);
    }

    words
}

fn is_word_boundary(previous: CharClass, current: CharClass, next: Option<CharClass>) -> bool {
    match (previous, current) {
        (CharClass::Lower | CharClass::Digit, CharClass::Upper) => true,
        (CharClass::Upper | CharClass::Lower, CharClass::Digit) => true,
        (CharClass::Digit, CharClass::Lower) => true,
        (CharClass::Upper, CharClass::Upper) => next == Some(CharClass::Lower),
        _ => false,
    }
}
