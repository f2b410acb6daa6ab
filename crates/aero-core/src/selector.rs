#![forbid(unsafe_code)]

//! Minimal CSS selector matching for [`MemoryDom`](crate::MemoryDom).
//!
//! Supported: type (`div`), universal (`*`), `#id`, `.class`, compounds
//! (`div.a#b`), descendant and child (`>`) combinators, and selector lists
//! (`a, b`). Anything else fails to parse and therefore matches nothing.

/// Tree view the matcher walks.
pub(crate) trait SelectorTree {
    type Id: Copy + PartialEq;

    fn tag(&self, id: Self::Id) -> &str;
    fn element_id(&self, id: Self::Id) -> Option<&str>;
    fn has_class(&self, id: Self::Id, class: &str) -> bool;
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One compound selector. An empty compound is the universal selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) ids: Vec<String>,
    pub(crate) classes: Vec<String>,
}

impl Compound {
    fn matches<T: SelectorTree>(&self, tree: &T, node: T::Id) -> bool {
        if let Some(tag) = &self.tag
            && !tree.tag(node).eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if !self
            .ids
            .iter()
            .all(|id| tree.element_id(node) == Some(id.as_str()))
        {
            return false;
        }
        self.classes.iter().all(|class| tree.has_class(node, class))
    }
}

/// Compounds joined by combinators, left to right.
/// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches<T: SelectorTree>(&self, tree: &T, node: T::Id) -> bool {
        matches_from(tree, node, &self.compounds, &self.combinators)
    }
}

fn matches_from<T: SelectorTree>(
    tree: &T,
    node: T::Id,
    compounds: &[Compound],
    combinators: &[Combinator],
) -> bool {
    let Some((last, rest)) = compounds.split_last() else {
        return true;
    };
    if !last.matches(tree, node) {
        return false;
    }
    let Some((combinator, outer)) = combinators.split_last() else {
        return true;
    };
    match combinator {
        Combinator::Child => tree
            .parent(node)
            .is_some_and(|parent| matches_from(tree, parent, rest, outer)),
        Combinator::Descendant => {
            let mut ancestor = tree.parent(node);
            while let Some(candidate) = ancestor {
                if matches_from(tree, candidate, rest, outer) {
                    return true;
                }
                ancestor = tree.parent(candidate);
            }
            false
        }
    }
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<Complex>);

impl SelectorList {
    pub(crate) fn parse(input: &str) -> Option<Self> {
        input
            .split(',')
            .map(parse_complex)
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub(crate) fn matches<T: SelectorTree>(&self, tree: &T, node: T::Id) -> bool {
        self.0.iter().any(|complex| complex.matches(tree, node))
    }
}

fn parse_complex(input: &str) -> Option<Complex> {
    let spaced = input.replace('>', " > ");
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in spaced.split_whitespace() {
        if token == ">" {
            if compounds.is_empty() || pending.is_some() {
                return None;
            }
            pending = Some(Combinator::Child);
            continue;
        }
        let compound = parse_compound(token)?;
        if !compounds.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }
        compounds.push(compound);
    }

    if compounds.is_empty() || pending.is_some() {
        return None;
    }
    Some(Complex {
        compounds,
        combinators,
    })
}

/// Parse a single compound such as `div`, `*`, `.a.b` or `section#top.wide`.
pub(crate) fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = token;

    if let Some(tail) = rest.strip_prefix('*') {
        rest = tail;
    } else {
        let len = ident_len(rest);
        if len > 0 {
            compound.tag = Some(rest[..len].to_ascii_lowercase());
            rest = &rest[len..];
        }
    }

    while let Some(marker) = rest.chars().next() {
        let tail = &rest[marker.len_utf8()..];
        let len = ident_len(tail);
        if len == 0 {
            return None;
        }
        let ident = tail[..len].to_owned();
        match marker {
            '.' => compound.classes.push(ident),
            '#' => compound.ids.push(ident),
            _ => return None,
        }
        rest = &tail[len..];
    }

    if token.is_empty() {
        return None;
    }
    Some(compound)
}

fn ident_len(input: &str) -> usize {
    input
        .char_indices()
        .find(|&(_, ch)| !(ch.is_alphanumeric() || ch == '-' || ch == '_'))
        .map_or(input.len(), |(idx, _)| idx)
}
