//! Symbol identifiers to package-qualified monikers.
//!
//! Symbols follow the `<scheme> <manager> <name> <version> <descriptors>`
//! layout. Inside the four header fields a literal space is written as two
//! spaces and a lone `.` stands for an empty field. Symbols starting with
//! `local ` are scoped to one document and never become monikers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use codenav_api::{CodeNavError, Moniker, MonikerKind, PackageInformation, Result};
use indexmap::IndexMap;
use std::collections::BTreeSet;

pub const LOCAL_PREFIX: &str = "local ";
pub const PACKAGE_ID_TAG: &str = "scip";

/// Upper bound on distinct monikers searched for one request.
pub const DEFAULT_MONIKER_LIMIT: usize = 10;

/// The parsed header of a global symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolHeader<'a> {
    pub scheme: String,
    pub package: PackageInformation,
    pub descriptors: &'a str,
}

pub fn is_local(symbol: &str) -> bool {
    symbol.starts_with(LOCAL_PREFIX)
}

/// Parses a symbol's header. Local symbols yield `Ok(None)`.
pub fn parse_symbol(symbol: &str) -> Result<Option<SymbolHeader<'_>>> {
    if is_local(symbol) {
        return Ok(None);
    }

    let mut fields: Vec<String> = Vec::with_capacity(4);
    let mut current = String::new();
    let mut chars = symbol.char_indices().peekable();
    let mut rest = None;

    while let Some((idx, ch)) = chars.next() {
        if ch != ' ' {
            current.push(ch);
            continue;
        }
        if matches!(chars.peek(), Some((_, ' '))) {
            chars.next();
            current.push(' ');
            continue;
        }
        fields.push(std::mem::take(&mut current));
        if fields.len() == 4 {
            rest = Some(&symbol[idx + 1..]);
            break;
        }
    }

    let Some(descriptors) = rest else {
        return Err(CodeNavError::malformed_symbol(
            symbol,
            "expected scheme, manager, name, version and descriptors",
        ));
    };
    if descriptors.is_empty() {
        return Err(CodeNavError::malformed_symbol(symbol, "empty descriptors"));
    }

    let mut fields = fields.into_iter().map(|field| match field.as_str() {
        "." => String::new(),
        _ => field,
    });
    let scheme = fields.next().unwrap_or_default();
    if scheme.is_empty() {
        return Err(CodeNavError::malformed_symbol(symbol, "empty scheme"));
    }
    let package = PackageInformation {
        manager: fields.next().unwrap_or_default(),
        name: fields.next().unwrap_or_default(),
        version: fields.next().unwrap_or_default(),
    };

    Ok(Some(SymbolHeader {
        scheme,
        package,
        descriptors,
    }))
}

/// Stable id of a package triple: `scip:<b64 manager>:<b64 name>:<b64 version>`.
pub fn package_information_id(package: &PackageInformation) -> String {
    format!(
        "{}:{}:{}:{}",
        PACKAGE_ID_TAG,
        STANDARD.encode(&package.manager),
        STANDARD.encode(&package.name),
        STANDARD.encode(&package.version)
    )
}

/// Builds the moniker for `symbol`. Local symbols have none.
pub fn to_moniker(symbol: &str, kind: MonikerKind) -> Result<Option<Moniker>> {
    let Some(header) = parse_symbol(symbol)? else {
        return Ok(None);
    };
    Ok(Some(Moniker {
        kind,
        scheme: header.scheme,
        identifier: symbol.to_string(),
        package_information_id: package_information_id(&header.package),
        package: header.package,
    }))
}

/// Distinct (manager, name, version) triples of the parseable global names,
/// sorted. Local and malformed names are skipped.
pub fn package_coordinates<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<PackageInformation> {
    let packages: BTreeSet<PackageInformation> = names
        .into_iter()
        .filter_map(|name| match parse_symbol(name) {
            Ok(Some(header)) => Some(header.package),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!("skipping symbol name: {}", err);
                None
            }
        })
        .collect();
    packages.into_iter().collect()
}

/// Identity of a moniker within a [`MonikerSet`]. The kind is not part of it:
/// the first kind inserted for a key wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonikerKey {
    pub manager: String,
    pub name: String,
    pub version: String,
    pub scheme: String,
    pub identifier: String,
}

impl From<&Moniker> for MonikerKey {
    fn from(moniker: &Moniker) -> Self {
        Self {
            manager: moniker.package.manager.clone(),
            name: moniker.package.name.clone(),
            version: moniker.package.version.clone(),
            scheme: moniker.scheme.clone(),
            identifier: moniker.identifier.clone(),
        }
    }
}

/// Insertion-ordered, deduplicated, bounded set of monikers.
#[derive(Debug, Clone)]
pub struct MonikerSet {
    monikers: IndexMap<MonikerKey, Moniker>,
    limit: usize,
}

impl Default for MonikerSet {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MONIKER_LIMIT)
    }
}

impl MonikerSet {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            monikers: IndexMap::new(),
            limit,
        }
    }

    /// Returns true if the moniker was new and fit under the cap.
    pub fn add(&mut self, moniker: Moniker) -> bool {
        if self.is_full() {
            return false;
        }
        let key = MonikerKey::from(&moniker);
        if self.monikers.contains_key(&key) {
            return false;
        }
        self.monikers.insert(key, moniker);
        true
    }

    pub fn is_full(&self) -> bool {
        self.monikers.len() >= self.limit
    }

    pub fn len(&self) -> usize {
        self.monikers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monikers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Moniker> {
        self.monikers.values()
    }

    pub fn into_vec(self) -> Vec<Moniker> {
        self.monikers.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUNC: &str = "scip-go gomod github.com/x/pkg v1.2.3 pkg/Func().";

    #[test]
    fn parses_header_fields() {
        let header = parse_symbol(FUNC).unwrap().unwrap();
        assert_eq!(header.scheme, "scip-go");
        assert_eq!(header.package.manager, "gomod");
        assert_eq!(header.package.name, "github.com/x/pkg");
        assert_eq!(header.package.version, "v1.2.3");
        assert_eq!(header.descriptors, "pkg/Func().");
    }

    #[test]
    fn double_space_escapes_and_dot_is_empty() {
        let header = parse_symbol("scip-ts npm my  pkg . `a b`/c.").unwrap().unwrap();
        assert_eq!(header.package.name, "my pkg");
        assert_eq!(header.package.version, "");
        assert_eq!(header.descriptors, "`a b`/c.");
    }

    #[test]
    fn local_symbols_have_no_moniker() {
        assert!(parse_symbol("local 12").unwrap().is_none());
        assert!(to_moniker("local 12", MonikerKind::Import).unwrap().is_none());
    }

    #[test]
    fn malformed_symbols_are_errors() {
        for symbol in ["", "scip-go gomod", "scip-go gomod a v1 ", ". gomod a v1 x."] {
            assert!(
                matches!(parse_symbol(symbol), Err(CodeNavError::MalformedSymbol { .. })),
                "{symbol:?} should be malformed"
            );
        }
    }

    #[test]
    fn package_id_is_base64_of_the_triple() {
        let package = PackageInformation {
            manager: "gomod".into(),
            name: "github.com/x/pkg".into(),
            version: "v1.2.3".into(),
        };
        assert_eq!(
            package_information_id(&package),
            "scip:Z29tb2Q=:Z2l0aHViLmNvbS94L3BrZw==:djEuMi4z"
        );
    }

    #[test]
    fn moniker_identifier_is_the_full_symbol() {
        let moniker = to_moniker(FUNC, MonikerKind::Export).unwrap().unwrap();
        assert_eq!(moniker.identifier, FUNC);
        assert_eq!(moniker.scheme, "scip-go");
        assert_eq!(moniker.kind, MonikerKind::Export);
    }

    #[test]
    fn set_is_idempotent_and_ordered() {
        let a = to_moniker(FUNC, MonikerKind::Import).unwrap().unwrap();
        let b = to_moniker("scip-go gomod github.com/x/pkg v1.2.3 pkg/Other().", MonikerKind::Import)
            .unwrap()
            .unwrap();
        let mut set = MonikerSet::default();
        assert!(set.add(a.clone()));
        assert!(set.add(b.clone()));
        assert!(!set.add(a.clone()));

        let mut export = a.clone();
        export.kind = MonikerKind::Export;
        assert!(!set.add(export));

        assert_eq!(set.into_vec(), vec![a, b]);
    }

    #[test]
    fn set_respects_cap() {
        let mut set = MonikerSet::with_limit(3);
        for i in 0..5 {
            let symbol = format!("scip-go gomod m v1 pkg/F{i}().");
            set.add(to_moniker(&symbol, MonikerKind::Import).unwrap().unwrap());
        }
        assert_eq!(set.len(), 3);
        assert!(set.is_full());
    }

    #[test]
    fn set_keeps_one_entry_per_key_in_first_seen_order() {
        let symbols = [
            "scip-go gomod a v1 pkg/F().",
            "scip-go gomod a v2 pkg/F().",
            "scip-go gomod b v1 pkg/F().",
            "scip-ts npm a v1 pkg/F().",
            "scip-go gomod a v1 pkg/G().",
        ];
        let kinds = [MonikerKind::Import, MonikerKind::Export, MonikerKind::Implementation];
        let mut input = Vec::new();
        for (i, symbol) in symbols.iter().enumerate() {
            for copy in 0..=i % 3 {
                input.push(to_moniker(symbol, kinds[(i + copy) % 3]).unwrap().unwrap());
            }
        }
        // Stride permutation, 7 is coprime with the input length.
        assert_eq!(input.len(), 9);
        let shuffled: Vec<Moniker> = (0..input.len())
            .map(|i| input[(i * 7) % input.len()].clone())
            .collect();

        let mut set = MonikerSet::with_limit(100);
        let mut expected_keys: Vec<MonikerKey> = Vec::new();
        for moniker in shuffled {
            let key = MonikerKey::from(&moniker);
            let fresh = !expected_keys.contains(&key);
            if fresh {
                expected_keys.push(key);
            }
            assert_eq!(set.add(moniker), fresh);
        }

        assert_eq!(set.len(), symbols.len());
        let keys: Vec<MonikerKey> = set.iter().map(MonikerKey::from).collect();
        assert_eq!(keys, expected_keys);
    }

    #[test]
    fn package_coordinates_are_distinct_and_sorted() {
        let names = [
            "scip-go gomod zeta v2 z/A#.",
            "scip-go gomod alpha v1 a/B#.",
            "scip-go gomod alpha v1 a/C#.",
            "local 4",
            "garbage",
        ];
        let packages = package_coordinates(names);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "alpha");
        assert_eq!(packages[1].name, "zeta");
    }
}
