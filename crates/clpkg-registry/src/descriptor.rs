//! Package descriptors and their JSON document form.
//!
//! A descriptor document looks like:
//!
//! ```json
//! {
//!   "name": "zlib",
//!   "version": {"name": "1.3", "code": 130},
//!   "build": {"required": true, "command": "make"},
//!   "dependencies": {"libc": ">=2.0"}
//! }
//! ```
//!
//! `build` and `dependencies` are optional. A `build` section that is not an
//! object, or whose `required` is not `true`, means no build; its `command`
//! is only read when a build is required. A `dependencies` value that is not
//! an object means no dependencies. A registry listing is a JSON array of
//! such documents.

use std::{cmp::Ordering, fmt, path::Path};

use clpkg_utils::fs::read_file;
use serde::{
    de::{IgnoredAny, MapAccess, SeqAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{json, value::RawValue, Value};

use crate::error::MalformedDescriptor;

/// One `(name, version)` requirement of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, version: V) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Identity of a package version: its name and version code.
///
/// Ordering is lexicographic, name first, so that all versions of one package
/// sort together and identical versions end up adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId<'a> {
    pub name: &'a str,
    pub version_code: i64,
}

impl fmt::Display for PackageId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.version_code)
    }
}

/// A single installable package version.
///
/// `PartialEq` compares every field. Two descriptors that merely describe the
/// same package version are recognised through [`PackageDescriptor::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorDocument", into = "DescriptorDocument")]
pub struct PackageDescriptor {
    name: String,
    version_name: String,
    version_code: i64,
    build_command: Option<String>,
    dependencies: Vec<Dependency>,
}

impl PackageDescriptor {
    /// Creates a descriptor with no build step and no dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedDescriptor`] if `name` is empty.
    pub fn new<N, V>(name: N, version_name: V, version_code: i64) -> Result<Self, MalformedDescriptor>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(MalformedDescriptor::new("package name is empty"));
        }

        Ok(Self {
            name,
            version_name: version_name.into(),
            version_code,
            build_command: None,
            dependencies: Vec::new(),
        })
    }

    /// Marks the package as requiring a build with `command`.
    pub fn with_build<C: Into<String>>(mut self, command: C) -> Self {
        self.build_command = Some(command.into());
        self
    }

    /// Appends a dependency, keeping insertion order.
    pub fn with_dependency<N: Into<String>, V: Into<String>>(mut self, name: N, version: V) -> Self {
        self.dependencies.push(Dependency::new(name, version));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    pub fn version_code(&self) -> i64 {
        self.version_code
    }

    pub fn is_build_required(&self) -> bool {
        self.build_command.is_some()
    }

    /// The build command, present only when a build is required.
    pub fn build_command(&self) -> Option<&str> {
        self.build_command.as_deref()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn id(&self) -> PackageId<'_> {
        PackageId {
            name: &self.name,
            version_code: self.version_code,
        }
    }

    /// Returns `true` if both descriptors have the same name and version code.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Total order over descriptors: name, then version code.
    pub fn cmp_identity(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }

    /// Encodes the descriptor as a JSON document.
    pub fn to_document(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.name, self.version_name, self.version_code
        )
    }
}

impl std::str::FromStr for PackageDescriptor {
    type Err = MalformedDescriptor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_one(s.as_bytes())
    }
}

#[derive(Deserialize, Serialize)]
struct DescriptorDocument {
    name: String,
    version: VersionDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    build: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "ordered_dependencies")]
    dependencies: Vec<Dependency>,
}

#[derive(Deserialize, Serialize)]
struct VersionDocument {
    name: String,
    code: i64,
}

impl TryFrom<DescriptorDocument> for PackageDescriptor {
    type Error = String;

    fn try_from(doc: DescriptorDocument) -> Result<Self, Self::Error> {
        if doc.name.is_empty() {
            return Err("package name is empty".to_string());
        }

        let build_command = doc.build.as_ref().and_then(build_command);

        Ok(Self {
            name: doc.name,
            version_name: doc.version.name,
            version_code: doc.version.code,
            build_command,
            dependencies: doc.dependencies,
        })
    }
}

impl From<PackageDescriptor> for DescriptorDocument {
    fn from(pkg: PackageDescriptor) -> Self {
        Self {
            name: pkg.name,
            version: VersionDocument {
                name: pkg.version_name,
                code: pkg.version_code,
            },
            build: pkg
                .build_command
                .map(|command| json!({"required": true, "command": command})),
            dependencies: pkg.dependencies,
        }
    }
}

/// Command of a `build` section, `None` unless `required` is `true`.
///
/// A non-string `command` reads as empty.
fn build_command(build: &Value) -> Option<String> {
    let required = build.get("required").and_then(Value::as_bool).unwrap_or(false);
    required.then(|| {
        build
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    })
}

/// `dependencies` is a JSON object whose entry order matters and whose keys
/// may repeat, so it is (de)serialized straight to and from a `Vec`.
mod ordered_dependencies {
    use super::*;

    pub fn serialize<S>(deps: &[Dependency], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(deps.len()))?;
        for dep in deps {
            map.serialize_entry(&dep.name, &dep.version)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Dependency>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DependencyVisitor;

        impl<'de> Visitor<'de> for DependencyVisitor {
            type Value = Vec<Dependency>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of dependency names to version strings")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_str<E>(self, _: &str) -> Result<Self::Value, E> {
                Ok(Vec::new())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(Vec::new())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut deps = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, version)) = map.next_entry::<String, String>()? {
                    deps.push(Dependency {
                        name,
                        version,
                    });
                }
                Ok(deps)
            }
        }

        // Anything but an object carries no dependencies.
        deserializer.deserialize_any(DependencyVisitor)
    }
}

/// Parses a single descriptor document.
///
/// # Errors
///
/// Returns [`MalformedDescriptor`] if the document is not valid JSON, lacks a
/// non-empty string `name`, a string `version.name` or an integer
/// `version.code`, or maps a dependency to a non-string value.
pub fn parse_one(document: &[u8]) -> Result<PackageDescriptor, MalformedDescriptor> {
    serde_json::from_slice(document).map_err(|err| MalformedDescriptor::new(err.to_string()))
}

/// Parses a listing, a JSON array of descriptor documents.
///
/// Entries are parsed independently and in order; the first invalid entry
/// fails the whole listing, reporting its index and name.
pub fn parse_many(document: &[u8]) -> Result<Vec<PackageDescriptor>, MalformedDescriptor> {
    // Entries stay raw so each one is decoded straight from its own text,
    // keeping dependency order and duplicate keys intact.
    let entries: Vec<&RawValue> = serde_json::from_slice(document).map_err(|err| {
        MalformedDescriptor::new(format!("listing is not a JSON array: {err}"))
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_str::<PackageDescriptor>(entry.get()).map_err(|err| {
                MalformedDescriptor::new(err.to_string()).at(index, probe_name(entry))
            })
        })
        .collect()
}

/// Reads and parses a single descriptor file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<PackageDescriptor, MalformedDescriptor> {
    let path = path.as_ref();
    let content = read_file(path).map_err(|err| MalformedDescriptor::new(err.to_string()))?;
    parse_one(&content).map_err(|err| {
        MalformedDescriptor {
            reason: format!("{}: {}", path.display(), err.reason),
            ..err
        }
    })
}

/// Encodes descriptors as a listing document.
pub fn encode_listing(packages: &[PackageDescriptor]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(packages)
}

fn probe_name(entry: &RawValue) -> Option<String> {
    #[derive(Deserialize)]
    struct NameProbe {
        name: Option<String>,
    }

    serde_json::from_str::<NameProbe>(entry.get())
        .ok()
        .and_then(|probe| probe.name)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zlib() -> PackageDescriptor {
        PackageDescriptor::new("zlib", "1.3", 130)
            .unwrap()
            .with_build("./configure && make")
            .with_dependency("libc", ">=2.0")
            .with_dependency("make", "4")
            .with_dependency("libc", "<3.0")
    }

    #[test]
    fn test_parse_minimal() {
        let pkg = parse_one(br#"{"name":"zlib","version":{"name":"1.2","code":120}}"#).unwrap();

        assert_eq!(pkg.name(), "zlib");
        assert_eq!(pkg.version_name(), "1.2");
        assert_eq!(pkg.version_code(), 120);
        assert!(!pkg.is_build_required());
        assert_eq!(pkg.build_command(), None);
        assert!(pkg.dependencies().is_empty());
    }

    #[test]
    fn test_parse_full_document() {
        let pkg = parse_one(
            br#"{
                "name": "curl",
                "version": {"name": "8.0", "code": 800},
                "build": {"required": true, "command": "make"},
                "dependencies": {"zlib": "1.3", "openssl": "3", "zlib": "1.2"}
            }"#,
        )
        .unwrap();

        assert_eq!(pkg.build_command(), Some("make"));
        assert_eq!(
            pkg.dependencies(),
            &[
                Dependency::new("zlib", "1.3"),
                Dependency::new("openssl", "3"),
                Dependency::new("zlib", "1.2"),
            ]
        );
    }

    #[test]
    fn test_build_required_without_command() {
        let pkg = parse_one(
            br#"{"name":"a","version":{"name":"1","code":1},"build":{"required":true}}"#,
        )
        .unwrap();
        assert!(pkg.is_build_required());
        assert_eq!(pkg.build_command(), Some(""));
    }

    #[test]
    fn test_build_not_required_ignores_command() {
        let pkg = parse_one(
            br#"{"name":"a","version":{"name":"1","code":1},"build":{"required":false,"command":"make"}}"#,
        )
        .unwrap();
        assert!(!pkg.is_build_required());
        assert_eq!(pkg.build_command(), None);

        let pkg = parse_one(
            br#"{"name":"a","version":{"name":"1","code":1},"build":{"command":"make"}}"#,
        )
        .unwrap();
        assert!(!pkg.is_build_required());
    }

    #[test]
    fn test_build_section_of_any_shape() {
        for build in [
            r#"{"required":false,"command":7}"#,
            r#"{"command":["make"]}"#,
            r#"{"required":"yes","command":"make"}"#,
            r#"{"required":1}"#,
            "true",
            "null",
            "\"make\"",
            "[1, 2]",
        ] {
            let document = format!(r#"{{"name":"a","version":{{"name":"1","code":1}},"build":{build}}}"#);
            let pkg = parse_one(document.as_bytes()).unwrap();
            assert!(!pkg.is_build_required(), "build: {build}");
        }
    }

    #[test]
    fn test_required_build_with_non_string_command() {
        let pkg = parse_one(
            br#"{"name":"a","version":{"name":"1","code":1},"build":{"required":true,"command":7}}"#,
        )
        .unwrap();
        assert_eq!(pkg.build_command(), Some(""));
    }

    #[test]
    fn test_dependencies_of_non_object_shape() {
        for deps in ["null", "[]", r#"["zlib"]"#, "7", "\"zlib\"", "false"] {
            let document = format!(r#"{{"name":"a","version":{{"name":"1","code":1}},"dependencies":{deps}}}"#);
            let pkg = parse_one(document.as_bytes()).unwrap();
            assert!(pkg.dependencies().is_empty(), "dependencies: {deps}");
        }
    }

    #[test]
    fn test_listing_with_loose_optional_sections() {
        let packages = parse_many(
            br#"[
                {"name":"a","version":{"name":"1","code":1},"build":true,"dependencies":null},
                {"name":"b","version":{"name":"2","code":2},"build":{"required":false,"command":7}},
                {"name":"c","version":{"name":"3","code":3},"dependencies":{"a":"1"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(packages.len(), 3);
        assert_eq!(packages[2].dependencies(), &[Dependency::new("a", "1")]);
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(parse_one(br#"{"version":{"name":"1","code":1}}"#).is_err());
        assert!(parse_one(br#"{"name":"a","version":{"name":"1"}}"#).is_err());
        assert!(parse_one(br#"{"name":"a","version":{"code":1}}"#).is_err());
        assert!(parse_one(br#"{"name":"a"}"#).is_err());
    }

    #[test]
    fn test_wrong_types() {
        assert!(parse_one(br#"{"name":7,"version":{"name":"1","code":1}}"#).is_err());
        assert!(parse_one(br#"{"name":"","version":{"name":"1","code":1}}"#).is_err());
        assert!(parse_one(br#"{"name":"a","version":{"name":1,"code":1}}"#).is_err());
        assert!(parse_one(br#"{"name":"a","version":{"name":"1","code":"1"}}"#).is_err());
        assert!(parse_one(br#"{"name":"a","version":{"name":"1","code":1.5}}"#).is_err());
    }

    #[test]
    fn test_dependency_with_non_string_version() {
        let err = parse_one(
            br#"{"name":"a","version":{"name":"1","code":1},"dependencies":{"b":2}}"#,
        )
        .unwrap_err();
        assert_eq!(err.index, None);
        assert!(err.reason.contains("invalid type"));
    }

    #[test]
    fn test_round_trip() {
        let pkg = zlib();
        let document = pkg.to_document().unwrap();
        let parsed: PackageDescriptor = document.parse().unwrap();

        assert_eq!(parsed, pkg);
        assert_eq!(parsed.dependencies()[2], Dependency::new("libc", "<3.0"));
    }

    #[test]
    fn test_round_trip_without_build() {
        let pkg = PackageDescriptor::new("m4", "1.4", 14).unwrap();
        let parsed = parse_one(pkg.to_document().unwrap().as_bytes()).unwrap();
        assert_eq!(parsed, pkg);
        assert!(!pkg.to_document().unwrap().contains("build"));
    }

    #[test]
    fn test_new_rejects_empty_name() {
        assert!(PackageDescriptor::new("", "1", 1).is_err());
    }

    #[test]
    fn test_identity_ignores_metadata() {
        let a = PackageDescriptor::new("zlib", "1.2", 120).unwrap();
        let b = PackageDescriptor::new("zlib", "1.2-final", 120)
            .unwrap()
            .with_build("make");

        assert!(a.same_identity(&b));
        assert_ne!(a, b);
        assert_eq!(a.cmp_identity(&b), Ordering::Equal);
    }

    #[test]
    fn test_identity_order_is_name_then_code() {
        let a1 = PackageDescriptor::new("a", "9", 9).unwrap();
        let b0 = PackageDescriptor::new("b", "0", 0).unwrap();
        let b5 = PackageDescriptor::new("b", "5", 5).unwrap();

        assert_eq!(a1.cmp_identity(&b0), Ordering::Less);
        assert_eq!(b0.cmp_identity(&a1), Ordering::Greater);
        assert_eq!(b0.cmp_identity(&b5), Ordering::Less);
        assert_eq!(a1.cmp_identity(&b5), Ordering::Less);
    }

    #[test]
    fn test_parse_many() {
        let packages = parse_many(
            br#"[
                {"name":"zlib","version":{"name":"1.2","code":120}},
                {"name":"zlib","version":{"name":"1.3","code":130}}
            ]"#,
        )
        .unwrap();

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[1].version_code(), 130);
        assert!(parse_many(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_many_fails_fast_with_location() {
        let err = parse_many(
            br#"[
                {"name":"ok","version":{"name":"1","code":1}},
                {"name":"broken","version":{"name":"1"}},
                {"version":{"name":"1","code":1}}
            ]"#,
        )
        .unwrap_err();

        assert_eq!(err.index, Some(1));
        assert_eq!(err.name.as_deref(), Some("broken"));
    }

    #[test]
    fn test_parse_many_nameless_entry() {
        let err = parse_many(br#"[{"version":{"name":"1","code":1}}]"#).unwrap_err();
        assert_eq!(err.index, Some(0));
        assert_eq!(err.name, None);
    }

    #[test]
    fn test_parse_many_rejects_non_array() {
        assert!(parse_many(br#"{"name":"zlib"}"#).is_err());
        assert!(parse_many(b"not json").is_err());
        assert!(parse_many(b"").is_err());
        assert!(parse_many(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_encode_listing_round_trip() {
        let packages = vec![zlib(), PackageDescriptor::new("m4", "1.4", 14).unwrap()];
        let listing = encode_listing(&packages).unwrap();
        assert_eq!(parse_many(&listing).unwrap(), packages);
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zlib.json");
        std::fs::write(&path, zlib().to_document().unwrap()).unwrap();

        assert_eq!(parse_file(&path).unwrap(), zlib());
        assert!(parse_file(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(zlib().to_string(), "zlib 1.3 (130)");
        assert_eq!(zlib().id().to_string(), "zlib#130");
    }
}
