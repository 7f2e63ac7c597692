//! Model family → firmware option table.
//!
//! The built-in table is compiled in and validated once at startup. A map
//! loaded through `config::load_model_map` goes through the same checks.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{LookupError, Result};
use crate::license::License;

/// One candidate firmware artifact for a model family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareOption {
    pub image:   String,
    pub version: String,
    /// `None` only for families with a single unlicensed firmware line.
    #[serde(default)]
    pub license: Option<License>,
}

// ── Built-in table ────────────────────────────────────────────────────────────

type Row = (&'static str, &'static str, Option<License>);

const BUILTIN: &[(&str, &[Row])] = &[
    ("C9300", &[
        ("cat9k_iosxe.16.12.03a.SPA.bin",      "16.12.03a",   None),
    ]),
    ("C2960X", &[
        ("c2960x-universalk9-mz.152-7.E2.bin", "15.2(7)E2",   None),
    ]),
    ("C3560CX", &[
        ("c3560cx-universalk9-mz.152-7.E2.bin", "15.2(7)E2",  None),
    ]),
    ("C2960", &[
        ("c2960-lanbasek9-mz.150-2.SE11.bin",  "15.0(2)SE11", Some(License::LanBase)),
        ("c2960-lanlitek9-mz.150-2.SE11.bin",  "15.0(2)SE11", Some(License::LanLite)),
    ]),
    ("C3560", &[
        ("c3560-ipbasek9-mz.150-2.SE11.bin",   "15.0(2)SE11", Some(License::IpBase)),
        ("c3560-ipservicesk9-mz.150-2.SE11",   "15.0(2)SE11", Some(License::IpServices)),
    ]),
    ("C3560C", &[
        ("c3560-ipbasek9-mz.150-2.SE11.bin",   "15.0(2)SE11", Some(License::IpBase)),
        ("c3560-ipservicesk9-mz.150-2.SE11",   "15.0(2)SE11", Some(License::IpServices)),
    ]),
    ("C3750", &[
        ("c3750-ipbasek9-mz.150-2.SE11.bin",   "15.0(2)SE11", Some(License::IpBase)),
        ("c3750-ipservicesk9-mz.150-2.SE11",   "15.0(2)SE11", Some(License::IpServices)),
    ]),
];

// ── ModelMap ──────────────────────────────────────────────────────────────────

/// Ordered, read-only mapping from model family key to firmware options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMap {
    families: Vec<(String, Vec<FirmwareOption>)>,
}

impl ModelMap {
    /// Build a map from `(family, options)` pairs, keeping their order.
    ///
    /// Fails if the result does not satisfy [`ModelMap::validate`].
    pub fn new(families: Vec<(String, Vec<FirmwareOption>)>) -> Result<Self> {
        let map = ModelMap { families };
        map.validate()?;
        Ok(map)
    }

    /// The compiled-in table.
    pub fn builtin() -> Self {
        let families = BUILTIN
            .iter()
            .map(|(family, rows)| {
                let options = rows
                    .iter()
                    .map(|&(image, version, license)| FirmwareOption {
                        image:   image.to_string(),
                        version: version.to_string(),
                        license,
                    })
                    .collect();
                (family.to_string(), options)
            })
            .collect();
        ModelMap { families }
    }

    /// Options for `family` in table order, or `None` if the key is absent.
    pub fn get(&self, family: &str) -> Option<&[FirmwareOption]> {
        self.families
            .iter()
            .find(|(key, _)| key == family)
            .map(|(_, options)| options.as_slice())
    }

    /// `(family, options)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FirmwareOption])> {
        self.families
            .iter()
            .map(|(family, options)| (family.as_str(), options.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Check the table invariants the resolver relies on.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (family, options) in &self.families {
            if family.is_empty() {
                return Err(LookupError::InvalidMap("empty model family key".into()));
            }
            if family.contains('-') {
                return Err(LookupError::InvalidMap(format!(
                    "family '{family}' contains '-' and can never be looked up"
                )));
            }
            if !seen.insert(family.as_str()) {
                return Err(LookupError::InvalidMap(format!("duplicate family '{family}'")));
            }
            if options.is_empty() {
                return Err(LookupError::InvalidMap(format!(
                    "family '{family}' has no firmware options"
                )));
            }
            if options.len() > 1 {
                let mut licenses = HashSet::new();
                for opt in options {
                    let lic = opt.license.ok_or_else(|| {
                        LookupError::InvalidMap(format!(
                            "family '{family}' has several options but '{}' carries no license",
                            opt.image
                        ))
                    })?;
                    if !licenses.insert(lic) {
                        return Err(LookupError::InvalidMap(format!(
                            "family '{family}' lists license {lic} more than once"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Serialize for ModelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.families.len()))?;
        for (family, options) in self.iter() {
            map.serialize_entry(family, options)?;
        }
        map.end()
    }
}
