//! Optional model-map override file.
//!
//! Same shape as the compiled-in table, as JSON:
//!
//! ```json
//! {
//!   "C9300": [
//!     { "image": "cat9k_iosxe.16.12.03a.SPA.bin", "version": "16.12.03a", "license": null }
//!   ],
//!   "C2960": [
//!     { "image": "c2960-lanbasek9-mz.150-2.SE11.bin", "version": "15.0(2)SE11",
//!       "license": "lanbase" },
//!     { "image": "c2960-lanlitek9-mz.150-2.SE11.bin", "version": "15.0(2)SE11",
//!       "license": "lanlite" }
//!   ]
//! }
//! ```
//!
//! Family and option order follow the file. A family key may appear once.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::Result;
use crate::model_map::{FirmwareOption, ModelMap};

/// Families in file order, rejecting repeated keys.
struct RawFamilies(Vec<(String, Vec<FirmwareOption>)>);

impl<'de> Deserialize<'de> for RawFamilies {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FamiliesVisitor;

        impl<'de> Visitor<'de> for FamiliesVisitor {
            type Value = RawFamilies;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of model family to firmware options")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<RawFamilies, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut seen = HashSet::new();
                let mut families = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((family, options)) =
                    access.next_entry::<String, Vec<FirmwareOption>>()?
                {
                    if !seen.insert(family.clone()) {
                        return Err(de::Error::custom(format!("duplicate family '{family}'")));
                    }
                    families.push((family, options));
                }
                Ok(RawFamilies(families))
            }
        }

        deserializer.deserialize_map(FamiliesVisitor)
    }
}

/// Parse a JSON model map and check its invariants.
pub fn parse_model_map(content: &str) -> Result<ModelMap> {
    let RawFamilies(families) = serde_json::from_str(content)?;
    ModelMap::new(families)
}

/// Read and parse the model map at `path`.
pub fn load_model_map(path: &Path) -> Result<ModelMap> {
    let content = fs::read_to_string(path)?;
    parse_model_map(&content)
}
