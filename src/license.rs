//! Firmware license variants and their inference from an image filename.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Feature tier of a firmware line shared by otherwise identical hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum License {
    LanLite,
    LanBase,
    IpBase,
    IpServices,
}

/// Substring probes in match priority order. `lanlite` must stay first.
const PROBES: [(&str, License); 4] = [
    ("lanlite",    License::LanLite),
    ("lanbase",    License::LanBase),
    ("ipbase",     License::IpBase),
    ("ipservices", License::IpServices),
];

impl License {
    pub fn as_str(&self) -> &'static str {
        match self {
            License::LanLite    => "lanlite",
            License::LanBase    => "lanbase",
            License::IpBase     => "ipbase",
            License::IpServices => "ipservices",
        }
    }

    /// Infer the license from the running image filename.
    ///
    /// Plain substring match, first probe wins. Returns `None` when the name
    /// carries no recognised tag (including the empty string).
    pub fn infer(image: &str) -> Option<License> {
        PROBES
            .iter()
            .find(|(tag, _)| image.contains(tag))
            .map(|&(_, lic)| lic)
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
