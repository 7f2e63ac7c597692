//! Map a device's model (and running image) to its target firmware.
//!
//! The decision is one linear pass:
//!   1. infer a license from the running image filename,
//!   2. normalise the model string to a family key,
//!   3. look the family up in the [`ModelMap`],
//!   4. pick the single option, or the one whose license matches,
//!   5. compare the target version with the running one (exact string match).

use log::debug;
use serde::Serialize;

use crate::error::{LookupError, Result};
use crate::license::License;
use crate::model_map::{FirmwareOption, ModelMap};

pub const MSG_UNMAPPED:  &str = "Unable to map model to a target firmware version";
pub const MSG_CURRENT:   &str = "Currently running target firmware version";
pub const MSG_MAPPED:    &str = "Successfully mapped model to target firmware version";

/// Result object written to stdout, one per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_required: Option<bool>,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
}

impl ResolutionResult {
    /// Domain-level failure: `{success: false, msg}` only.
    pub fn unmapped() -> Self {
        ResolutionResult {
            success:         false,
            update_required: None,
            msg:             MSG_UNMAPPED.to_string(),
            target_os:       None,
            target_file:     None,
        }
    }

    fn target(option: &FirmwareOption, running_version: &str) -> Self {
        let current = option.version == running_version;
        ResolutionResult {
            success:         true,
            update_required: Some(!current),
            msg:             if current { MSG_CURRENT } else { MSG_MAPPED }.to_string(),
            target_os:       Some(option.version.clone()),
            target_file:     Some(option.image.clone()),
        }
    }
}

/// Reduce a model string such as `WS-C2960X-24TS-L` to its family key
/// (`C2960X`). A leading `WS` segment is dropped.
///
/// Degenerate input (`""`, `"WS"`) yields an empty key, which matches no
/// family.
pub fn model_family(model: &str) -> &str {
    let mut segments = model.split('-');
    match segments.next() {
        Some("WS") => segments.next().unwrap_or(""),
        Some(first) => first,
        None => "",
    }
}

/// Select the target firmware option for `model`, disambiguating sibling
/// options with `license`.
pub fn select<'a>(
    map:     &'a ModelMap,
    model:   &str,
    license: Option<License>,
) -> Result<&'a FirmwareOption> {
    let family = model_family(model);
    debug!("model '{model}' normalised to family '{family}'");

    let options = map.get(family).ok_or_else(|| LookupError::UnknownModel {
        family: family.to_string(),
    })?;

    match options {
        [only] => Ok(only),
        _ => options
            .iter()
            .find(|opt| opt.license == license)
            .ok_or_else(|| LookupError::LicenseMismatch {
                family: family.to_string(),
                license,
            }),
    }
}

/// Run the full resolution for one device.
pub fn resolve(map: &ModelMap, version: &str, model: &str, image: &str) -> ResolutionResult {
    let license = License::infer(image);
    debug!("image '{image}' → license {license:?}");

    match select(map, model, license) {
        Ok(option) => {
            debug!("selected {} ({})", option.image, option.version);
            ResolutionResult::target(option, version)
        }
        Err(e) => {
            debug!("{e}");
            ResolutionResult::unmapped()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(model: &str, version: &str, image: &str) -> ResolutionResult {
        resolve(&ModelMap::builtin(), version, model, image)
    }

    fn expect_target(r: &ResolutionResult, update: bool, os: &str, file: &str) {
        assert!(r.success, "{r:?}");
        assert_eq!(r.update_required, Some(update));
        assert_eq!(r.target_os.as_deref(), Some(os));
        assert_eq!(r.target_file.as_deref(), Some(file));
    }

    #[test]
    fn family_normalisation() {
        assert_eq!(model_family("WS-C2960X-24TS-L"), "C2960X");
        assert_eq!(model_family("C9300-48P"), "C9300");
        assert_eq!(model_family("C9300"), "C9300");
        assert_eq!(model_family("WS-C3560C-8PC-S"), "C3560C");
        // only a leading WS is stripped, and only once
        assert_eq!(model_family("C2960-WS"), "C2960");
        assert_eq!(model_family("WS-WS-C2960"), "WS");
        assert_eq!(model_family(""), "");
        assert_eq!(model_family("WS"), "");
        assert_eq!(model_family("WS-"), "");
    }

    #[test]
    fn c9300_running_target() {
        let r = run("C9300", "16.12.03a", "");
        expect_target(&r, false, "16.12.03a", "cat9k_iosxe.16.12.03a.SPA.bin");
        assert_eq!(r.msg, MSG_CURRENT);
    }

    #[test]
    fn c2960x_needs_update() {
        let r = run("WS-C2960X-24TS-L", "15.0(1)SE", "");
        expect_target(&r, true, "15.2(7)E2", "c2960x-universalk9-mz.152-7.E2.bin");
        assert_eq!(r.msg, MSG_MAPPED);
    }

    #[test]
    fn c2960_lanlite_from_image() {
        let r = run("C2960", "15.0(2)SE11", "c2960-lanlitek9-mz.150-2.SE11.bin");
        expect_target(&r, false, "15.0(2)SE11", "c2960-lanlitek9-mz.150-2.SE11.bin");
    }

    #[test]
    fn c2960_lanbase_from_image() {
        let r = run("WS-C2960-24TT-L", "12.2(55)SE", "c2960-lanbasek9-mz.122-55.SE.bin");
        expect_target(&r, true, "15.0(2)SE11", "c2960-lanbasek9-mz.150-2.SE11.bin");
    }

    #[test]
    fn multi_option_without_license_fails() {
        assert_eq!(run("C2960", "15.0(2)SE11", ""), ResolutionResult::unmapped());
        assert!(matches!(
            select(&ModelMap::builtin(), "C2960", None),
            Err(LookupError::LicenseMismatch { .. })
        ));
    }

    #[test]
    fn multi_option_wrong_license_fails() {
        // ipbase tag on a lanbase/lanlite family
        let r = run("C2960", "15.0(2)SE11", "c3560-ipbasek9-mz.150-2.SE11.bin");
        assert_eq!(r, ResolutionResult::unmapped());
    }

    #[test]
    fn unknown_family_fails() {
        let r = run("C4500", "1.0", "");
        assert!(!r.success);
        assert_eq!(r.msg, MSG_UNMAPPED);
        assert!(r.update_required.is_none() && r.target_os.is_none() && r.target_file.is_none());
        assert!(matches!(
            select(&ModelMap::builtin(), "C4500", None),
            Err(LookupError::UnknownModel { family }) if family == "C4500"
        ));
    }

    #[test]
    fn degenerate_models_fail() {
        for model in ["", "WS", "WS-", "-C9300"] {
            assert_eq!(run(model, "1.0", ""), ResolutionResult::unmapped(), "model={model:?}");
        }
    }

    #[test]
    fn single_option_ignores_image() {
        let map = ModelMap::builtin();
        let images = ["", "c2960-lanlitek9-mz.bin", "lanbase", "ipbase", "ipservices", "garbage"];
        for (family, options) in map.iter().filter(|(_, options)| options.len() == 1) {
            let target = &options[0];
            for image in images {
                let r = resolve(&map, &target.version, family, image);
                expect_target(&r, false, &target.version, &target.image);
                let ws = resolve(&map, "0.0", &format!("WS-{family}-24TS-L"), image);
                expect_target(&ws, true, &target.version, &target.image);
            }
        }
    }

    #[test]
    fn every_licensed_option_is_selectable() {
        let map = ModelMap::builtin();
        let mut checked = 0;
        for (family, options) in map.iter().filter(|(_, options)| options.len() > 1) {
            for target in options {
                let lic = target.license.unwrap();
                let image = format!("{}-{}k9-mz.bin", family.to_lowercase(), lic);
                let r = resolve(&map, &target.version, &format!("WS-{family}-48PS-S"), &image);
                expect_target(&r, false, &target.version, &target.image);
                checked += 1;
            }
            assert_eq!(
                resolve(&map, "1.0", family, ""),
                ResolutionResult::unmapped(),
                "family={family}"
            );
        }
        // C2960, C3560, C3560C, C3750 with two licenses each
        assert_eq!(checked, 8);
    }

    #[test]
    fn foreign_license_never_matches() {
        let map = ModelMap::builtin();
        for (family, options) in map.iter().filter(|(_, options)| options.len() > 1) {
            for lic in [License::LanLite, License::LanBase, License::IpBase, License::IpServices] {
                if options.iter().any(|opt| opt.license == Some(lic)) {
                    continue;
                }
                let image = format!("x-{lic}k9-mz.bin");
                let r = resolve(&map, "1.0", family, &image);
                assert_eq!(r, ResolutionResult::unmapped(), "family={family} license={lic}");
            }
        }
    }

    #[test]
    fn ipservices_selects_second_option() {
        let r = run("WS-C3750-48PS-S", "12.2(55)SE", "c3750-ipservicesk9-mz.122-55.SE.bin");
        expect_target(&r, true, "15.0(2)SE11", "c3750-ipservicesk9-mz.150-2.SE11");
    }

    #[test]
    fn version_match_is_exact() {
        let r = run("C2960", "15.0.2.SE11", "c2960-lanlitek9-mz.150-2.SE11.bin");
        assert_eq!(r.update_required, Some(true));
        let r = run("C9300", "16.12.03A", "");
        assert_eq!(r.update_required, Some(true));
        let r = run("C9300", " 16.12.03a", "");
        assert_eq!(r.update_required, Some(true));
    }

    #[test]
    fn repeat_resolution_is_identical() {
        let a = run("WS-C3560-24PS-S", "12.2", "c3560-ipbasek9-mz.122.bin");
        let b = run("WS-C3560-24PS-S", "12.2", "c3560-ipbasek9-mz.122.bin");
        assert_eq!(a, b);
    }

    #[test]
    fn failure_json_shape() {
        let v = serde_json::to_value(ResolutionResult::unmapped()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["success"], false);
        assert_eq!(obj["msg"], MSG_UNMAPPED);
    }

    #[test]
    fn success_json_shape() {
        let v = serde_json::to_value(run("C9300", "16.12.03a", "")).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["success"], true);
        assert_eq!(obj["update_required"], false);
        assert_eq!(obj["target_os"], "16.12.03a");
        assert_eq!(obj["target_file"], "cat9k_iosxe.16.12.03a.SPA.bin");
    }
}
